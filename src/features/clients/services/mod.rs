mod client_service;

pub use client_service::{normalize_client_name, ClientService};
