pub mod client_handler;

pub use client_handler::{__path_list_clients, list_clients};
