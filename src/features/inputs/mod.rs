//! PDF inputs attached to opportunities.
//!
//! Each upload is recorded as a row that starts `processing`, is relayed
//! through the upload proxy in-process, and ends `completed` or `failed`.
//! Failed rows can be retried with a fresh copy of the file.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{IngestionService, InputStore, PgInputStore};
