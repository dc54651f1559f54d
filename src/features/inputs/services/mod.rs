mod ingestion_service;
mod input_store;

#[cfg(test)]
pub(crate) mod fake;

pub use ingestion_service::{IngestionService, NewUpload};
pub use input_store::{InputStore, PgInputStore};
