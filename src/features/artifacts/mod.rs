//! Documents generated for an opportunity. Generation currently records a
//! placeholder Google Docs link; the workflow does not produce them yet.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ArtifactService;
