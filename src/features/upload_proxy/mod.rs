pub mod dtos;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod services;

pub use error::ProxyError;
pub use routes::routes;
pub use services::UploadProxyService;
