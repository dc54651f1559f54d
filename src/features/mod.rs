pub mod artifacts;
pub mod clients;
pub mod inputs;
pub mod opportunities;
pub mod upload_proxy;
