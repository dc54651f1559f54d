mod upload_proxy_service;

pub use upload_proxy_service::UploadProxyService;
