pub mod upload_handler;

pub use upload_handler::{
    __path_proxy_upload, method_not_allowed, preflight, proxy_upload, read_submission,
};
