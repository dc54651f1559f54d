mod upload_dto;

pub use upload_dto::{
    FilePart, ProxyErrorDto, ProxyUploadForm, RelayResultDto, UploadSubmission,
    ACCEPTED_MIME_TYPE, MAX_FILE_SIZE, MAX_UPLOAD_BODY_SIZE, REQUIRED_RESULT_FIELDS,
    UPSTREAM_DETAIL_MAX_CHARS, WEBHOOK_DEADLINE,
};
