mod input_file;

pub use input_file::{is_placeholder, CreateInputFile, InputFile, RetryInputFile, UploadStatus};

#[cfg(test)]
pub use input_file::PLACEHOLDER_IDENTIFIER;
