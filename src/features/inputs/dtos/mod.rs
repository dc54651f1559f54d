mod input_dto;

pub use input_dto::{InputFileResponseDto, UploadInputForm};
