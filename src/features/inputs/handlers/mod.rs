pub mod input_handler;

pub use input_handler::{
    __path_create_input, __path_delete_input, __path_list_inputs, __path_retry_input,
    create_input, delete_input, list_inputs, retry_input,
};
