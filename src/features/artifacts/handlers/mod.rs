pub mod artifact_handler;

pub use artifact_handler::{
    __path_delete_artifact, __path_generate_artifact, __path_list_artifacts, delete_artifact,
    generate_artifact, list_artifacts,
};
