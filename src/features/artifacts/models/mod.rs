mod artifact;

pub use artifact::{ArtifactDoc, NewArtifact};
