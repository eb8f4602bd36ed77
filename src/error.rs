use thiserror::Error;

/// Failure kinds raised by this crate itself.
/// Collaborator failures (calculators, training) travel as `anyhow::Error`.
#[derive(Debug, Error, PartialEq)]
pub enum AipesError {
    #[error("cannot compute statistics over an empty set of values")]
    EmptyInput,

    #[error("image '{0}' carries no reference {1}")]
    MissingReference(String, &'static str),

    #[error("image '{label}': expected {expected} force vectors, got {actual}")]
    ShapeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("image '{0}' has no atoms")]
    NoAtoms(String),

    #[error("cannot split {images} images into {ngroup} groups")]
    InvalidGroupCount { ngroup: usize, images: usize },

    #[error("group index {index} out of range (ngroup = {ngroup})")]
    GroupOutOfRange { index: usize, ngroup: usize },

    #[error("a path needs at least the two endpoint images, got {0}")]
    PathTooShort(usize),

    #[error("a path of {0} images has no intermediate images to refine")]
    NoIntermediateImages(usize),
}
