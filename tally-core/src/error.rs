//! Error types for feature extraction and classification

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifyError>;

#[derive(Error, Debug)]
pub enum ClassifyError {
    /// No labelled examples to fit on
    #[error("training set is empty: at least one labelled example is required")]
    EmptyTrainingSet,

    #[error("got {vectors} feature vectors but {labels} labels")]
    LabelCountMismatch { vectors: usize, labels: usize },

    /// Vector was built against a different vocabulary than the model
    #[error("feature vector has {found} dimensions, model expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Same size, but built against a different term list than the model
    #[error("feature vector was built against a different vocabulary than the model")]
    VocabularyMismatch,

    #[error("smoothing parameter must be finite and > 0, got {0}")]
    InvalidSmoothing(f64),

    #[error("invalid n-gram range ({min}, {max}): need 1 <= min <= max")]
    InvalidNgramRange { min: usize, max: usize },

    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),
}
