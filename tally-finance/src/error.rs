use tally_core::ClassifyError;
use tally_ingest::IngestError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    /// No corpus item is currently predicted into this category
    #[error("unknown category '{0}': no item is predicted into it")]
    UnknownCategory(String),

    #[error("item id {index} out of range: corpus has {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// Category cannot be written back as the last field of a record
    #[error("invalid category '{category}': {reason}")]
    InvalidCategory {
        category: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}
