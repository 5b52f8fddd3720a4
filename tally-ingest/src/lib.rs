//! tally-ingest: the `;`-delimited bank record format (reading and writing)

pub mod error;
pub mod reader;
pub mod types;
pub mod writer;

pub use error::{IngestError, Result};
pub use reader::{read_corpus, read_corpus_from, read_training, read_training_from, ReadOptions};
pub use types::{category_problem, LabeledTransaction, Transaction};
pub use writer::{save_predictions, save_training, write_labeled};
