//! Writers producing the same `;`-delimited layout the reader accepts

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{IngestError, Result};
use crate::types::{LabeledTransaction, Transaction};

/// Write each transaction with its category appended as the last field.
pub fn write_labeled<'a, W, I>(out: W, rows: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = (&'a Transaction, &'a str)>,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(out);

    let mut n = 0;
    for (txn, category) in rows {
        wtr.write_record(txn.fields().iter().map(String::as_str).chain([category]))?;
        n += 1;
    }
    wtr.flush().map_err(|e| IngestError::Csv(e.into()))?;
    Ok(n)
}

/// Corpus lines with the predicted category appended
pub fn save_predictions<'a, I>(path: impl AsRef<Path>, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = (&'a Transaction, &'a str)>,
{
    let path = path.as_ref();
    let n = write_labeled(create(path)?, rows)?;
    info!(path = %path.display(), records = n, "saved predictions");
    Ok(n)
}

pub fn save_training(path: impl AsRef<Path>, examples: &[LabeledTransaction]) -> Result<usize> {
    let path = path.as_ref();
    let rows = examples
        .iter()
        .map(|e| (&e.transaction, e.category.as_str()));
    let n = write_labeled(create(path)?, rows)?;
    info!(path = %path.display(), records = n, "saved training set");
    Ok(n)
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}
