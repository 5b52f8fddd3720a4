//! Lenient reader for `;`-delimited transaction files.
//!
//! Only lines whose first field is a `YYYY/MM/DD` date are data; anything
//! else (headers, comments, blank lines) is skipped silently. A data line
//! that fails validation is a [`IngestError::MalformedRecord`] unless
//! [`ReadOptions::skip_malformed`] is set, in which case it is logged and
//! dropped.
//!
//! Lines are split as raw bytes. Only data lines must be UTF-8, so a header
//! in another encoding (a Latin-1 `Libellé`, say) never stops a read.

use chrono::NaiveDate;
use regex::bytes::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::types::{category_problem, LabeledTransaction, Transaction, DATE_FORMAT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub skip_malformed: bool,
}

/// Read a corpus file (`date;details...;amount` per line).
pub fn read_corpus(path: impl AsRef<Path>, opts: ReadOptions) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let txns = read_corpus_from(open(path)?, opts)?;
    debug!(path = %path.display(), records = txns.len(), "read corpus");
    Ok(txns)
}

/// Read a training file (`date;details...;amount;category` per line).
pub fn read_training(path: impl AsRef<Path>, opts: ReadOptions) -> Result<Vec<LabeledTransaction>> {
    let path = path.as_ref();
    let examples = read_training_from(open(path)?, opts)?;
    debug!(path = %path.display(), records = examples.len(), "read training set");
    Ok(examples)
}

pub fn read_corpus_from<R: Read>(rdr: R, opts: ReadOptions) -> Result<Vec<Transaction>> {
    read_data_lines(rdr, opts, |fields| {
        if fields.len() < 3 {
            return Err(format!(
                "expected at least 3 fields (date;details;amount), found {}",
                fields.len()
            ));
        }
        let txn = Transaction::from_fields(fields);
        txn.amount().map_err(|e| e.to_string())?;
        Ok(txn)
    })
}

pub fn read_training_from<R: Read>(rdr: R, opts: ReadOptions) -> Result<Vec<LabeledTransaction>> {
    read_data_lines(rdr, opts, |mut fields| {
        if fields.len() < 4 {
            return Err(format!(
                "expected at least 4 fields (date;details;amount;category), found {}",
                fields.len()
            ));
        }
        let category = fields.pop().unwrap_or_default();
        if let Some(problem) = category_problem(&category) {
            return Err(problem.to_string());
        }
        Ok(LabeledTransaction::new(Transaction::from_fields(fields), category))
    })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_data_lines<R, T, F>(rdr: R, opts: ReadOptions, mut parse: F) -> Result<Vec<T>>
where
    R: Read,
    F: FnMut(Vec<String>) -> std::result::Result<T, String>,
{
    let date_re = Regex::new(r"^\d{4}/\d{2}/\d{2}$")?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(rdr);

    let mut out = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // Header / comment lines: no date prefix
        if record.len() < 2 || !date_re.is_match(&record[0]) {
            continue;
        }

        let parsed = decode_fields(&record).and_then(|mut fields| {
            if let Some(last) = fields.last_mut() {
                let trimmed = last.trim_end().len();
                last.truncate(trimmed);
            }
            match NaiveDate::parse_from_str(&fields[0], DATE_FORMAT) {
                Ok(_) => parse(fields),
                Err(_) => Err(format!("invalid date '{}'", fields[0])),
            }
        });

        match parsed {
            Ok(item) => out.push(item),
            Err(reason) if opts.skip_malformed => {
                warn!(line, %reason, "skipping malformed record");
            }
            Err(reason) => return Err(IngestError::MalformedRecord { line, reason }),
        }
    }

    Ok(out)
}

fn decode_fields(record: &csv::ByteRecord) -> std::result::Result<Vec<String>, String> {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            std::str::from_utf8(field)
                .map(str::to_string)
                .map_err(|_| format!("invalid UTF-8 in field {}", i + 1))
        })
        .collect()
}
