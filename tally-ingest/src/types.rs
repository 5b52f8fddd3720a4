use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{IngestError, Result};

pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// One bank transaction: `date;field...;amount`.
///
/// Always has at least three fields. The fields between the date and the
/// amount are the free text used for categorisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Transaction {
    fields: Vec<String>,
}

impl Transaction {
    pub(crate) fn from_fields(fields: Vec<String>) -> Self {
        debug_assert!(fields.len() >= 3);
        Self { fields }
    }

    /// Parse a single `;`-delimited line. Returns `None` when the line has
    /// fewer than three fields.
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<String> = line.trim().split(';').map(str::to_string).collect();
        (fields.len() >= 3).then(|| Self::from_fields(fields))
    }

    pub fn date_field(&self) -> &str {
        &self.fields[0]
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_field(), DATE_FORMAT).ok()
    }

    /// Fields between date and amount
    pub fn details(&self) -> &[String] {
        &self.fields[1..self.fields.len() - 1]
    }

    /// Classifier input: the detail fields re-joined with `;`
    pub fn text(&self) -> String {
        self.details().join(";")
    }

    pub fn amount_field(&self) -> &str {
        &self.fields[self.fields.len() - 1]
    }

    /// Amount with embedded spaces removed (`"1 234.50"` → 1234.5)
    pub fn amount(&self) -> Result<f64> {
        let raw = self.amount_field();
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        compact
            .parse()
            .map_err(|_| IngestError::InvalidAmount(raw.to_string()))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The record as it appears in a file
    pub fn to_line(&self) -> String {
        self.fields.join(";")
    }
}

/// Why `category` cannot be stored as the last field of a record, if it
/// cannot. Field separators and line breaks would split the saved line.
pub fn category_problem(category: &str) -> Option<&'static str> {
    if category.trim().is_empty() {
        Some("empty category")
    } else if category.contains(';') {
        Some("category contains the field separator ';'")
    } else if category.contains(['\n', '\r']) {
        Some("category contains a line break")
    } else {
        None
    }
}

/// A training example: a transaction plus the category a user assigned it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LabeledTransaction {
    pub transaction: Transaction,
    pub category: String,
}

impl LabeledTransaction {
    pub fn new(transaction: Transaction, category: impl Into<String>) -> Self {
        Self {
            transaction,
            category: category.into(),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{};{}", self.transaction.to_line(), self.category)
    }
}
