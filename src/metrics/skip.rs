use std::collections::BTreeMap;
use thiserror::Error;

/// Why a single record was dropped, or had its value nulled, during extraction or
/// normalization. None of these abort a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("empty value for '{name}' on {date}")]
    EmptyValue { name: String, date: String },
    #[error("zero value for '{name}' on {date}")]
    ZeroValue { name: String, date: String },
    #[error("unparseable value {value} for '{name}' on {date}")]
    UnparseableValue {
        name: String,
        date: String,
        value: String,
    },
    #[error("unparseable date '{date}' for '{name}'")]
    UnparseableDate { name: String, date: String },
    #[error("malformed dimensions '{raw}'")]
    MalformedDimensions { raw: String },
    #[error("total for '{name}' on {date} overflows")]
    TotalOverflow { name: String, date: String },
    #[error("history entry {date} has {found} values, expected {expected}")]
    ShapeMismatch {
        date: String,
        expected: usize,
        found: usize,
    },
}

impl SkipReason {
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::EmptyValue { .. } => "empty value",
            SkipReason::ZeroValue { .. } => "zero value",
            SkipReason::UnparseableValue { .. } => "unparseable value",
            SkipReason::UnparseableDate { .. } => "unparseable date",
            SkipReason::MalformedDimensions { .. } => "malformed dimensions",
            SkipReason::TotalOverflow { .. } => "total overflow",
            SkipReason::ShapeMismatch { .. } => "shape mismatch",
        }
    }
}

/// Skipped records of one dataset, kept so the caller can report them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkipLog {
    entries: Vec<SkipReason>,
}

impl SkipLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reason: SkipReason) {
        log::debug!("Skipping record: {}", reason);
        self.entries.push(reason);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extend(&mut self, other: SkipLog) {
        self.entries.extend(other.entries);
    }

    /// Count of skipped records per reason kind, in stable order.
    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind()).or_insert(0) += 1;
        }
        counts
    }
}
