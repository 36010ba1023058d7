use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw value of a fact as it comes out of a filing.
///
/// XBRL instance values are text, but fact dumps and tests may carry plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        FactValue::Text(s.to_string())
    }
}

impl From<i64> for FactValue {
    fn from(v: i64) -> Self {
        FactValue::Integer(v)
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Null => write!(f, "null"),
            FactValue::Integer(v) => write!(f, "{}", v),
            FactValue::Float(v) => write!(f, "{}", v),
            FactValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// One dimensional fact emitted by the extractor, before canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub name: String,
    pub value: FactValue,
    pub date: String,
}

impl Fact {
    pub fn new(name: impl Into<String>, value: impl Into<FactValue>, date: impl Into<String>) -> Self {
        Fact {
            name: name.into(),
            value: value.into(),
            date: date.into(),
        }
    }
}

/// One row of the output history, newest first in a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub value: Vec<Option<i64>>,
    #[serde(rename = "valueGrowth")]
    pub value_growth: Vec<Option<f64>>,
}

/// `names[k]` labels `history[*].value[k]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub names: Vec<String>,
    pub history: Vec<HistoryEntry>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.history.is_empty()
    }
}

/// A dataset together with the records that were dropped or nulled while building it.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub dataset: Dataset,
    pub skipped: super::skip::SkipLog,
}

/// The document written per ticker for the front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetrics {
    pub revenue: Dataset,
    pub geographic: Dataset,
}
