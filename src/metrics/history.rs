use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::skip::{SkipLog, SkipReason};
use super::types::{Dataset, HistoryEntry};

/// Dense date x name matrix: every date carries exactly one slot per name.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSeries {
    names: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<i64>>>,
}

impl CanonicalSeries {
    /// Builds the matrix from `(date, name, value)` cells. Cells naming something outside
    /// `names` are ignored; a later cell for the same slot replaces an earlier one.
    pub fn from_cells<I>(names: Vec<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, String, Option<i64>)>,
    {
        let index: BTreeMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut rows: BTreeMap<NaiveDate, Vec<Option<i64>>> = BTreeMap::new();
        for (date, name, value) in cells {
            let Some(&slot) = index.get(name.as_str()) else {
                continue;
            };
            let row = rows.entry(date).or_insert_with(|| vec![None; names.len()]);
            row[slot] = value;
        }

        Self { names, rows }
    }

    /// Reshapes into the output dataset, newest date first, under the given display names.
    pub fn into_dataset(self, display_names: Vec<String>, skips: &mut SkipLog) -> Dataset {
        let rows: Vec<(NaiveDate, Vec<Option<i64>>)> = self.rows.into_iter().rev().collect();
        Dataset {
            names: display_names,
            history: add_value_growth(rows, self.names.len(), skips),
        }
    }
}

/// Attaches `valueGrowth` to each row, comparing it with the next older row.
///
/// Rows must be ordered newest first. A row that cannot be compared is dropped and
/// recorded in `skips`; the rest of the history is kept.
pub fn add_value_growth(
    rows: Vec<(NaiveDate, Vec<Option<i64>>)>,
    width: usize,
    skips: &mut SkipLog,
) -> Vec<HistoryEntry> {
    let mut history = Vec::with_capacity(rows.len());

    for (i, (date, values)) in rows.iter().enumerate() {
        let growth = match rows.get(i + 1) {
            Some((_, older)) => growth_between(date, values, older, width),
            None if values.len() == width => Ok(vec![None; width]),
            None => Err(SkipReason::ShapeMismatch {
                date: date.to_string(),
                expected: width,
                found: values.len(),
            }),
        };

        match growth {
            Ok(value_growth) => history.push(HistoryEntry {
                date: *date,
                value: values.clone(),
                value_growth,
            }),
            Err(reason) => skips.record(reason),
        }
    }

    history
}

fn growth_between(
    date: &NaiveDate,
    current: &[Option<i64>],
    older: &[Option<i64>],
    width: usize,
) -> Result<Vec<Option<f64>>, SkipReason> {
    if current.len() != width || older.len() != width {
        return Err(SkipReason::ShapeMismatch {
            date: date.to_string(),
            expected: width,
            found: current.len().min(older.len()),
        });
    }

    Ok(current
        .iter()
        .zip(older)
        .map(|(current, older)| percent_change(current.unwrap_or(0), older.unwrap_or(0)))
        .collect())
}

/// Percent change rounded to two decimals; `None` when the base is zero.
///
/// The difference is taken in `i128` so amounts near the `i64` bounds cannot overflow.
pub fn percent_change(current: i64, older: i64) -> Option<f64> {
    if older == 0 {
        return None;
    }
    let change = (i128::from(current) - i128::from(older)) as f64 / older as f64 * 100.0;
    Some(round2(change))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
