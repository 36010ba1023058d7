use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use super::coerce::{is_reported_period, parse_date, parse_disclosed_amount};
use super::history::CanonicalSeries;
use super::labels::{is_excluded_segment, segment_display_name};
use super::skip::SkipLog;
use super::types::{Fact, Normalized};

/// Number of segments kept in the revenue breakdown.
pub const TOP_SEGMENTS: usize = 5;

#[derive(Debug, Clone)]
struct Cell {
    name: String,
    date: NaiveDate,
    value: Option<i64>,
}

/// Builds the revenue-by-segment dataset from raw extractor facts.
pub fn generate_revenue_dataset(facts: &[Fact]) -> Normalized {
    let mut skipped = SkipLog::new();

    let cells = fill_missing(collect_cells(facts, &mut skipped));
    let Some(latest) = cells.iter().map(|c| c.date).max() else {
        return Normalized {
            skipped,
            ..Default::default()
        };
    };

    // A segment that is no longer reported is dropped from every period.
    let discontinued: BTreeSet<String> = cells
        .iter()
        .filter(|c| c.date == latest && c.value.is_none())
        .map(|c| c.name.clone())
        .collect();
    if !discontinued.is_empty() {
        log::debug!("Dropping segments not reported on {}: {:?}", latest, discontinued);
    }

    let mut cells: Vec<Cell> = cells
        .into_iter()
        .filter(|c| !discontinued.contains(&c.name))
        .filter(|c| is_reported_period(&c.date))
        .collect();
    cells.sort_by(|a, b| b.date.cmp(&a.date));

    let top = top_segments(&cells, TOP_SEGMENTS);
    let display_names = top.iter().map(|name| segment_display_name(name)).collect();
    log::debug!("Top revenue segments: {:?}", top);

    let series = CanonicalSeries::from_cells(
        top,
        cells.into_iter().map(|c| (c.date, c.name, c.value)),
    );
    let dataset = series.into_dataset(display_names, &mut skipped);

    Normalized { dataset, skipped }
}

/// Drops excluded segments and unparseable dates, coerces values and keeps the first
/// fact seen for each (name, date).
fn collect_cells(facts: &[Fact], skipped: &mut SkipLog) -> Vec<Cell> {
    let mut seen = BTreeSet::new();
    let mut cells = Vec::new();

    for fact in facts.iter().filter(|f| !is_excluded_segment(&f.name)) {
        let date = match parse_date(fact) {
            Ok(date) => date,
            Err(reason) => {
                skipped.record(reason);
                continue;
            }
        };
        if !seen.insert((fact.name.clone(), date)) {
            continue;
        }

        let value = match parse_disclosed_amount(fact) {
            Ok(amount) => Some(amount),
            Err(reason) => {
                skipped.record(reason);
                None
            }
        };
        cells.push(Cell {
            name: fact.name.clone(),
            date,
            value,
        });
    }

    cells
}

/// Appends a null cell for every (name, date) combination not yet present.
fn fill_missing(mut cells: Vec<Cell>) -> Vec<Cell> {
    let names: BTreeSet<String> = cells.iter().map(|c| c.name.clone()).collect();
    let dates: BTreeSet<NaiveDate> = cells.iter().map(|c| c.date).collect();
    let present: BTreeSet<(String, NaiveDate)> =
        cells.iter().map(|c| (c.name.clone(), c.date)).collect();

    for name in &names {
        for date in &dates {
            if !present.contains(&(name.clone(), *date)) {
                cells.push(Cell {
                    name: name.clone(),
                    date: *date,
                    value: None,
                });
            }
        }
    }

    cells
}

/// Names ranked by summed value, ties in order of first appearance.
fn top_segments(cells: &[Cell], limit: usize) -> Vec<String> {
    let mut ranked: Vec<(String, i64)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for cell in cells {
        let slot = *slots.entry(cell.name.as_str()).or_insert_with(|| {
            ranked.push((cell.name.clone(), 0));
            ranked.len() - 1
        });
        // Totals only order the names and are never written out.
        ranked[slot].1 = ranked[slot].1.saturating_add(cell.value.unwrap_or(0));
    }

    // Stable sort keeps first appearance on ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(name, _)| name).collect()
}
