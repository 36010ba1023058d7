use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::coerce::{is_reported_period, parse_amount, parse_date};
use super::history::CanonicalSeries;
use super::labels::{canonical_country, country_priority};
use super::skip::{SkipLog, SkipReason};
use super::types::{Fact, Normalized};

/// Never a region, even when it leaks through the geography axis.
const IGNORED_NAMES: &[&str] = &["CloudServiceAgreements"];

/// Builds the revenue-by-geography dataset from raw extractor facts.
pub fn generate_geography_dataset(facts: &[Fact]) -> Normalized {
    let mut skipped = SkipLog::new();
    let totals = aggregate_by_country(facts, &mut skipped);

    let mut names: Vec<String> = totals
        .keys()
        .map(|(_, name)| name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|name| !IGNORED_NAMES.contains(&name.as_str()))
        .collect();
    names.sort_by(|a, b| country_priority(b).cmp(&country_priority(a)).then(a.cmp(b)));

    let series = CanonicalSeries::from_cells(
        names.clone(),
        totals
            .into_iter()
            .map(|((date, name), total)| (date, name, total)),
    );
    let dataset = series.into_dataset(names, &mut skipped);

    Normalized { dataset, skipped }
}

/// Sums values per (date, canonical country). Every unmapped label lands in the single
/// `Other` bucket of its date. A total that overflows `i64` becomes `None`.
fn aggregate_by_country(
    facts: &[Fact],
    skipped: &mut SkipLog,
) -> BTreeMap<(NaiveDate, String), Option<i64>> {
    let mut totals: BTreeMap<(NaiveDate, String), Option<i64>> = BTreeMap::new();

    for fact in facts {
        let date = match parse_date(fact) {
            Ok(date) => date,
            Err(reason) => {
                skipped.record(reason);
                continue;
            }
        };
        if !is_reported_period(&date) {
            continue;
        }
        let amount = match parse_amount(fact) {
            Ok(amount) => amount,
            Err(reason) => {
                skipped.record(reason);
                continue;
            }
        };

        let country = canonical_country(&fact.name).to_string();
        let total = totals.entry((date, country.clone())).or_insert(Some(0));
        if let Some(sum) = *total {
            *total = sum.checked_add(amount);
            if total.is_none() {
                skipped.record(SkipReason::TotalOverflow {
                    name: country,
                    date: date.to_string(),
                });
            }
        }
    }

    totals
}
