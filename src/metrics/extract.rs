use std::collections::BTreeSet;

use super::skip::SkipLog;
use super::types::Fact;
use crate::edgar::xbrl::{DimensionMap, XbrlFact};
use crate::edgar::{Filing, Ticker};

/// Number of most recent filings walked per form type.
pub const FILING_WINDOW: usize = 17;

pub const GEOGRAPHICAL_AXIS: &str = "srt:StatementGeographicalAxis";
pub const BUSINESS_SEGMENTS_AXIS: &str = "us-gaap:StatementBusinessSegmentsAxis";
pub const PRODUCT_OR_SERVICE_AXIS: &str = "srt:ProductOrServiceAxis";

const AXES: [&str; 3] = [GEOGRAPHICAL_AXIS, BUSINESS_SEGMENTS_AXIS, PRODUCT_OR_SERVICE_AXIS];

const ACCOUNTING_NAMESPACE: &str = "us-gaap";

/// Tickers whose business-segment axis double counts their product lines; only the
/// product/service axis is read as revenue for them.
const SEGMENT_AXIS_EXCLUDED: &[&str] = &[
    "ORCL", "SAVE", "BA", "NFLX", "LLY", "MSFT", "META", "NVDA", "AAPL", "GME",
];

/// Member prefixes, besides the company's own, that carry usable labels.
const SHARED_PREFIXES: &[&str] = &["country:", "us-gaap:", "srt:", "goog:"];

/// Raw revenue and geography facts pulled out of a window of filings.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFacts {
    pub revenue: Vec<Fact>,
    pub geography: Vec<Fact>,
    pub skipped: SkipLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Revenue,
    Geography,
}

/// Walks up to [`FILING_WINDOW`] filings and sorts their dimensional facts into revenue
/// and geography lists.
pub fn process_filings(filings: &[Filing], ticker: &Ticker) -> ExtractedFacts {
    let mut extracted = ExtractedFacts::default();

    for filing in filings.iter().take(FILING_WINDOW) {
        let before = extracted.revenue.len() + extracted.geography.len();
        process_filing(&filing.facts, ticker, &mut extracted);
        log::debug!(
            "{} {} {}: {} facts kept",
            ticker,
            filing.report_type,
            filing.accession_number,
            extracted.revenue.len() + extracted.geography.len() - before
        );
    }

    extracted
}

fn process_filing(facts: &[XbrlFact], ticker: &Ticker, extracted: &mut ExtractedFacts) {
    // First fact seen for each distinct dimension combination.
    let mut seen: BTreeSet<DimensionMap> = BTreeSet::new();

    for fact in facts {
        let dimensions = match fact.dimensions.resolve() {
            Ok(dimensions) => dimensions,
            Err(reason) => {
                extracted.skipped.record(reason);
                continue;
            }
        };
        if !seen.insert(dimensions.clone()) || fact.namespace != ACCOUNTING_NAMESPACE {
            continue;
        }

        for axis in AXES {
            let Some(member) = dimensions.get(axis) else {
                continue;
            };
            if !has_known_prefix(member, ticker) {
                continue;
            }

            let kept = Fact {
                name: clean_label(member, ticker),
                value: fact.value.clone(),
                date: fact.end_date.clone(),
            };
            match classify(axis, ticker) {
                Classification::Revenue => extracted.revenue.push(kept),
                Classification::Geography => extracted.geography.push(kept),
            }
        }
    }
}

fn has_known_prefix(member: &str, ticker: &Ticker) -> bool {
    member.starts_with(&ticker.taxonomy_prefix())
        || SHARED_PREFIXES.iter().any(|prefix| member.starts_with(prefix))
}

fn classify(axis: &str, ticker: &Ticker) -> Classification {
    let segment_axis_is_revenue = !SEGMENT_AXIS_EXCLUDED.contains(&ticker.as_str());
    match axis {
        PRODUCT_OR_SERVICE_AXIS => Classification::Revenue,
        BUSINESS_SEGMENTS_AXIS if segment_axis_is_revenue => Classification::Revenue,
        _ => Classification::Geography,
    }
}

/// Strips taxonomy prefixes and the `Member` suffix, and folds known mislabeled members.
///
/// A `Segment` suffix survives (`DataCenterSegment`); the label tables key on it.
pub fn clean_label(member: &str, ticker: &Ticker) -> String {
    let own_prefix = ticker.taxonomy_prefix();
    let replacements = [
        ("Member", ""),
        ("VideoGameAccessories", "HardwareAndAccessories"),
        ("NewVideoGameHardware", "HardwareAndAccessories"),
        ("NewVideoGameSoftware", "Software"),
        (own_prefix.as_str(), ""),
        ("goog:", ""),
        ("us-gaap:", ""),
        ("srt:", ""),
    ];

    replacements
        .into_iter()
        .fold(member.to_string(), |name, (old, new)| name.replace(old, new))
}
