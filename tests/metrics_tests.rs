use anyhow::{anyhow, Result};
use async_trait::async_trait;
use business_metrics::edgar::xbrl::{Dimensions, XbrlFact};
use business_metrics::edgar::{Filing, FilingSource, ReportType, Ticker};
use business_metrics::metrics::{self, BusinessMetrics, Fact, FactValue};
use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

#[derive(Default)]
struct MemorySource {
    filings: HashMap<String, Vec<Filing>>,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    fn with(mut self, report_type: ReportType, filings: Vec<Filing>) -> Self {
        self.filings.insert(report_type.to_string(), filings);
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FilingSource for MemorySource {
    async fn latest_filings(
        &self,
        _ticker: &Ticker,
        report_type: ReportType,
        limit: usize,
    ) -> Result<Vec<Filing>> {
        self.requests.lock().unwrap().push(report_type.to_string());
        self.filings
            .get(&report_type.to_string())
            .map(|filings| filings.iter().take(limit).cloned().collect())
            .ok_or_else(|| anyhow!("no {} filings", report_type))
    }
}

fn xbrl(axis: &str, member: &str, value: &str, end_date: &str) -> XbrlFact {
    XbrlFact {
        namespace: "us-gaap".to_string(),
        concept: "RevenueFromContractWithCustomerExcludingAssessedTax".to_string(),
        dimensions: Dimensions::Encoded(format!("{{'{}': '{}'}}", axis, member)),
        value: FactValue::Text(value.to_string()),
        end_date: end_date.to_string(),
    }
}

fn filing(report_type: ReportType, accession: &str, facts: Vec<XbrlFact>) -> Filing {
    Filing {
        accession_number: accession.to_string(),
        report_type,
        report_date: String::new(),
        facts,
    }
}

fn ticker(s: &str) -> Ticker {
    Ticker::new(s.to_string()).unwrap()
}

const PRODUCT: &str = "srt:ProductOrServiceAxis";
const GEOGRAPHY: &str = "srt:StatementGeographicalAxis";

fn nvda_quarterlies() -> Vec<Filing> {
    vec![
        filing(
            ReportType::Form10Q,
            "0001045810-23-000227",
            vec![
                xbrl(PRODUCT, "nvda:DataCenterMember", "14514000000", "2023-10-29"),
                xbrl(PRODUCT, "nvda:GamingMember", "2856000000", "2023-10-29"),
                xbrl(GEOGRAPHY, "country:US", "6302000000", "2023-10-29"),
                xbrl(GEOGRAPHY, "nvda:TaiwanMember", "4333000000", "2023-10-29"),
                xbrl(GEOGRAPHY, "nvda:OtherCountriesMember", "3420000000", "2023-10-29"),
            ],
        ),
        filing(
            ReportType::Form10Q,
            "0001045810-23-000175",
            vec![
                xbrl(PRODUCT, "nvda:DataCenterMember", "10323000000", "2023-07-30"),
                xbrl(PRODUCT, "nvda:GamingMember", "2486000000", "2023-07-30"),
                xbrl(GEOGRAPHY, "country:US", "6812000000", "2023-07-30"),
                xbrl(GEOGRAPHY, "country:CN", "2740000000", "2023-07-30"),
            ],
        ),
    ]
}

#[tokio::test]
async fn test_run_writes_snapshot() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default().with(ReportType::Form10Q, nvda_quarterlies());

    let summary = metrics::run(&source, &ticker("NVDA"), dir.path()).await.unwrap();
    assert_eq!(summary.path, dir.path().join("business-metrics").join("NVDA.json"));
    assert_eq!(source.requested(), vec!["10-Q"]);

    let written: BusinessMetrics =
        serde_json::from_str(&fs::read_to_string(&summary.path).unwrap()).unwrap();

    assert_eq!(written.revenue.names, vec!["Data Center", "Gaming"]);
    assert_eq!(written.revenue.history.len(), 2);
    assert_eq!(
        written.revenue.history[0].value,
        vec![Some(14514000000), Some(2856000000)]
    );
    assert_eq!(
        written.revenue.history[0].value_growth,
        vec![Some(40.6), Some(14.88)]
    );

    assert_eq!(written.geographic.names, vec!["United States", "China", "Other"]);
    assert_eq!(
        written.geographic.history[0].value,
        vec![Some(6302000000), None, Some(7753000000)]
    );
    assert_eq!(
        written.geographic.history[1].value,
        vec![Some(6812000000), Some(2740000000), None]
    );
    for entry in written.revenue.history.iter().chain(&written.geographic.history) {
        assert_eq!(entry.value.len(), entry.value_growth.len());
    }
}

#[tokio::test]
async fn test_geography_falls_back_to_annual_filings() {
    let dir = tempdir().unwrap();
    let quarterly = vec![filing(
        ReportType::Form10Q,
        "0000320193-24-000006",
        vec![xbrl(PRODUCT, "aapl:IPhoneMember", "69702000000", "2023-12-30")],
    )];
    let annual = vec![filing(
        ReportType::Form10K,
        "0000320193-23-000106",
        vec![
            xbrl(PRODUCT, "aapl:MacMember", "29357000000", "2023-09-30"),
            xbrl(GEOGRAPHY, "country:US", "138573000000", "2023-09-30"),
        ],
    )];
    let source = MemorySource::default()
        .with(ReportType::Form10Q, quarterly)
        .with(ReportType::Form10K, annual);

    let summary = metrics::run(&source, &ticker("AAPL"), dir.path()).await.unwrap();
    assert_eq!(source.requested(), vec!["10-Q", "10-K"]);

    let written: BusinessMetrics =
        serde_json::from_str(&fs::read_to_string(&summary.path).unwrap()).unwrap();
    // Revenue stays with the quarterly filings.
    assert_eq!(written.revenue.names, vec!["IPhone"]);
    assert_eq!(written.geographic.names, vec!["United States"]);
    assert_eq!(written.geographic.history[0].value, vec![Some(138573000000)]);
}

#[tokio::test]
async fn test_failed_annual_fallback_keeps_revenue() {
    let dir = tempdir().unwrap();
    let quarterly = vec![filing(
        ReportType::Form10Q,
        "0000000001-24-000001",
        vec![xbrl(PRODUCT, "amd:ClientMember", "1000", "2024-03-30")],
    )];
    let source = MemorySource::default().with(ReportType::Form10Q, quarterly);

    let summary = metrics::run(&source, &ticker("AMD"), dir.path()).await.unwrap();
    assert_eq!(summary.revenue_names, 1);
    assert_eq!(summary.geography_names, 0);
}

#[tokio::test]
async fn test_missing_quarterly_filings_is_an_error() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default();
    assert!(metrics::run(&source, &ticker("MSFT"), dir.path()).await.is_err());
    assert!(!dir.path().join("business-metrics").join("MSFT.json").exists());
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default().with(ReportType::Form10Q, nvda_quarterlies());
    let nvda = ticker("NVDA");

    let first = metrics::run(&source, &nvda, dir.path()).await.unwrap();
    let first_bytes = fs::read(&first.path).unwrap();
    let second = metrics::run(&source, &nvda, dir.path()).await.unwrap();
    let second_bytes = fs::read(&second.path).unwrap();

    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn test_revenue_scenario_json_shape() {
    let facts = vec![
        Fact::new("iPhone", "100", "2023-12-31"),
        Fact::new("iPhone", "80", "2022-12-31"),
    ];
    let revenue = metrics::generate_revenue_dataset(&facts).dataset;
    let json: serde_json::Value = serde_json::to_value(&revenue).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "names": ["IPhone"],
            "history": [
                {"date": "2023-12-31", "value": [100], "valueGrowth": [25.0]},
                {"date": "2022-12-31", "value": [80], "valueGrowth": [null]}
            ]
        })
    );
}

#[test]
fn test_dense_fill_scenario() {
    let facts = vec![
        Fact::new("A", "1", "2023-01-01"),
        Fact::new("B", "2", "2023-02-01"),
    ];
    // Both names are missing at one of the two dates; only B survives the latest-date check.
    let revenue = metrics::generate_revenue_dataset(&facts).dataset;
    assert_eq!(revenue.names, vec!["B"]);
    assert_eq!(revenue.history.len(), 2);
    assert_eq!(revenue.history[1].value, vec![None]);

    let geography = metrics::generate_geography_dataset(&[
        Fact::new("UnitedStates", "1", "2023-01-01"),
        Fact::new("GreaterChina", "2", "2023-02-01"),
    ])
    .dataset;
    assert_eq!(geography.history.len(), 2);
    let nulls = geography
        .history
        .iter()
        .flat_map(|entry| entry.value.iter())
        .filter(|value| value.is_none())
        .count();
    assert_eq!(nulls, 2);
    for entry in &geography.history {
        assert_eq!(entry.value.len(), geography.names.len());
    }
}

#[test]
fn test_unmapped_regions_fold_into_other() {
    let geography = metrics::generate_geography_dataset(&[
        Fact::new("UnitedStates", "50", "2023-12-31"),
        Fact::new("Mars", "5", "2023-12-31"),
        Fact::new("Venus", "6", "2023-12-31"),
    ])
    .dataset;

    assert_eq!(geography.names, vec!["United States", "Other"]);
    assert_eq!(geography.history[0].value, vec![Some(50), Some(11)]);
}

#[test]
fn test_malformed_input_never_panics() {
    let garbage = vec![
        Fact::new("", "", ""),
        Fact::new("Mac", "not a number", "2023-12-31"),
        Fact::new("Mac", "1e400", "2023-12-31"),
        Fact::new("Mac", "12", "31/12/2023"),
        Fact {
            name: "Mac".to_string(),
            value: FactValue::Null,
            date: "2023-09-30".to_string(),
        },
        Fact::new("Mac", "-0", "2023-06-30"),
    ];

    let revenue = metrics::generate_revenue_dataset(&garbage);
    let geography = metrics::generate_geography_dataset(&garbage);

    assert!(revenue.dataset.names.is_empty());
    assert!(!revenue.skipped.is_empty());
    assert!(geography.dataset.history.len() <= 2);
}

#[test]
fn test_pre_2019_facts_never_contribute() {
    let facts = vec![
        Fact::new("Gaming", "10", "2019-01-01"),
        Fact::new("Gaming", "999", "2018-12-31"),
        Fact::new("UnitedStates", "999", "2018-12-31"),
    ];
    let revenue = metrics::generate_revenue_dataset(&facts).dataset;
    let geography = metrics::generate_geography_dataset(&facts).dataset;

    assert!(revenue
        .history
        .iter()
        .all(|entry| entry.date.to_string() >= "2019-01-01".to_string()));
    assert_eq!(revenue.history[0].value_growth, vec![None]);
    assert!(!geography.names.iter().any(|name| name == "United States"));
}

#[test]
fn test_extreme_amounts_produce_finite_growth() {
    let revenue = metrics::generate_revenue_dataset(&[
        Fact::new("Mac", "9000000000000000000", "2023-12-31"),
        Fact::new("Mac", "-9000000000000000000", "2022-12-31"),
    ])
    .dataset;
    let geography = metrics::generate_geography_dataset(&[
        Fact::new("UnitedStates", "9000000000000000000", "2023-12-31"),
        Fact::new("UnitedStates", "-9000000000000000000", "2022-12-31"),
    ])
    .dataset;

    assert_eq!(revenue.history[0].value_growth, vec![Some(-200.0)]);
    assert_eq!(geography.history[0].value_growth, vec![Some(-200.0)]);
}
