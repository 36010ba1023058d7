use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use super::report::ReportType;
use super::xbrl::XbrlFact;

pub const EDGAR_DATA_URL: &str = "https://data.sec.gov";
pub const EDGAR_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Columnar listing of recent filings, as served by the submissions API.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilingEntry {
    #[serde(rename = "accessionNumber")]
    pub accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    pub filing_date: Vec<String>,
    #[serde(rename = "reportDate")]
    pub report_date: Vec<String>,
    #[serde(rename = "form")]
    pub report_type: Vec<ReportType>,
    #[serde(rename = "isInlineXBRL")]
    pub is_inline_xbrl: Vec<u8>,
    #[serde(rename = "primaryDocument")]
    pub primary_document: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilingsData {
    pub recent: FilingEntry,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyFilings {
    pub cik: String,
    pub name: String,
    pub tickers: Vec<String>,
    pub filings: FilingsData,
}

/// One row of [`FilingEntry`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilingRef {
    pub accession_number: String,
    pub filing_date: String,
    pub report_date: String,
    pub report_type: ReportType,
    pub primary_document: String,
}

/// A filing with its parsed XBRL facts.
#[derive(Debug, Clone, PartialEq)]
pub struct Filing {
    pub accession_number: String,
    pub report_type: ReportType,
    pub report_date: String,
    pub facts: Vec<XbrlFact>,
}

pub fn submissions_url(cik: &str) -> Result<Url> {
    // Ensure CIK is 10 digits with leading zeros
    let padded_cik = format!("{:0>10}", cik);
    Ok(Url::parse(&format!(
        "{}/submissions/CIK{}.json",
        EDGAR_DATA_URL, padded_cik
    ))?)
}

pub fn parse_company_filings(content: &str) -> Result<CompanyFilings> {
    serde_json::from_str(content).map_err(|e| anyhow!("Failed to parse filings JSON: {}", e))
}

impl CompanyFilings {
    /// Latest inline-XBRL filings of the given form, newest first.
    pub fn latest(&self, report_type: &ReportType, limit: usize) -> Vec<FilingRef> {
        let recent = &self.filings.recent;
        let rows = recent
            .accession_number
            .len()
            .min(recent.filing_date.len())
            .min(recent.report_date.len())
            .min(recent.report_type.len())
            .min(recent.is_inline_xbrl.len())
            .min(recent.primary_document.len());

        let mut refs: Vec<FilingRef> = (0..rows)
            .filter(|&i| recent.report_type[i] == *report_type && recent.is_inline_xbrl[i] == 1)
            .map(|i| FilingRef {
                accession_number: recent.accession_number[i].clone(),
                filing_date: recent.filing_date[i].clone(),
                report_date: recent.report_date[i].clone(),
                report_type: recent.report_type[i].clone(),
                primary_document: recent.primary_document[i].clone(),
            })
            .collect();

        // ISO dates sort lexically.
        refs.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
        refs.truncate(limit);
        refs
    }
}

impl FilingRef {
    /// URL of the XBRL instance the SEC extracts from an inline-XBRL primary document.
    pub fn instance_url(&self, cik: &str) -> Result<Url> {
        let stem = self
            .primary_document
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.primary_document);
        let cik = cik.trim_start_matches('0');
        Ok(Url::parse(&format!(
            "{}/{}/{}/{}_htm.xml",
            EDGAR_ARCHIVES_URL,
            cik,
            self.accession_number.replace('-', ""),
            stem
        ))?)
    }

    /// File name used for the on-disk cache of the instance document.
    pub fn cache_name(&self) -> String {
        format!("{}.xml", self.accession_number)
    }
}
