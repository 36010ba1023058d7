// Instance walk follows fast_xbrl_parser: https://github.com/TiesdeKok/fast_xbrl_parser
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::metrics::skip::SkipReason;
use crate::metrics::types::FactValue;

/// Axis -> member mapping of a fact, both sides prefixed (`srt:ProductOrServiceAxis` ->
/// `aapl:IPhoneMember`).
pub type DimensionMap = BTreeMap<String, String>;

/// Dimensions as a filing source hands them over: already a mapping, or a string encoding
/// of one (JSON, or a single-quoted literal such as `{'srt:ProductOrServiceAxis': 'aapl:MacMember'}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimensions {
    Map(DimensionMap),
    Encoded(String),
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions::Map(DimensionMap::new())
    }
}

impl Dimensions {
    pub fn resolve(&self) -> Result<DimensionMap, SkipReason> {
        match self {
            Dimensions::Map(map) => Ok(map.clone()),
            Dimensions::Encoded(raw) => decode_dimensions(raw),
        }
    }
}

fn decode_dimensions(raw: &str) -> Result<DimensionMap, SkipReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DimensionMap::new());
    }
    if let Ok(map) = serde_json::from_str::<DimensionMap>(trimmed) {
        return Ok(map);
    }
    serde_json::from_str::<DimensionMap>(&trimmed.replace('\'', "\"")).map_err(|_| {
        SkipReason::MalformedDimensions {
            raw: raw.to_string(),
        }
    })
}

/// One fact of an XBRL instance document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XbrlFact {
    pub namespace: String,
    pub concept: String,
    #[serde(default)]
    pub dimensions: Dimensions,
    pub value: FactValue,
    pub end_date: String,
}

#[derive(Debug, Default)]
struct Context {
    end_date: Option<String>,
    dimensions: DimensionMap,
}

/// Parses an XBRL instance document into facts.
///
/// Facts without a context, or whose context has no end date or instant, are left out.
pub fn parse_instance(raw_xml: &str) -> Result<Vec<XbrlFact>> {
    let xml_tree = roxmltree::Document::parse(raw_xml)
        .map_err(|e| anyhow!("Error parsing XBRL instance: {}", e))?;

    let elem = xml_tree
        .root_element()
        .children()
        .filter(|e| e.node_type() == roxmltree::NodeType::Element);

    // -- Contexts --

    let mut contexts: HashMap<&str, Context> = HashMap::new();
    for child in elem.clone().filter(|e| e.tag_name().name() == "context") {
        let Some(id) = child.attribute("id") else {
            continue;
        };
        let mut context = Context::default();

        for node in child.descendants().filter(|e| e.is_element()) {
            match node.tag_name().name() {
                "endDate" | "instant" => {
                    context.end_date = node.text().map(|t| t.trim().to_string());
                }
                "explicitMember" => {
                    let Some(axis) = node.attribute("dimension") else {
                        continue;
                    };
                    let member = node.text().unwrap_or("").trim();
                    log::trace!("Context {} dimension {} = {}", id, axis, member);
                    context
                        .dimensions
                        .insert(axis.trim().to_string(), member.to_string());
                }
                _ => {}
            }
        }

        contexts.insert(id, context);
    }

    // -- Facts --

    let non_fact_ele = ["context", "unit", "xbrl", "schemaRef", "roleRef", "arcroleRef"];
    let mut facts = Vec::new();

    for child in elem.filter(|e| {
        !non_fact_ele.contains(&e.tag_name().name()) && e.tag_name().namespace().is_some()
    }) {
        let Some(context_ref) = child.attribute("contextRef") else {
            continue;
        };
        let Some(context) = contexts.get(context_ref) else {
            log::debug!("Fact {} references unknown context {}", child.tag_name().name(), context_ref);
            continue;
        };
        let Some(end_date) = &context.end_date else {
            continue;
        };

        let namespace = child.tag_name().namespace().unwrap_or("");
        let prefix = child.lookup_prefix(namespace).unwrap_or("");

        facts.push(XbrlFact {
            namespace: prefix.to_string(),
            concept: child.tag_name().name().to_string(),
            dimensions: Dimensions::Map(context.dimensions.clone()),
            value: FactValue::Text(child.text().unwrap_or("").trim().to_string()),
            end_date: end_date.clone(),
        });
    }

    log::debug!("Parsed {} facts from {} contexts", facts.len(), contexts.len());
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTANCE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:xbrldi="http://xbrl.org/2006/xbrldi"
    xmlns:us-gaap="http://fasb.org/us-gaap/2023"
    xmlns:srt="http://fasb.org/srt/2023"
    xmlns:aapl="http://www.apple.com/20231230"
    xmlns:dei="http://xbrl.sec.gov/dei/2023">
  <xbrli:context id="c-1">
    <xbrli:entity>
      <xbrli:identifier scheme="http://www.sec.gov/CIK">0000320193</xbrli:identifier>
    </xbrli:entity>
    <xbrli:period>
      <xbrli:startDate>2023-10-01</xbrli:startDate>
      <xbrli:endDate>2023-12-30</xbrli:endDate>
    </xbrli:period>
  </xbrli:context>
  <xbrli:context id="c-2">
    <xbrli:entity>
      <xbrli:identifier scheme="http://www.sec.gov/CIK">0000320193</xbrli:identifier>
      <xbrli:segment>
        <xbrldi:explicitMember dimension="srt:ProductOrServiceAxis">aapl:IPhoneMember</xbrldi:explicitMember>
      </xbrli:segment>
    </xbrli:entity>
    <xbrli:period>
      <xbrli:startDate>2023-10-01</xbrli:startDate>
      <xbrli:endDate>2023-12-30</xbrli:endDate>
    </xbrli:period>
  </xbrli:context>
  <xbrli:context id="c-3">
    <xbrli:entity>
      <xbrli:identifier scheme="http://www.sec.gov/CIK">0000320193</xbrli:identifier>
    </xbrli:entity>
    <xbrli:period>
      <xbrli:instant>2023-12-30</xbrli:instant>
    </xbrli:period>
  </xbrli:context>
  <xbrli:unit id="usd"><xbrli:measure>iso4217:USD</xbrli:measure></xbrli:unit>
  <us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax contextRef="c-1" unitRef="usd" decimals="-6">119575000000</us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax>
  <us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax contextRef="c-2" unitRef="usd" decimals="-6">69702000000</us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax>
  <dei:EntityCommonStockSharesOutstanding contextRef="c-3" decimals="-3">15441881000</dei:EntityCommonStockSharesOutstanding>
  <us-gaap:Assets contextRef="missing" unitRef="usd">1</us-gaap:Assets>
</xbrli:xbrl>"#;

    #[test]
    fn test_parse_instance() {
        let facts = parse_instance(INSTANCE).unwrap();
        assert_eq!(facts.len(), 3);

        let segment = &facts[1];
        assert_eq!(segment.namespace, "us-gaap");
        assert_eq!(segment.end_date, "2023-12-30");
        assert_eq!(segment.value, FactValue::Text("69702000000".to_string()));
        let dims = segment.dimensions.resolve().unwrap();
        assert_eq!(
            dims.get("srt:ProductOrServiceAxis").map(String::as_str),
            Some("aapl:IPhoneMember")
        );

        assert_eq!(facts[2].namespace, "dei");
        assert!(facts[0].dimensions.resolve().unwrap().is_empty());
    }

    #[test]
    fn test_parse_instance_rejects_garbage() {
        assert!(parse_instance("<not xml").is_err());
    }

    #[test]
    fn test_decode_dimensions() {
        let json = Dimensions::Encoded(r#"{"srt:StatementGeographicalAxis": "country:US"}"#.to_string());
        assert_eq!(
            json.resolve().unwrap().get("srt:StatementGeographicalAxis").map(String::as_str),
            Some("country:US")
        );

        let literal = Dimensions::Encoded("{'srt:ProductOrServiceAxis': 'aapl:MacMember'}".to_string());
        assert_eq!(literal.resolve().unwrap().len(), 1);

        let broken = Dimensions::Encoded("{'srt:ProductOrServiceAxis': ".to_string());
        assert!(matches!(
            broken.resolve(),
            Err(SkipReason::MalformedDimensions { .. })
        ));

        assert!(Dimensions::Encoded(String::new()).resolve().unwrap().is_empty());
    }

    #[test]
    fn test_fact_deserializes_from_dump() {
        let fact: XbrlFact = serde_json::from_str(
            r#"{"namespace": "us-gaap", "concept": "Revenues",
                "dimensions": "{'srt:ProductOrServiceAxis': 'nvda:GamingMember'}",
                "value": 2865000000, "end_date": "2024-01-28"}"#,
        )
        .unwrap();
        assert_eq!(fact.value, FactValue::Integer(2865000000));
        assert!(matches!(fact.dimensions, Dimensions::Encoded(_)));
    }
}
