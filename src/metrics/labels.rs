//! Static lookup tables used to canonicalize segment and country labels.
//!
//! Keys are lowercased labels as they come out of the extractor. Lookups that miss fall
//! through to an explicit default (auto-formatting for segments, `Other` for countries).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

pub const UNITED_STATES: &str = "United States";
pub const CHINA: &str = "China";
pub const OTHER: &str = "Other";

/// Display names for known revenue segments.
static SEGMENT_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("datacenter", "Data Center"),
        ("professionalvisualization", "Visualization"),
        ("oemandother", "OEM & Other"),
        ("automotive", "Automotive"),
        ("oemip", "OEM & Other"),
        ("gaming", "Gaming"),
        ("mac", "Mac"),
        ("iphone", "IPhone"),
        ("ipad", "IPad"),
        ("wearableshomeandaccessories", "Wearables"),
        ("hardwareandaccessories", "Hardware & Accessories"),
        ("software", "Software"),
        ("collectibles", "Collectibles"),
        ("automotivesales", "Auto"),
        ("automotiveleasing", "Auto Leasing"),
        ("energygenerationandstoragesegment", "Energy and Storage"),
        ("servicesandother", "Services & Other"),
        ("automotiveregulatorycredits", "Regulatory Credits"),
        ("intelligentcloud", "Intelligent Cloud"),
        ("productivityandbusinessprocesses", "Productivity & Business"),
        ("searchandnewsadvertising", "Advertising"),
        ("linkedincorporation", "LinkedIn"),
        ("morepersonalcomputing", "More Personal Computing"),
        ("serviceother", "Service Other"),
        ("governmentoperatingsegment", "Government Operating Segment"),
        (
            "internationaldevelopmentallicensedmarketsandcorporate",
            "License Market",
        ),
        ("youtubeadvertisingrevenue", "Youtube Ads"),
        ("googleadvertisingrevenue", "Google Ads"),
        ("cloudservicesandlicensesupport", "Cloud Services & Support"),
        (
            "infrastructurecloudservicesandlicensesupport",
            "Infrastructure Cloud",
        ),
        (
            "applicationscloudservicesandlicensesupport",
            "Application Cloud",
        ),
    ])
});

/// Umbrella or aggregate segments that would double count their children.
static EXCLUDED_SEGMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "government",
        "enterpriseembeddedandsemicustom",
        "computingandgraphics",
        "officeproductsandcloudservices",
        "serverproductsandcloudservices",
        "automotiverevenues",
        "automotive",
        "computeandnetworking",
        "graphics",
        "gpu",
        "automotivesegment",
        "energygenerationandstoragesales",
        "energygenerationandstorage",
        "automotivesaleswithoutresalevalueguarantee",
        "salesandservices",
        "compute",
        "networking",
        "cloudserviceagreements",
        "digital",
        "allother",
        "preownedvideogameproducts",
    ])
});

static COUNTRY_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("americas", UNITED_STATES),
        ("unitedstates", UNITED_STATES),
        ("videogamebrandsunitedstates", UNITED_STATES),
        ("country:us", UNITED_STATES),
        ("greaterchina", CHINA),
        ("country:cn", CHINA),
        ("chinaincludinghongkong", CHINA),
    ])
});

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid camel case pattern"));

pub fn is_excluded_segment(name: &str) -> bool {
    EXCLUDED_SEGMENTS.contains(name.to_lowercase().as_str())
}

/// Display name for a revenue segment: table entry or auto-formatted label.
pub fn segment_display_name(name: &str) -> String {
    match SEGMENT_NAMES.get(name.to_lowercase().as_str()) {
        Some(display) => display.to_string(),
        None => format_name(name),
    }
}

/// `ServicesAndOtherRevenue` -> `Services & Other`.
pub fn format_name(name: &str) -> String {
    let spaced = CAMEL_BOUNDARY.replace_all(name, "$1 $2");
    spaced
        .split_whitespace()
        .filter(|word| *word != "Revenue")
        .map(|word| if word == "And" { "&" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical country for a raw geography label, `Other` when unknown.
pub fn canonical_country(name: &str) -> &'static str {
    COUNTRY_ALIASES
        .get(name.to_lowercase().as_str())
        .copied()
        .unwrap_or(OTHER)
}

/// Sort priority of a canonical country; higher comes first.
pub fn country_priority(name: &str) -> u8 {
    match name {
        UNITED_STATES => 2,
        CHINA => 1,
        OTHER => 0,
        _ => 3,
    }
}
