use chrono::{Datelike, NaiveDate};

use super::skip::SkipReason;
use super::types::{Fact, FactValue};

/// Facts for periods ending before this year never reach the output.
pub const FIRST_REPORTED_YEAR: i32 = 2019;

pub fn parse_date(fact: &Fact) -> Result<NaiveDate, SkipReason> {
    NaiveDate::parse_from_str(fact.date.trim(), "%Y-%m-%d").map_err(|_| {
        SkipReason::UnparseableDate {
            name: fact.name.clone(),
            date: fact.date.clone(),
        }
    })
}

pub fn is_reported_period(date: &NaiveDate) -> bool {
    date.year() >= FIRST_REPORTED_YEAR
}

/// Integer amount of a fact, truncating any fraction. Zero is returned as zero.
pub fn parse_amount(fact: &Fact) -> Result<i64, SkipReason> {
    let number = match &fact.value {
        FactValue::Null => return Err(empty(fact)),
        FactValue::Integer(v) => return Ok(*v),
        FactValue::Float(v) => *v,
        FactValue::Text(s) if s.trim().is_empty() => return Err(empty(fact)),
        FactValue::Text(s) => s.trim().parse::<f64>().map_err(|_| unparseable(fact))?,
    };

    if !number.is_finite() || number.abs() >= i64::MAX as f64 {
        return Err(unparseable(fact));
    }
    Ok(number.trunc() as i64)
}

/// Like [`parse_amount`], but a zero amount means "not disclosed".
pub fn parse_disclosed_amount(fact: &Fact) -> Result<i64, SkipReason> {
    match parse_amount(fact)? {
        0 => Err(SkipReason::ZeroValue {
            name: fact.name.clone(),
            date: fact.date.clone(),
        }),
        amount => Ok(amount),
    }
}

fn empty(fact: &Fact) -> SkipReason {
    SkipReason::EmptyValue {
        name: fact.name.clone(),
        date: fact.date.clone(),
    }
}

fn unparseable(fact: &Fact) -> SkipReason {
    SkipReason::UnparseableValue {
        name: fact.name.clone(),
        date: fact.date.clone(),
        value: fact.value.to_string(),
    }
}
