use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// Listings on the directory are denominated in Indian rupees.
pub const RUPEE_SYMBOL: &str = "₹";

// Longer unit spellings come first so "Crore" is not cut down to "Cr". Units ignore case.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₹|Rs\.?|INR)?\s*(\d[\d,]*(?:\.\d+)?)\s*((?i:Crore|Cr\.?|Lakhs|Lakh))?")
        .expect("amount pattern")
});

/// A monetary amount recovered from free-form text such as `₹ 895.00 Cr.`.
///
/// When the text holds no recognizable number only `raw` is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "currency", skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
    pub raw: String,
}

impl CurrencyValue {
    fn raw_only(raw: String) -> Self {
        Self {
            value: None,
            unit: None,
            currency_symbol: None,
            raw,
        }
    }
}

/// Parses the first amount in `text`.
///
/// Returns `None` for absent or blank input. Thousands separators are stripped
/// before conversion and a trailing `.` on the unit is dropped.
pub fn parse_currency(text: Option<&str>) -> Option<CurrencyValue> {
    let text = text.filter(|t| !t.trim().is_empty())?;
    let raw = normalize(Some(text));

    let Some(captures) = AMOUNT_RE.captures(text) else {
        return Some(CurrencyValue::raw_only(raw));
    };
    let number = captures[1].replace(',', "");
    let Ok(value) = number.parse::<f64>() else {
        return Some(CurrencyValue::raw_only(raw));
    };
    let unit = captures
        .get(2)
        .map(|m| m.as_str().trim_end_matches('.').to_string());

    Some(CurrencyValue {
        value: Some(value),
        unit,
        currency_symbol: Some(RUPEE_SYMBOL.to_string()),
        raw,
    })
}
