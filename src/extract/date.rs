//! German free-text date parsing.
//!
//! Both chronicle sites render dates as German prose ("3. März 2021") or
//! numerically ("03.03.2021"). No ecosystem crate covers German month names,
//! so this is a small fixed grammar over `chrono::NaiveDate`.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

static TEXTUAL: OnceLock<Regex> = OnceLock::new();
static NUMERIC: OnceLock<Regex> = OnceLock::new();

fn textual_re() -> &'static Regex {
    TEXTUAL.get_or_init(|| {
        Regex::new(r"^(\d{1,2})\.?\s+(\p{L}+)\.?\s+(\d{4})$").expect("static regex")
    })
}

fn numeric_re() -> &'static Regex {
    NUMERIC.get_or_init(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").expect("static regex"))
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let n = match name.as_str() {
        "januar" | "jan" => 1,
        "februar" | "feb" => 2,
        "märz" | "maerz" | "mrz" => 3,
        "april" | "apr" => 4,
        "mai" => 5,
        "juni" | "jun" => 6,
        "juli" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "oktober" | "okt" => 10,
        "november" | "nov" => 11,
        "dezember" | "dez" => 12,
        _ => return None,
    };
    Some(n)
}

/// Parse a German date string into a calendar date.
///
/// Fails with [`Error::DateParse`] when the text doesn't match the grammar or
/// names an impossible date.
pub fn parse_german_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let fail = || Error::DateParse(trimmed.to_string());

    let (day, month, year) = if let Some(caps) = textual_re().captures(trimmed) {
        let month = month_number(&caps[2]).ok_or_else(fail)?;
        (caps[1].parse().map_err(|_| fail())?, month, caps[3].parse().map_err(|_| fail())?)
    } else if let Some(caps) = numeric_re().captures(trimmed) {
        (
            caps[1].parse().map_err(|_| fail())?,
            caps[2].parse().map_err(|_| fail())?,
            caps[3].parse().map_err(|_| fail())?,
        )
    } else {
        return Err(fail());
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(fail)
}
