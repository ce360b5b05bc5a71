//! Locale-tolerant currency and percentage parsing
//!
//! Spreadsheet pastes mix Brazilian (`1.234,56`) and generic (`1,234.56`)
//! notation inside a single block, so the decimal convention is decided per
//! value. `None` means "not a number" and is never silently turned into zero
//! here.

use std::sync::LazyLock;

use regex::Regex;

/// Currency markers removed before number extraction, longest first
const CURRENCY_SYMBOLS: &[&str] = &["US$", "R$", "$", "€", "£"];

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").expect("float prefix pattern is valid")
});

/// Replace NBSP with a space, trim, and map Unicode dashes to `-`
fn normalize_text(value: &str) -> String {
    value
        .replace('\u{00A0}', " ")
        .trim()
        .chars()
        .map(|c| match c {
            '\u{2212}' | '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect()
}

fn strip_currency_symbols(value: &str) -> String {
    CURRENCY_SYMBOLS
        .iter()
        .fold(value.to_string(), |acc, symbol| acc.replace(symbol, ""))
}

/// Parse the longest leading float, ignoring whatever trails it
fn parse_float_prefix(value: &str) -> Option<f64> {
    FLOAT_PREFIX
        .find(value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Parse a currency amount such as `R$ 1.234,56`, `1,234.56` or `(R$9,50)`
pub fn parse_currency(value: &str) -> Option<f64> {
    let mut text = normalize_text(value);

    // Accounting notation: (100,00) -> -100,00
    if text.len() >= 2 && text.starts_with('(') && text.ends_with(')') {
        text = format!("-{}", &text[1..text.len() - 1]);
    }

    let text = strip_currency_symbols(&text);

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let last_comma = cleaned.rfind(',');
    let last_period = cleaned.rfind('.');

    let decimal_comma = match (last_comma, last_period) {
        (Some(comma), Some(period)) => comma > period,
        (Some(_), None) => true,
        _ => false,
    };

    let canonical = if decimal_comma {
        cleaned.replace('.', "").replacen(',', ".", 1)
    } else {
        cleaned.replace(',', "")
    };

    parse_float_prefix(&canonical)
}

/// Parse a percentage such as `12,5%`; the result is in percent units
pub fn parse_percentage(value: &str) -> Option<f64> {
    let text = normalize_text(value).replace('%', "");
    let text = text.trim().replace(',', ".");

    parse_float_prefix(&text)
}
