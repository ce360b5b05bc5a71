//! Line splitting and trailing metric isolation

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::IDENTIFIER_DELIMITER;

/// Number of metric columns trailing every campaign line
pub const METRIC_COUNT: usize = 7;

/// Minimum tokens a line needs: at least one identifier token plus the metrics
pub const MIN_TOKENS: usize = METRIC_COUNT + 1;

static AROUND_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"\s*{}\s*", regex::escape(&IDENTIFIER_DELIMITER.to_string()));
    Regex::new(&pattern).expect("delimiter pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A non-empty line with its 1-based position in the pasted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Split pasted text into non-blank lines, keeping physical line numbers
pub fn split_lines(raw_text: &str) -> Vec<RawLine<'_>> {
    raw_text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| RawLine {
            number: idx + 1,
            text: line.trim_end_matches('\r'),
        })
        .collect()
}

/// The seven metric strings of a line, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFields {
    pub roi: String,
    pub spend: String,
    pub earnings: String,
    pub profit: String,
    pub cpc: String,
    pub ctr: String,
    pub ecpm: String,
}

impl MetricFields {
    /// Build from values in column order: ROI, spend, earnings, profit, CPC, CTR, eCPM
    fn from_ordered(values: [String; METRIC_COUNT]) -> Self {
        let [roi, spend, earnings, profit, cpc, ctr, ecpm] = values;
        Self {
            roi,
            spend,
            earnings,
            profit,
            cpc,
            ctr,
            ecpm,
        }
    }
}

/// Why a line could not be decomposed into metrics and identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitError {
    TooFewColumns,
    MetricIsolationFailed,
    EmptyIdentifier,
}

/// A line decomposed into its metrics and the raw identifier text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLine {
    pub metrics: MetricFields,
    pub identifier: String,
}

fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

/// Pop one metric off the end of `tokens`
///
/// A popped token without digits (a currency symbol split from its number)
/// absorbs the tokens before it until the merged value has a digit.
fn pop_metric(tokens: &mut Vec<&str>) -> Option<String> {
    let mut value = tokens.pop()?.to_string();
    while !has_digit(&value) {
        let previous = tokens.pop()?;
        value = format!("{} {}", previous, value);
    }
    Some(value)
}

/// Isolate the seven trailing metrics and the identifier remainder of a line
pub fn split_line(line: &str) -> Result<SplitLine, SplitError> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return Err(SplitError::TooFewColumns);
    }

    // Isolated back to front: eCPM first, ROI last
    let mut popped = Vec::with_capacity(METRIC_COUNT);
    for _ in 0..METRIC_COUNT {
        let value = pop_metric(&mut tokens).ok_or(SplitError::MetricIsolationFailed)?;
        popped.push(value);
    }
    popped.reverse();

    let values: [String; METRIC_COUNT] = popped
        .try_into()
        .map_err(|_| SplitError::MetricIsolationFailed)?;

    let identifier = normalize_identifier(&tokens.join(" "));
    if identifier.is_empty() {
        return Err(SplitError::EmptyIdentifier);
    }

    Ok(SplitLine {
        metrics: MetricFields::from_ordered(values),
        identifier,
    })
}

/// Collapse whitespace around delimiters, then join the remaining tokens with the delimiter
///
/// `"CO1 - 01 SDM"` becomes `"CO1-01-SDM"`.
pub fn normalize_identifier(raw: &str) -> String {
    let collapsed = AROUND_DELIMITER.replace_all(raw.trim(), IDENTIFIER_DELIMITER.to_string());
    WHITESPACE_RUN
        .replace_all(&collapsed, IDENTIFIER_DELIMITER.to_string())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "CO1-01 SDM WA7 01012024 DWD 15,0% R$ 100,00 R$ 150,00 R$ 50,00 R$ 0,50 2,0% R$ 5,00";

    #[test]
    fn test_split_lines_skips_blank_lines() {
        let lines = split_lines("first\n\n   \nsecond\r\nthird");
        let numbers: Vec<usize> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 4, 5]);
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn test_split_line_worked_example() {
        let split = split_line(EXAMPLE).unwrap();
        assert_eq!(split.identifier, "CO1-01-SDM-WA7-01012024-DWD");
        assert_eq!(split.metrics.roi, "15,0% R$");
        assert_eq!(split.metrics.spend, "100,00 R$");
        assert_eq!(split.metrics.earnings, "150,00 R$");
        assert_eq!(split.metrics.profit, "50,00 R$");
        assert_eq!(split.metrics.cpc, "0,50");
        assert_eq!(split.metrics.ctr, "2,0% R$");
        assert_eq!(split.metrics.ecpm, "5,00");
    }

    #[test]
    fn test_split_line_tab_separated() {
        let line = "CO1-01-DOR-BS2-05022024-LVM\t10%\t200\t260\t60\t0.3\t1.5%\t4.1";
        let split = split_line(line).unwrap();
        assert_eq!(split.identifier, "CO1-01-DOR-BS2-05022024-LVM");
        assert_eq!(split.metrics.roi, "10%");
        assert_eq!(split.metrics.spend, "200");
        assert_eq!(split.metrics.ecpm, "4.1");
    }

    #[test]
    fn test_too_few_columns() {
        assert_eq!(
            split_line("CO1-01 1 2 3 4 5 6"),
            Err(SplitError::TooFewColumns)
        );
    }

    #[test]
    fn test_metric_isolation_fails_when_tokens_run_out() {
        // Eight tokens, but the digit-less ones swallow everything before seven values exist
        let line = "R$ 1 R$ 2 R$ 3 R$ 4";
        assert_eq!(split_line(line), Err(SplitError::MetricIsolationFailed));
    }

    #[test]
    fn test_identifier_empty_after_isolation() {
        let line = "1 2 3 4 5 6 7 R$";
        assert_eq!(split_line(line), Err(SplitError::EmptyIdentifier));
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("A - B"), "A-B");
        assert_eq!(normalize_identifier("CO1 -01  SDM"), "CO1-01-SDM");
        assert_eq!(normalize_identifier("SINGLE"), "SINGLE");
    }
}
