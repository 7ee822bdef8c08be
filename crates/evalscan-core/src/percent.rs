//! Percentage block parsing.
//!
//! A percentage block is one answer row of a Likert-style question:
//! a description followed by five or six `NN%` tokens, e.g.
//! `Presented clear lectures. 5% 0% 0% 0% 21% 73%`.

use std::sync::LazyLock;

use regex::Regex;

static PERCENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})%").expect("static regex must compile"));

static BARE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}%$").expect("static regex must compile"));

static TALLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\d?) / \d{1,3}%").expect("static regex must compile"));

static TALLY_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\d? / \d{1,3}%").expect("static regex must compile"));

/// A recognized percentage-answer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentBlock<'a> {
    /// The line as captured, without trailing whitespace.
    pub line: &'a str,
    /// The descriptive text before the percentages.
    pub description: &'a str,
    /// The trailing percentages, in order.
    pub values: Vec<u32>,
}

/// Extract every `<digits>%` token (1 to 3 digits) in order of appearance.
pub fn extract_percentages(line: &str) -> Vec<u32> {
    PERCENT_TOKEN
        .captures_iter(line)
        .filter_map(|c| c[1].parse().ok())
        .collect()
}

/// Parse a full percentage-answer line.
///
/// The line must be non-empty descriptive text followed by exactly five or
/// six space-separated percentage tokens. Anything else, including partial
/// blocks, yields `None`.
pub fn parse_block(line: &str) -> Option<PercentBlock<'_>> {
    let line = line.trim_end();
    let mut rest = line;
    let mut trailing = Vec::new();

    while let Some((head, last)) = rest.rsplit_once(' ') {
        if !BARE_PERCENT.is_match(last) {
            break;
        }
        trailing.push(last);
        rest = head;
    }

    if !(5..=6).contains(&trailing.len()) || rest.trim().is_empty() {
        return None;
    }

    let values = trailing
        .iter()
        .rev()
        .map(|t| t.trim_end_matches('%').parse().ok())
        .collect::<Option<Vec<u32>>>()?;

    Some(PercentBlock {
        line,
        description: rest,
        values,
    })
}

/// Returns `true` if the line carries a `count / percent%` tally anywhere.
pub fn contains_tally(line: &str) -> bool {
    TALLY_ANYWHERE.is_match(line)
}

/// Parse the count from a line starting with `count / percent%`.
pub fn parse_tally(line: &str) -> Option<u32> {
    TALLY
        .captures(line)
        .and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_in_order() {
        assert_eq!(
            extract_percentages("Presented clear lectures. 5% 0% 0% 0% 21% 73%"),
            vec![5, 0, 0, 0, 21, 73]
        );
        assert_eq!(extract_percentages("no numbers here"), Vec::<u32>::new());
        assert_eq!(extract_percentages("100% and 7%"), vec![100, 7]);
    }

    #[test]
    fn six_token_block() {
        let block = parse_block("Presented clear lectures. 5% 0% 0% 0% 21% 73%").unwrap();
        assert_eq!(block.description, "Presented clear lectures.");
        assert_eq!(block.values, vec![5, 0, 0, 0, 21, 73]);
    }

    #[test]
    fn five_token_block_with_trailing_space() {
        let block = parse_block("Was fair. 0% 10% 20% 30% 40% ").unwrap();
        assert_eq!(block.line, "Was fair. 0% 10% 20% 30% 40%");
        assert_eq!(block.values.len(), 5);
    }

    #[test]
    fn partial_and_oversized_blocks_rejected() {
        assert!(parse_block("Was fair. 10% 20% 30% 40%").is_none());
        assert!(parse_block("Was fair. 1% 1% 1% 1% 1% 1% 1%").is_none());
        assert!(parse_block("0% 10% 20% 30% 40%").is_none());
        assert!(parse_block("Was fair. 1000% 1% 1% 1% 1%").is_none());
        assert!(parse_block("Strongly Agree").is_none());
    }

    #[test]
    fn tally_patterns() {
        assert_eq!(parse_tally("12 / 80%"), Some(12));
        assert_eq!(parse_tally("3 / 20% of respondents"), Some(3));
        assert_eq!(parse_tally("Yes 12 / 80%"), None);
        assert!(contains_tally("Yes 12 / 80%"));
        assert!(!contains_tally("12 of 80%"));
    }
}
