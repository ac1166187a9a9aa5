//! Source list parsing.
//!
//! Lists use one entry per line. Blank lines and `#` comment lines are
//! skipped, the first whitespace-delimited token is the address, and text
//! after a `#` on the same line is kept as the entry comment:
//!
//! ```text
//! # FireHOL level 1
//! 192.0.2.10
//! 198.51.100.0/24   # scanner
//! 2001:db8::1
//! ```
//!
//! Invalid addresses never abort parsing. They come back as
//! [`ParseWarning`]s next to the valid entries.

use std::fmt;

use crate::entry::{CandidateSet, Entry};
use crate::validation::validate_ip_or_cidr;

/// A source line that could not be turned into an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Name of the list (file path or URL)
    pub source: String,
    /// 1-based line number
    pub line: usize,
    pub content: String,
    pub reason: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: skipping '{}' ({})",
            self.source, self.line, self.content, self.reason
        )
    }
}

/// Parse a single line.
///
/// Returns `None` for lines that carry no entry (blank or comment).
pub fn parse_line(line: &str) -> Option<Result<Entry, String>> {
    let (body, comment) = match line.split_once('#') {
        Some((body, comment)) => (body, Some(comment.trim())),
        None => (line, None),
    };

    let address = body.split_whitespace().next()?;

    if let Err(e) = validate_ip_or_cidr(address) {
        return Some(Err(e.to_string()));
    }

    let mut entry = Entry::new(address);
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        entry = entry.with_comment(comment);
    }
    Some(Ok(entry))
}

/// Lazily parse the content of one list.
pub fn parse_lines<'a>(
    source: &'a str,
    content: &'a str,
) -> impl Iterator<Item = Result<Entry, ParseWarning>> + 'a {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.lines().enumerate().filter_map(move |(idx, line)| {
        parse_line(line).map(|parsed| {
            parsed.map_err(|reason| ParseWarning {
                source: source.to_string(),
                line: idx + 1,
                content: line.trim().to_string(),
                reason,
            })
        })
    })
}

/// Everything parsed from all sources of one run
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub candidates: CandidateSet,
    pub warnings: Vec<ParseWarning>,
    /// Valid entries seen, duplicates included
    pub valid_count: usize,
}

impl ParseOutcome {
    pub fn duplicate_count(&self) -> usize {
        self.valid_count - self.candidates.len()
    }
}

/// Accumulates entries from several lists into one deduplicated set.
#[derive(Debug, Default)]
pub struct CandidateCollector {
    outcome: ParseOutcome,
}

impl CandidateCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one list and merge it in. Returns the number of valid entries it held.
    pub fn add_source(&mut self, source: &str, content: &str) -> usize {
        let mut valid = 0;
        for parsed in parse_lines(source, content) {
            match parsed {
                Ok(entry) => {
                    valid += 1;
                    self.outcome.candidates.insert(entry);
                }
                Err(warning) => self.outcome.warnings.push(warning),
            }
        }
        self.outcome.valid_count += valid;
        valid
    }

    pub fn finish(self) -> ParseOutcome {
        self.outcome
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn ipv4_string_strategy() -> impl Strategy<Value = String> {
        (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
            .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d))
    }

    fn list_content_strategy(max_lines: usize) -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                ipv4_string_strategy(),
                ipv4_string_strategy().prop_map(|ip| format!("{} # note", ip)),
                Just("# comment".to_string()),
                Just("".to_string()),
                Just("garbage".to_string()),
            ],
            0..max_lines,
        )
        .prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        /// Any valid IPv4 literal parses to an entry with the same address
        #[test]
        fn prop_valid_ipv4_parses(ip in ipv4_string_strategy()) {
            let entry = parse_line(&ip).unwrap().unwrap();
            prop_assert_eq!(entry.address, ip);
        }

        /// Arbitrary input never panics
        #[test]
        fn prop_arbitrary_line_no_panic(line in ".*") {
            let _ = parse_line(&line);
        }

        /// Parsing the same list twice adds nothing the second time
        #[test]
        fn prop_same_list_twice_dedups(content in list_content_strategy(50)) {
            let mut collector = CandidateCollector::new();
            collector.add_source("first", &content);
            let after_first = collector.outcome.candidates.len();
            collector.add_source("second", &content);
            prop_assert_eq!(collector.outcome.candidates.len(), after_first);
        }
    }
}
