//! Text matching used for bidding, addressing and reply cleanup
//!
//! Keyword and urgency checks are plain case-sensitive substring tests.
//! Name detection is case-insensitive and whole-word.

use eyre::{Context, Result};
use lazy_regex::regex_is_match;
use regex::{Regex, RegexBuilder};

/// Markers that raise every persona's bid regardless of role
pub const URGENCY_MARKERS: [&str; 3] = ["urgent", "asap", "immediately"];

/// True if `term` occurs anywhere in `message`. Empty terms never match.
pub fn contains_term(message: &str, term: &str) -> bool {
    !term.is_empty() && message.contains(term)
}

/// Number of distinct urgency markers present in `message`
pub fn urgency_hits(message: &str) -> usize {
    URGENCY_MARKERS
        .iter()
        .filter(|marker| contains_term(message, marker))
        .count()
}

/// Whole-word, case-insensitive matcher for a persona name
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    pub fn new(name: &str) -> Result<Self> {
        let regex = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(name)))
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Failed to build name pattern for '{}'", name))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, message: &str) -> bool {
        self.regex.is_match(message)
    }
}

/// Everything the model produced after the last occurrence of `sent_line`.
///
/// Models that echo the prompt back are common; when the line is absent the
/// whole output is the reply.
pub fn reply_after<'a>(raw: &'a str, sent_line: &str) -> &'a str {
    match raw.rsplit_once(sent_line) {
        Some((_, suffix)) => suffix.trim(),
        None => raw.trim(),
    }
}

/// Drop a leading `<name>:` label the model may have added
pub fn strip_label<'a>(reply: &'a str, name: &str) -> &'a str {
    reply
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim)
        .unwrap_or(reply)
}

/// True for the "what's your focus <name>" console command
pub fn is_focus_query(input: &str) -> bool {
    regex_is_match!(r"(?i)what['’]s your focus", input)
}

/// The persona name a focus query refers to: its last word, punctuation trimmed
pub fn focus_target(input: &str) -> Option<&str> {
    input
        .split_whitespace()
        .last()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_term_is_case_sensitive_substring() {
        assert!(contains_term("redeploying now", "deploy"));
        assert!(!contains_term("Deploy now", "deploy"));
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn test_urgency_hits() {
        assert_eq!(urgency_hits("urgent asap"), 2);
        assert_eq!(urgency_hits("fix it immediately, this is urgent"), 2);
        assert_eq!(urgency_hits("no rush"), 0);
        // Each marker counts once per message
        assert_eq!(urgency_hits("urgent urgent urgent"), 1);
    }

    #[test]
    fn test_name_pattern_whole_word() {
        let da = NamePattern::new("Da").unwrap();
        assert!(da.is_match("da, can you check the logs?"));
        assert!(da.is_match("Ask DA about it"));
        assert!(!da.is_match("the database is down"));
        assert!(!da.is_match("update the data"));
    }

    #[test]
    fn test_name_pattern_escapes_metacharacters() {
        let pattern = NamePattern::new("C.J").unwrap();
        assert!(pattern.is_match("hey c.j"));
        assert!(!pattern.is_match("hey cxj"));
    }

    #[test]
    fn test_reply_after_last_sent_line() {
        let raw = "Incident: x\nUser: status?\nTyne: old\nUser: status?\nTyne: fresh answer";
        assert_eq!(reply_after(raw, "User: status?"), "Tyne: fresh answer");
    }

    #[test]
    fn test_reply_after_without_echo() {
        assert_eq!(reply_after("  plain reply \n", "User: hi"), "plain reply");
    }

    #[test]
    fn test_strip_label() {
        assert_eq!(strip_label("Tyne: rolling back", "Tyne"), "rolling back");
        assert_eq!(strip_label("Tyne rolled back", "Tyne"), "Tyne rolled back");
        assert_eq!(strip_label("Ben: hi", "Tyne"), "Ben: hi");
    }

    #[test]
    fn test_focus_query() {
        assert!(is_focus_query("What's your focus Tyne"));
        assert!(is_focus_query("what’s your focus, Da?"));
        assert!(!is_focus_query("what is the focus"));
    }

    #[test]
    fn test_focus_target() {
        assert_eq!(focus_target("what's your focus Tyne?"), Some("Tyne"));
        assert_eq!(focus_target("what's your focus da"), Some("da"));
        assert_eq!(focus_target("   "), None);
    }
}
