//! Entry text parser.
//!
//! Splits free-form desk input into a (name, memo) pair. Total function:
//! every input produces a result, so the AI-assisted parser in
//! `physio-queue-llm` can always fall back here.
//!
//! Rules:
//! - A leading chart number, optionally joined by `/` or a space to the
//!   name token, stays part of the name: `"3333 김진료 도수대기"` →
//!   name `"3333 김진료"`, memo `"도수대기"`.
//! - Otherwise the first whitespace boundary splits name from memo.
//! - No whitespace at all: the whole input is the name and the memo is the
//!   placeholder.

use serde::{Deserialize, Serialize};

/// Memo used when the input is only a name.
pub const DEFAULT_TREATMENT: &str = "접수/대기";

/// A parsed desk entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedEntry {
    pub name: String,
    pub treatment: String,
}

/// Parse raw desk input into name and memo.
pub fn parse_entry(text: &str) -> ParsedEntry {
    let trimmed = text.trim();

    if let Some(entry) = split_numeric_prefix(trimmed) {
        return entry;
    }

    match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => ParsedEntry {
            name: name.to_string(),
            treatment: rest.trim_start().to_string(),
        },
        None => ParsedEntry {
            name: trimmed.to_string(),
            treatment: DEFAULT_TREATMENT.to_string(),
        },
    }
}

/// Numeric-prefix rule: digits, an optional single `/` or whitespace
/// separator, a name token, then whitespace and a non-empty memo. Returns
/// None when the shape does not match, deferring to the plain split.
fn split_numeric_prefix(text: &str) -> Option<ParsedEntry> {
    let digits_end = text.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }

    let rest = &text[digits_end..];
    let sep = rest.chars().next()?;
    let sep_len = if sep == '/' || sep.is_whitespace() {
        sep.len_utf8()
    } else {
        0
    };

    let after_sep = &rest[sep_len..];
    let token_end = after_sep.find(char::is_whitespace)?;
    if token_end == 0 {
        return None;
    }

    let treatment = after_sep[token_end..].trim_start();
    if treatment.is_empty() {
        return None;
    }

    Some(ParsedEntry {
        name: text[..digits_end + sep_len + token_end].to_string(),
        treatment: treatment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_space_name() {
        let entry = parse_entry("3333 김진료 도수대기");
        assert_eq!(entry.name, "3333 김진료");
        assert_eq!(entry.treatment, "도수대기");
    }

    #[test]
    fn test_number_slash_name() {
        let entry = parse_entry("2343/주한솔 충격파 대기");
        assert_eq!(entry.name, "2343/주한솔");
        assert_eq!(entry.treatment, "충격파 대기");
    }

    #[test]
    fn test_plain_split() {
        let entry = parse_entry("김진표 충격파");
        assert_eq!(entry.name, "김진표");
        assert_eq!(entry.treatment, "충격파");
    }

    #[test]
    fn test_name_only_gets_placeholder() {
        let entry = parse_entry("김진표");
        assert_eq!(entry.name, "김진표");
        assert_eq!(entry.treatment, DEFAULT_TREATMENT);
    }

    #[test]
    fn test_number_and_name_without_memo() {
        // No memo after the name token, so the numeric rule does not apply
        // and the plain split takes over.
        let entry = parse_entry("3333 김진료");
        assert_eq!(entry.name, "3333");
        assert_eq!(entry.treatment, "김진료");
    }

    #[test]
    fn test_digits_glued_to_name() {
        let entry = parse_entry("3333김진료 도수대기");
        assert_eq!(entry.name, "3333김진료");
        assert_eq!(entry.treatment, "도수대기");
    }

    #[test]
    fn test_surrounding_whitespace() {
        let entry = parse_entry("  김진표 충격파  ");
        assert_eq!(entry.name, "김진표");
        assert_eq!(entry.treatment, "충격파");
    }

    #[test]
    fn test_number_only() {
        let entry = parse_entry("3333");
        assert_eq!(entry.name, "3333");
        assert_eq!(entry.treatment, DEFAULT_TREATMENT);
    }

    #[test]
    fn test_empty_input() {
        let entry = parse_entry("");
        assert_eq!(entry.name, "");
        assert_eq!(entry.treatment, DEFAULT_TREATMENT);
    }

    #[test]
    fn test_double_space_after_number() {
        // Two spaces break the numeric-prefix shape; plain split applies.
        let entry = parse_entry("3333  김진료 도수대기");
        assert_eq!(entry.name, "3333");
        assert_eq!(entry.treatment, "김진료 도수대기");
    }
}
