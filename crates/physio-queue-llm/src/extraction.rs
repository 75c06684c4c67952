//! Structured entry extraction from LLM output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("LLM inference error: {0}")]
    Inference(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Memo used when the input is only a name.
pub const DEFAULT_TREATMENT: &str = "접수/대기";

/// A parsed desk entry in the shape expected by the board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedEntry {
    pub name: String,
    pub treatment: String,
}

/// Parse model output JSON into a structured entry.
pub fn parse_entry_output(output: &str) -> ExtractionResult<ParsedEntry> {
    // Try to find JSON in the response (in case the model adds extra text)
    let json_start = output
        .find('{')
        .ok_or_else(|| ExtractionError::InvalidFormat("No JSON object found in response".into()))?;
    let json_end = output
        .rfind('}')
        .ok_or_else(|| ExtractionError::InvalidFormat("No closing brace found in response".into()))?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let json_slice = &output[json_start..=json_end];
    let entry: ParsedEntry = serde_json::from_str(json_slice)?;

    if entry.name.is_empty() {
        return Err(ExtractionError::InvalidFormat("empty name".into()));
    }

    Ok(entry)
}

/// Mock parser for testing without actual LLM inference. Applies the same
/// informal rules the prompt describes.
pub struct MockParser;

impl MockParser {
    /// Extract a (name, memo) pair using plain pattern matching.
    pub fn parse(raw_text: &str) -> ParsedEntry {
        let trimmed = raw_text.trim();

        // Chart number joined to the name by a space or "/"
        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() && digits.len() < trimmed.len() {
            let rest = &trimmed[digits.len()..];
            let sep = rest.chars().next().filter(|c| *c == '/' || *c == ' ');
            let after_sep = sep.map(|c| &rest[c.len_utf8()..]).unwrap_or(rest);
            if let Some((token, memo)) = after_sep.split_once(' ') {
                if !token.is_empty() && !memo.trim().is_empty() {
                    let sep_str = sep.map(String::from).unwrap_or_default();
                    return ParsedEntry {
                        name: format!("{digits}{sep_str}{token}"),
                        treatment: memo.trim().to_string(),
                    };
                }
            }
        }

        match trimmed.split_once(' ') {
            Some((name, memo)) => ParsedEntry {
                name: name.to_string(),
                treatment: memo.trim().to_string(),
            },
            None => ParsedEntry {
                name: trimmed.to_string(),
                treatment: DEFAULT_TREATMENT.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_entry_output() {
        let json = r#"{"name":"3333 김진료","treatment":"도수대기"}"#;
        let entry = parse_entry_output(json).unwrap();
        assert_eq!(entry.name, "3333 김진료");
        assert_eq!(entry.treatment, "도수대기");
    }

    #[test]
    fn test_parse_entry_output_with_prose() {
        let output = r#"Here is the extracted entry:
{"name":"김진표","treatment":"충격파"}
Let me know if you need anything else."#;
        let entry = parse_entry_output(output).unwrap();
        assert_eq!(entry.name, "김진표");
        assert_eq!(entry.treatment, "충격파");
    }

    #[test]
    fn test_parse_entry_output_no_json() {
        let result = parse_entry_output("no structured data here");
        assert!(matches!(result, Err(ExtractionError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_entry_output_reversed_braces() {
        let result = parse_entry_output("} then some prose {");
        assert!(matches!(result, Err(ExtractionError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_entry_output_empty_name() {
        let result = parse_entry_output(r#"{"name":"","treatment":"x"}"#);
        assert!(matches!(result, Err(ExtractionError::InvalidFormat(_))));
    }

    #[test]
    fn test_mock_parser_chart_number() {
        let entry = MockParser::parse("3333 김진료 도수대기");
        assert_eq!(entry.name, "3333 김진료");
        assert_eq!(entry.treatment, "도수대기");

        let entry = MockParser::parse("2343/주한솔 충격파 대기");
        assert_eq!(entry.name, "2343/주한솔");
        assert_eq!(entry.treatment, "충격파 대기");
    }

    #[test]
    fn test_mock_parser_name_only() {
        let entry = MockParser::parse("김진표");
        assert_eq!(entry.name, "김진표");
        assert_eq!(entry.treatment, DEFAULT_TREATMENT);
    }

    proptest! {
        /// The mock parser is total: no input panics and every result has
        /// a non-empty memo.
        #[test]
        fn prop_mock_parser_total(input in "\\PC{0,40}") {
            let entry = MockParser::parse(&input);
            prop_assert!(!entry.treatment.is_empty());
        }
    }
}
