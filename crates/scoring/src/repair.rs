//! Best-effort recovery of a JSON object from an LLM reply.
//!
//! This is a fallback, not a lenient JSON parser. After isolating the widest
//! `{ ... }` span it fixes exactly two things: single-quoted strings and
//! trailing commas before `}` or `]`. An apostrophe inside a single-quoted
//! string cannot be told apart from its closing quote and is not recovered.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::ScoringError;

static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]+\}").expect("object span pattern is valid"));

/// Parse `raw` as JSON, falling back to span extraction plus [`repair_json`].
pub fn parse_with_repair(raw: &str) -> Result<Value, ScoringError> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(value);
    }

    let span = extract_object_span(raw)
        .ok_or_else(|| ScoringError::unparsable("no JSON object found in response", raw))?;

    let repaired = repair_json(span);
    serde_json::from_str::<Value>(&repaired).map_err(|e| {
        tracing::warn!(error = %e, "JSON repair did not produce valid JSON");
        ScoringError::unparsable(format!("invalid JSON after repair: {}", e), raw)
    })
}

/// Widest substring running from the first `{` to the last `}`.
pub fn extract_object_span(text: &str) -> Option<&str> {
    OBJECT_SPAN.find(text).map(|m| m.as_str())
}

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    None,
    Double,
    Single,
}

/// Rewrites single-quoted strings as double-quoted ones and drops trailing
/// commas. Text inside double-quoted strings is left untouched.
pub fn repair_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = Quote::None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            Quote::None => match c {
                '"' => {
                    out.push('"');
                    state = Quote::Double;
                }
                '\'' => {
                    out.push('"');
                    state = Quote::Single;
                }
                ',' if closes_after_whitespace(&chars[i + 1..]) => {}
                _ => out.push(c),
            },
            Quote::Double => match c {
                '\\' => {
                    out.push(c);
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                }
                '"' => {
                    out.push('"');
                    state = Quote::None;
                }
                _ => out.push(c),
            },
            Quote::Single => match c {
                '\\' => match chars.get(i + 1) {
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => out.push('\\'),
                },
                '"' => out.push_str("\\\""),
                '\'' => {
                    out.push('"');
                    state = Quote::None;
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}

fn closes_after_whitespace(rest: &[char]) -> bool {
    matches!(
        rest.iter().find(|c| !c.is_whitespace()),
        Some('}') | Some(']')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_quotes_and_trailing_comma() {
        let raw = r#"{"Leadership": {'Score': 7, 'Color': 'Yellow', 'Justification': "ok",}}"#;

        let value = parse_with_repair(raw).unwrap();

        assert_eq!(
            value,
            json!({"Leadership": {"Score": 7, "Color": "Yellow", "Justification": "ok"}})
        );
    }

    #[test]
    fn test_valid_json_is_parsed_directly() {
        let raw = r#"{"Risk": {"Score": 3, "Justification": "It's 'early' days"}}"#;
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["Risk"]["Justification"], "It's 'early' days");
    }

    #[test]
    fn test_apostrophes_inside_double_quotes_survive_repair() {
        let raw = r#"{'Risk': {'Score': 4, 'Justification': "The founder's runway is short",},}"#;
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["Risk"]["Justification"], "The founder's runway is short");
    }

    #[test]
    fn test_object_is_found_inside_prose_and_fences() {
        let raw = "Here is my evaluation:\n```json\n{\"Traction\": {\"Score\": 6, \"Color\": \"Yellow\",},}\n```\nLet me know!";
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["Traction"]["Score"], 6);
    }

    #[test]
    fn test_double_quote_inside_single_quoted_string_is_escaped() {
        assert_eq!(repair_json(r#"{'a': 'say "hi"'}"#), r#"{"a": "say \"hi\""}"#);
    }

    #[test]
    fn test_trailing_comma_in_array() {
        assert_eq!(repair_json("[1, 2, 3 ,\n ]"), "[1, 2, 3 \n ]");
    }

    #[test]
    fn test_no_object_is_unparsable() {
        let raw = "I am unable to score this pitch.";
        match parse_with_repair(raw) {
            Err(ScoringError::UnparsableResponse { raw: attached, .. }) => {
                assert_eq!(attached, raw);
            }
            other => panic!("expected UnparsableResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_unrepairable_object_keeps_raw_text() {
        let raw = "{Leadership: seven}";
        let err = parse_with_repair(raw).unwrap_err();
        assert_eq!(err.raw_response(), Some(raw));
    }
}
