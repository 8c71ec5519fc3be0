//! Parse model replies into extraction results

use crate::types::{ContractFields, ExtractionResult};
use serde_json::{Map, Value};
use tracing::{debug, error};

/// Message for a reply with no `{...}` span
pub const NO_JSON_MESSAGE: &str = "Could not parse response";

/// Parse a raw model reply
///
/// Models often wrap the object in prose or markdown fences, so the span
/// from the first `{` to the last `}` is taken as the candidate object. A
/// reply that opens an object but never closes it is parsed from the first
/// `{` to the end, so the truncation is reported as a JSON error.
///
/// - no `{` at all → `ParseError("Could not parse response")`, no raw reply
/// - candidate is not a JSON object → `ParseError("JSON parsing error: ...")`
///   carrying the full reply
/// - otherwise → `Extracted` with the object unchanged
pub fn parse_model_reply(raw: &str) -> ExtractionResult {
    let Some(candidate) = json_span(raw) else {
        error!("No JSON object found in model reply");
        return ExtractionResult::ParseError {
            message: NO_JSON_MESSAGE.to_string(),
            raw_response: None,
        };
    };

    match serde_json::from_str::<Map<String, Value>>(candidate) {
        Ok(map) => ExtractionResult::Extracted(ContractFields::new(map)),
        Err(e) => {
            error!("Failed to parse JSON in model reply: {}", e);
            debug!("Raw reply: {}", raw);
            ExtractionResult::ParseError {
                message: format!("JSON parsing error: {}", e),
                raw_response: Some(raw.to_string()),
            }
        }
    }
}

/// First `{` through last `}` inclusive, or through the end of the reply
/// when no `}` follows the first `{`
fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    match raw.rfind('}') {
        Some(end) if end > start => Some(&raw[start..=end]),
        _ => Some(&raw[start..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_inside_prose() {
        let raw = "Here you go: {\"effective_date\": \"2024-01-15\", \"total_amount\": 1500}\nThanks";
        let result = parse_model_reply(raw);
        assert_eq!(
            result.to_value(),
            json!({"effective_date": "2024-01-15", "total_amount": 1500})
        );
    }

    #[test]
    fn test_no_braces() {
        let result = parse_model_reply("I could not find any contract terms.");
        assert_eq!(
            result.to_value(),
            json!({"effective_date": null, "total_amount": null, "error": "Could not parse response"})
        );
        assert!(result.raw_response().is_none());
    }

    #[test]
    fn test_invalid_json_keeps_raw_reply() {
        let raw = "{not valid json";
        let result = parse_model_reply(raw);
        assert!(result.error().unwrap().starts_with("JSON parsing error: "));
        assert_eq!(result.raw_response(), Some(raw));
        assert_eq!(result.to_value()["raw_response"], raw);
    }

    #[test]
    fn test_invalid_json_between_braces() {
        let raw = "Result: {effective_date: 2024-01-15}";
        let result = parse_model_reply(raw);
        assert!(result.error().unwrap().starts_with("JSON parsing error: "));
        assert_eq!(result.raw_response(), Some(raw));
    }

    #[test]
    fn test_markdown_fence() {
        let raw = "```json\n{\"effective_date\": null, \"total_amount\": 99.5}\n```";
        let fields = parse_model_reply(raw);
        assert_eq!(fields.fields().unwrap().total_amount(), Some(99.5));
    }

    #[test]
    fn test_nested_objects_use_outermost_braces() {
        let raw = r#"{"effective_date": "2023-07-01", "details": {"schedule": "A"}}"#;
        let result = parse_model_reply(raw);
        assert_eq!(result.to_value()["details"]["schedule"], "A");
    }

    #[test]
    fn test_closing_brace_before_opening() {
        let raw = "} nothing here {";
        let result = parse_model_reply(raw);
        assert!(result.error().unwrap().starts_with("JSON parsing error: "));
        assert_eq!(result.raw_response(), Some(raw));
    }

    #[test]
    fn test_two_objects_fail_as_one_span() {
        let raw = "{\"a\": 1} and {\"b\": 2}";
        let result = parse_model_reply(raw);
        assert!(result.error().unwrap().starts_with("JSON parsing error"));
        assert_eq!(result.raw_response(), Some(raw));
    }

    #[test]
    fn test_empty_reply() {
        assert_eq!(parse_model_reply("").error().as_deref(), Some(NO_JSON_MESSAGE));
    }
}
