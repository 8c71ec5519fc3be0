//! Types for contract extraction

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// What the model is asked to read
#[derive(Clone, PartialEq, Eq)]
pub enum ExtractionInput {
    /// Pre-extracted document text, appended to the prompt
    Text(String),
    /// Raw PDF bytes, attached next to the prompt
    Document(Vec<u8>),
}

impl std::fmt::Debug for ExtractionInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionInput::Text(text) => write!(f, "Text(<{} chars>)", text.chars().count()),
            ExtractionInput::Document(bytes) => write!(f, "Document(<{} bytes>)", bytes.len()),
        }
    }
}

/// The JSON object produced by the model, passed through unchanged
///
/// Typed accessors cover the fields the prompt asks for; anything else the
/// model adds is kept and available through [`as_map`](Self::as_map).
#[derive(Debug, Clone, PartialEq)]
pub struct ContractFields(Map<String, Value>);

impl ContractFields {
    /// Wrap a parsed JSON object
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Effective date as written by the model
    pub fn effective_date(&self) -> Option<&str> {
        self.0.get("effective_date").and_then(Value::as_str)
    }

    /// Effective date, if it is an ISO `YYYY-MM-DD` date
    pub fn effective_date_parsed(&self) -> Option<NaiveDate> {
        self.effective_date()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
    }

    /// Confidence for the effective date, 0 to 1
    pub fn effective_date_confidence(&self) -> Option<f64> {
        self.number("effective_date_confidence")
    }

    /// Total contract amount
    ///
    /// Accepts a JSON number or a numeric string such as `"150,000.00"`.
    pub fn total_amount(&self) -> Option<f64> {
        self.number("total_amount")
    }

    /// Confidence for the total amount, 0 to 1
    pub fn total_amount_confidence(&self) -> Option<f64> {
        self.number("total_amount_confidence")
    }

    /// Free-form notes from the model
    pub fn notes(&self) -> Option<&str> {
        self.0
            .get("notes")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// All fields
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s
                .trim()
                .trim_start_matches('$')
                .replace(',', "")
                .parse()
                .ok(),
            _ => None,
        }
    }
}

/// Outcome of one extraction call
///
/// Every failure path is a variant; the extraction call itself never
/// returns an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// The model replied with a parseable JSON object
    Extracted(ContractFields),

    /// The reply could not be turned into a JSON object
    ParseError {
        /// `Could not parse response` or `JSON parsing error: <detail>`
        message: String,
        /// Full reply text, kept when a candidate object failed to parse
        raw_response: Option<String>,
    },

    /// The model service failed or could not be reached
    ServiceError {
        /// Service name, e.g. `Bedrock`
        service: String,
        /// Failure detail
        message: String,
    },
}

impl ExtractionResult {
    /// Whether fields were extracted
    pub fn is_extracted(&self) -> bool {
        matches!(self, ExtractionResult::Extracted(_))
    }

    /// Extracted fields, if any
    pub fn fields(&self) -> Option<&ContractFields> {
        match self {
            ExtractionResult::Extracted(fields) => Some(fields),
            _ => None,
        }
    }

    /// User-facing error text for the failure variants
    pub fn error(&self) -> Option<String> {
        match self {
            ExtractionResult::Extracted(_) => None,
            ExtractionResult::ParseError { message, .. } => Some(message.clone()),
            ExtractionResult::ServiceError { service, message } => {
                Some(format!("{} API error: {}", service, message))
            }
        }
    }

    /// Raw model reply kept for a failed parse
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ExtractionResult::ParseError { raw_response, .. } => raw_response.as_deref(),
            _ => None,
        }
    }

    /// Render as a loose JSON mapping
    ///
    /// Success renders the model's object unchanged. Failures render
    /// `{effective_date: null, total_amount: null, error, raw_response?}`.
    pub fn to_value(&self) -> Value {
        match self {
            ExtractionResult::Extracted(fields) => Value::Object(fields.as_map().clone()),
            failure => {
                let mut value = json!({
                    "effective_date": null,
                    "total_amount": null,
                    "error": failure.error(),
                });
                if let Some(raw) = failure.raw_response() {
                    value["raw_response"] = Value::String(raw.to_string());
                }
                value
            }
        }
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
