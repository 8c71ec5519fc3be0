//! Prompt for contract field extraction

use crate::types::ExtractionInput;

/// Instructions sent with every extraction request
pub const CONTRACT_PROMPT: &str = r#"You are analyzing a contract document. Please extract the following information:

1. Effective Date: The date when the contract becomes effective or starts. This might be labeled as "Effective Date", "Start Date", "Commencement Date", or similar.
2. Total Amount: The total dollar amount of the contract. This might be labeled as "Total Contract Value", "Total Amount", "Contract Price", "Total Fee", or similar.

Please respond with a JSON object containing:
- "effective_date": The effective date in ISO format (YYYY-MM-DD) if found, or null if not found
- "total_amount": The total dollar amount as a number (without currency symbols or commas) if found, or null if not found
- "effective_date_confidence" and "total_amount_confidence": A confidence score from 0-1 for each extraction
- "notes": Any relevant notes about the extraction

Example response:
{
    "effective_date": "2024-01-15",
    "effective_date_confidence": 0.95,
    "total_amount": 150000.00,
    "total_amount_confidence": 0.90,
    "notes": "Effective date found in Section 1. Total amount calculated from monthly fees in Schedule A."
}"#;

/// Build the prompt text for `input`
///
/// Text input is appended after the instructions; a document is sent as an
/// attachment, so the prompt is the instructions alone.
pub fn build_prompt(input: &ExtractionInput) -> String {
    match input {
        ExtractionInput::Text(text) => {
            let mut prompt = String::with_capacity(CONTRACT_PROMPT.len() + text.len() + 20);
            prompt.push_str(CONTRACT_PROMPT);
            prompt.push_str("\n\nDocument text:\n");
            prompt.push_str(text);
            prompt
        }
        ExtractionInput::Document(_) => CONTRACT_PROMPT.to_string(),
    }
}
