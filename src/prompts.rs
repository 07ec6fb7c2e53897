//! Classification prompt and structured-response schema.
//!
//! Callers can override the prompt via [`crate::config::RenameConfig::prompt`];
//! the constant here is used only when no override is provided.

use serde_json::{json, Value};

/// Default classification instruction sent alongside every page image.
pub const DEFAULT_PROMPT: &str = "Detected page number, 'cover', or 'copyright'.";

/// Name of the single string field the model must return.
pub const LABEL_FIELD: &str = "page_number";

/// JSON schema constraining the model output to `{"page_number": "<label>"}`.
///
/// The prompt doubles as the field description so the model sees the
/// instruction twice: once in the user turn and once in the schema.
pub fn response_schema(prompt: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            (LABEL_FIELD): {
                "type": "string",
                "description": prompt,
            }
        },
        "required": [LABEL_FIELD],
    })
}
