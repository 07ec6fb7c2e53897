//! Remote page classifier: the capability the detector depends on.
//!
//! [`PageClassifier`] is the seam between retry logic and the network. The
//! production implementation, [`GeminiClassifier`], posts one
//! `generateContent` request per attempt; tests inject scripted fakes through
//! [`crate::config::RenameConfigBuilder::classifier`].
//!
//! ## Request shape
//!
//! ```text
//! POST {base}v1beta/models/{model}:generateContent
//! x-goog-api-key: …
//! {
//!   "contents": [{ "parts": [{ "text": prompt }, { "inlineData": { png } }] }],
//!   "safetySettings": [ 4 × BLOCK_NONE ],
//!   "generationConfig": { "responseMimeType": "application/json",
//!                         "responseSchema": { page_number: string } }
//! }
//! ```

use crate::config::RenameConfig;
use crate::error::{ClassifyError, RenameError};
use crate::pipeline::encode::EncodedImage;
use crate::prompts::{response_schema, LABEL_FIELD};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Something that can read a page label off an encoded image.
///
/// One call is one attempt: implementations must not retry internally.
/// The returned string is the raw label; normalisation happens in the
/// detector.
#[async_trait]
pub trait PageClassifier: Send + Sync {
    async fn classify(&self, image: &EncodedImage) -> Result<String, ClassifyError>;
}

/// Harm categories relaxed to `BLOCK_NONE` so that scan artefacts are not
/// pre-filtered. The service still applies its own non-configurable filters.
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Candidate finish reasons that mean the content itself was refused.
const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Gemini `generateContent` client.
pub struct GeminiClassifier {
    http: reqwest::Client,
    url: String,
    api_key: String,
    prompt: String,
}

impl std::fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiClassifier {
    /// Build a client from the run configuration.
    ///
    /// A missing API key is not an error here: the detector reports it per
    /// file before any request is attempted.
    pub fn from_config(config: &RenameConfig) -> Result<Self, RenameError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RenameError::ClassifierInit(e.to_string()))?;

        Ok(Self {
            http,
            url: endpoint_url(&config.base_url, &config.model),
            api_key: config.api_key.clone().unwrap_or_default(),
            prompt: config.prompt.clone(),
        })
    }

    fn build_request(&self, image: &EncodedImage) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: self.prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: image.mime_type.to_string(),
                            data: image.data.clone(),
                        },
                    },
                ],
            }],
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_string(),
                    threshold: "BLOCK_NONE".to_string(),
                })
                .collect(),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(&self.prompt),
            },
        }
    }
}

#[async_trait]
impl PageClassifier for GeminiClassifier {
    async fn classify(&self, image: &EncodedImage) -> Result<String, ClassifyError> {
        let request = self.build_request(image);
        debug!("POST {}", self.url);

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout
                } else {
                    ClassifyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;
        debug!("Response {}: {}", status, body);

        if !status.is_success() {
            return Err(ClassifyError::Transport(format!("HTTP {status}: {body}")));
        }

        parse_response(&body)
    }
}

/// `{base}v1beta/models/{model}:generateContent`, tolerant of a missing
/// trailing slash on `base`.
pub fn endpoint_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// Extract the raw label from a `generateContent` response body.
///
/// A prompt-level block reason, or a candidate stopped for safety, is
/// reported as [`ClassifyError::Blocked`]. Anything else that does not lead
/// to a non-empty `page_number` string is [`ClassifyError::Malformed`].
pub fn parse_response(body: &str) -> Result<String, ClassifyError> {
    let malformed = |detail: String| ClassifyError::Malformed {
        detail,
        raw: body.to_string(),
    };

    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|pf| pf.block_reason.as_deref())
    {
        return Err(ClassifyError::Blocked(reason.to_string()));
    }

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| malformed("response has no candidates".into()))?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKING_FINISH_REASONS.contains(&reason) {
            return Err(ClassifyError::Blocked(reason.to_string()));
        }
    }

    let text = candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
        .ok_or_else(|| malformed("candidate has no text part".into()))?;

    let structured: Value = serde_json::from_str(text)
        .map_err(|e| malformed(format!("structured payload is not JSON: {e}")))?;

    let label = structured
        .get(LABEL_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("missing string field '{LABEL_FIELD}'")))?;

    if label.trim().is_empty() {
        return Err(malformed(format!("empty '{LABEL_FIELD}'")));
    }

    Ok(label.to_string())
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    safety_settings: Vec<SafetySetting>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_body(structured: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": structured }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn extracts_label_from_structured_text() {
        let body = ok_body(r#"{"page_number": "7"}"#);
        assert_eq!(parse_response(&body), Ok("7".to_string()));
    }

    #[test]
    fn semantic_label_passes_through() {
        let body = ok_body(r#"{"page_number": "cover"}"#);
        assert_eq!(parse_response(&body), Ok("cover".to_string()));
    }

    #[test]
    fn prompt_block_reason_is_terminal() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert_eq!(
            parse_response(body),
            Err(ClassifyError::Blocked("SAFETY".into()))
        );
    }

    #[test]
    fn safety_finish_reason_is_terminal() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let err = parse_response(body).unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_candidates_is_malformed_with_raw() {
        let body = r#"{"usageMetadata": {}}"#;
        match parse_response(body) {
            Err(ClassifyError::Malformed { raw, .. }) => assert_eq!(raw, body),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn non_json_structured_text_is_malformed() {
        let body = ok_body("page seven");
        assert!(matches!(
            parse_response(&body),
            Err(ClassifyError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_field_is_malformed() {
        let body = ok_body(r#"{"page": "7"}"#);
        assert!(matches!(
            parse_response(&body),
            Err(ClassifyError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_label_is_malformed() {
        let body = ok_body(r#"{"page_number": "  "}"#);
        assert!(matches!(
            parse_response(&body),
            Err(ClassifyError::Malformed { .. })
        ));
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(matches!(
            parse_response("<html>502</html>"),
            Err(ClassifyError::Malformed { .. })
        ));
    }

    #[test]
    fn endpoint_url_handles_trailing_slash() {
        let expected =
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
        assert_eq!(
            endpoint_url("https://generativelanguage.googleapis.com/", "gemini-2.0-flash"),
            expected
        );
        assert_eq!(
            endpoint_url("https://generativelanguage.googleapis.com", "gemini-2.0-flash"),
            expected
        );
    }

    #[test]
    fn request_carries_prompt_image_schema_and_safety() {
        let config = RenameConfig::builder()
            .api_key("k")
            .prompt("Which page?")
            .build()
            .unwrap();
        let client = GeminiClassifier::from_config(&config).unwrap();
        let image = EncodedImage {
            mime_type: "image/png",
            data: "iVBORw0KGgo=".into(),
        };

        let json = serde_json::to_value(client.build_request(&image)).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Which page?");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "iVBORw0KGgo=");

        let safety = json["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), HARM_CATEGORIES.len());
        assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_NONE"));

        let gen = &json["generationConfig"];
        assert_eq!(gen["responseMimeType"], "application/json");
        assert_eq!(gen["responseSchema"]["required"][0], LABEL_FIELD);
    }
}
