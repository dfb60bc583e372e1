//! OCR boundary.
//!
//! The recognition backend itself is external; this module owns the
//! request/response contract, the HTTP client, and the deterministic
//! post-processing applied to recognized text before it enters the
//! extraction pipeline.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::OcrConfig;
use crate::error::{OcrError, Result};

// ============================================================================
// Boundary Types
// ============================================================================

/// Request sent to the OCR backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    /// URL of the image to recognize.
    pub image_url: String,
    /// Request enhanced recognition mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_mode: Option<bool>,
}

/// Response from the OCR backend. Only the text is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    /// The recognized text.
    pub text: String,
}

/// An OCR backend.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Recognize the text in an image.
    async fn recognize(&self, request: &OcrRequest) -> Result<OcrResponse>;
}

// ============================================================================
// HTTP Backend
// ============================================================================

/// OCR backend over HTTP.
pub struct HttpOcrBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpOcrBackend {
    /// Create a backend from configuration.
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OcrError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl OcrBackend for HttpOcrBackend {
    async fn recognize(&self, request: &OcrRequest) -> Result<OcrResponse> {
        let url = format!("{}/recognize", self.base_url);

        let mut req = self.client.post(&url).json(request);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "OCR backend error");
            return Err(OcrError::Status(status.as_u16()).into());
        }

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|e| OcrError::MalformedResponse(e.to_string()))?;
        Ok(parsed)
    }
}

/// Recognize an image and post-process the text for extraction.
///
/// Empty recognition output is a typed failure: the pipeline has nothing
/// to work with and the caller must route the input to manual review.
pub async fn recognize_text(backend: &dyn OcrBackend, request: &OcrRequest) -> Result<String> {
    let response = backend.recognize(request).await?;
    let text = normalize_ocr_text(&response.text);
    if text.trim().is_empty() {
        return Err(OcrError::EmptyText(request.image_url.clone()).into());
    }
    debug!(len = text.len(), "OCR text normalized");
    Ok(text)
}

// ============================================================================
// Post-Processing
// ============================================================================

/// Letter/digit confusions, applied only in numeric contexts so prose is
/// untouched. Applied to a fixpoint: "2:OO" needs the first repaired zero
/// before the second becomes digit-adjacent.
static DIGIT_CONFUSIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(\d)[Il]").unwrap(), "${1}1"),
        (Regex::new(r"[Il](\d)").unwrap(), "1${1}"),
        (Regex::new(r"(\d)O").unwrap(), "${1}0"),
        (Regex::new(r"O(\d)").unwrap(), "0${1}"),
        (Regex::new(r"([:.])O").unwrap(), "${1}0"),
        (Regex::new(r"([:.])[Il]").unwrap(), "${1}1"),
    ]
});

/// Hyphenated line break inside a word: "invita-\ntion".
static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{L})-\s*\n\s*(\p{L})").unwrap());

/// Line break continuing a sentence (previous line does not end it).
static SOFT_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s.!?:\n])[ \t]*\n[ \t]*(\S)").unwrap());

/// Deterministic cleanup of raw OCR output.
pub fn normalize_ocr_text(text: &str) -> String {
    let mut result = HYPHEN_BREAK.replace_all(text, "${1}${2}").into_owned();
    result = SOFT_BREAK.replace_all(&result, "${1} ${2}").into_owned();

    // Confusion fixes until stable; each pass can expose the next digit
    // context, and the chains are short.
    for _ in 0..3 {
        let mut changed = false;
        for (pattern, replacement) in DIGIT_CONFUSIONS.iter() {
            let fixed = pattern.replace_all(&result, *replacement);
            if fixed != result {
                result = fixed.into_owned();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_confusions_in_numeric_context() {
        assert_eq!(normalize_ocr_text("party on 4/I2"), "party on 4/12");
        assert_eq!(normalize_ocr_text("at 2:OO PM"), "at 2:00 PM");
        assert_eq!(normalize_ocr_text("kl. I4.OO"), "kl. 14.00");
    }

    #[test]
    fn test_prose_letters_untouched() {
        // "I" and "O" outside numeric contexts stay as they are.
        assert_eq!(normalize_ocr_text("I hope you can come"), "I hope you can come");
        assert_eq!(normalize_ocr_text("Oh what fun"), "Oh what fun");
    }

    #[test]
    fn test_hyphenated_line_break_joined() {
        assert_eq!(
            normalize_ocr_text("birthday invita-\ntion for Emma"),
            "birthday invitation for Emma"
        );
    }

    #[test]
    fn test_soft_line_break_becomes_space() {
        assert_eq!(
            normalize_ocr_text("party at\nPizza Palace"),
            "party at Pizza Palace"
        );
    }

    #[test]
    fn test_sentence_end_break_preserved() {
        let text = "Welcome!\nSaturday 4/12";
        assert_eq!(normalize_ocr_text(text), "Welcome!\nSaturday 4/12");
    }

    #[test]
    fn test_request_wire_shape() {
        let request = OcrRequest {
            image_url: "https://img.example/invite.jpg".to_string(),
            enhanced_mode: Some(true),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["imageUrl"], "https://img.example/invite.jpg");
        assert_eq!(json["enhancedMode"], true);
    }

    struct EmptyBackend;

    #[async_trait]
    impl OcrBackend for EmptyBackend {
        async fn recognize(&self, _request: &OcrRequest) -> Result<OcrResponse> {
            Ok(OcrResponse {
                text: "   ".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_empty_text_is_typed_failure() {
        let request = OcrRequest {
            image_url: "https://img.example/blank.jpg".to_string(),
            enhanced_mode: None,
        };
        let err = recognize_text(&EmptyBackend, &request).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::HearthError::Ocr(OcrError::EmptyText(_))
        ));
    }
}
