use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::GeminiConfig;

/// One content part of a generateContent request or response. Either a text
/// fragment or an inline binary blob.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

/// Base64-encoded binary payload with its MIME type
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<Content>,
}

/// One entry of the ListModels response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status} - {body}")]
    Api { status: u16, body: String },

    #[error("unreadable response: {0}")]
    Parse(String),
}

/// Thin client for the generative language REST API (`v1beta`).
///
/// The API key travels in the `x-goog-api-key` header so request URLs stay
/// safe to log.
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { config, client }
    }

    /// Whether an API key is present. Callers should check this before
    /// starting a candidate loop so a missing key fails once, not per model.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn preferred_model(&self) -> Option<&str> {
        self.config.model.as_deref()
    }

    fn api_key(&self) -> Result<&str, GeminiError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(GeminiError::MissingApiKey)
    }

    /// Send one image plus prompt to `models/{model}:generateContent` and
    /// return the concatenated text of all returned parts. An empty string is
    /// a valid (if useless) response; the caller decides what to do with it.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        mime_type: &str,
        image_bytes: &[u8],
    ) -> Result<String, GeminiError> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url, model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: BASE64_STANDARD.encode(image_bytes),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        tracing::debug!("Gemini generateContent: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api { status, body });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let mut text = String::new();
        for candidate in &parsed.candidates {
            if let Some(content) = &candidate.content {
                for part in &content.parts {
                    if let Some(t) = &part.text {
                        text.push_str(t);
                    }
                }
            }
        }

        Ok(text)
    }

    /// List every model visible to this key, following pagination
    pub async fn list_models(&self) -> Result<Vec<GeminiModel>, GeminiError> {
        let api_key = self.api_key()?;
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/models", self.config.api_base_url))
                .header("x-goog-api-key", api_key)
                .query(&[("pageSize", "200")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| GeminiError::Request(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(GeminiError::Api { status, body });
            }

            let page: ListModelsResponse = response
                .json()
                .await
                .map_err(|e| GeminiError::Parse(e.to_string()))?;

            models.extend(page.models);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }
}

// ==================== gemini client tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str, api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(|s| s.to_string()),
            model: None,
            api_base_url: base_url.to_string(),
            request_timeout: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn test_is_configured_requires_api_key() {
        let client = GeminiClient::new(test_config("http://localhost:9", None));
        assert!(!client.is_configured());

        let client = GeminiClient::new(test_config("http://localhost:9", Some("key")));
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_generate_content_without_key_fails() {
        let client = GeminiClient::new(test_config("http://localhost:9", None));
        let result = client
            .generate_content("gemini-1.5-flash-001", "prompt", "image/png", b"bytes")
            .await;
        assert!(matches!(result, Err(GeminiError::MissingApiKey)));
    }

    #[test]
    fn test_request_body_uses_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some("prompt".to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/png".to_string(),
                            data: "aGVsbG8=".to_string(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        // The text part must not carry a null inlineData key
        assert!(json["contents"][0]["parts"][0].get("inlineData").is_none());
    }

    #[test]
    fn test_response_text_extraction_shape() {
        let raw = serde_json::json!({
            "candidates": [
                {"content": {"role": "model", "parts": [
                    {"text": "{\"ewaste\": "},
                    {"text": "true}"}
                ]}},
                {"content": null}
            ]
        });

        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let mut text = String::new();
        for candidate in &parsed.candidates {
            if let Some(content) = &candidate.content {
                for part in &content.parts {
                    if let Some(t) = &part.text {
                        text.push_str(t);
                    }
                }
            }
        }
        assert_eq!(text, "{\"ewaste\": true}");
    }
}
