use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::core::config::GeminiConfig;
use crate::core::error::{AppError, Result};
use crate::features::ml::clients::{GeminiClient, GeminiModel};
use crate::shared::llm::parse_object;

/// Model tried when nothing else is configured or discoverable
const DEFAULT_MODEL: &str = "gemini-1.5-flash-001";

/// Known-good fallbacks tried after the default
const FALLBACK_MODELS: [&str; 2] = ["gemini-1.5-flash", "gemini-1.5-flash-002"];

/// Instruction sent alongside every image
const VERIFICATION_PROMPT: &str = r#"You are verifying whether the provided photo shows discarded electronic waste. Classify as ewaste only when there are clear electronic components such as circuit boards, batteries, cables, screens, or other electronic devices intended for disposal. Respond strictly in JSON with the structure {"ewaste": true|false, "reason": "short explanation"}. If you are unsure, respond with ewaste=false."#;

/// Outcome of an e-waste verification call
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_ewaste: bool,
    pub reason: String,
}

/// Binary gate deciding whether an uploaded photo shows e-waste.
///
/// The submission pipeline depends on this trait rather than on the Gemini
/// implementation directly so tests can substitute a scripted verifier.
#[async_trait]
pub trait EwasteVerifier: Send + Sync {
    async fn verify(&self, image_bytes: &[u8], mime_type: &str) -> Result<Verdict>;
}

/// JSON shape the prompt demands from the model. A present-but-empty reason
/// and an absent reason are treated the same.
#[derive(Debug, Deserialize)]
struct VerdictPayload {
    #[serde(default)]
    ewaste: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl From<VerdictPayload> for Verdict {
    fn from(payload: VerdictPayload) -> Self {
        let reason = payload
            .reason
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "No reason provided.".to_string());

        Self {
            is_ewaste: payload.ewaste,
            reason,
        }
    }
}

/// Verifier backed by the Gemini generateContent API with a multi-candidate
/// fallback chain.
pub struct GeminiVerifier {
    client: GeminiClient,
    /// Discovered model names, fetched once on first use. A failed discovery
    /// caches an empty list: the static candidates are enough to proceed.
    discovered: RwLock<Option<Vec<String>>>,
}

impl GeminiVerifier {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: GeminiClient::new(config),
            discovered: RwLock::new(None),
        }
    }

    async fn discovered_models(&self) -> Vec<String> {
        {
            let cache = self.discovered.read().await;
            if let Some(models) = cache.as_ref() {
                return models.clone();
            }
        }

        let mut cache = self.discovered.write().await;
        // Another task may have filled the cache while we waited for the lock
        if let Some(models) = cache.as_ref() {
            return models.clone();
        }

        let models = match self.client.list_models().await {
            Ok(listed) => {
                let names = filter_generate_content_models(&listed);
                tracing::info!("Discovered {} usable Gemini models", names.len());
                names
            }
            Err(e) => {
                tracing::warn!("Gemini model discovery failed: {}", e);
                Vec::new()
            }
        };

        *cache = Some(models.clone());
        models
    }

    async fn candidate_models(&self) -> Vec<String> {
        let discovered = self.discovered_models().await;
        assemble_candidates(self.client.preferred_model(), &discovered)
    }
}

#[async_trait]
impl EwasteVerifier for GeminiVerifier {
    async fn verify(&self, image_bytes: &[u8], mime_type: &str) -> Result<Verdict> {
        if !self.client.is_configured() {
            return Err(AppError::Internal(
                "Gemini API key is not configured.".to_string(),
            ));
        }

        let resolved_mime = if mime_type.starts_with("image/") {
            mime_type
        } else {
            "image/jpeg"
        };

        let mut last_failure: Option<String> = None;
        for model in self.candidate_models().await {
            let text = match self
                .client
                .generate_content(&model, VERIFICATION_PROMPT, resolved_mime, image_bytes)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Gemini model {} failed: {}", model, e);
                    last_failure = Some(e.to_string());
                    continue;
                }
            };

            match parse_object::<VerdictPayload>(&text) {
                Ok(payload) => {
                    tracing::debug!("Gemini model {} returned a verdict", model);
                    return Ok(Verdict::from(payload));
                }
                Err(e) => {
                    tracing::warn!("Gemini model {} returned malformed JSON: {}", model, e);
                    last_failure = Some(e);
                }
            }
        }

        let detail =
            last_failure.unwrap_or_else(|| "no candidate models available".to_string());
        Err(AppError::ExternalServiceError(format!(
            "Gemini request failed: {}",
            detail
        )))
    }
}

/// Merge the configured model, built-in candidates, and discovered models
/// into one ordered list: strip `models/` path prefixes, skip unstable
/// `latest` aliases, deduplicate keeping first occurrence.
fn assemble_candidates(preferred: Option<&str>, discovered: &[String]) -> Vec<String> {
    let mut raw: Vec<&str> = Vec::new();
    if let Some(model) = preferred {
        raw.push(model);
    }
    raw.push(DEFAULT_MODEL);
    raw.extend(FALLBACK_MODELS);
    raw.extend(discovered.iter().map(String::as_str));

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for name in raw {
        if name.is_empty() {
            continue;
        }
        let clean = name.rsplit('/').next().unwrap_or(name);
        if clean.ends_with("latest") {
            continue;
        }
        if seen.insert(clean.to_string()) {
            candidates.push(clean.to_string());
        }
    }

    if candidates.is_empty() {
        candidates.push(DEFAULT_MODEL.to_string());
    }
    candidates
}

/// Keep only models usable for generateContent, normalized to their short
/// name. `latest` aliases are not reliably served by v1beta generateContent,
/// so they are dropped here as well.
fn filter_generate_content_models(models: &[GeminiModel]) -> Vec<String> {
    let mut names = Vec::new();
    for model in models {
        let supported = model
            .supported_generation_methods
            .iter()
            .any(|method| method == "generateContent");
        if !supported || model.name.is_empty() {
            continue;
        }

        let simple = model.name.rsplit('/').next().unwrap_or(&model.name);
        if simple.ends_with("latest") {
            continue;
        }
        names.push(simple.to_string());
    }
    names
}

// ==================== verifier tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Scripted Gemini upstream. Models present in `replies` answer with the
    /// mapped text as their single candidate part; everything else gets an
    /// HTTP 500.
    struct StubGemini {
        replies: HashMap<String, String>,
        listed: Value,
        calls: Mutex<Vec<String>>,
        mimes: Mutex<Vec<String>>,
        list_calls: AtomicUsize,
    }

    impl StubGemini {
        fn new(replies: &[(&str, &str)]) -> Arc<Self> {
            Self::with_listed(replies, json!({ "models": [] }))
        }

        fn with_listed(replies: &[(&str, &str)], listed: Value) -> Arc<Self> {
            Arc::new(Self {
                replies: replies
                    .iter()
                    .map(|(model, text)| (model.to_string(), text.to_string()))
                    .collect(),
                listed,
                calls: Mutex::new(Vec::new()),
                mimes: Mutex::new(Vec::new()),
                list_calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    async fn list_models_stub(State(stub): State<Arc<StubGemini>>) -> Json<Value> {
        stub.list_calls.fetch_add(1, Ordering::SeqCst);
        Json(stub.listed.clone())
    }

    async fn generate_content_stub(
        State(stub): State<Arc<StubGemini>>,
        Path(action): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        let model = action.trim_end_matches(":generateContent").to_string();
        stub.calls.lock().unwrap().push(model.clone());

        if let Some(mime) = body
            .pointer("/contents/0/parts/1/inlineData/mimeType")
            .and_then(Value::as_str)
        {
            stub.mimes.lock().unwrap().push(mime.to_string());
        }

        match stub.replies.get(&model) {
            Some(text) => Json(json!({
                "candidates": [
                    {"content": {"role": "model", "parts": [{"text": text}]}}
                ]
            }))
            .into_response(),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        }
    }

    async fn serve(stub: Arc<StubGemini>) -> String {
        let app = Router::new()
            .route("/models", get(list_models_stub))
            .route("/models/{action}", post(generate_content_stub))
            .with_state(stub);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn verifier_for(base_url: &str, model: Option<&str>) -> GeminiVerifier {
        GeminiVerifier::new(GeminiConfig {
            api_key: Some("test-key".to_string()),
            model: model.map(|s| s.to_string()),
            api_base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn test_first_candidate_success_short_circuits() {
        let stub = StubGemini::new(&[(
            "gemini-1.5-flash-001",
            r#"{"ewaste": true, "reason": "visible circuit boards"}"#,
        )]);
        let base_url = serve(stub.clone()).await;

        let verdict = verifier_for(&base_url, None)
            .verify(b"image-bytes", "image/png")
            .await
            .unwrap();

        assert!(verdict.is_ewaste);
        assert_eq!(verdict.reason, "visible circuit boards");
        assert_eq!(stub.calls(), vec!["gemini-1.5-flash-001"]);
    }

    #[tokio::test]
    async fn test_fallback_advances_past_http_errors() {
        // flash-001 fails with HTTP 500; flash answers
        let stub = StubGemini::new(&[(
            "gemini-1.5-flash",
            r#"{"ewaste": false, "reason": "shows a banana"}"#,
        )]);
        let base_url = serve(stub.clone()).await;

        let verdict = verifier_for(&base_url, None)
            .verify(b"image-bytes", "image/jpeg")
            .await
            .unwrap();

        assert!(!verdict.is_ewaste);
        assert_eq!(verdict.reason, "shows a banana");
        assert_eq!(stub.calls(), vec!["gemini-1.5-flash-001", "gemini-1.5-flash"]);
    }

    #[tokio::test]
    async fn test_fallback_advances_past_malformed_json() {
        let stub = StubGemini::new(&[
            ("gemini-1.5-flash-001", "I am quite sure this is e-waste"),
            (
                "gemini-1.5-flash",
                "```json\n{\"ewaste\": true, \"reason\": \"a pile of cables\"}\n```",
            ),
        ]);
        let base_url = serve(stub.clone()).await;

        let verdict = verifier_for(&base_url, None)
            .verify(b"image-bytes", "image/jpeg")
            .await
            .unwrap();

        assert!(verdict.is_ewaste);
        assert_eq!(verdict.reason, "a pile of cables");
        assert_eq!(stub.calls(), vec!["gemini-1.5-flash-001", "gemini-1.5-flash"]);
    }

    #[tokio::test]
    async fn test_exhausted_candidates_surface_last_failure() {
        let stub = StubGemini::new(&[]);
        let base_url = serve(stub.clone()).await;

        let err = verifier_for(&base_url, None)
            .verify(b"image-bytes", "image/jpeg")
            .await
            .unwrap_err();

        match err {
            AppError::ExternalServiceError(message) => {
                assert!(message.starts_with("Gemini request failed:"), "{}", message);
                assert!(message.contains("500"), "{}", message);
            }
            other => panic!("expected ExternalServiceError, got {:?}", other),
        }
        // All three static candidates were tried
        assert_eq!(stub.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_configuration_error() {
        let verifier = GeminiVerifier::new(GeminiConfig {
            api_key: None,
            model: None,
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_secs(1),
        });

        let err = verifier.verify(b"image-bytes", "image/png").await.unwrap_err();
        match err {
            AppError::Internal(message) => {
                assert_eq!(message, "Gemini API key is not configured.");
            }
            other => panic!("expected Internal, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_image_mime_is_coerced_to_jpeg() {
        let stub = StubGemini::new(&[(
            "gemini-1.5-flash-001",
            r#"{"ewaste": true, "reason": "ok"}"#,
        )]);
        let base_url = serve(stub.clone()).await;

        verifier_for(&base_url, None)
            .verify(b"image-bytes", "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(stub.mimes.lock().unwrap().clone(), vec!["image/jpeg"]);
    }

    #[tokio::test]
    async fn test_discovered_models_extend_candidates_and_cache_once() {
        let listed = json!({
            "models": [
                {"name": "models/stub-model-8b", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]}
            ]
        });
        let stub = StubGemini::with_listed(
            &[("stub-model-8b", r#"{"ewaste": true, "reason": "ok"}"#)],
            listed,
        );
        let base_url = serve(stub.clone()).await;
        let verifier = verifier_for(&base_url, None);

        let verdict = verifier.verify(b"image-bytes", "image/png").await.unwrap();
        assert!(verdict.is_ewaste);
        assert_eq!(
            stub.calls(),
            vec![
                "gemini-1.5-flash-001",
                "gemini-1.5-flash",
                "gemini-1.5-flash-002",
                "stub-model-8b"
            ]
        );

        // Second call reuses the cached discovery result
        verifier.verify(b"image-bytes", "image/png").await.unwrap();
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preferred_model_is_tried_first() {
        let stub = StubGemini::new(&[(
            "tuned-ewaste-check",
            r#"{"ewaste": true, "reason": "ok"}"#,
        )]);
        let base_url = serve(stub.clone()).await;

        verifier_for(&base_url, Some("tuned-ewaste-check"))
            .verify(b"image-bytes", "image/png")
            .await
            .unwrap();

        assert_eq!(stub.calls(), vec!["tuned-ewaste-check"]);
    }

    #[test]
    fn test_assemble_candidates_order_and_dedup() {
        let discovered = vec![
            "models/gemini-2.0-pro".to_string(),
            "gemini-1.5-flash".to_string(),
            "gemini-1.5-pro-latest".to_string(),
        ];
        let candidates = assemble_candidates(Some("gemini-1.5-flash-002"), &discovered);
        assert_eq!(
            candidates,
            vec![
                "gemini-1.5-flash-002",
                "gemini-1.5-flash-001",
                "gemini-1.5-flash",
                "gemini-2.0-pro"
            ]
        );
    }

    #[test]
    fn test_assemble_candidates_without_config_or_discovery() {
        assert_eq!(
            assemble_candidates(None, &[]),
            vec![
                "gemini-1.5-flash-001",
                "gemini-1.5-flash",
                "gemini-1.5-flash-002"
            ]
        );
    }

    #[test]
    fn test_filter_discovered_models() {
        let models = vec![
            GeminiModel {
                name: "models/gemini-1.5-pro".to_string(),
                supported_generation_methods: vec!["generateContent".to_string()],
            },
            GeminiModel {
                name: "models/embedding-001".to_string(),
                supported_generation_methods: vec!["embedContent".to_string()],
            },
            GeminiModel {
                name: "models/gemini-1.5-pro-latest".to_string(),
                supported_generation_methods: vec!["generateContent".to_string()],
            },
            GeminiModel {
                name: String::new(),
                supported_generation_methods: vec!["generateContent".to_string()],
            },
        ];
        assert_eq!(filter_generate_content_models(&models), vec!["gemini-1.5-pro"]);
    }

    #[test]
    fn test_verdict_payload_defaults() {
        let verdict: Verdict = parse_object::<VerdictPayload>("{}").unwrap().into();
        assert!(!verdict.is_ewaste);
        assert_eq!(verdict.reason, "No reason provided.");

        let verdict: Verdict = parse_object::<VerdictPayload>(r#"{"ewaste": true, "reason": ""}"#)
            .unwrap()
            .into();
        assert!(verdict.is_ewaste);
        assert_eq!(verdict.reason, "No reason provided.");
    }
}
