use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::normalize::l2_normalize_in_place;
use crate::retry::{execute_with_retry, RetryConfig};
use crate::{EmbeddingProvider, EmbeddingVector, SemanticConfig, SemanticError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiProviderKind {
    Gemini,
    HuggingFace,
    OpenAI,
    Custom,
}

/// Remote embedding provider speaking the Gemini, OpenAI, Hugging Face, or a
/// minimal custom JSON protocol.
///
/// Each instance owns its HTTP client so it can be injected wherever an
/// [`EmbeddingProvider`] is expected.
#[derive(Debug, Clone)]
pub struct ApiEmbedder {
    client: reqwest::Client,
    url: String,
    provider: ApiProviderKind,
    cfg: SemanticConfig,
}

impl ApiEmbedder {
    pub fn new(cfg: SemanticConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        let timeout = Duration::from_secs(cfg.api_timeout_secs.unwrap_or(30));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("http client: {e}")))?;

        Ok(Self {
            client,
            url: cfg.resolved_api_url(),
            provider: api_provider_kind(&cfg),
            cfg,
        })
    }

    async fn send_api_request(&self, payload: &Value) -> Result<Value, SemanticError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(key) = self.cfg.api_key.as_deref() {
            request = match self.provider {
                ApiProviderKind::Gemini => request.header("x-goog-api-key", key),
                _ => request.bearer_auth(key),
            };
        }

        let response = request
            .send()
            .await
            .map_err(|e| SemanticError::Request(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::QuotaExceeded(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SemanticError::InvalidResponse(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl EmbeddingProvider for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, SemanticError> {
        let payload = build_api_payload(self.provider, text, &self.cfg);

        let response = if self.cfg.enable_retry {
            let retry_cfg: RetryConfig = self.cfg.retry_config.unwrap_or_default();
            let (this, payload) = (self, &payload);
            execute_with_retry(&retry_cfg, move |_attempt| this.send_api_request(payload))
                .await
                .into_result()?
        } else {
            self.send_api_request(&payload).await?
        };

        let mut vector = parse_embeddings_from_value(response)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SemanticError::InvalidResponse("response did not contain embeddings".into())
            })?;
        if vector.is_empty() {
            return Err(SemanticError::InvalidResponse(
                "provider returned an empty vector".into(),
            ));
        }

        if self.cfg.normalize {
            l2_normalize_in_place(&mut vector);
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        &self.cfg.model_name
    }
}

fn api_provider_kind(cfg: &SemanticConfig) -> ApiProviderKind {
    let provider = cfg
        .api_provider
        .as_deref()
        .unwrap_or("gemini")
        .to_ascii_lowercase();
    match provider.as_str() {
        "gemini" | "google" => ApiProviderKind::Gemini,
        "hf" | "huggingface" => ApiProviderKind::HuggingFace,
        "openai" | "gpt" => ApiProviderKind::OpenAI,
        _ => ApiProviderKind::Custom,
    }
}

fn build_api_payload(provider: ApiProviderKind, text: &str, cfg: &SemanticConfig) -> Value {
    match provider {
        ApiProviderKind::Gemini => json!({
            "model": format!("models/{}", cfg.model_name),
            "content": { "parts": [{ "text": text }] },
            "taskType": cfg.task_type,
        }),
        ApiProviderKind::HuggingFace => json!({ "inputs": text }),
        ApiProviderKind::OpenAI => json!({ "input": text, "model": cfg.model_name }),
        ApiProviderKind::Custom => json!({ "text": text }),
    }
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            // Gemini: {"embedding": {"values": [...]}}
            if let Some(embedding) = map.remove("embedding") {
                return match embedding {
                    Value::Object(mut inner) => match inner.remove("values") {
                        Some(values) => parse_embedding_vector(values).map(|v| vec![v]),
                        None => Err(SemanticError::InvalidResponse(
                            "missing `values` inside `embedding`".into(),
                        )),
                    },
                    other => parse_embedding_vector(other).map(|v| vec![v]),
                };
            }

            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(mut obj) => match obj.remove("embedding") {
                            Some(embedding) => vectors.push(parse_embedding_vector(embedding)?),
                            None => {
                                return Err(SemanticError::InvalidResponse(
                                    "missing `embedding` field in data item".into(),
                                ))
                            }
                        },
                        _ => {
                            return Err(SemanticError::InvalidResponse(
                                "unexpected entry inside `data` array".into(),
                            ))
                        }
                    }
                }
                return Ok(vectors);
            }

            Err(SemanticError::InvalidResponse(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num.as_f64().map(|f| f as f32).ok_or_else(|| {
                    SemanticError::InvalidResponse("non-finite embedding value".into())
                }),
                other => Err(SemanticError::InvalidResponse(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(SemanticError::InvalidResponse(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}
