//! HTTP agent service adapter
//!
//! Talks to an agent system that exposes an OpenAI Responses-style endpoint.
//! Each invocation starts from a cold cache and makes one non-streamed call.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use url::Url;

use crate::bench::adapter::AgentAdapter;
use crate::core::{AgentConfig, BackendKind, BenchError, Config, ResearchTask, Result};

/// Service root used when none is configured
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000";

/// Where the final answer lives in the service's JSON payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// Responses envelope: `output_text`, or `output[*].content[*]` parts
    /// of type `output_text`
    Responses,
    /// Chat completion: `choices[0].message.content`
    ChatCompletion,
    /// Arbitrary JSON pointer, e.g. `/result/answer`
    Pointer(String),
}

impl FromStr for ResponseShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "responses" => Ok(ResponseShape::Responses),
            "chat_completion" | "chat-completion" => Ok(ResponseShape::ChatCompletion),
            pointer if pointer.starts_with('/') => Ok(ResponseShape::Pointer(pointer.to_string())),
            other => Err(format!(
                "unknown response shape '{}' (expected responses, chat_completion, or a JSON pointer)",
                other
            )),
        }
    }
}

impl ResponseShape {
    /// Pull the answer text out of a payload
    pub fn extract(&self, payload: &Value) -> Result<String> {
        if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(BenchError::service(format!(
                "service reported an error: {}",
                message
            )));
        }

        let answer = match self {
            ResponseShape::Responses => extract_output_text(payload),
            ResponseShape::ChatCompletion => payload
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map(str::to_string),
            ResponseShape::Pointer(pointer) => payload
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string),
        };

        answer.ok_or_else(|| {
            BenchError::ResponseShape(format!(
                "no answer text at {} (top-level keys: {})",
                self.describe(),
                top_level_keys(payload)
            ))
        })
    }

    fn describe(&self) -> &str {
        match self {
            ResponseShape::Responses => "output_text",
            ResponseShape::ChatCompletion => "/choices/0/message/content",
            ResponseShape::Pointer(pointer) => pointer,
        }
    }
}

fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = payload
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

fn top_level_keys(payload: &Value) -> String {
    match payload.as_object() {
        Some(map) if !map.is_empty() => map.keys().cloned().collect::<Vec<_>>().join(", "),
        _ => "none".to_string(),
    }
}

/// Recursively delete a cache directory; an absent directory is not an error
pub fn clear_cache_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "cache directory cleared");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BenchError::CacheCleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Request body for a non-streamed run
#[derive(Debug, Serialize)]
struct ServiceRequest<'a> {
    model: &'a str,
    input: &'a str,
    stream: bool,
}

/// Adapter for the HTTP agent service backend
pub struct HttpServiceAdapter {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: String,
    cache_dir: Option<PathBuf>,
    shape: ResponseShape,
}

impl HttpServiceAdapter {
    /// Create an adapter for a service root such as `http://127.0.0.1:8000`
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self> {
        let mut root = base_url.trim().to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        let endpoint = Url::parse(&root)?.join("responses")?;

        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
            model: model.into(),
            api_key: "not-needed".to_string(),
            cache_dir: None,
            shape: ResponseShape::Responses,
        })
    }

    /// Create an adapter from the service's [`AgentConfig`]
    ///
    /// Model and base URL come from `agent`; key, cache and response shape
    /// from the `[http_service]` section of `config`.
    pub fn from_config(agent: &AgentConfig, config: &Config) -> Result<Self> {
        let AgentConfig::HttpService {
            model_name,
            base_url,
        } = agent
        else {
            return Err(BenchError::config(format!(
                "{} settings cannot build the agent service adapter",
                agent.kind()
            )));
        };

        let service = &config.http_service;
        let shape = service
            .response_shape
            .parse::<ResponseShape>()
            .map_err(BenchError::config)?;
        let cache_dir = if service.clear_cache {
            config.service_cache_dir()
        } else {
            None
        };

        Ok(Self::new(
            base_url.as_deref().unwrap_or(DEFAULT_SERVICE_URL),
            model_name.clone(),
        )?
        .with_api_key(service.api_key.clone())
        .with_cache_dir(cache_dir)
        .with_response_shape(shape))
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the cache directory cleared before every run; `None` disables clearing
    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    /// Set where the answer is read from
    pub fn with_response_shape(mut self, shape: ResponseShape) -> Self {
        self.shape = shape;
        self
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AgentAdapter for HttpServiceAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::HttpAgentService
    }

    async fn invoke(&self, task: &ResearchTask) -> Result<String> {
        if let Some(ref dir) = self.cache_dir {
            clear_cache_dir(dir)?;
        }

        let request = ServiceRequest {
            model: &self.model,
            input: task.as_str(),
            stream: false,
        };

        info!(endpoint = %self.endpoint, model = %self.model, "calling agent service");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BenchError::service(format!(
                        "Cannot connect to agent service at {}. Is it running?",
                        self.endpoint
                    ))
                } else {
                    BenchError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BenchError::service(format!(
                "Agent service error ({}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "agent service responded");

        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            BenchError::ResponseShape(format!("response is not valid JSON: {}", e))
        })?;

        self.shape.extract(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_responses() {
        let adapter = HttpServiceAdapter::new("http://127.0.0.1:8000", "m").unwrap();
        assert_eq!(adapter.endpoint().as_str(), "http://127.0.0.1:8000/responses");

        let adapter = HttpServiceAdapter::new("http://localhost:9000/v1", "m").unwrap();
        assert_eq!(
            adapter.endpoint().as_str(),
            "http://localhost:9000/v1/responses"
        );
    }

    #[test]
    fn test_from_config_reads_agent_config() {
        let mut config = Config::default();
        config.http_service.base_url = Some("http://10.0.0.2:8000".to_string());
        config.http_service.response_shape = "/answer".to_string();

        let adapter = HttpServiceAdapter::from_config(
            &config.agent_config(BackendKind::HttpAgentService),
            &config,
        )
        .unwrap();
        assert_eq!(adapter.endpoint().as_str(), "http://10.0.0.2:8000/responses");
        assert_eq!(adapter.model, config.http_service.model);
        assert_eq!(adapter.shape, ResponseShape::Pointer("/answer".to_string()));

        let adapter = HttpServiceAdapter::from_config(
            &AgentConfig::HttpService {
                model_name: "blast-large".to_string(),
                base_url: None,
            },
            &config,
        )
        .unwrap();
        assert_eq!(adapter.endpoint().as_str(), "http://127.0.0.1:8000/responses");
        assert_eq!(adapter.model, "blast-large");
    }

    #[test]
    fn test_from_config_rejects_browser_settings() {
        let config = Config::default();
        let result = HttpServiceAdapter::from_config(
            &config.agent_config(BackendKind::InProcessBrowserAgent),
            &config,
        );
        assert!(matches!(result, Err(BenchError::Config(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpServiceAdapter::new("not a url", "m"),
            Err(BenchError::Url(_))
        ));
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!("responses".parse::<ResponseShape>(), Ok(ResponseShape::Responses));
        assert_eq!(
            "chat_completion".parse::<ResponseShape>(),
            Ok(ResponseShape::ChatCompletion)
        );
        assert_eq!(
            "/result/answer".parse::<ResponseShape>(),
            Ok(ResponseShape::Pointer("/result/answer".to_string()))
        );
        assert!("choices[0]".parse::<ResponseShape>().is_err());
    }

    #[test]
    fn test_extract_responses_envelope() {
        let payload = json!({
            "id": "resp_1",
            "object": "response",
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "Founded "},
                    {"type": "refusal", "refusal": "n/a"},
                    {"type": "output_text", "text": "in 1999."}
                ]}
            ]
        });
        assert_eq!(
            ResponseShape::Responses.extract(&payload).unwrap(),
            "Founded in 1999."
        );
    }

    #[test]
    fn test_extract_output_text_shortcut() {
        let payload = json!({"output_text": "1999", "output": []});
        assert_eq!(ResponseShape::Responses.extract(&payload).unwrap(), "1999");
    }

    #[test]
    fn test_extract_chat_completion() {
        let payload = json!({"choices": [{"message": {"content": "1999"}}]});
        assert_eq!(
            ResponseShape::ChatCompletion.extract(&payload).unwrap(),
            "1999"
        );
    }

    #[test]
    fn test_chat_path_against_responses_payload_fails() {
        let payload = json!({"id": "resp_1", "output": []});
        let err = ResponseShape::ChatCompletion.extract(&payload).unwrap_err();
        assert!(matches!(err, BenchError::ResponseShape(_)));
        assert!(err.to_string().contains("top-level keys: id, output"));
    }

    #[test]
    fn test_service_error_payload() {
        let payload = json!({"error": {"message": "rate limited"}});
        let err = ResponseShape::Responses.extract(&payload).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_clear_missing_cache_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("blast");
        assert!(clear_cache_dir(&missing).is_ok());
        assert!(clear_cache_dir(&missing).is_ok());
    }

    #[test]
    fn test_clear_removes_nested_contents() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("blast");
        fs::create_dir_all(cache.join("plans")).unwrap();
        fs::write(cache.join("plans").join("p1.json"), "{}").unwrap();

        clear_cache_dir(&cache).unwrap();
        assert!(!cache.exists());
    }
}
