use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::{Agent, AgentBuilder};

use crate::error::{Result, SubcheckError};

pub const API_KEY_PLACEHOLDER: &str = "PASTE_YOUR_API_KEY_HERE";
pub const ENGINE_ID_PLACEHOLDER: &str = "PASTE_YOUR_SEARCH_ENGINE_ID_HERE";

fn default_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_request_interval_ms() -> u64 {
    1_000
}

fn default_timeout_ms() -> u64 {
    15_000
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub engine_id: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Minimum delay before each query.
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            engine_id: ENGINE_ID_PLACEHOLDER.to_string(),
            endpoint: default_endpoint(),
            request_interval_ms: default_request_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            ..Default::default()
        }
    }

    /// Both credentials set to something other than a placeholder.
    pub fn is_configured(&self) -> bool {
        let set = |v: &str, placeholder: &str| !v.trim().is_empty() && v != placeholder;
        set(&self.api_key, API_KEY_PLACEHOLDER) && set(&self.engine_id, ENGINE_ID_PLACEHOLDER)
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub link: String,
    pub title: String,
}

pub trait SearchClient: Send + Sync {
    /// Top result for `query`, if any.
    fn search(&self, query: &str) -> Result<Option<SearchHit>>;
}

/// Exact-phrase form of a chunk.
pub fn exact_phrase(chunk: &str) -> String {
    format!("\"{chunk}\"")
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

/// Client for the Custom Search JSON API.
pub struct CustomSearchClient {
    agent: Agent,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl CustomSearchClient {
    pub fn new(cfg: &SearchConfig) -> Self {
        let agent = AgentBuilder::new().timeout(cfg.timeout()).build();
        Self {
            agent,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            engine_id: cfg.engine_id.clone(),
        }
    }
}

impl SearchClient for CustomSearchClient {
    fn search(&self, query: &str) -> Result<Option<SearchHit>> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("key", &self.api_key)
            .query("cx", &self.engine_id)
            .query("q", query)
            .call();

        match response {
            Ok(resp) => {
                let body: SearchResponse = resp
                    .into_json()
                    .map_err(|e| SubcheckError::Search(format!("response decode: {e}")))?;
                Ok(body.items.into_iter().next())
            }
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                Err(classify_status(code, &text))
            }
            Err(ureq::Error::Transport(t)) => Err(transport_error(&t)),
        }
    }
}

/// The transport's Display includes the request URL, and with it the API key.
fn transport_error(t: &ureq::Transport) -> SubcheckError {
    let detail = t.message().unwrap_or("no further detail");
    SubcheckError::Search(format!("{}: {detail}", t.kind()))
}

fn classify_status(code: u16, body: &str) -> SubcheckError {
    let lower = body.to_lowercase();
    if code == 429 || lower.contains("quota") || lower.contains("ratelimitexceeded") {
        SubcheckError::SearchQuotaExceeded
    } else {
        SubcheckError::Search(format!("HTTP {code}: {}", body.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_not_configured() {
        assert!(!SearchConfig::default().is_configured());
        assert!(!SearchConfig::new("real-key", ENGINE_ID_PLACEHOLDER).is_configured());
        assert!(!SearchConfig::new(API_KEY_PLACEHOLDER, "cx").is_configured());
        assert!(!SearchConfig::new("  ", "cx").is_configured());
        assert!(SearchConfig::new("real-key", "cx-123").is_configured());
    }

    #[test]
    fn exact_phrase_quotes() {
        assert_eq!(exact_phrase("copied text"), "\"copied text\"");
    }

    #[test]
    fn response_keeps_first_item() {
        let raw = r#"{"kind":"customsearch#search","items":[
            {"link":"https://a.example/1","title":"First","snippet":"..."},
            {"link":"https://b.example/2","title":"Second"}]}"#;
        let r: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            r.items.into_iter().next(),
            Some(SearchHit {
                link: "https://a.example/1".into(),
                title: "First".into()
            })
        );
        let empty: SearchResponse = serde_json::from_str(r#"{"kind":"x"}"#).unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn transport_errors_do_not_leak_the_key() {
        let cfg = SearchConfig {
            endpoint: "http://127.0.0.1:1/customsearch/v1".into(),
            timeout_ms: 2_000,
            ..SearchConfig::new("SECRET-API-KEY-123", "cx-1")
        };
        let err = CustomSearchClient::new(&cfg)
            .search(&exact_phrase("hello world"))
            .unwrap_err();
        let text = err.to_string();
        assert!(matches!(err, SubcheckError::Search(_)), "{text}");
        assert!(!text.contains("SECRET-API-KEY-123"), "{text}");
        assert!(!text.contains("key="), "{text}");
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(429, ""),
            SubcheckError::SearchQuotaExceeded
        ));
        assert!(matches!(
            classify_status(403, r#"{"error":{"message":"Quota exceeded for quota metric"}}"#),
            SubcheckError::SearchQuotaExceeded
        ));
        assert!(matches!(classify_status(400, "bad cx"), SubcheckError::Search(_)));
    }
}
