//! SerpAPI web search with a file cache
//!
//! Responses are cached per query under `<memory_root>/../cache/serpapi`,
//! one JSON file per query named by the base64url of the query text. An
//! entry older than the `cache_duration` it was written with is deleted on
//! the next lookup.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use sdk::errors::EngineError;
use sdk::types::{SearchResultItem, SearchResults, WebSearchArgs};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::{parse_duration, SerpApiConfig};

const CAPABILITY: &str = "serpapi";

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    query: String,
    /// Unix milliseconds
    timestamp: i64,
    cache_duration: String,
    results: SearchResults,
}

pub struct SerpApiClient {
    config: SerpApiConfig,
    cache_dir: PathBuf,
    client: reqwest::Client,
}

impl SerpApiClient {
    pub fn new(config: SerpApiConfig, cache_dir: PathBuf) -> Self {
        let client = crate::llm::http_client(Duration::from_secs(config.timeout_secs));
        Self {
            config,
            cache_dir,
            client,
        }
    }

    fn cache_path(&self, query: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.json", URL_SAFE_NO_PAD.encode(query.as_bytes())))
    }

    pub async fn search(&self, args: &WebSearchArgs) -> Result<SearchResults, EngineError> {
        if args.query.trim().is_empty() {
            return Err(EngineError::MissingParameter("query".to_string()));
        }

        if let Some(mut cached) = self.cached(&args.query).await {
            info!("Returning cached results for '{}'", args.query);
            cached.cached = true;
            return Ok(cached);
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| EngineError::Config("SERP_API_KEY not configured".to_string()))?;

        info!("Searching the web for '{}' ({:?})", args.query, args.search_type);
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let num = args.max_results.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", args.query.as_str()),
                ("api_key", api_key),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::capability(
                CAPABILITY,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| EngineError::capability(CAPABILITY, format!("unreadable response: {}", e)))?;
        let results = format_results(&data, args);

        if let Err(e) = self.store(&args.query, &results).await {
            warn!("Failed to cache search results for '{}': {}", args.query, e);
        }
        Ok(results)
    }

    async fn cached(&self, query: &str) -> Option<SearchResults> {
        let path = self.cache_path(query);
        let raw = fs::read_to_string(&path).await.ok()?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        let ttl = parse_duration(&entry.cache_duration).unwrap_or(Duration::ZERO);
        let age_ms = Utc::now().timestamp_millis().saturating_sub(entry.timestamp);
        if u128::try_from(age_ms).unwrap_or(0) < ttl.as_millis() {
            return Some(entry.results);
        }

        debug!("Cache expired for '{}'", query);
        if let Err(e) = fs::remove_file(&path).await {
            debug!("Could not remove expired cache entry: {}", e);
        }
        None
    }

    async fn store(&self, query: &str, results: &SearchResults) -> Result<(), EngineError> {
        fs::create_dir_all(&self.cache_dir).await?;
        let entry = CacheEntry {
            query: query.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            cache_duration: self.config.cache_duration.clone(),
            results: results.clone(),
        };
        fs::write(self.cache_path(query), serde_json::to_string_pretty(&entry)?).await?;
        Ok(())
    }
}

fn format_results(data: &Value, args: &WebSearchArgs) -> SearchResults {
    let text = |item: &Value, key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let results = data
        .get("organic_results")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(args.max_results as usize)
                .map(|item| SearchResultItem {
                    title: text(item, "title"),
                    link: text(item, "link"),
                    snippet: text(item, "snippet"),
                    source: item.get("source").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    SearchResults {
        search_type: args.search_type,
        results,
        cached: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::types::SearchType;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String, api_key: Option<&str>, cache_dir: PathBuf) -> SerpApiClient {
        SerpApiClient::new(
            SerpApiConfig {
                api_key: api_key.map(str::to_string),
                base_url,
                ..SerpApiConfig::default()
            },
            cache_dir,
        )
    }

    fn args(query: &str) -> WebSearchArgs {
        WebSearchArgs {
            query: query.to_string(),
            search_type: SearchType::ErrorSolution,
            max_results: 2,
        }
    }

    #[tokio::test]
    async fn test_search_then_cache_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "TS2322 fix"))
            .and(query_param("api_key", "serp-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [
                    { "title": "A", "link": "https://a", "snippet": "sa", "source": "Stack Overflow" },
                    { "title": "B", "link": "https://b", "snippet": "sb" },
                    { "title": "C", "link": "https://c", "snippet": "sc" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let client = client(server.uri(), Some("serp-key"), temp.path().to_path_buf());

        let first = client.search(&args("TS2322 fix")).await.unwrap();
        assert_eq!(first.results.len(), 2);
        assert_eq!(first.search_type, SearchType::ErrorSolution);
        assert_eq!(first.results[0].source.as_deref(), Some("Stack Overflow"));
        assert!(!first.cached);

        let second = client.search(&args("TS2322 fix")).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.results, first.results);
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let temp = TempDir::new().unwrap();
        let client = client("http://127.0.0.1:1".to_string(), None, temp.path().to_path_buf());

        let err = client.search(&args("anything")).await.unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let temp = TempDir::new().unwrap();
        let client = client("http://127.0.0.1:1".to_string(), None, temp.path().to_path_buf());

        let entry = CacheEntry {
            query: "old".to_string(),
            timestamp: Utc::now().timestamp_millis() - 120_000,
            cache_duration: "1m".to_string(),
            results: SearchResults {
                search_type: SearchType::General,
                results: vec![],
                cached: false,
            },
        };
        let cache_file = client.cache_path("old");
        std::fs::write(&cache_file, serde_json::to_string(&entry).unwrap()).unwrap();

        assert!(client.cached("old").await.is_none());
        assert!(!cache_file.exists());
    }

    #[tokio::test]
    async fn test_http_failure_is_capability_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let client = client(server.uri(), Some("k"), temp.path().to_path_buf());
        let err = client.search(&args("q")).await.unwrap_err();
        assert!(err.to_string().starts_with("serpapi failed: HTTP 500"));
    }

    #[test]
    fn test_cache_file_name_is_url_safe() {
        let client = client(String::new(), None, PathBuf::from("/cache"));
        let path = client.cache_path("what/is?this+that");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.contains('/') && !name.contains('+') && !name.contains('='));
    }
}
