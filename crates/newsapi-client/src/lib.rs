use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use sentiment_core::{FetchError, FetchRequest, NewsItem, NewsSource, UNKNOWN_SOURCE};
use serde::Deserialize;
use std::time::Duration;


pub const BASE_URL: &str = "https://newsapi.org";
const EVERYTHING_PATH: &str = "/v2/everything";

/// Applied when the caller does not configure one; the endpoint has no
/// timeout of its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response bodies quoted in errors are cut to this many characters.
const MAX_ERROR_BODY: usize = 200;

/// Connection settings for [`NewsApiClient`]
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the NewsAPI `everything` search endpoint
#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_settings(api_key, BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    /// Build a client from configuration. Fails with
    /// [`FetchError::CredentialMissing`] when no usable key is present, in
    /// which case no request must be attempted.
    pub fn from_config(config: &NewsApiConfig) -> Result<Self, FetchError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::CredentialMissing)?;

        Ok(Self::with_settings(
            api_key.to_string(),
            config.base_url.clone(),
            config.timeout,
        ))
    }

    fn with_settings(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search articles matching `request`. Issues exactly one request and
    /// never retries.
    pub async fn everything(&self, request: &FetchRequest) -> Result<Vec<NewsItem>, FetchError> {
        let url = format!("{}{}", self.base_url, EVERYTHING_PATH);
        let limit = request.effective_page_size();

        tracing::debug!(
            "NewsAPI search q='{}' from={} to={} pageSize={}",
            request.query,
            request.window.from,
            request.window.to,
            limit
        );

        let from = request.window.from.format("%Y-%m-%d").to_string();
        let to = request.window.to.format("%Y-%m-%d").to_string();
        let page_size = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", request.query.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("language", request.language.as_str()),
                ("sortBy", request.sort_by.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport_error(&e))?;

        let mut items = parse_response(status, &body)?;
        items.truncate(limit as usize);

        tracing::info!("NewsAPI returned {} articles for '{}'", items.len(), request.query);
        Ok(items)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<NewsItem>, FetchError> {
        self.everything(request).await
    }
}

fn transport_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Transport(format!("request timed out: {}", e))
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Decode an `everything` response. Any non-2xx status or a status field
/// other than `"ok"` is a failure; an empty article list is not.
pub fn parse_response(status: u16, body: &str) -> Result<Vec<NewsItem>, FetchError> {
    let envelope = serde_json::from_str::<EverythingResponse>(body);

    if !(200..300).contains(&status) {
        // NewsAPI explains most rejections in a JSON error envelope.
        return Err(match envelope {
            Ok(env) if env.status != "ok" => api_status_error(env),
            _ => FetchError::HttpStatus {
                status,
                body: truncate(body, MAX_ERROR_BODY),
            },
        });
    }

    let envelope = envelope.map_err(|e| FetchError::Decode(e.to_string()))?;
    if envelope.status != "ok" {
        return Err(api_status_error(envelope));
    }

    if let Some(total) = envelope.total_results {
        tracing::debug!("NewsAPI reports {} total results", total);
    }

    Ok(envelope
        .articles
        .unwrap_or_default()
        .into_iter()
        .filter_map(ArticleResult::into_news_item)
        .collect())
}

fn api_status_error(envelope: EverythingResponse) -> FetchError {
    FetchError::ApiStatus {
        status: envelope.status,
        code: envelope.code.unwrap_or_else(|| "unknown".to_string()),
        message: envelope.message.unwrap_or_else(|| "Unknown error".to_string()),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

// Response structures
#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "totalResults")]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Option<Vec<ArticleResult>>,
}

#[derive(Debug, Deserialize)]
struct ArticleResult {
    #[serde(default)]
    source: Option<ArticleSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    #[serde(default)]
    name: Option<String>,
}

impl ArticleResult {
    /// Articles without a usable title are dropped here so they never reach
    /// the scorer.
    fn into_news_item(self) -> Option<NewsItem> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;

        let source_name = self
            .source
            .and_then(|s| s.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        let published_at = self.published_at.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Some(NewsItem {
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            source_name,
            url: self.url.filter(|u| !u.trim().is_empty()),
            published_at,
        })
    }
}
