use newsapi_client::{NewsApiConfig, BASE_URL, DEFAULT_TIMEOUT};
use sentiment_analysis::{ClassificationThresholds, DEFAULT_POLARITY_THRESHOLD};
use sentiment_core::{
    ConfigError, FetchRequest, SortOrder, TimeWindow, DEFAULT_LANGUAGE, DEFAULT_PAGE_SIZE,
    MAX_WINDOW_DAYS,
};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_QUERY: &str = "Nifty";
pub const DEFAULT_WINDOW_DAYS: u32 = 1;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_TOP_TERMS: usize = 15;

/// Everything a pipeline run needs, passed explicitly to each stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: Option<String>,
    pub query: String,
    pub window_days: u32,
    pub page_size: u32,
    pub language: String,
    pub sort_by: SortOrder,
    /// Symmetric polarity threshold for Positive/Negative
    pub threshold: f64,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    pub base_url: String,
    pub top_terms: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            query: DEFAULT_QUERY.to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
            sort_by: SortOrder::default(),
            threshold: DEFAULT_POLARITY_THRESHOLD,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            http_timeout: DEFAULT_TIMEOUT,
            base_url: BASE_URL.to_string(),
            top_terms: DEFAULT_TOP_TERMS,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PipelineConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let sort_by = match lookup("NEWS_SORT_BY") {
            Some(raw) => SortOrder::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "NEWS_SORT_BY".to_string(),
                value: raw.clone(),
                reason: "expected publishedAt, relevancy or popularity".to_string(),
            })?,
            None => defaults.sort_by,
        };

        let config = Self {
            api_key: lookup("NEWSAPI_KEY").filter(|k| !k.trim().is_empty()),
            query: lookup("NEWS_QUERY").unwrap_or(defaults.query),
            window_days: parse_var(&lookup, "NEWS_WINDOW_DAYS", defaults.window_days)?,
            page_size: parse_var(&lookup, "NEWS_PAGE_SIZE", defaults.page_size)?,
            language: lookup("NEWS_LANGUAGE").unwrap_or(defaults.language),
            sort_by,
            threshold: parse_var(&lookup, "SENTIMENT_THRESHOLD", defaults.threshold)?,
            cache_ttl: Duration::from_secs(parse_var(
                &lookup,
                "NEWS_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?),
            http_timeout: Duration::from_secs(parse_var(
                &lookup,
                "NEWS_HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )?),
            base_url: lookup("NEWSAPI_BASE_URL").unwrap_or(defaults.base_url),
            top_terms: parse_var(&lookup, "NEWS_TOP_TERMS", defaults.top_terms)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days > MAX_WINDOW_DAYS {
            return Err(ConfigError::InvalidValue {
                key: "NEWS_WINDOW_DAYS".to_string(),
                value: self.window_days.to_string(),
                reason: format!("window must not exceed {} days", MAX_WINDOW_DAYS),
            });
        }
        self.thresholds()?;
        self.fetch_request()?;
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "NEWS_HTTP_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn thresholds(&self) -> Result<ClassificationThresholds, ConfigError> {
        ClassificationThresholds::symmetric(self.threshold)
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::last_days(self.window_days)
    }

    pub fn fetch_request(&self) -> Result<FetchRequest, ConfigError> {
        Ok(FetchRequest::new(self.query.clone(), self.window())?
            .with_page_size(self.page_size)
            .with_language(self.language.clone())
            .with_sort_by(self.sort_by))
    }

    pub fn news_api_config(&self) -> NewsApiConfig {
        NewsApiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: self.http_timeout,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
