use chrono::{DateTime, Utc};
use newsapi_client::NewsApiClient;
use sentiment_analysis::{summarize, top_terms, SentimentAggregator, TermCount};
use sentiment_core::{
    ConfigError, FetchError, FetchOutcome, FetchRequest, NewsSource, ScoredItem,
    SentimentSummary, TimeWindow,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod cache;
pub mod config;

pub use cache::FreshnessCache;
pub use config::PipelineConfig;


#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Severity of a message meant for the person looking at the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvisoryLevel {
    Info,
    Warning,
    Error,
}

/// User-facing note about a run. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub level: AdvisoryLevel,
    pub message: String,
    #[serde(default)]
    pub detail: Option<String>,
}

impl Advisory {
    pub fn credential_missing() -> Self {
        Self {
            level: AdvisoryLevel::Info,
            message: "Please provide a NewsAPI key to fetch sentiment data.".to_string(),
            detail: Some("Set NEWSAPI_KEY or pass --api-key".to_string()),
        }
    }

    pub fn no_articles(query: &str) -> Self {
        Self {
            level: AdvisoryLevel::Warning,
            message: "No articles found for the given keyword.".to_string(),
            detail: Some(format!("query: {}", query)),
        }
    }

    pub fn fetch_failed(error: &FetchError) -> Self {
        Self {
            level: AdvisoryLevel::Error,
            message: "Failed to fetch data. Check your API key or try later.".to_string(),
            detail: Some(error.to_string()),
        }
    }

    /// Advisory for a fetch outcome, if it warrants one.
    pub fn for_outcome(outcome: &FetchOutcome, query: &str) -> Option<Self> {
        match &outcome.failure {
            Some(FetchError::CredentialMissing) => Some(Self::credential_missing()),
            Some(e) => Some(Self::fetch_failed(e)),
            None if outcome.items.is_empty() => Some(Self::no_articles(query)),
            None => None,
        }
    }
}

/// Output of one pipeline run, ready for a presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    pub query: String,
    pub window: TimeWindow,
    pub generated_at: DateTime<Utc>,
    pub from_cache: bool,
    pub items: Vec<ScoredItem>,
    pub summary: SentimentSummary,
    pub top_terms: Vec<TermCount>,
    #[serde(default)]
    pub advisory: Option<Advisory>,
}

impl SentimentReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items ordered from most positive to most negative
    pub fn ranked_items(&self) -> Vec<&ScoredItem> {
        let mut ranked: Vec<&ScoredItem> = self.items.iter().collect();
        ranked.sort_by(|a, b| {
            b.polarity
                .partial_cmp(&a.polarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// fetch -> score -> classify -> summarize
pub struct SentimentPipeline {
    source: Arc<dyn NewsSource>,
    aggregator: SentimentAggregator,
    cache: FreshnessCache,
    top_terms: usize,
}

impl SentimentPipeline {
    /// Pipeline without a cache
    pub fn new(source: Arc<dyn NewsSource>, aggregator: SentimentAggregator) -> Self {
        Self {
            source,
            aggregator,
            cache: FreshnessCache::disabled(),
            top_terms: config::DEFAULT_TOP_TERMS,
        }
    }

    /// NewsAPI-backed pipeline. Fails with `FetchError::CredentialMissing`
    /// before any request is made when no key is configured.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let thresholds = config.thresholds()?;
        let client = NewsApiClient::from_config(&config.news_api_config())?;

        Ok(Self::new(
            Arc::new(client),
            SentimentAggregator::new().with_thresholds(thresholds),
        )
        .with_cache_ttl(config.cache_ttl)
        .with_top_terms(config.top_terms))
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = FreshnessCache::new(ttl);
        self
    }

    pub fn with_top_terms(mut self, limit: usize) -> Self {
        self.top_terms = limit;
        self
    }

    pub fn aggregator(&self) -> &SentimentAggregator {
        &self.aggregator
    }

    pub fn cache(&self) -> &FreshnessCache {
        &self.cache
    }

    /// Fetch through the cache. Failures come back as an empty item list
    /// with the error attached. The boolean is true on a cache hit.
    pub async fn fetch(&self, request: &FetchRequest) -> (FetchOutcome, bool) {
        let source = Arc::clone(&self.source);
        self.cache
            .get_or_fetch(request, || async move { source.fetch_or_empty(request).await })
            .await
    }

    pub async fn run(&self, request: &FetchRequest) -> SentimentReport {
        let (outcome, from_cache) = self.fetch(request).await;
        let advisory = Advisory::for_outcome(&outcome, &request.query);

        if let Some(adv) = &advisory {
            tracing::info!("{} ({})", adv.message, adv.detail.as_deref().unwrap_or(""));
        }

        let terms = top_terms(&outcome.items, self.top_terms);
        let items = self.aggregator.score_all(outcome.items);
        let summary = summarize(&items);

        tracing::info!(
            "Sentiment for '{}': {} articles ({} positive, {} negative, {} neutral){}",
            request.query,
            summary.total_count,
            summary.positive_count,
            summary.negative_count,
            summary.neutral_count,
            if from_cache { " [cached]" } else { "" }
        );

        SentimentReport {
            query: request.query.clone(),
            window: request.window,
            generated_at: Utc::now(),
            from_cache,
            items,
            summary,
            top_terms: terms,
            advisory,
        }
    }
}
