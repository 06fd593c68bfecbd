use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ConfigError, FetchError};

/// Source label used when the provider omits one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Largest page the news search endpoint will return in one request.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Longest look-back a window can span.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// News article as returned by a fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub source_name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            source_name: UNKNOWN_SOURCE.to_string(),
            url: None,
            published_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Text fed to the polarity scorer: title followed by the description.
    /// A missing description contributes nothing.
    pub fn scoring_text(&self) -> String {
        match self.description.as_deref() {
            Some(desc) if !desc.trim().is_empty() => format!("{} {}", self.title, desc),
            _ => self.title.clone(),
        }
    }
}

/// Discrete sentiment bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Positive,
    Negative,
    Neutral,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Positive => "Positive",
            Classification::Negative => "Negative",
            Classification::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A news item together with its polarity and bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: NewsItem,
    pub polarity: f64, // -1.0 to 1.0
    pub classification: Classification,
}

/// Distribution of classifications over a batch of scored items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total_count: usize,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
    pub average_polarity: f64,
}

impl SentimentSummary {
    /// Build a summary from bucket counts. `polarity_sum` is the sum of the
    /// individual polarities and is only used for the mean.
    pub fn from_counts(positive: usize, negative: usize, neutral: usize, polarity_sum: f64) -> Self {
        let total = positive + negative + neutral;
        if total == 0 {
            return Self::default();
        }

        let pct = |count: usize| count as f64 / total as f64 * 100.0;

        Self {
            positive_count: positive,
            negative_count: negative,
            neutral_count: neutral,
            total_count: total,
            positive_pct: pct(positive),
            negative_pct: pct(negative),
            neutral_pct: pct(neutral),
            average_polarity: polarity_sum / total as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Bucket with the most items. Ties and empty batches resolve to Neutral.
    pub fn dominant(&self) -> Classification {
        if self.positive_count > self.negative_count && self.positive_count > self.neutral_count {
            Classification::Positive
        } else if self.negative_count > self.positive_count && self.negative_count > self.neutral_count {
            Classification::Negative
        } else {
            Classification::Neutral
        }
    }

    pub fn count_of(&self, classification: Classification) -> usize {
        match classification {
            Classification::Positive => self.positive_count,
            Classification::Negative => self.negative_count,
            Classification::Neutral => self.neutral_count,
        }
    }

    pub fn pct_of(&self, classification: Classification) -> f64 {
        match classification {
            Classification::Positive => self.positive_pct,
            Classification::Negative => self.negative_pct,
            Classification::Neutral => self.neutral_pct,
        }
    }
}

/// Inclusive range of publish dates to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl TimeWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ConfigError> {
        if from > to {
            return Err(ConfigError::InvalidWindow {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// `days` days ago through `today`. `days` is capped at `MAX_WINDOW_DAYS`.
    pub fn ending_on(today: NaiveDate, days: u32) -> Self {
        let days = days.min(MAX_WINDOW_DAYS);
        Self {
            from: today
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            to: today,
        }
    }

    /// `days` days ago through today (UTC).
    pub fn last_days(days: u32) -> Self {
        Self::ending_on(Utc::now().date_naive(), days)
    }
}

impl Default for TimeWindow {
    /// Yesterday through today
    fn default() -> Self {
        Self::last_days(1)
    }
}

/// Result ordering requested from the news search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PublishedAt => "publishedAt",
            SortOrder::Relevancy => "relevancy",
            SortOrder::Popularity => "popularity",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "publishedat" | "published_at" | "published" => Some(SortOrder::PublishedAt),
            "relevancy" | "relevance" => Some(SortOrder::Relevancy),
            "popularity" | "popular" => Some(SortOrder::Popularity),
            _ => None,
        }
    }
}

/// Everything one fetch needs apart from the credential.
/// Also serves as the cache key for repeated fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    pub query: String,
    pub window: TimeWindow,
    pub page_size: u32,
    pub language: String,
    pub sort_by: SortOrder,
}

impl FetchRequest {
    pub fn new(query: impl Into<String>, window: TimeWindow) -> Result<Self, ConfigError> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(ConfigError::EmptyQuery);
        }

        Ok(Self {
            query,
            window,
            page_size: DEFAULT_PAGE_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
            sort_by: SortOrder::default(),
        })
    }

    /// Page size is clamped to 1..=MAX_PAGE_SIZE.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// `page_size` within 1..=MAX_PAGE_SIZE, even when the field was set
    /// directly or deserialized.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortOrder) -> Self {
        self.sort_by = sort_by;
        self
    }
}

/// Fetch result with failures already absorbed: `items` is empty whenever
/// `failure` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub items: Vec<NewsItem>,
    pub failure: Option<FetchError>,
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl From<Result<Vec<NewsItem>, FetchError>> for FetchOutcome {
    fn from(result: Result<Vec<NewsItem>, FetchError>) -> Self {
        match result {
            Ok(items) => Self { items, failure: None },
            Err(e) => Self {
                items: Vec::new(),
                failure: Some(e),
            },
        }
    }
}
