use async_trait::async_trait;
use crate::{FetchError, FetchOutcome, FetchRequest, NewsItem};

/// Trait for text polarity scorers.
///
/// Implementations must be deterministic and return a value in roughly
/// [-1.0, 1.0]; callers clamp the result.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Trait for news search backends
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<NewsItem>, FetchError>;

    /// Fetch with every failure converted into an empty item list.
    async fn fetch_or_empty(&self, request: &FetchRequest) -> FetchOutcome {
        let result = self.fetch(request).await;
        if let Err(e) = &result {
            tracing::warn!("{} fetch for '{}' failed: {}", self.name(), request.query, e);
        }
        FetchOutcome::from(result)
    }
}

impl<F> PolarityScorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}
