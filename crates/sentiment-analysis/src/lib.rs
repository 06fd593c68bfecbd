use sentiment_core::{
    Classification, ConfigError, NewsItem, PolarityScorer, ScoredItem, SentimentSummary,
};
use serde::{Deserialize, Serialize};

pub mod lexicon;
pub mod terms;

pub use lexicon::LexiconScorer;
pub use terms::{term_frequencies, top_terms, TermCount};

/// Default symmetric classification threshold.
pub const DEFAULT_POLARITY_THRESHOLD: f64 = 0.1;

/// Polarity cut-offs. Both bounds are exclusive: a polarity equal to
/// `positive` is Neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub positive: f64,
    pub negative: f64,
}

impl ClassificationThresholds {
    pub fn new(positive: f64, negative: f64) -> Result<Self, ConfigError> {
        if !positive.is_finite() || !negative.is_finite() || negative > positive {
            return Err(ConfigError::InvalidThresholds { negative, positive });
        }
        Ok(Self { positive, negative })
    }

    /// `+threshold` / `-threshold`
    pub fn symmetric(threshold: f64) -> Result<Self, ConfigError> {
        Self::new(threshold.abs(), -threshold.abs())
    }

    pub fn classify(&self, polarity: f64) -> Classification {
        if polarity > self.positive {
            Classification::Positive
        } else if polarity < self.negative {
            Classification::Negative
        } else {
            Classification::Neutral
        }
    }
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            positive: DEFAULT_POLARITY_THRESHOLD,
            negative: -DEFAULT_POLARITY_THRESHOLD,
        }
    }
}

/// Scores, classifies and tallies news items.
///
/// Every step is a pure function of its input, so items can be processed in
/// any order and the summary does not depend on it.
pub struct SentimentAggregator {
    scorer: Box<dyn PolarityScorer>,
    thresholds: ClassificationThresholds,
}

impl SentimentAggregator {
    /// Default lexicon scorer with ±0.1 thresholds
    pub fn new() -> Self {
        Self::with_scorer(LexiconScorer::new(), ClassificationThresholds::default())
    }

    pub fn with_scorer(scorer: impl PolarityScorer + 'static, thresholds: ClassificationThresholds) -> Self {
        Self {
            scorer: Box::new(scorer),
            thresholds,
        }
    }

    pub fn with_thresholds(mut self, thresholds: ClassificationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> ClassificationThresholds {
        self.thresholds
    }

    /// Polarity of the item's title and description, in [-1, 1].
    /// A scorer returning a non-finite value is treated as neutral.
    pub fn score(&self, item: &NewsItem) -> f64 {
        let polarity = self.scorer.polarity(&item.scoring_text());
        if polarity.is_finite() {
            polarity.clamp(-1.0, 1.0)
        } else {
            tracing::debug!("Scorer returned {} for '{}', using 0.0", polarity, item.title);
            0.0
        }
    }

    pub fn classify(&self, polarity: f64) -> Classification {
        self.thresholds.classify(polarity)
    }

    pub fn score_item(&self, item: NewsItem) -> ScoredItem {
        let polarity = self.score(&item);
        ScoredItem {
            classification: self.classify(polarity),
            polarity,
            item,
        }
    }

    pub fn score_all(&self, items: impl IntoIterator<Item = NewsItem>) -> Vec<ScoredItem> {
        items.into_iter().map(|item| self.score_item(item)).collect()
    }

    pub fn summarize(&self, items: &[ScoredItem]) -> SentimentSummary {
        summarize(items)
    }
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Tally classifications into counts and percentages. An empty batch gives
/// the all-zero summary.
pub fn summarize(items: &[ScoredItem]) -> SentimentSummary {
    let mut positive = 0;
    let mut negative = 0;
    let mut neutral = 0;
    let mut polarity_sum = 0.0;

    for scored in items {
        match scored.classification {
            Classification::Positive => positive += 1,
            Classification::Negative => negative += 1,
            Classification::Neutral => neutral += 1,
        }
        polarity_sum += scored.polarity;
    }

    SentimentSummary::from_counts(positive, negative, neutral, polarity_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(classification: Classification, polarity: f64) -> ScoredItem {
        ScoredItem {
            item: NewsItem::new("headline"),
            polarity,
            classification,
        }
    }

    #[test]
    fn test_classify_boundaries() {
        let agg = SentimentAggregator::new();
        assert_eq!(agg.classify(0.15), Classification::Positive);
        assert_eq!(agg.classify(-0.2), Classification::Negative);
        assert_eq!(agg.classify(0.0), Classification::Neutral);
        assert_eq!(agg.classify(0.1), Classification::Neutral);
        assert_eq!(agg.classify(-0.1), Classification::Neutral);
    }

    #[test]
    fn test_configured_threshold() {
        let agg = SentimentAggregator::new()
            .with_thresholds(ClassificationThresholds::symmetric(0.05).unwrap());
        assert_eq!(agg.classify(0.07), Classification::Positive);
        assert_eq!(agg.classify(-0.07), Classification::Negative);
        assert_eq!(agg.classify(0.05), Classification::Neutral);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert!(ClassificationThresholds::new(-0.2, 0.2).is_err());
        assert!(ClassificationThresholds::new(f64::NAN, -0.1).is_err());
        assert_eq!(
            ClassificationThresholds::symmetric(-0.3).unwrap(),
            ClassificationThresholds { positive: 0.3, negative: -0.3 }
        );
    }

    #[test]
    fn test_summarize_percentages_for_all_small_triples() {
        for p in 0..6 {
            for n in 0..6 {
                for u in 0..6 {
                    let mut items = Vec::new();
                    items.extend((0..p).map(|_| scored(Classification::Positive, 0.5)));
                    items.extend((0..n).map(|_| scored(Classification::Negative, -0.5)));
                    items.extend((0..u).map(|_| scored(Classification::Neutral, 0.0)));

                    let summary = summarize(&items);
                    let total = p + n + u;
                    assert_eq!(summary.total_count, total);
                    assert_eq!(summary.positive_count, p);
                    assert_eq!(summary.negative_count, n);
                    assert_eq!(summary.neutral_count, u);

                    if total == 0 {
                        assert_eq!(summary, SentimentSummary::default());
                        continue;
                    }

                    let expect = |c: usize| c as f64 / total as f64 * 100.0;
                    assert!((summary.positive_pct - expect(p)).abs() < 1e-9);
                    assert!((summary.negative_pct - expect(n)).abs() < 1e-9);
                    assert!((summary.neutral_pct - expect(u)).abs() < 1e-9);
                    let sum = summary.positive_pct + summary.negative_pct + summary.neutral_pct;
                    assert!((sum - 100.0).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_summarize_is_order_independent() {
        let mut items = vec![
            scored(Classification::Positive, 0.4),
            scored(Classification::Neutral, 0.0),
            scored(Classification::Negative, -0.3),
            scored(Classification::Positive, 0.2),
        ];
        let forward = summarize(&items);
        items.reverse();
        let backward = summarize(&items);
        assert_eq!(forward.positive_count, backward.positive_count);
        assert_eq!(forward.negative_count, backward.negative_count);
        assert_eq!(forward.neutral_count, backward.neutral_count);
        assert!((forward.average_polarity - backward.average_polarity).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = SentimentAggregator::new().summarize(&[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.positive_pct, 0.0);
        assert_eq!(summary.negative_pct, 0.0);
        assert_eq!(summary.neutral_pct, 0.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let agg = SentimentAggregator::new();
        let item = NewsItem::new("Sensex slumps as banks drag")
            .with_description("Investors worry about weak earnings");
        assert_eq!(agg.score(&item), agg.score(&item));
    }

    #[test]
    fn test_missing_description_scores() {
        let agg = SentimentAggregator::new();
        let item = NewsItem::new("RBI holds rates");
        let scored = agg.score_item(item);
        assert_eq!(scored.polarity, 0.0);
        assert_eq!(scored.classification, Classification::Neutral);
    }

    #[test]
    fn test_headline_scenario_buckets() {
        let agg = SentimentAggregator::new();
        let items = vec![
            NewsItem::new("Market rallies as inflation cools"),
            NewsItem::new("Banking sector hits new low amid crisis"),
            NewsItem::new("Midcap stocks trade flat"),
            NewsItem::new("no title here but irrelevant desc"),
        ];

        let scored = agg.score_all(items);
        let labels: Vec<Classification> = scored.iter().map(|s| s.classification).collect();
        assert_eq!(
            labels,
            vec![
                Classification::Positive,
                Classification::Negative,
                Classification::Neutral,
                Classification::Neutral
            ]
        );

        let summary = agg.summarize(&scored);
        assert_eq!(
            (summary.positive_count, summary.negative_count, summary.neutral_count),
            (1, 1, 2)
        );
    }

    #[test]
    fn test_pluggable_scorer() {
        let agg = SentimentAggregator::with_scorer(
            |text: &str| if text.contains("up") { 0.9 } else { -0.9 },
            ClassificationThresholds::default(),
        );
        assert_eq!(agg.score_item(NewsItem::new("index up")).classification, Classification::Positive);
        assert_eq!(agg.score_item(NewsItem::new("index off")).classification, Classification::Negative);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let agg = SentimentAggregator::with_scorer(|_: &str| 7.5, ClassificationThresholds::default());
        assert_eq!(agg.score(&NewsItem::new("x")), 1.0);

        let agg = SentimentAggregator::with_scorer(|_: &str| f64::NAN, ClassificationThresholds::default());
        assert_eq!(agg.score(&NewsItem::new("x")), 0.0);
    }
}
