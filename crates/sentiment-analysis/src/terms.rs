//! Term frequencies over headlines and descriptions (the data behind a word
//! cloud view).

use crate::lexicon::tokenize;
use sentiment_core::NewsItem;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const MIN_TERM_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "amid", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "few", "for", "from", "further", "had", "has", "have", "having", "he",
    "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "may", "me", "more", "most", "my", "new", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own",
    "said", "same", "says", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "upon", "very", "via", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "year",
    "you", "your", "yours",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// Count every non-stopword term of at least `MIN_TERM_LEN` characters across
/// the titles and descriptions of `items`. Pure numbers are skipped.
pub fn term_frequencies(items: &[NewsItem]) -> HashMap<String, usize> {
    let stopwords: HashSet<&str> = STOPWORDS.iter().copied().collect();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for item in items {
        for token in tokenize(&item.scoring_text()) {
            if token.chars().count() < MIN_TERM_LEN
                || stopwords.contains(token.as_str())
                || token.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '\'')
            {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    counts
}

/// The `limit` most frequent terms, ties broken alphabetically.
pub fn top_terms(items: &[NewsItem], limit: usize) -> Vec<TermCount> {
    let mut terms: Vec<TermCount> = term_frequencies(items)
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();

    terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    terms.truncate(limit);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<NewsItem> {
        vec![
            NewsItem::new("Nifty rallies as banks gain").with_description("Nifty closes at record"),
            NewsItem::new("Banks drag Nifty lower in 2024"),
            NewsItem::new("RBI holds rates"),
        ]
    }

    #[test]
    fn test_frequencies_skip_stopwords_and_short_tokens() {
        let freq = term_frequencies(&items());
        assert_eq!(freq.get("nifty"), Some(&3));
        assert_eq!(freq.get("banks"), Some(&2));
        assert!(!freq.contains_key("as"));
        assert!(!freq.contains_key("in"));
        assert!(!freq.contains_key("at"));
        assert!(!freq.contains_key("2024"));
    }

    #[test]
    fn test_top_terms_order_and_limit() {
        let top = top_terms(&items(), 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0], TermCount { term: "nifty".to_string(), count: 3 });
        assert_eq!(top[1], TermCount { term: "banks".to_string(), count: 2 });
        // Remaining terms all occur once; alphabetical tie-break picks "closes"
        assert_eq!(top[2].term, "closes");
    }

    #[test]
    fn test_top_terms_empty() {
        assert!(top_terms(&[], 10).is_empty());
        assert!(top_terms(&items(), 0).is_empty());
    }
}
