use sentiment_core::PolarityScorer;
use std::collections::{HashMap, HashSet};

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

/// How many tokens back a negator reaches.
const NEGATION_WINDOW: usize = 3;

/// A negated term flips sign and loses half its strength ("not great" is
/// milder than "bad").
const NEGATION_FACTOR: f64 = -0.5;

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("sharply", 1.4),
    ("strongly", 1.3),
    ("significantly", 1.3),
    ("deeply", 1.3),
    ("massive", 1.4),
    ("huge", 1.3),
    ("slightly", 0.6),
    ("marginally", 0.6),
    ("modestly", 0.7),
    ("somewhat", 0.7),
];

/// Finance-oriented polarity weights in [-1, 1].
const DEFAULT_LEXICON: &[(&str, f64)] = &[
    // Bullish
    ("bullish", 0.7),
    ("rally", 0.6),
    ("rallies", 0.6),
    ("rallied", 0.6),
    ("surge", 0.6),
    ("surges", 0.6),
    ("surged", 0.6),
    ("soar", 0.7),
    ("soars", 0.7),
    ("soared", 0.7),
    ("jump", 0.4),
    ("jumps", 0.4),
    ("jumped", 0.4),
    ("climb", 0.4),
    ("climbs", 0.4),
    ("climbed", 0.4),
    ("gain", 0.4),
    ("gains", 0.4),
    ("gained", 0.4),
    ("rise", 0.3),
    ("rises", 0.3),
    ("rose", 0.3),
    ("advance", 0.3),
    ("advances", 0.3),
    ("rebound", 0.5),
    ("rebounds", 0.5),
    ("recovery", 0.4),
    ("recovers", 0.4),
    ("boost", 0.4),
    ("boosts", 0.4),
    ("upbeat", 0.6),
    ("optimism", 0.6),
    ("optimistic", 0.6),
    ("strong", 0.4),
    ("stronger", 0.4),
    ("robust", 0.5),
    ("growth", 0.4),
    ("profit", 0.4),
    ("profits", 0.4),
    ("record", 0.3),
    ("high", 0.2),
    ("highs", 0.3),
    ("beat", 0.5),
    ("beats", 0.5),
    ("outperform", 0.5),
    ("outperforms", 0.5),
    ("upgrade", 0.5),
    ("upgraded", 0.5),
    ("buy", 0.3),
    ("breakout", 0.4),
    ("breakthrough", 0.6),
    ("success", 0.6),
    ("successful", 0.6),
    ("positive", 0.5),
    ("good", 0.5),
    ("great", 0.7),
    ("excellent", 0.9),
    ("best", 0.8),
    ("win", 0.5),
    ("wins", 0.5),
    ("confidence", 0.4),
    ("stable", 0.2),
    ("easing", 0.2),
    ("momentum", 0.3),
    ("tailwind", 0.4),
    ("dividend", 0.2),
    ("buyback", 0.3),
    ("inflows", 0.4),
    // Bearish
    ("bearish", -0.7),
    ("crash", -0.8),
    ("crashes", -0.8),
    ("crashed", -0.8),
    ("plunge", -0.7),
    ("plunges", -0.7),
    ("plunged", -0.7),
    ("tumble", -0.6),
    ("tumbles", -0.6),
    ("tumbled", -0.6),
    ("slump", -0.6),
    ("slumps", -0.6),
    ("slumped", -0.6),
    ("sink", -0.5),
    ("sinks", -0.5),
    ("sank", -0.5),
    ("fall", -0.4),
    ("falls", -0.4),
    ("fell", -0.4),
    ("drop", -0.4),
    ("drops", -0.4),
    ("dropped", -0.4),
    ("decline", -0.4),
    ("declines", -0.4),
    ("declined", -0.4),
    ("slide", -0.4),
    ("slides", -0.4),
    ("loss", -0.5),
    ("losses", -0.5),
    ("low", -0.3),
    ("lows", -0.3),
    ("weak", -0.5),
    ("weaker", -0.5),
    ("miss", -0.5),
    ("misses", -0.5),
    ("missed", -0.5),
    ("downgrade", -0.5),
    ("downgraded", -0.5),
    ("underperform", -0.5),
    ("sell-off", -0.6),
    ("selloff", -0.6),
    ("crisis", -0.7),
    ("recession", -0.7),
    ("default", -0.6),
    ("bankruptcy", -0.9),
    ("fraud", -0.8),
    ("scam", -0.8),
    ("probe", -0.4),
    ("lawsuit", -0.5),
    ("panic", -0.7),
    ("fear", -0.6),
    ("fears", -0.6),
    ("worry", -0.5),
    ("worries", -0.5),
    ("concern", -0.4),
    ("concerns", -0.4),
    ("risk", -0.3),
    ("risks", -0.3),
    ("uncertainty", -0.4),
    ("volatile", -0.3),
    ("volatility", -0.3),
    ("pressure", -0.3),
    ("headwind", -0.4),
    ("headwinds", -0.4),
    ("warning", -0.5),
    ("warns", -0.5),
    ("layoffs", -0.5),
    ("outflows", -0.4),
    ("negative", -0.5),
    ("bad", -0.7),
    ("worst", -0.9),
    ("poor", -0.5),
    ("fail", -0.6),
    ("fails", -0.6),
    ("failed", -0.6),
    ("sell", -0.3),
];

/// Lexicon and rule based polarity scorer.
///
/// Each matched term contributes its weight, amplified or damped by an
/// intensifier directly before it and flipped by a negator up to
/// `NEGATION_WINDOW` tokens before it. The polarity is the mean contribution
/// of the matched terms, clamped to [-1, 1]; text without any matched term
/// scores 0.0.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    weights: HashMap<String, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::from_terms(DEFAULT_LEXICON.iter().map(|(t, w)| (t.to_string(), *w)))
    }

    /// Build a scorer over a custom lexicon. Terms are matched lowercase.
    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            weights: terms
                .into_iter()
                .map(|(t, w)| (t.to_lowercase(), w.clamp(-1.0, 1.0)))
                .collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
            negations: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    /// Add or replace a single term.
    pub fn with_term(mut self, term: &str, weight: f64) -> Self {
        self.weights.insert(term.to_lowercase(), weight.clamp(-1.0, 1.0));
        self
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight_of(&self, term: &str) -> Option<f64> {
        self.weights.get(&term.to_lowercase()).copied()
    }

    fn analyze_text(&self, text: &str) -> f64 {
        let words = tokenize(text);

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negations.contains(w.as_str()))
            .map(|(i, _)| i)
            .collect();

        let mut total = 0.0;
        let mut matched = 0usize;

        for (i, word) in words.iter().enumerate() {
            let Some(&weight) = self.weights.get(word) else {
                continue;
            };

            let mut contribution = weight;

            if i > 0 {
                if let Some(&factor) = self.intensifiers.get(words[i - 1].as_str()) {
                    contribution *= factor;
                }
            }

            let negated = negation_positions
                .iter()
                .any(|&neg_pos| neg_pos < i && (i - neg_pos) <= NEGATION_WINDOW);
            if negated {
                contribution *= NEGATION_FACTOR;
            }

            total += contribution;
            matched += 1;
        }

        if matched == 0 {
            return 0.0;
        }

        (total / matched as f64).clamp(-1.0, 1.0)
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        self.analyze_text(text)
    }
}

/// Lowercase word tokens. Hyphens and apostrophes inside a word are kept so
/// "sell-off" and "don't" survive as single tokens.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|w| w.trim_matches(|c: char| c == '-' || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
