// Text analytics over the filtered review set:
//   - word cloud (top tokens, font size scaled linearly on frequency)
//   - positive / negative themes (unigrams + bigrams counted per sentiment)
//   - per-product phrases (raw bigrams of praise vs complaints)

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::Serialize;

use super::preprocessing::{bigrams, grams, split_words, tokenize, StopWordFilter};
use crate::parser::types::{Review, Sentiment};

// ─────────────────────────────────────────────
// Public structs
// ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCloudEntry {
    pub word: String,
    pub count: usize,
    /// Font size, always within the configured [min, max] range.
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRange {
    pub min: f64,
    pub max: f64,
}

impl Default for FontRange {
    fn default() -> Self {
        FontRange { min: 12.0, max: 36.0 }
    }
}

impl FontRange {
    /// Linear interpolation of `count` between the extreme counts.
    /// A degenerate domain maps to the midpoint.
    pub fn scale(&self, count: usize, min_count: usize, max_count: usize) -> f64 {
        if max_count == min_count {
            return (self.min + self.max) / 2.0;
        }
        let t = (count - min_count) as f64 / (max_count - min_count) as f64;
        self.min + t * (self.max - self.min)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEntry {
    pub theme: String,
    pub count: usize,
}

/// Occurrences of one gram, split by the sentiment of the reviews it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GramStats {
    pub count: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

/// Gram frequency table in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ThemeTable {
    entries: Vec<(String, GramStats)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseEntry {
    pub phrase: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPhrases {
    pub product: String,
    pub praise: Vec<PhraseEntry>,
    pub complaints: Vec<PhraseEntry>,
}

// ─────────────────────────────────────────────
// Frequency counting
// ─────────────────────────────────────────────

/// Counter that remembers insertion order, so equal counts sort stably.
#[derive(Default)]
struct OrderedCounter {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl OrderedCounter {
    fn add(&mut self, key: String) {
        match self.index.get(&key) {
            Some(&slot) => self.order[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.order.len());
                self.order.push((key, 1));
            }
        }
    }

    /// Sorted by count descending, ties in first-seen order.
    fn into_sorted(self) -> Vec<(String, usize)> {
        let mut entries = self.order;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

// ─────────────────────────────────────────────
// Word cloud
// ─────────────────────────────────────────────

/// Top `limit` tokens by frequency with a scaled font size.
///
/// Scaling uses the minimum and maximum counts over the whole vocabulary, not
/// only the returned slice. Empty when the reviews yield no tokens.
pub fn word_cloud<R: Borrow<Review>>(
    reviews: &[R],
    filter: &StopWordFilter,
    limit: usize,
    fonts: FontRange,
) -> Vec<WordCloudEntry> {
    let mut counter = OrderedCounter::default();
    for r in reviews {
        let review: &Review = r.borrow();
        for token in tokenize(&review.text, filter) {
            counter.add(token);
        }
    }

    let entries = counter.into_sorted();
    let (Some(max_count), Some(min_count)) = (
        entries.first().map(|(_, c)| *c),
        entries.last().map(|(_, c)| *c),
    ) else {
        return Vec::new();
    };

    entries
        .into_iter()
        .take(limit)
        .map(|(word, count)| WordCloudEntry {
            size: fonts.scale(count, min_count, max_count),
            word,
            count,
        })
        .collect()
}

// ─────────────────────────────────────────────
// Themes
// ─────────────────────────────────────────────

impl ThemeTable {
    /// Accumulate unigrams and bigrams (stop-word filtered) over all reviews.
    pub fn build<R: Borrow<Review>>(reviews: &[R], filter: &StopWordFilter) -> Self {
        let mut entries: Vec<(String, GramStats)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for r in reviews {
            let review: &Review = r.borrow();
            for gram in grams(&review.text, filter) {
                let slot = match index.get(&gram) {
                    Some(&slot) => slot,
                    None => {
                        index.insert(gram.clone(), entries.len());
                        entries.push((gram, GramStats::default()));
                        entries.len() - 1
                    }
                };
                let stats = &mut entries[slot].1;
                stats.count += 1;
                match review.sentiment {
                    Sentiment::Positive => stats.positive += 1,
                    Sentiment::Neutral => stats.neutral += 1,
                    Sentiment::Negative => stats.negative += 1,
                    Sentiment::Excluded => {}
                }
            }
        }
        ThemeTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, gram: &str) -> Option<&GramStats> {
        self.entries.iter().find(|(g, _)| g == gram).map(|(_, s)| s)
    }

    /// Grams seen at least once in `sentiment` reviews, most frequent first.
    /// `Excluded` has no themes.
    pub fn top(&self, sentiment: Sentiment, limit: usize) -> Vec<ThemeEntry> {
        let count_of = |s: &GramStats| match sentiment {
            Sentiment::Positive => s.positive,
            Sentiment::Neutral => s.neutral,
            Sentiment::Negative => s.negative,
            Sentiment::Excluded => 0,
        };
        let mut themes: Vec<ThemeEntry> = self
            .entries
            .iter()
            .filter(|(_, s)| count_of(s) > 0)
            .map(|(g, s)| ThemeEntry {
                theme: g.clone(),
                count: count_of(s),
            })
            .collect();
        themes.sort_by(|a, b| b.count.cmp(&a.count));
        themes.truncate(limit);
        themes
    }
}

/// Top `limit` themes for one sentiment.
pub fn top_themes<R: Borrow<Review>>(
    reviews: &[R],
    filter: &StopWordFilter,
    sentiment: Sentiment,
    limit: usize,
) -> Vec<ThemeEntry> {
    ThemeTable::build(reviews, filter).top(sentiment, limit)
}

// ─────────────────────────────────────────────
// Product phrases
// ─────────────────────────────────────────────

/// Most frequent raw bigrams in praise and complaints about `product`.
///
/// No stop-word or length filtering on tokens here; a bigram shorter than
/// `min_chars` characters is skipped.
pub fn product_phrases<R: Borrow<Review>>(
    reviews: &[R],
    product: &str,
    limit: usize,
    min_chars: usize,
) -> ProductPhrases {
    let phrases_for = |sentiment: Sentiment| -> Vec<PhraseEntry> {
        let mut counter = OrderedCounter::default();
        for r in reviews {
            let review: &Review = r.borrow();
            if review.sentiment != sentiment || !review.has_category(product) {
                continue;
            }
            for bigram in bigrams(&split_words(&review.text)) {
                if bigram.chars().count() < min_chars {
                    continue;
                }
                counter.add(bigram);
            }
        }
        counter
            .into_sorted()
            .into_iter()
            .take(limit)
            .map(|(phrase, count)| PhraseEntry { phrase, count })
            .collect()
    };

    ProductPhrases {
        product: product.to_string(),
        praise: phrases_for(Sentiment::Positive),
        complaints: phrases_for(Sentiment::Negative),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
