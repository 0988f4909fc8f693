//! NLP Preprocessing — naive Russian/Latin tokenizer, stop words, bigrams
//!
//! Pipeline per review text:
//!   lowercase → non-word characters to spaces → whitespace split
//!   → stop-word filter → length filter

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

// ── Static regex ──────────────────────────────────────────────────────────────

/// Anything that is not a Cyrillic or Latin letter, a digit or whitespace.
/// Applied after lowercasing.
static NON_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^а-яёa-z0-9\s]").expect("NON_WORD_REGEX: invalid pattern")
});

// ── Stop-word constants ───────────────────────────────────────────────────────

/// Russian function words.
const RUSSIAN_STOP_WORDS: &[&str] = &[
    "и", "в", "во", "не", "что", "он", "на", "я", "с", "со", "как", "а", "то", "все",
    "она", "так", "его", "но", "да", "ты", "к", "у", "же", "вы", "за", "бы", "по",
    "только", "ее", "мне", "было", "вот", "от", "меня", "еще", "нет", "о", "из", "ему",
    "теперь", "когда", "даже", "ну", "вдруг", "ли", "если", "уже", "или", "ни", "быть",
    "был", "него", "до", "вас", "нибудь", "опять", "уж", "вам", "ведь", "там", "потом",
    "себя", "ничего", "ей", "может", "они", "тут", "где", "есть", "надо", "ней", "для",
    "мы", "тебя", "их", "чем", "сказал", "сказала", "бывает", "раз", "два", "три",
    "этот", "эта", "это", "эти", "такой", "также", "всего", "всем", "при", "больше",
    "после", "её",
];

/// Tokens shorter than this many characters are dropped.
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 3;

// ── StopWordFilter ────────────────────────────────────────────────────────────

/// Stop-word set plus the minimum token length, shared by all text analytics.
#[derive(Debug, Clone)]
pub struct StopWordFilter {
    single_words: HashSet<String>,
    min_chars: usize,
}

impl StopWordFilter {
    /// Fixed Russian stop words and the default length rule (length > 2).
    pub fn new() -> Self {
        StopWordFilter {
            single_words: RUSSIAN_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_chars: DEFAULT_MIN_TOKEN_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Add configured words (lowercased) to the stop-word set.
    pub fn add_words<S: AsRef<str>>(&mut self, words: &[S]) {
        for w in words {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() {
                self.single_words.insert(w);
            }
        }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.single_words.contains(token)
    }

    /// `true` if the token survives both the stop-word and the length rule.
    /// Length is counted in characters, not bytes.
    pub fn keeps(&self, token: &str) -> bool {
        !self.is_stop_word(token) && token.chars().count() >= self.min_chars
    }
}

impl Default for StopWordFilter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tokenisation ──────────────────────────────────────────────────────────────

/// Lowercase, blank out non-word characters, split on whitespace. No filtering.
pub fn split_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD_REGEX
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// `split_words` followed by the stop-word and length filters.
pub fn tokenize(text: &str, filter: &StopWordFilter) -> Vec<String> {
    split_words(text)
        .into_iter()
        .filter(|t| filter.keeps(t))
        .collect()
}

/// Adjacent pairs joined by a single space.
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// Theme candidates: filtered unigrams followed by the bigrams built from them.
pub fn grams(text: &str, filter: &StopWordFilter) -> Vec<String> {
    let tokens = tokenize(text, filter);
    let pairs = bigrams(&tokens);
    let mut out = tokens;
    out.extend(pairs);
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
