//! Hand-engineered features appended after the TF-IDF columns.
//!
//! The order of the entries in [`FeatureVector`] is part of the model artifact
//! contract: reordering or adding a column invalidates every trained model.

use serde::Serialize;

use crate::text::word_count;

/// Number of engineered columns.
pub const FEATURE_COUNT: usize = 9;

/// Column names in contract order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "char_count",
    "word_count",
    "math_symbols",
    "easy_keywords",
    "medium_keywords",
    "hard_keywords",
    "log_mentions",
    "quadratic_mentions",
    "exponential_mentions",
];

const MATH_SYMBOLS: &[char] = &['+', '-', '*', '/', '%', '<', '>', '='];

pub const EASY_KEYWORDS: &[&str] = &[
    "sum", "print", "input", "simple", "even", "odd", "basic", "integer", "numbers", "add",
    "swap", "reverse", "min", "max", "average",
];

pub const MEDIUM_KEYWORDS: &[&str] = &[
    "sorting",
    "binary search",
    "greedy",
    "hashing",
    "stack",
    "queue",
    "sliding window",
    "two pointers",
    "prefix sum",
    "bfs",
    "dfs",
    "recursion",
];

pub const HARD_KEYWORDS: &[&str] = &[
    "dp",
    "dynamic programming",
    "graph",
    "dijkstra",
    "segment tree",
    "bitmask",
    "complexity",
    "backtracking",
    "flow",
    "geometry",
    "combinatorics",
    "strongly connected",
    "modular inverse",
];

/// Fixed-order engineered feature vector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn char_count(&self) -> f64 { self.0[0] }
    pub fn word_count(&self) -> f64 { self.0[1] }
    pub fn math_symbols(&self) -> f64 { self.0[2] }
    pub fn easy_keywords(&self) -> f64 { self.0[3] }
    pub fn medium_keywords(&self) -> f64 { self.0[4] }
    pub fn hard_keywords(&self) -> f64 { self.0[5] }
    pub fn log_mentions(&self) -> f64 { self.0[6] }
    pub fn quadratic_mentions(&self) -> f64 { self.0[7] }
    pub fn exponential_mentions(&self) -> f64 { self.0[8] }
}

/// Compute the engineered features for `text`.
///
/// Length and word count are taken on `text` exactly as given; every other
/// column works on its lower-cased form. Keyword columns count distinct list
/// entries contained anywhere in the text (substring match, so "dp" also hits
/// inside "dpi").
pub fn extract_features(text: &str) -> FeatureVector {
    let lower = text.to_lowercase();

    let math = lower.chars().filter(|c| MATH_SYMBOLS.contains(c)).count();

    FeatureVector([
        text.chars().count() as f64,
        word_count(text) as f64,
        math as f64,
        keyword_hits(&lower, EASY_KEYWORDS) as f64,
        keyword_hits(&lower, MEDIUM_KEYWORDS) as f64,
        keyword_hits(&lower, HARD_KEYWORDS) as f64,
        lower.matches("log").count() as f64,
        lower.matches("n^2").count() as f64,
        lower.matches("2^n").count() as f64,
    ])
}

fn keyword_hits(haystack: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| haystack.contains(*k)).count()
}
