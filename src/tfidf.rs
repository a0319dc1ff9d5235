//! TF-IDF vectorizer over word n-grams.
//!
//! Tokens are runs of two or more word characters. English stop words are
//! dropped before n-grams are formed, n-grams are joined with one space.
//! Weights are raw counts times a smoothed idf, L2-normalised per document.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"(?u)\b\w\w+\b").expect("static token pattern"))
}

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

static STOP_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn is_stop_word(token: &str) -> bool {
    STOP_SET
        .get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
        .contains(token)
}

/// Fitted vocabulary and idf weights. Serialises to `tfidf.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize, ngram_range: (usize, usize)) -> Self {
        Self {
            max_features,
            ngram_range,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty() && self.idf.len() == self.vocabulary.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Lower-cased tokens minus stop words, expanded into n-grams.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let lower = doc.to_lowercase();
        let tokens: Vec<&str> = token_re()
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|t| !is_stop_word(t))
            .collect();

        let (lo, hi) = self.ngram_range;
        let mut grams = Vec::new();
        for n in lo.max(1)..=hi {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    pub fn fit(&mut self, docs: &[String]) -> Result<(), ModelError> {
        if docs.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mut total: HashMap<String, usize> = HashMap::new();
        let mut df: HashMap<String, usize> = HashMap::new();
        for doc in docs {
            let grams = self.analyze(doc);
            let mut seen = HashSet::new();
            for g in grams {
                if seen.insert(g.clone()) {
                    *df.entry(g.clone()).or_insert(0) += 1;
                }
                *total.entry(g).or_insert(0) += 1;
            }
        }
        if total.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, usize)> = total.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features.max(1));

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort();

        let n = docs.len() as f64;
        self.idf = terms
            .iter()
            .map(|t| {
                let d = df.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + d)).ln() + 1.0
            })
            .collect();
        self.vocabulary = terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect();

        debug!(target: "train", docs = docs.len(), vocabulary = self.vocabulary.len(), "tfidf fitted");
        Ok(())
    }

    pub fn transform(&self, doc: &str) -> Result<Vec<f64>, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        let mut row = vec![0.0; self.vocabulary.len()];
        for g in self.analyze(doc) {
            if let Some(&idx) = self.vocabulary.get(&g) {
                row[idx] += 1.0;
            }
        }
        for (v, w) in row.iter_mut().zip(&self.idf) {
            *v *= w;
        }
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(row)
    }

    pub fn fit_transform(&mut self, docs: &[String]) -> Result<Vec<Vec<f64>>, ModelError> {
        self.fit(docs)?;
        docs.iter().map(|d| self.transform(d)).collect()
    }
}
