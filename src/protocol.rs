//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analyzer::{Analysis, ProblemText};
use crate::model::ModelBundle;

/// Body of `POST /api/v1/analyze`. Only `description` is required.
#[derive(Debug, Deserialize)]
pub struct AnalyzeIn {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_description: String,
    #[serde(default)]
    pub output_description: String,
}

impl From<AnalyzeIn> for ProblemText {
    fn from(a: AnalyzeIn) -> Self {
        ProblemText::new(a.description, a.input_description, a.output_description)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOut {
    pub label: String,
    pub display: String,
    pub color: String,
    pub raw_score: f64,
    pub score: f64,
    pub score_text: String,
    pub progress: f64,
    pub probabilities: BTreeMap<String, f64>,
}

impl From<Analysis> for AnalyzeOut {
    fn from(a: Analysis) -> Self {
        let v = &a.verdict;
        AnalyzeOut {
            label: v.tier.as_str().to_string(),
            display: v.display.to_string(),
            color: v.color.to_string(),
            raw_score: v.raw_score,
            score: v.score,
            score_text: v.score_text(),
            progress: v.progress(),
            probabilities: a.probabilities,
        }
    }
}

/// Non-fatal user-facing message (e.g. blank description).
#[derive(Debug, Serialize)]
pub struct WarningOut {
    pub warning: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoOut {
    pub vocabulary: usize,
    pub n_features: usize,
    pub classifier_trees: usize,
    pub regressor_trees: usize,
    pub classes: Vec<String>,
}

impl From<&ModelBundle> for ModelInfoOut {
    fn from(b: &ModelBundle) -> Self {
        ModelInfoOut {
            vocabulary: b.vectorizer.vocabulary_len(),
            n_features: b.n_features(),
            classifier_trees: b.classifier.n_trees(),
            regressor_trees: b.regressor.n_trees(),
            classes: b.classifier.classes().to_vec(),
        }
    }
}
