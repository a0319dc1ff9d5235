//! Single-problem inference: text in, reconciled difficulty verdict out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::AnalyzeError;
use crate::features::extract_features;
use crate::model::ModelBundle;
use crate::scoring::{reconcile, Tier, Verdict};
use crate::text::join_fields;

/// The three fields a user fills in on the dashboard.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProblemText {
  pub description: String,
  #[serde(default)]
  pub input_description: String,
  #[serde(default)]
  pub output_description: String,
}

impl ProblemText {
  pub fn new(
    description: impl Into<String>,
    input_description: impl Into<String>,
    output_description: impl Into<String>,
  ) -> Self {
    Self {
      description: description.into(),
      input_description: input_description.into(),
      output_description: output_description.into(),
    }
  }

  /// Fields joined with single spaces, as fed to the models.
  pub fn joined(&self) -> String {
    join_fields(&[&self.description, &self.input_description, &self.output_description])
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Analysis {
  pub verdict: Verdict,
  /// Mean classifier probability per class label.
  pub probabilities: BTreeMap<String, f64>,
}

/// Read-only inference over a loaded [`ModelBundle`]; safe to share across tasks.
#[derive(Clone, Debug)]
pub struct Analyzer {
  bundle: ModelBundle,
}

impl Analyzer {
  pub fn new(bundle: ModelBundle) -> Self {
    Self { bundle }
  }

  pub fn bundle(&self) -> &ModelBundle {
    &self.bundle
  }

  /// Full feature row for an already-joined text: TF-IDF columns, then the
  /// engineered ones.
  pub fn feature_row(&self, text: &str) -> Result<Vec<f64>, AnalyzeError> {
    let mut row = self.bundle.vectorizer.transform(text)?;
    row.extend_from_slice(extract_features(text).as_slice());
    Ok(row)
  }

  #[instrument(level = "info", target = "analyze", skip_all, fields(description_len = problem.description.len()))]
  pub fn analyze(&self, problem: &ProblemText) -> Result<Analysis, AnalyzeError> {
    if problem.description.trim().is_empty() {
      return Err(AnalyzeError::EmptyDescription);
    }

    let row = self.feature_row(&problem.joined())?;
    let (label, proba) = self.bundle.classifier.predict_with_proba(&row)?;
    let tier: Tier = label.parse()?;
    let raw_score = self.bundle.regressor.predict(&row)?;

    let verdict = reconcile(tier, raw_score);
    debug!(target: "analyze", %tier, raw_score, score = verdict.score, "problem analyzed");

    let probabilities = self
      .bundle
      .classifier
      .classes()
      .iter()
      .cloned()
      .zip(proba)
      .collect();
    Ok(Analysis { verdict, probabilities })
  }
}
