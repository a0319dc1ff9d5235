//! Line-delimited training set: one JSON problem per line.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::DatasetError;
use crate::scoring::Tier;
use crate::text::clean_text;

/// Raw row as stored in `problems_data.jsonl`. Text fields may be missing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProblemRecord {
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub description: Option<String>,
  #[serde(default)] pub input_description: Option<String>,
  #[serde(default)] pub output_description: Option<String>,
  pub problem_class: String,
  pub problem_score: f64,
  /// 1-based line in the source file; 0 for records built in memory.
  #[serde(skip)] pub line: usize,
}

impl ProblemRecord {
  /// Normalised `title description input output`. Any missing field blanks the
  /// whole text.
  pub fn training_text(&self) -> String {
    match (&self.title, &self.description, &self.input_description, &self.output_description) {
      (Some(t), Some(d), Some(i), Some(o)) => {
        clean_text(Some(&format!("{t} {d} {i} {o}")))
      }
      _ => String::new(),
    }
  }
}

/// A parsed row with its label checked.
#[derive(Clone, Debug)]
pub struct Example {
  pub text: String,
  pub tier: Tier,
  pub score: f64,
}

/// Read every non-blank line of `path` as a [`ProblemRecord`].
#[instrument(level = "info", target = "train", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<ProblemRecord>, DatasetError> {
  let path = path.as_ref();
  let raw = fs::read_to_string(path)
    .map_err(|source| DatasetError::Io { path: path.to_path_buf(), source })?;

  let mut records = Vec::new();
  for (i, line) in raw.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let mut rec: ProblemRecord = serde_json::from_str(line)
      .map_err(|source| DatasetError::Parse { line: i + 1, source })?;
    rec.line = i + 1;
    records.push(rec);
  }

  if records.is_empty() {
    return Err(DatasetError::Empty { path: path.to_path_buf() });
  }
  info!(target: "train", records = records.len(), "dataset loaded");
  Ok(records)
}

/// Normalise text and parse labels. Label errors carry the record's source
/// line, or its 1-based position when it was not read from a file.
pub fn to_examples(records: &[ProblemRecord]) -> Result<Vec<Example>, DatasetError> {
  records
    .iter()
    .enumerate()
    .map(|(i, r)| {
      let tier = r
        .problem_class
        .parse::<Tier>()
        .map_err(|source| DatasetError::Label { line: if r.line > 0 { r.line } else { i + 1 }, source })?;
      Ok(Example { text: r.training_text(), tier, score: r.problem_score })
    })
    .collect()
}

/// Seeded shuffle-split of `0..n` into (train, test) indices.
///
/// The test part holds `ceil(n * test_size)` items, but at least one item is
/// always left for training.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
  let mut idx: Vec<usize> = (0..n).collect();
  let mut rng = StdRng::seed_from_u64(seed);
  idx.shuffle(&mut rng);

  let n_test = ((n as f64) * test_size.clamp(0.0, 1.0)).ceil() as usize;
  let n_test = n_test.min(n.saturating_sub(1));
  let train = idx.split_off(n_test);

  debug!(target: "train", train = train.len(), test = idx.len(), "dataset split");
  (train, idx)
}
