//! Runtime configuration: a handful of env vars plus an optional TOML file.
//!
//! TOML schema (every table and field optional):
//!
//! ```toml
//! [model]       # dir = "data/processed"
//! [vectorizer]  # max_features = 3000, ngram_min = 1, ngram_max = 3
//! [classifier]  # n_estimators = 300, seed = 42, max_depth = 0 (unbounded)
//! [regressor]   # same keys as [classifier]
//! [training]    # dataset = "data/raw/problems_data.jsonl", test_size = 0.2, seed = 42
//! [server]      # port = 3000, static_dir = "static"
//! ```
//!
//! Env vars win over the file: `MODEL_DIR`, `DATASET_PATH`, `STATIC_DIR`,
//! `PORT`. The file itself is read from `AUTOJUDGE_CONFIG_PATH`.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::forest::{ForestParams, MaxFeatures};

pub const CONFIG_PATH_ENV: &str = "AUTOJUDGE_CONFIG_PATH";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)] pub model: ModelCfg,
  #[serde(default)] pub vectorizer: VectorizerCfg,
  #[serde(default = "ForestCfg::default")] pub classifier: ForestCfg,
  #[serde(default = "ForestCfg::default")] pub regressor: ForestCfg,
  #[serde(default)] pub training: TrainingCfg,
  #[serde(default)] pub server: ServerCfg,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ModelCfg {
  pub dir: PathBuf,
}

impl Default for ModelCfg {
  fn default() -> Self {
    Self { dir: PathBuf::from("data/processed") }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct VectorizerCfg {
  pub max_features: usize,
  pub ngram_min: usize,
  pub ngram_max: usize,
}

impl Default for VectorizerCfg {
  fn default() -> Self {
    Self { max_features: 3000, ngram_min: 1, ngram_max: 3 }
  }
}

/// Shared by `[classifier]` and `[regressor]`. `max_depth = 0` means unbounded.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ForestCfg {
  pub n_estimators: usize,
  pub seed: u64,
  pub max_depth: usize,
  pub min_samples_split: usize,
}

impl Default for ForestCfg {
  fn default() -> Self {
    Self { n_estimators: 300, seed: 42, max_depth: 0, min_samples_split: 2 }
  }
}

impl ForestCfg {
  fn params(&self, max_features: MaxFeatures) -> ForestParams {
    ForestParams {
      n_estimators: self.n_estimators.max(1),
      max_features,
      min_samples_split: self.min_samples_split.max(2),
      max_depth: (self.max_depth > 0).then_some(self.max_depth),
      seed: self.seed,
    }
  }

  pub fn classifier_params(&self) -> ForestParams {
    self.params(MaxFeatures::Sqrt)
  }

  pub fn regressor_params(&self) -> ForestParams {
    self.params(MaxFeatures::All)
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TrainingCfg {
  pub dataset: PathBuf,
  pub test_size: f64,
  pub seed: u64,
}

impl Default for TrainingCfg {
  fn default() -> Self {
    Self { dataset: PathBuf::from("data/raw/problems_data.jsonl"), test_size: 0.2, seed: 42 }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
  pub port: u16,
  pub static_dir: PathBuf,
}

impl Default for ServerCfg {
  fn default() -> Self {
    Self { port: 3000, static_dir: PathBuf::from("static") }
  }
}

impl AppConfig {
  /// File config (if any) with env overrides applied on top.
  pub fn from_env() -> Self {
    let mut cfg = load_config_from_env().unwrap_or_default();
    cfg.apply_env(|k| std::env::var(k).ok());
    cfg
  }

  /// Apply overrides from a lookup function; invalid `PORT` values are ignored.
  pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = get("MODEL_DIR") {
      self.model.dir = PathBuf::from(dir);
    }
    if let Some(path) = get("DATASET_PATH") {
      self.training.dataset = PathBuf::from(path);
    }
    if let Some(dir) = get("STATIC_DIR") {
      self.server.static_dir = PathBuf::from(dir);
    }
    if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
      self.server.port = port;
    }
  }
}

/// Attempt to load `AppConfig` from AUTOJUDGE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var(CONFIG_PATH_ENV).ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "autojudge", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "autojudge", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "autojudge", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
