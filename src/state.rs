//! Application state: the loaded model bundle plus the resolved config.
//!
//! Built once at startup and shared behind an `Arc`. Nothing in here is
//! mutated after construction, so handlers need no locks.

use tracing::{error, info, instrument};

use crate::analyzer::Analyzer;
use crate::config::AppConfig;
use crate::error::ArtifactError;
use crate::model::ModelBundle;

pub struct AppState {
    pub analyzer: Analyzer,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(analyzer: Analyzer, config: AppConfig) -> Self {
        Self { analyzer, config }
    }

    /// Load the artifacts from `config.model.dir`.
    #[instrument(level = "info", target = "autojudge", skip_all, fields(dir = %config.model.dir.display()))]
    pub fn load(config: AppConfig) -> Result<Self, ArtifactError> {
        match ModelBundle::load(&config.model.dir) {
            Ok(bundle) => {
                info!(target: "autojudge", n_features = bundle.n_features(), "Model ready");
                Ok(Self::new(Analyzer::new(bundle), config))
            }
            Err(e) => {
                error!(target: "autojudge", error = %e, "Failed to load model artifacts");
                Err(e)
            }
        }
    }
}
