//! AutoJudge: predicts the difficulty of a programming problem from its text.
//!
//! A TF-IDF vectorizer plus nine hand-made features feed two extra-trees
//! ensembles, one for the tier (easy / medium / hard) and one for a 0-10
//! score. The score is then clamped into the tier's band.

pub mod analyzer;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod forest;
pub mod metrics;
pub mod model;
pub mod protocol;
pub mod routes;
pub mod scoring;
pub mod state;
pub mod telemetry;
pub mod text;
pub mod tfidf;
pub mod train;

pub use analyzer::{Analysis, Analyzer, ProblemText};
pub use config::AppConfig;
pub use model::ModelBundle;
pub use scoring::{reconcile, Tier, Verdict};
