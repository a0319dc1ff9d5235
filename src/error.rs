//! Error types for the library. Binaries wrap these at the top level.

use std::path::PathBuf;

use crate::scoring::UnknownTier;

/// Preconditions of the vectorizer and tree ensembles.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model has not been fitted")]
    NotFitted,
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,
    #[error("got {rows} feature rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("row {row} has {got} features, expected {expected}")]
    RaggedRow { row: usize, got: usize, expected: usize },
    #[error("expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
    #[error("vocabulary is empty: every document was blank or stop words only")]
    EmptyVocabulary,
}

/// Loading or saving the fitted artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("cannot access artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed artifact {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "artifact shapes disagree: vectorizer yields {expected} columns, \
         classifier expects {classifier}, regressor expects {regressor}"
    )]
    ShapeMismatch {
        expected: usize,
        classifier: usize,
        regressor: usize,
    },
    #[error("artifact {path} holds an unfitted model")]
    Unfitted { path: PathBuf },
}

/// Reading the line-delimited training set.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: {source}")]
    Label {
        line: usize,
        #[source]
        source: UnknownTier,
    },
    #[error("dataset {path} contains no records")]
    Empty { path: PathBuf },
}

/// Why a single analysis produced no result.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Please enter a problem description before analyzing.")]
    EmptyDescription,
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("classifier produced an unknown label: {0}")]
    UnknownLabel(#[from] UnknownTier),
}

/// Anything the offline training run can fail on.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
