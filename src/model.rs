//! The three fitted artifacts and their on-disk layout.
//!
//! A model directory holds `tfidf.json`, `classifier.json` and
//! `regressor.json`. They are only usable together: both ensembles must expect
//! exactly `vocabulary + FEATURE_COUNT` columns.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ArtifactError;
use crate::features::FEATURE_COUNT;
use crate::forest::{ExtraTreesClassifier, ExtraTreesRegressor};
use crate::tfidf::TfidfVectorizer;

pub const VECTORIZER_FILE: &str = "tfidf.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const REGRESSOR_FILE: &str = "regressor.json";

#[derive(Clone, Debug)]
pub struct ModelBundle {
    pub vectorizer: TfidfVectorizer,
    pub classifier: ExtraTreesClassifier,
    pub regressor: ExtraTreesRegressor,
}

impl ModelBundle {
    /// Bundle already-fitted parts, checking that they agree.
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: ExtraTreesClassifier,
        regressor: ExtraTreesRegressor,
    ) -> Result<Self, ArtifactError> {
        let bundle = Self { vectorizer, classifier, regressor };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Column count every ensemble must have been trained on.
    pub fn n_features(&self) -> usize {
        self.vectorizer.vocabulary_len() + FEATURE_COUNT
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        let expected = self.n_features();
        let (c, r) = (self.classifier.n_features(), self.regressor.n_features());
        if c != expected || r != expected {
            return Err(ArtifactError::ShapeMismatch { expected, classifier: c, regressor: r });
        }
        Ok(())
    }

    #[instrument(level = "info", target = "autojudge", skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();

        let vectorizer: TfidfVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
        if !vectorizer.is_fitted() {
            return Err(ArtifactError::Unfitted { path: dir.join(VECTORIZER_FILE) });
        }
        let classifier: ExtraTreesClassifier = read_json(&dir.join(CLASSIFIER_FILE))?;
        if !classifier.is_fitted() {
            return Err(ArtifactError::Unfitted { path: dir.join(CLASSIFIER_FILE) });
        }
        let regressor: ExtraTreesRegressor = read_json(&dir.join(REGRESSOR_FILE))?;
        if !regressor.is_fitted() {
            return Err(ArtifactError::Unfitted { path: dir.join(REGRESSOR_FILE) });
        }

        let bundle = Self::new(vectorizer, classifier, regressor)?;
        info!(
            target: "autojudge",
            vocabulary = bundle.vectorizer.vocabulary_len(),
            classes = ?bundle.classifier.classes(),
            "model bundle loaded"
        );
        Ok(bundle)
    }

    /// Write all three artifacts, creating `dir` if needed.
    #[instrument(level = "info", target = "train", skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ArtifactError::Io { path: dir.to_path_buf(), source })?;
        write_json(&dir.join(VECTORIZER_FILE), &self.vectorizer)?;
        write_json(&dir.join(CLASSIFIER_FILE), &self.classifier)?;
        write_json(&dir.join(REGRESSOR_FILE), &self.regressor)?;
        info!(target: "train", "model bundle saved");
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| io_err(path, source))?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json { path: path.to_path_buf(), source })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let raw = serde_json::to_string(value)
        .map_err(|source| ArtifactError::Json { path: path.to_path_buf(), source })?;
    fs::write(path, raw).map_err(|source| io_err(path, source))
}

fn io_err(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io { path: PathBuf::from(path), source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestParams;

    fn tiny_bundle() -> ModelBundle {
        let docs = vec!["graph shortest path".to_string(), "print sum".to_string()];
        let mut vec = TfidfVectorizer::new(50, (1, 1));
        vec.fit(&docs).unwrap();
        let width = vec.vocabulary_len() + FEATURE_COUNT;
        let x = vec![vec![0.0; width], vec![1.0; width]];

        let mut clf = ExtraTreesClassifier::new(ForestParams::classifier(2, 0));
        clf.fit(&x, &["hard".to_string(), "easy".to_string()]).unwrap();
        let mut reg = ExtraTreesRegressor::new(ForestParams::regressor(2, 0));
        reg.fit(&x, &[8.0, 2.0]).unwrap();
        ModelBundle::new(vec, clf, reg).unwrap()
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = tiny_bundle();
        bundle.save(dir.path().join("nested")).unwrap();
        let back = ModelBundle::load(dir.path().join("nested")).unwrap();
        assert_eq!(back.n_features(), bundle.n_features());
        assert_eq!(back.classifier.classes(), ["easy", "hard"]);
    }

    #[test]
    fn missing_artifact_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(ModelBundle::load(dir.path()), Err(ArtifactError::Io { .. })));
    }

    #[test]
    fn corrupt_artifact_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        tiny_bundle().save(dir.path()).unwrap();
        fs::write(dir.path().join(CLASSIFIER_FILE), "{ nope").unwrap();
        assert!(matches!(ModelBundle::load(dir.path()), Err(ArtifactError::Json { .. })));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let b = tiny_bundle();
        let mut other = TfidfVectorizer::new(50, (1, 1));
        other.fit(&["alpha beta gamma".to_string()]).unwrap();
        let err = ModelBundle::new(other, b.classifier, b.regressor).unwrap_err();
        assert!(matches!(err, ArtifactError::ShapeMismatch { .. }));
    }
}
