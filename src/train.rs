//! Offline training: dataset in, evaluated and saved model bundle out.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::dataset::{load_jsonl, to_examples, train_test_split, Example};
use crate::error::{ModelError, TrainError};
use crate::features::extract_features;
use crate::forest::{ExtraTreesClassifier, ExtraTreesRegressor};
use crate::metrics::{mean_absolute_error, ClassificationReport};
use crate::model::ModelBundle;
use crate::tfidf::TfidfVectorizer;

/// Held-out numbers from the 80/20 run. `None` when the set was too small to
/// hold anything out.
#[derive(Clone, Debug, Serialize)]
pub struct TrainReport {
    pub samples: usize,
    pub vocabulary: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub report: Option<ClassificationReport>,
    pub mae: Option<f64>,
}

/// Design matrix: TF-IDF columns followed by the engineered features.
pub fn design_matrix(
    vectorizer: &mut TfidfVectorizer,
    examples: &[Example],
) -> Result<Vec<Vec<f64>>, ModelError> {
    let texts: Vec<String> = examples.iter().map(|e| e.text.clone()).collect();
    let mut rows = vectorizer.fit_transform(&texts)?;
    for (row, text) in rows.iter_mut().zip(&texts) {
        row.extend_from_slice(extract_features(text).as_slice());
    }
    Ok(rows)
}

fn pick<T: Clone>(items: &[T], idx: &[usize]) -> Vec<T> {
    idx.iter().map(|&i| items[i].clone()).collect()
}

/// Fit on `examples`, evaluate on a held-out split, then refit on everything.
#[instrument(level = "info", target = "train", skip_all, fields(samples = examples.len()))]
pub fn fit_bundle(examples: &[Example], cfg: &AppConfig) -> Result<(ModelBundle, TrainReport), TrainError> {
    let mut vectorizer = TfidfVectorizer::new(
        cfg.vectorizer.max_features,
        (cfg.vectorizer.ngram_min, cfg.vectorizer.ngram_max),
    );
    let x = design_matrix(&mut vectorizer, examples)?;
    let labels: Vec<String> = examples.iter().map(|e| e.tier.as_str().to_string()).collect();
    let scores: Vec<f64> = examples.iter().map(|e| e.score).collect();

    let (train_idx, test_idx) = train_test_split(x.len(), cfg.training.test_size, cfg.training.seed);
    let clf_params = cfg.classifier.classifier_params();
    let reg_params = cfg.regressor.regressor_params();

    let (report, mae) = if test_idx.is_empty() {
        (None, None)
    } else {
        let x_train = pick(&x, &train_idx);
        let mut clf = ExtraTreesClassifier::new(clf_params.clone());
        clf.fit(&x_train, &pick(&labels, &train_idx))?;
        let mut reg = ExtraTreesRegressor::new(reg_params.clone());
        reg.fit(&x_train, &pick(&scores, &train_idx))?;

        let mut pred_labels = Vec::with_capacity(test_idx.len());
        let mut pred_scores = Vec::with_capacity(test_idx.len());
        for &i in &test_idx {
            pred_labels.push(clf.predict(&x[i])?.to_string());
            pred_scores.push(reg.predict(&x[i])?);
        }
        let report = ClassificationReport::new(&pick(&labels, &test_idx), &pred_labels);
        let mae = mean_absolute_error(&pick(&scores, &test_idx), &pred_scores);
        info!(target: "train", accuracy = report.accuracy, mae, "held-out evaluation");
        (Some(report), Some(mae))
    };

    let mut clf = ExtraTreesClassifier::new(clf_params);
    clf.fit(&x, &labels)?;
    let mut reg = ExtraTreesRegressor::new(reg_params);
    reg.fit(&x, &scores)?;

    let summary = TrainReport {
        samples: examples.len(),
        vocabulary: vectorizer.vocabulary_len(),
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        report,
        mae,
    };
    let bundle = ModelBundle::new(vectorizer, clf, reg)?;
    Ok((bundle, summary))
}

/// Whole offline run: read the dataset, fit, evaluate and write the artifacts
/// into `model_dir`.
#[instrument(level = "info", target = "train", skip_all, fields(dataset = %dataset.as_ref().display()))]
pub fn run(
    dataset: impl AsRef<Path>,
    model_dir: impl AsRef<Path>,
    cfg: &AppConfig,
) -> Result<TrainReport, TrainError> {
    let records = load_jsonl(dataset)?;
    let examples = to_examples(&records)?;
    let (bundle, report) = fit_bundle(&examples, cfg)?;
    bundle.save(model_dir)?;
    info!(target: "train", samples = report.samples, vocabulary = report.vocabulary, "training finished");
    Ok(report)
}
