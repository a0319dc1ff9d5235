//! Extremely randomised tree ensembles (classifier and regressor).
//!
//! Every tree sees the whole training set. At each node the candidate features
//! are visited in random order, constant ones are skipped, and each of up to
//! `max_features` usable features gets a single uniform random threshold. The
//! best of those splits by weighted impurity decrease is kept.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;

/// How many features each split may look at. `Sqrt` rounds down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    Sqrt,
    All,
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
            MaxFeatures::All => n_features.max(1),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl ForestParams {
    pub fn classifier(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            max_depth: None,
            seed,
        }
    }

    pub fn regressor(n_estimators: usize, seed: u64) -> Self {
        Self {
            max_features: MaxFeatures::All,
            ..Self::classifier(n_estimators, seed)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A single fitted tree stored as a flat node arena; node 0 is the root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_for(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => return value,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Impurity criterion plus the leaf payload it produces.
trait Criterion {
    /// Impurity of `samples` and their total weight.
    fn impurity(&self, samples: &[usize]) -> (f64, f64);
    fn leaf(&self, samples: &[usize]) -> Vec<f64>;
}

struct Gini<'a> {
    labels: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
}

impl Gini<'_> {
    fn distribution(&self, samples: &[usize]) -> (Vec<f64>, f64) {
        let mut dist = vec![0.0; self.n_classes];
        for &s in samples {
            dist[self.labels[s]] += self.weights[self.labels[s]];
        }
        let total = dist.iter().sum();
        (dist, total)
    }
}

impl Criterion for Gini<'_> {
    fn impurity(&self, samples: &[usize]) -> (f64, f64) {
        let (dist, total) = self.distribution(samples);
        if total <= 0.0 {
            return (0.0, 0.0);
        }
        let sq: f64 = dist.iter().map(|w| (w / total) * (w / total)).sum();
        (1.0 - sq, total)
    }

    fn leaf(&self, samples: &[usize]) -> Vec<f64> {
        let (mut dist, total) = self.distribution(samples);
        if total > 0.0 {
            dist.iter_mut().for_each(|w| *w /= total);
        }
        dist
    }
}

struct Mse<'a> {
    targets: &'a [f64],
}

impl Criterion for Mse<'_> {
    fn impurity(&self, samples: &[usize]) -> (f64, f64) {
        if samples.is_empty() {
            return (0.0, 0.0);
        }
        let n = samples.len() as f64;
        let mean = samples.iter().map(|&s| self.targets[s]).sum::<f64>() / n;
        let var = samples
            .iter()
            .map(|&s| (self.targets[s] - mean).powi(2))
            .sum::<f64>()
            / n;
        (var, n)
    }

    fn leaf(&self, samples: &[usize]) -> Vec<f64> {
        let n = samples.len().max(1) as f64;
        vec![samples.iter().map(|&s| self.targets[s]).sum::<f64>() / n]
    }
}

fn validate(x: &[Vec<f64>], n_targets: usize) -> Result<usize, ModelError> {
    if x.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.len() != n_targets {
        return Err(ModelError::LengthMismatch { rows: x.len(), targets: n_targets });
    }
    let width = x[0].len();
    if let Some((row, r)) = x.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(ModelError::RaggedRow { row, got: r.len(), expected: width });
    }
    Ok(width)
}

fn build_tree<C: Criterion + Sync>(
    x: &[Vec<f64>],
    criterion: &C,
    params: &ForestParams,
    rng: &mut StdRng,
) -> Tree {
    let n_features = x[0].len();
    let k = params.max_features.resolve(n_features);
    let mut samples: Vec<usize> = (0..x.len()).collect();
    let mut nodes: Vec<Node> = Vec::new();
    let mut features: Vec<usize> = (0..n_features).collect();

    // (node slot, start, end, depth)
    let mut stack = vec![(0usize, 0usize, samples.len(), 0usize)];
    nodes.push(Node::Leaf { value: Vec::new() });

    while let Some((slot, start, end, depth)) = stack.pop() {
        let here = &samples[start..end];
        let (impurity, _) = criterion.impurity(here);
        let depth_ok = params.max_depth.map_or(true, |d| depth < d);

        let split = if here.len() >= params.min_samples_split && impurity > 0.0 && depth_ok {
            best_random_split(x, here, criterion, &mut features, k, rng)
        } else {
            None
        };

        let Some((feature, threshold)) = split else {
            nodes[slot] = Node::Leaf { value: criterion.leaf(here) };
            continue;
        };

        let mid = partition(&mut samples[start..end], |s| x[s][feature] <= threshold) + start;
        let left = nodes.len();
        nodes.push(Node::Leaf { value: Vec::new() });
        let right = nodes.len();
        nodes.push(Node::Leaf { value: Vec::new() });
        nodes[slot] = Node::Split { feature, threshold, left, right };
        stack.push((right, mid, end, depth + 1));
        stack.push((left, start, mid, depth + 1));
    }

    Tree { nodes }
}

/// Draw up to `k` random thresholds on non-constant features and keep the one
/// with the lowest weighted child impurity.
fn best_random_split<C: Criterion>(
    x: &[Vec<f64>],
    samples: &[usize],
    criterion: &C,
    features: &mut [usize],
    k: usize,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;
    let mut tried = 0;
    let mut left = Vec::with_capacity(samples.len());
    let mut right = Vec::with_capacity(samples.len());

    // partial Fisher-Yates: features[..i] is the visited prefix
    for i in 0..features.len() {
        if tried >= k {
            break;
        }
        let j = rng.gen_range(i..features.len());
        features.swap(i, j);
        let f = features[i];

        let (lo, hi) = samples.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(x[s][f]), hi.max(x[s][f]))
        });
        if !(hi > lo) {
            continue;
        }
        tried += 1;

        let threshold = rng.gen_range(lo..hi);
        left.clear();
        right.clear();
        for &s in samples {
            if x[s][f] <= threshold {
                left.push(s);
            } else {
                right.push(s);
            }
        }
        if left.is_empty() || right.is_empty() {
            continue;
        }
        let (li, lw) = criterion.impurity(&left);
        let (ri, rw) = criterion.impurity(&right);
        let score = li * lw + ri * rw;
        if best.map_or(true, |(_, _, b)| score < b) {
            best = Some((f, threshold, score));
        }
    }
    best.map(|(f, t, _)| (f, t))
}

/// In-place partition; returns the count of items matching `pred`.
fn partition(items: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..items.len() {
        if pred(items[i]) {
            items.swap(mid, i);
            mid += 1;
        }
    }
    mid
}

fn tree_seeds(params: &ForestParams) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    (0..params.n_estimators.max(1)).map(|_| rng.gen::<u64>()).collect()
}

fn check_width(expected: usize, row: &[f64]) -> Result<(), ModelError> {
    if row.len() != expected {
        return Err(ModelError::FeatureMismatch { expected, got: row.len() });
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtraTreesClassifier {
    pub params: ForestParams,
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<Tree>,
}

impl ExtraTreesClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self { params, classes: Vec::new(), n_features: 0, trees: Vec::new() }
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty() && !self.classes.is_empty()
    }

    /// Class labels in sorted order; index i matches probability column i.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<(), ModelError> {
        let width = validate(x, y.len())?;

        let mut classes: Vec<String> = y.to_vec();
        classes.sort();
        classes.dedup();
        let labels: Vec<usize> = y
            .iter()
            .map(|c| classes.binary_search(c).unwrap_or_default())
            .collect();

        // balanced: n / (k * count_c)
        let mut counts = vec![0usize; classes.len()];
        labels.iter().for_each(|&l| counts[l] += 1);
        let n = y.len() as f64;
        let k = classes.len() as f64;
        let weights: Vec<f64> = counts.iter().map(|&c| n / (k * c as f64)).collect();

        let gini = Gini { labels: &labels, weights: &weights, n_classes: classes.len() };
        let params = &self.params;
        // each tree owns its seed; output does not depend on scheduling
        self.trees = tree_seeds(params)
            .into_par_iter()
            .map(|seed| build_tree(x, &gini, params, &mut StdRng::seed_from_u64(seed)))
            .collect();
        self.classes = classes;
        self.n_features = width;

        debug!(target: "train", trees = self.trees.len(), classes = self.classes.len(), "classifier fitted");
        Ok(())
    }

    /// Mean of the per-tree leaf distributions.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        check_width(self.n_features, row)?;
        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.leaf_for(row)) {
                *a += p;
            }
        }
        let t = self.trees.len() as f64;
        acc.iter_mut().for_each(|a| *a /= t);
        Ok(acc)
    }

    /// Arg-max class; ties go to the first class in sorted order.
    pub fn predict(&self, row: &[f64]) -> Result<&str, ModelError> {
        self.predict_with_proba(row).map(|(label, _)| label)
    }

    /// Predicted class together with the probabilities it was picked from,
    /// walking every tree once.
    pub fn predict_with_proba(&self, row: &[f64]) -> Result<(&str, Vec<f64>), ModelError> {
        let proba = self.predict_proba(row)?;
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok((&self.classes[best], proba))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtraTreesRegressor {
    pub params: ForestParams,
    n_features: usize,
    trees: Vec<Tree>,
}

impl ExtraTreesRegressor {
    pub fn new(params: ForestParams) -> Self {
        Self { params, n_features: 0, trees: Vec::new() }
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let width = validate(x, y.len())?;
        let mse = Mse { targets: y };
        let params = &self.params;
        self.trees = tree_seeds(params)
            .into_par_iter()
            .map(|seed| build_tree(x, &mse, params, &mut StdRng::seed_from_u64(seed)))
            .collect();
        self.n_features = width;

        debug!(target: "train", trees = self.trees.len(), "regressor fitted");
        Ok(())
    }

    pub fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        check_width(self.n_features, row)?;
        let sum: f64 = self.trees.iter().map(|t| t.leaf_for(row)[0]).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> (Vec<Vec<f64>>, Vec<String>, Vec<f64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut s = Vec::new();
        for i in 0..10 {
            let j = i as f64 * 0.1;
            x.push(vec![j, 5.0, 0.0]);
            y.push("easy".to_string());
            s.push(2.0);
            x.push(vec![10.0 + j, 5.0, 1.0]);
            y.push("hard".to_string());
            s.push(8.0);
        }
        (x, y, s)
    }

    #[test]
    fn classifier_separates_blobs() {
        let (x, y, _) = blobs();
        let mut clf = ExtraTreesClassifier::new(ForestParams::classifier(25, 7));
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.classes(), ["easy", "hard"]);
        assert_eq!(clf.predict(&x[6]).unwrap(), "easy");
        assert_eq!(clf.predict(&x[7]).unwrap(), "hard");
        let p = clf.predict_proba(&[5.0, 5.0, 0.5]).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn classifier_memorises_training_set() {
        let (x, y, _) = blobs();
        let mut clf = ExtraTreesClassifier::new(ForestParams::classifier(5, 1));
        clf.fit(&x, &y).unwrap();
        for (row, label) in x.iter().zip(&y) {
            assert_eq!(clf.predict(row).unwrap(), label);
        }
    }

    #[test]
    fn regressor_tracks_targets() {
        let (x, _, s) = blobs();
        let mut reg = ExtraTreesRegressor::new(ForestParams::regressor(20, 3));
        reg.fit(&x, &s).unwrap();
        assert!((reg.predict(&x[10]).unwrap() - 2.0).abs() < 1e-9);
        assert!((reg.predict(&x[11]).unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_model() {
        let (x, y, _) = blobs();
        let mut a = ExtraTreesClassifier::new(ForestParams::classifier(10, 42));
        let mut b = ExtraTreesClassifier::new(ForestParams::classifier(10, 42));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        let probe = [5.0, 5.0, 0.5];
        assert_eq!(a.predict_proba(&probe).unwrap(), b.predict_proba(&probe).unwrap());
    }

    #[test]
    fn label_and_probabilities_come_from_one_pass() {
        let (x, y, _) = blobs();
        let mut clf = ExtraTreesClassifier::new(ForestParams::classifier(8, 11));
        clf.fit(&x, &y).unwrap();
        for row in [&x[0], &x[1], &vec![5.0, 5.0, 0.5]] {
            let (label, proba) = clf.predict_with_proba(row).unwrap();
            assert_eq!(label, clf.predict(row).unwrap());
            assert_eq!(proba, clf.predict_proba(row).unwrap());
        }
    }

    #[test]
    fn parallel_fit_matches_across_runs() {
        let (x, _, s) = blobs();
        let fit = || {
            let mut reg = ExtraTreesRegressor::new(ForestParams::regressor(32, 5));
            reg.fit(&x, &s).unwrap();
            serde_json::to_string(&reg).unwrap()
        };
        assert_eq!(fit(), fit());
    }

    #[test]
    fn constant_targets_give_single_leaf() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let mut reg = ExtraTreesRegressor::new(ForestParams::regressor(3, 0));
        reg.fit(&x, &[4.0, 4.0, 4.0]).unwrap();
        assert!(reg.trees.iter().all(|t| t.node_count() == 1));
        assert_eq!(reg.predict(&[100.0]).unwrap(), 4.0);
    }

    #[test]
    fn rejects_bad_input() {
        let mut clf = ExtraTreesClassifier::new(ForestParams::classifier(2, 0));
        assert!(matches!(clf.fit(&[], &[]), Err(ModelError::EmptyTrainingSet)));
        let x = vec![vec![1.0, 2.0], vec![1.0]];
        let y = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(clf.fit(&x, &y), Err(ModelError::RaggedRow { row: 1, .. })));
        assert!(matches!(
            clf.fit(&x[..1], &y),
            Err(ModelError::LengthMismatch { rows: 1, targets: 2 })
        ));
        assert!(matches!(clf.predict(&[1.0, 2.0]), Err(ModelError::NotFitted)));
    }

    #[test]
    fn wrong_width_at_predict_is_an_error() {
        let (x, _, s) = blobs();
        let mut reg = ExtraTreesRegressor::new(ForestParams::regressor(2, 0));
        reg.fit(&x, &s).unwrap();
        assert!(matches!(
            reg.predict(&[1.0]),
            Err(ModelError::FeatureMismatch { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn sqrt_rounds_down() {
        assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(9), 3);
        // default vocabulary plus the engineered columns
        assert_eq!(MaxFeatures::Sqrt.resolve(3009), 54);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::All.resolve(9), 9);
    }
}
