//! Held-out evaluation: accuracy, per-class report and mean absolute error.

use std::fmt;

use serde::Serialize;

pub fn accuracy(truth: &[String], pred: &[String]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth.iter().zip(pred).filter(|(t, p)| t == p).count();
    hits as f64 / truth.len() as f64
}

pub fn mean_absolute_error(truth: &[f64], pred: &[f64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    truth.iter().zip(pred).map(|(t, p)| (t - p).abs()).sum::<f64>() / truth.len() as f64
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassStats {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall, F1 and support, in sorted class order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassStats>,
    pub accuracy: f64,
}

impl ClassificationReport {
    /// Classes are the union of the true and predicted labels. A ratio whose
    /// denominator is zero is reported as 0.
    pub fn new(truth: &[String], pred: &[String]) -> Self {
        let mut labels: Vec<&String> = truth.iter().chain(pred).collect();
        labels.sort();
        labels.dedup();

        let classes = labels
            .into_iter()
            .map(|c| {
                let tp = truth.iter().zip(pred).filter(|(t, p)| *t == c && *p == c).count();
                let predicted = pred.iter().filter(|p| *p == c).count();
                let support = truth.iter().filter(|t| *t == c).count();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassStats { class: c.clone(), precision, recall, f1, support }
            })
            .collect();

        Self { classes, accuracy: accuracy(truth, pred) }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.class, c.precision, c.recall, c.f1, c.support
            )?;
        }
        let total: usize = self.classes.iter().map(|c| c.support).sum();
        write!(f, "{:>12} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&s(&["a", "b", "a", "b"]), &s(&["a", "a", "a", "b"])), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn mae() {
        assert!((mean_absolute_error(&[1.0, 2.0, 3.0], &[2.0, 2.0, 1.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn report_per_class() {
        let truth = s(&["easy", "easy", "hard", "hard"]);
        let pred = s(&["easy", "hard", "hard", "hard"]);
        let r = ClassificationReport::new(&truth, &pred);
        assert_eq!(r.classes.len(), 2);
        let easy = &r.classes[0];
        assert_eq!((easy.precision, easy.recall, easy.support), (1.0, 0.5, 2));
        let hard = &r.classes[1];
        assert!((hard.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(hard.recall, 1.0);
        assert!((hard.f1 - 0.8).abs() < 1e-12);
        assert!(r.to_string().contains("accuracy"));
    }

    #[test]
    fn class_never_predicted_scores_zero() {
        let r = ClassificationReport::new(&s(&["medium"]), &s(&["easy"]));
        let medium = r.classes.iter().find(|c| c.class == "medium").unwrap();
        assert_eq!((medium.precision, medium.recall, medium.f1), (0.0, 0.0, 0.0));
    }
}
