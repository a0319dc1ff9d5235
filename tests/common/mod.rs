use std::io::Write;
use std::path::Path;

use autojudge::config::AppConfig;
use autojudge::dataset::ProblemRecord;

const EASY: &[&str] = &[
    "print the sum of two integers",
    "read an integer and print whether it is even or odd",
    "swap two numbers and print them",
    "print the max and min of the input numbers",
    "reverse the input string and print it",
];

const MEDIUM: &[&str] = &[
    "use binary search on the sorted array",
    "greedy choice after sorting the intervals",
    "sliding window with two pointers over the array",
    "bfs on a grid to find the nearest exit",
    "prefix sum queries over a stack of plates",
];

const HARD: &[&str] = &[
    "dynamic programming over bitmask subsets in 2^n",
    "dijkstra on a weighted graph with log factor",
    "segment tree with lazy propagation",
    "max flow on a bipartite graph",
    "count strongly connected components and combinatorics",
];

pub fn records() -> Vec<ProblemRecord> {
    let mut out = Vec::new();
    for (class, score, texts) in [("easy", 2.0, EASY), ("medium", 5.0, MEDIUM), ("hard", 8.5, HARD)] {
        for (i, t) in texts.iter().enumerate() {
            out.push(ProblemRecord {
                title: Some(format!("{class} {i}")),
                description: Some(t.to_string()),
                input_description: Some("The first line contains n.".into()),
                output_description: Some("Print the answer.".into()),
                problem_class: class.into(),
                problem_score: score + i as f64 * 0.1,
                line: 0,
            });
        }
    }
    out
}

pub fn write_dataset(path: &Path) {
    let mut f = std::fs::File::create(path).unwrap();
    for r in records() {
        writeln!(f, "{}", serde_json::to_string(&r).unwrap()).unwrap();
    }
}

pub fn small_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.classifier.n_estimators = 15;
    cfg.regressor.n_estimators = 15;
    cfg.vectorizer.max_features = 200;
    cfg
}
