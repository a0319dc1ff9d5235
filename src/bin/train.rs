//! Offline trainer: reads the JSONL dataset, prints held-out metrics and
//! writes the three model artifacts.
//!
//! Usage: `autojudge-train [DATASET] [MODEL_DIR]`. Positional arguments win
//! over `DATASET_PATH` / `MODEL_DIR` and the TOML config.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use autojudge::config::AppConfig;
use autojudge::telemetry;
use autojudge::train;

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cfg = AppConfig::from_env();
    let mut args = std::env::args().skip(1);
    let dataset = args.next().map(PathBuf::from).unwrap_or_else(|| cfg.training.dataset.clone());
    let model_dir = args.next().map(PathBuf::from).unwrap_or_else(|| cfg.model.dir.clone());

    info!(target: "train", dataset = %dataset.display(), model_dir = %model_dir.display(), "Loading data and extracting features");
    let report = train::run(&dataset, &model_dir, &cfg)
        .with_context(|| format!("training on {} failed", dataset.display()))?;

    match (&report.report, report.mae) {
        (Some(r), Some(mae)) => {
            println!("\nFinal Accuracy: {:.2}%", r.accuracy * 100.0);
            println!("{r}");
            println!("Mean absolute error (score): {mae:.3}");
        }
        _ => println!("Dataset too small for a held-out split; skipped evaluation."),
    }
    println!("Models saved to {}", model_dir.display());
    Ok(())
}
