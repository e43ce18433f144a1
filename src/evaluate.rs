//! Wrapper around the official Spider evaluation script.
//!
//! Metrics are computed out of process: the script lives next to the gold
//! SQL file in the dataset directory and prints accuracy tables to stdout,
//! which is passed straight through.

use crate::{log_debug, log_info};

use anyhow::{Context, Result, anyhow, bail};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Flatten a predictions file into the flat SQL shape the evaluator expects.
///
/// Accepts either a flat file of SQL lines (returned as-is) or a JSONL file
/// of `{"pred_sql": ...}` records, which is rewritten to a temporary flat
/// file. The temp file guard must be kept alive while the path is in use.
pub fn flatten_predictions(predictions_path: &Path) -> Result<(PathBuf, Option<NamedTempFile>)> {
    let content = std::fs::read_to_string(predictions_path)
        .with_context(|| format!("failed to read {}", predictions_path.display()))?;

    let looks_like_jsonl = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.trim_start().starts_with('{'));
    if !looks_like_jsonl {
        return Ok((predictions_path.to_path_buf(), None));
    }

    log_debug!(
        "Flattening JSONL predictions from {}",
        predictions_path.display()
    );
    let mut flat = NamedTempFile::new().context("failed to create temporary SQL file")?;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let record: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("invalid JSONL record in {}", predictions_path.display()))?;
        let pred_sql = record
            .get("pred_sql")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        writeln!(flat, "{}", pred_sql.trim())?;
    }
    flat.flush()?;

    let path = flat.path().to_path_buf();
    Ok((path, Some(flat)))
}

/// Execute the official Spider evaluation script as a child process.
///
/// The script's stdout and stderr are inherited; a non-zero exit status is
/// an error.
pub async fn run_spider_evaluation(
    gold_sql_path: &Path,
    pred_sql_path: &Path,
    database_dir: &Path,
) -> Result<()> {
    let script = gold_sql_path
        .parent()
        .map(|dir| dir.join("evaluate.py"))
        .ok_or_else(|| anyhow!("gold SQL path has no parent directory"))?;

    log_info!(
        "Running Spider evaluation: python {} --gold {} --pred {} --db {}",
        script.display(),
        gold_sql_path.display(),
        pred_sql_path.display(),
        database_dir.display()
    );

    let status = Command::new("python")
        .arg(&script)
        .arg("--gold")
        .arg(gold_sql_path)
        .arg("--pred")
        .arg(pred_sql_path)
        .arg("--db")
        .arg(database_dir)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("failed to launch {}", script.display()))?;

    if !status.success() {
        bail!("Spider evaluation exited with {status}");
    }
    Ok(())
}
