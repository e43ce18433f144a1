use crate::common::CommonParams;
use crate::config::Config;
use crate::dataset::SpiderDataset;
use crate::evaluate;
use crate::extract::extract_sql;
use crate::llm::SqlLlmClient;
use crate::prompt::build_prompt;
use crate::routers::{Router, RouterSettings};
use crate::ui;
use crate::{log_error, log_info};

use anyhow::Result;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Generate one prediction per example, in input order.
///
/// A generation failure (after the client's own retries) is isolated to
/// its example: it is logged with the failing `db_id` and degrades to an
/// empty-string prediction so the run always completes with one output
/// line per input. Schema lookup failures abort the run, since they point
/// at a dataset consistency problem.
pub async fn generate_predictions(
    client: &SqlLlmClient,
    dataset: &SpiderDataset,
    model: &str,
    limit: Option<usize>,
    mut on_progress: impl FnMut(),
) -> Result<Vec<String>> {
    let mut predictions = Vec::new();

    for example in dataset.iter_examples(limit) {
        let schema = dataset.get_schema(&example.db_id)?;
        let prompt = build_prompt(&example.question, &schema);

        let predicted_sql = match client.generate(&prompt, model).await {
            Ok(result) => {
                let sql = extract_sql(&result.sql);
                log_info!("Predicted SQL Query: {sql}");
                sql
            }
            Err(e) => {
                log_error!("Failed to generate SQL for {}: {e}", example.db_id);
                String::new()
            }
        };

        predictions.push(predicted_sql);
        on_progress();
    }

    Ok(predictions)
}

/// Handle the `run` command: generate predictions for the Spider dev set
pub async fn handle_run_command(
    common: CommonParams,
    num_samples: Option<usize>,
    out: PathBuf,
) -> Result<()> {
    // Pick up API keys from a .env file when present
    let _ = dotenvy::dotenv();

    let config = Config::load(common.config.as_deref())?;
    let model = common.resolve_model(&config)?;
    let router = common.resolve_router(&config)?;

    log_info!("Using router {router} with model {model}");
    ui::print_info(&format!("Router: {router} | Model: {model}"));

    let dataset = SpiderDataset::from_config(&config)?;
    let client = SqlLlmClient::new(router, None, &config)?;

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let total = num_samples.map_or(dataset.len(), |n| n.min(dataset.len()));
    let progress = ui::create_progress_bar(total as u64, "Generating SQL");

    let start_time = Instant::now();
    let predictions =
        generate_predictions(&client, &dataset, &model, num_samples, || progress.inc(1)).await?;
    progress.finish_and_clear();
    let elapsed = start_time.elapsed();

    fs::write(&out, predictions.join("\n") + "\n")?;
    log_info!("Saved {} predictions to {}", predictions.len(), out.display());

    #[allow(clippy::cast_precision_loss)]
    let avg_latency = if predictions.is_empty() {
        0.0
    } else {
        elapsed.as_secs_f64() / predictions.len() as f64
    };
    log_info!(
        "Total latency: {:.2} seconds (avg {avg_latency:.2} s/example)",
        elapsed.as_secs_f64()
    );
    ui::print_success(&format!(
        "Saved {} predictions to {} in {:.2}s (avg {avg_latency:.2}s/example)",
        predictions.len(),
        out.display(),
        elapsed.as_secs_f64()
    ));

    Ok(())
}

/// Handle the `evaluate` command: score predictions with the official script
pub async fn handle_evaluate_command(common: CommonParams, predictions: PathBuf) -> Result<()> {
    let config = Config::load(common.config.as_deref())?;

    // Keep the temp file guard alive for the duration of the evaluation
    let (pred_sql_path, _guard) = evaluate::flatten_predictions(&predictions)?;

    evaluate::run_spider_evaluation(
        &config.gold_sql_path(),
        &pred_sql_path,
        &config.database_path(),
    )
    .await
}

/// Handle the `list-routers` command
pub fn handle_list_routers_command(common: &CommonParams) -> Result<()> {
    let config = Config::load(common.config.as_deref())?;

    println!("{}", "Available LLM routers:".bright_magenta().bold());
    for router in Router::ALL {
        let settings = RouterSettings::for_router(*router, &config);
        let key_present = std::env::var(&settings.api_key_env).is_ok_and(|v| !v.is_empty());
        let key_status = if key_present {
            "key set".green()
        } else {
            "key missing".yellow()
        };
        let default_marker = if router.name() == config.default_router {
            " (default)"
        } else {
            ""
        };
        println!(
            "  {}{default_marker}: {} [{}] ({key_status})",
            router.name().bold(),
            settings.base_url,
            settings.api_key_env
        );
    }

    Ok(())
}
