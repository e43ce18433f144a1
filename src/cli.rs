use crate::commands;
use crate::common::CommonParams;
use crate::log_debug;
use crate::routers::Router;
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::path::PathBuf;

const LOG_FILE: &str = "text2sql-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "Text2SQL: Spider Text-to-SQL baseline harness",
    long_about = "Text2SQL generates SQL for Spider benchmark questions via hosted LLM routers, extracts clean statements from model responses, and hands predictions to the official evaluation script.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (progress bars, status lines, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Generate SQL predictions for the Spider dev set
    #[command(
        about = "Generate SQL predictions for the Spider dev set",
        long_about = "Send each Spider question to the configured LLM router, extract the SQL from the response, and write one prediction per line.",
        after_help = get_dynamic_help()
    )]
    Run {
        #[command(flatten)]
        common: CommonParams,

        /// Number of examples to evaluate (default: all)
        #[arg(short, long, help = "Number of examples to evaluate (default: all)")]
        num_samples: Option<usize>,

        /// Destination path for predictions
        #[arg(
            short,
            long,
            default_value = "predictions.sql",
            help = "Destination path for predictions"
        )]
        out: PathBuf,
    },

    /// Score a predictions file with the official Spider evaluator
    #[command(
        about = "Score a predictions file with the official Spider evaluator",
        long_about = "Run the official Spider evaluation script against a predictions file (flat SQL lines or JSONL with pred_sql records) and print its metrics."
    )]
    Evaluate {
        #[command(flatten)]
        common: CommonParams,

        /// Path to the predictions file
        #[arg(help = "Path to the predictions file")]
        predictions: PathBuf,
    },

    /// List configured LLM routers
    #[command(about = "List configured LLM routers and their API key variables")]
    ListRouters {
        #[command(flatten)]
        common: CommonParams,
    },
}

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Generate dynamic help including available LLM routers
fn get_dynamic_help() -> String {
    let mut routers = Router::all_names();
    routers.sort_unstable();

    let routers_list = routers
        .iter()
        .map(|r| format!("{}", r.bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable LLM Routers: {routers_list}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
        log_debug!("Debug logging to {log_file}");
    } else {
        crate::logger::disable_logging();
    }

    // Set quiet mode in the UI module
    if cli.quiet {
        crate::ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        // If no subcommand is provided, print the help
        let _ = Cli::parse_from(["text2sql", "--help"]);
        Ok(())
    }
}

/// Dispatch a parsed subcommand to its handler
async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            common,
            num_samples,
            out,
        } => commands::handle_run_command(common, num_samples, out).await,
        Commands::Evaluate {
            common,
            predictions,
        } => commands::handle_evaluate_command(common, predictions).await,
        Commands::ListRouters { common } => commands::handle_list_routers_command(&common),
    }
}
