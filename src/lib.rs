//! Text2SQL - Spider Text-to-SQL baseline harness
//!
//! This library loads Spider benchmark questions with their database
//! schemas, prompts a hosted LLM router for SQL, extracts clean statements
//! from the model's free-text responses, and writes predictions for the
//! official Spider evaluation script.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod dataset;
pub mod evaluate;
pub mod extract;
pub mod llm;
pub mod logger;
pub mod prompt;
pub mod routers;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use dataset::{DatasetError, SpiderDataset, SpiderExample};
pub use extract::extract_sql;
pub use llm::{LlmError, LlmResult, SqlLlmClient};
pub use prompt::build_prompt;
pub use routers::{Router, RouterSettings};
