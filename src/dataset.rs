//! Loading and formatting of the Spider benchmark dataset.

use crate::config::Config;
use crate::log_debug;

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One Spider benchmark example
#[derive(Debug, Clone, Deserialize)]
pub struct SpiderExample {
    /// Natural-language question
    pub question: String,
    /// Ground-truth SQL for the question
    #[serde(rename = "query")]
    pub gold_sql: String,
    /// Identifier of the database the question targets
    pub db_id: String,
}

/// Schema metadata for one database, as laid out in `tables.json`
#[derive(Debug, Clone, Deserialize)]
struct SchemaEntry {
    db_id: String,
    table_names_original: Vec<String>,
    /// Pairs of (table index, column name); index -1 is the `*` pseudo-column
    column_names_original: Vec<(i64, String)>,
}

/// Dataset error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Could not find Spider file: {0}")]
    MissingFile(PathBuf),
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown Spider database id: {0}")]
    UnknownDbId(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reader for the Spider development set.
///
/// Examples and schema metadata are loaded once and read-only thereafter.
#[derive(Debug)]
pub struct SpiderDataset {
    examples: Vec<SpiderExample>,
    schemas: HashMap<String, SchemaEntry>,
}

impl SpiderDataset {
    /// Load the dataset from `root`, which must contain the dev and
    /// tables JSON files.
    pub fn load(
        root: &Path,
        dev_filename: &str,
        tables_filename: &str,
    ) -> Result<Self, DatasetError> {
        let dev_path = root.join(dev_filename);
        let tables_path = root.join(tables_filename);

        if !dev_path.exists() {
            return Err(DatasetError::MissingFile(dev_path));
        }
        if !tables_path.exists() {
            return Err(DatasetError::MissingFile(tables_path));
        }

        log_debug!("Loading Spider dev set from {}", dev_path.display());
        let dev_content = fs::read_to_string(&dev_path)?;
        let examples: Vec<SpiderExample> =
            serde_json::from_str(&dev_content).map_err(|source| DatasetError::Parse {
                path: dev_path,
                source,
            })?;
        log_debug!("Loaded {} Spider examples", examples.len());

        log_debug!("Loading schema metadata from {}", tables_path.display());
        let tables_content = fs::read_to_string(&tables_path)?;
        let entries: Vec<SchemaEntry> =
            serde_json::from_str(&tables_content).map_err(|source| DatasetError::Parse {
                path: tables_path,
                source,
            })?;
        let schemas = entries
            .into_iter()
            .map(|entry| (entry.db_id.clone(), entry))
            .collect();

        Ok(Self { examples, schemas })
    }

    /// Load the dataset from the paths named in `config`
    pub fn from_config(config: &Config) -> Result<Self, DatasetError> {
        Self::load(
            &config.spider_path,
            &config.dev_filename,
            &config.tables_filename,
        )
    }

    /// Number of examples in the dev set
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the dev set is empty
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// All examples, in file order
    pub fn examples(&self) -> &[SpiderExample] {
        &self.examples
    }

    /// Iterate over examples with an optional limit
    pub fn iter_examples(&self, limit: Option<usize>) -> impl Iterator<Item = &SpiderExample> {
        let take = limit.unwrap_or(self.examples.len());
        self.examples.iter().take(take)
    }

    /// Human-readable schema description for `db_id`.
    ///
    /// One line per table: `Table: name(col1, col2, ...)`, columns in
    /// declaration order. The `*` pseudo-column (table index -1) is skipped.
    pub fn get_schema(&self, db_id: &str) -> Result<String, DatasetError> {
        let schema = self
            .schemas
            .get(db_id)
            .ok_or_else(|| DatasetError::UnknownDbId(db_id.to_string()))?;

        let mut table_columns: Vec<Vec<&str>> = vec![Vec::new(); schema.table_names_original.len()];
        for (table_idx, column_name) in &schema.column_names_original {
            // Index -1 is the pseudo-column for `*`
            let Ok(idx) = usize::try_from(*table_idx) else {
                continue;
            };
            if let Some(columns) = table_columns.get_mut(idx) {
                columns.push(column_name.as_str());
            }
        }

        let lines: Vec<String> = schema
            .table_names_original
            .iter()
            .zip(&table_columns)
            .map(|(table_name, columns)| format!("Table: {table_name}({})", columns.join(", ")))
            .collect();

        let schema_str = lines.join("\n");
        log_debug!("Schema for {db_id}:\n{schema_str}");
        Ok(schema_str)
    }
}
