use std::fs;
use std::path::Path;

use tempfile::TempDir;

use text2sql::{DatasetError, SpiderDataset};

fn write_fixture(dir: &Path) {
    fs::write(
        dir.join("dev.json"),
        serde_json::json!([
            {"question": "How many heads are there?", "query": "SELECT count(*) FROM head", "db_id": "department_management"},
            {"question": "List singers by age.", "query": "SELECT name FROM singer ORDER BY age", "db_id": "concert_singer"},
            {"question": "List all names.", "query": "SELECT name FROM head", "db_id": "department_management"}
        ])
        .to_string(),
    )
    .expect("write dev.json");

    fs::write(
        dir.join("tables.json"),
        serde_json::json!([
            {
                "db_id": "department_management",
                "table_names_original": ["a", "b"],
                "column_names_original": [[0, "x"], [1, "y"], [-1, "*"]]
            },
            {
                "db_id": "concert_singer",
                "table_names_original": ["singer", "concert", "empty_table"],
                "column_names_original": [
                    [-1, "*"],
                    [0, "name"],
                    [0, "age"],
                    [1, "venue"]
                ]
            }
        ])
        .to_string(),
    )
    .expect("write tables.json");
}

fn fixture_dataset() -> (TempDir, SpiderDataset) {
    let dir = TempDir::new().expect("temp dir");
    write_fixture(dir.path());
    let dataset =
        SpiderDataset::load(dir.path(), "dev.json", "tables.json").expect("dataset loads");
    (dir, dataset)
}

#[test]
fn test_load_reads_examples_in_order() {
    let (_dir, dataset) = fixture_dataset();
    assert_eq!(dataset.len(), 3);
    assert!(!dataset.is_empty());

    let first = &dataset.examples()[0];
    assert_eq!(first.question, "How many heads are there?");
    assert_eq!(first.gold_sql, "SELECT count(*) FROM head");
    assert_eq!(first.db_id, "department_management");
}

#[test]
fn test_iter_examples_with_limit() {
    let (_dir, dataset) = fixture_dataset();
    assert_eq!(dataset.iter_examples(Some(2)).count(), 2);
    assert_eq!(dataset.iter_examples(None).count(), 3);
    // Limits beyond the dataset size are harmless
    assert_eq!(dataset.iter_examples(Some(10)).count(), 3);
}

#[test]
fn test_schema_formatting_skips_star_sentinel() {
    let (_dir, dataset) = fixture_dataset();
    let schema = dataset
        .get_schema("department_management")
        .expect("known db_id");
    assert_eq!(schema, "Table: a(x)\nTable: b(y)");
}

#[test]
fn test_schema_formatting_orders_columns_per_table() {
    let (_dir, dataset) = fixture_dataset();
    let schema = dataset.get_schema("concert_singer").expect("known db_id");
    assert_eq!(
        schema,
        "Table: singer(name, age)\nTable: concert(venue)\nTable: empty_table()"
    );
}

#[test]
fn test_unknown_db_id_fails_fast() {
    let (_dir, dataset) = fixture_dataset();
    let err = dataset.get_schema("no_such_db").expect_err("unknown db_id");
    assert!(matches!(err, DatasetError::UnknownDbId(_)));
    assert!(err.to_string().contains("no_such_db"));
}

#[test]
fn test_missing_dev_file_is_load_error() {
    let dir = TempDir::new().expect("temp dir");
    // tables.json exists, dev.json does not
    fs::write(dir.path().join("tables.json"), "[]").expect("write tables.json");

    let err = SpiderDataset::load(dir.path(), "dev.json", "tables.json")
        .expect_err("missing dev file");
    assert!(matches!(err, DatasetError::MissingFile(_)));
    assert!(err.to_string().contains("dev.json"));
}

#[test]
fn test_missing_tables_file_is_load_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("dev.json"), "[]").expect("write dev.json");

    let err = SpiderDataset::load(dir.path(), "dev.json", "tables.json")
        .expect_err("missing tables file");
    assert!(matches!(err, DatasetError::MissingFile(_)));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("dev.json"), "not json").expect("write dev.json");
    fs::write(dir.path().join("tables.json"), "[]").expect("write tables.json");

    let err =
        SpiderDataset::load(dir.path(), "dev.json", "tables.json").expect_err("bad dev JSON");
    assert!(matches!(err, DatasetError::Parse { .. }));
}
