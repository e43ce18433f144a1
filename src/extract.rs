//! SQL extraction from free-text model responses.
//!
//! Models rarely return a bare statement: the SQL tends to arrive wrapped
//! in markdown fences, prefixed with labels like "SQL Query:", or buried
//! after a conversational preamble. This module reduces all of those shapes
//! to a plain SQL string. It is a textual cleanup, not a parser, and makes
//! no claim about the validity of the result.

use regex::Regex;
use std::sync::LazyLock;

static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)^```(?:sql)?\s*").unwrap()
});

static FENCE_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\s*```$").unwrap()
});

static SQL_QUERY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)^sql\s*query:\s*").unwrap()
});

static THE_SQL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)^the\s*sql\s*(query|statement)\s*(is)?:\s*").unwrap()
});

static STATEMENT_START: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)(SELECT|WITH)\s").unwrap()
});

/// Extract a bare SQL statement from a model response.
///
/// Handles formats like:
/// - ```` ```sql\nSELECT * FROM t\n``` ````
/// - `SQL Query: SELECT * FROM t`
/// - `Sure! The answer is: SELECT * FROM t`
/// - plain `SELECT * FROM t`
///
/// Total function: empty input yields empty output, and applying it to its
/// own output is a no-op.
pub fn extract_sql(response: &str) -> String {
    if response.is_empty() {
        return String::new();
    }

    let text = response.trim();

    // 1. Remove ```sql or ``` fences if they exist
    let text = FENCE_OPEN.replace(text, "");
    let text = FENCE_CLOSE.replace(&text, "");

    // 2. Remove common prefixes like "SQL Query:" or "The SQL is:"
    let text = SQL_QUERY_LABEL.replace(&text, "");
    let text = THE_SQL_LABEL.replace(&text, "");

    // 3. Models sometimes return explanation + query. Keep from the first
    //    SELECT or WITH onwards.
    let text: &str = &text;
    let text = match STATEMENT_START.find(text) {
        Some(m) => &text[m.start()..],
        None => text,
    };

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_sql_fence() {
        assert_eq!(extract_sql("```sql\nSELECT * FROM t\n```"), "SELECT * FROM t");
    }

    #[test]
    fn test_strips_bare_fence() {
        assert_eq!(extract_sql("``` SELECT * FROM t ```"), "SELECT * FROM t");
    }

    #[test]
    fn test_strips_query_label() {
        assert_eq!(extract_sql("SQL Query: SELECT a FROM b"), "SELECT a FROM b");
        assert_eq!(
            extract_sql("The SQL statement is: SELECT a FROM b"),
            "SELECT a FROM b"
        );
    }

    #[test]
    fn test_discards_preamble() {
        assert_eq!(extract_sql("Sure! The answer is: SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_keeps_with_clause() {
        assert_eq!(
            extract_sql("Here you go:\nWITH t AS (SELECT 1) SELECT * FROM t"),
            "WITH t AS (SELECT 1) SELECT * FROM t"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_sql(""), "");
    }

    #[test]
    fn test_plain_sql_untouched() {
        assert_eq!(extract_sql("SELECT count(*) FROM head"), "SELECT count(*) FROM head");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "```sql\nSELECT * FROM t\n```",
            "SQL Query: SELECT a FROM b",
            "Sure! The answer is: SELECT 1",
            "no sql here at all",
            "",
        ];
        for sample in samples {
            let once = extract_sql(sample);
            assert_eq!(extract_sql(&once), once, "not idempotent for {sample:?}");
        }
    }
}
