//! Zero-shot prompt template for Text-to-SQL generation.

/// Template with `{schema}` and `{question}` placeholders.
///
/// The wording is deliberately fixed: the prompt must be a pure function
/// of its inputs so that runs are reproducible.
const ZERO_SHOT_TEMPLATE: &str = "\
You are an expert SQL developer.
Given the following database schema:
{schema}
Write a correct SQL query to answer this question:
Q: {question}
Only output the SQL query.";

/// Build the zero-shot prompt for `question` and `schema`.
///
/// Both inputs are whitespace-trimmed before substitution. Total over any
/// text inputs, including empty strings.
pub fn build_prompt(question: &str, schema: &str) -> String {
    ZERO_SHOT_TEMPLATE
        .replace("{schema}", schema.trim())
        .replace("{question}", question.trim())
}
