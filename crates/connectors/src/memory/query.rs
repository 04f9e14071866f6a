use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Syntax error, expected '{expected}' but found '{found}'")]
    Expected { expected: String, found: String },

    #[error("Syntax error, invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Syntax error, '{0}' does not refer to alias '{1}'")]
    UnknownAlias(String, String),

    #[error("Syntax error, invalid literal '{0}'")]
    InvalidLiteral(String),
}

/// Equality predicate on a (possibly nested) property.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub path: Vec<String>,
    pub value: Value,
}

impl Filter {
    pub fn matches(&self, record: &Value) -> bool {
        let mut current = record;
        for segment in &self.path {
            match current.get(segment) {
                Some(next) => current = next,
                None => return false,
            }
        }

        match (current, &self.value) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (a, b) => a == b,
        }
    }
}

/// The query subset understood by the in-memory backend:
/// `SELECT * FROM <alias> [WHERE <alias>.<path> = <literal>]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuery {
    pub alias: String,
    pub filter: Option<Filter>,
}

impl FeedQuery {
    pub fn scan_all() -> Self {
        FeedQuery {
            alias: "root".to_string(),
            filter: None,
        }
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(record))
    }
}

pub fn parse(text: &str) -> Result<FeedQuery, QueryError> {
    let text = text.trim().trim_end_matches(';');

    let rest = expect_keyword(text, "select")?;
    let rest = expect_keyword(rest, "*")?;
    let rest = expect_keyword(rest, "from")?;
    let (alias, rest) = split_word(rest);
    if !is_identifier(alias) {
        return Err(QueryError::InvalidIdentifier(alias.to_string()));
    }

    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(FeedQuery {
            alias: alias.to_string(),
            filter: None,
        });
    }

    let condition = expect_keyword(rest, "where")?;
    let (lhs, rhs) = condition.split_once('=').ok_or_else(|| QueryError::Expected {
        expected: "=".to_string(),
        found: condition.trim().to_string(),
    })?;

    let path = parse_path(lhs.trim(), alias)?;
    let value = parse_literal(rhs.trim())?;

    Ok(FeedQuery {
        alias: alias.to_string(),
        filter: Some(Filter { path, value }),
    })
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], &input[idx..]),
        None => (input, ""),
    }
}

fn expect_keyword<'a>(input: &'a str, keyword: &str) -> Result<&'a str, QueryError> {
    let (word, rest) = split_word(input);
    if word.eq_ignore_ascii_case(keyword) {
        Ok(rest)
    } else {
        Err(QueryError::Expected {
            expected: keyword.to_string(),
            found: word.to_string(),
        })
    }
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_path(expr: &str, alias: &str) -> Result<Vec<String>, QueryError> {
    let mut segments = expr.split('.');
    let head = segments.next().unwrap_or_default();
    if head != alias {
        return Err(QueryError::UnknownAlias(expr.to_string(), alias.to_string()));
    }

    let path: Vec<String> = segments.map(str::to_string).collect();
    if path.is_empty() {
        return Err(QueryError::InvalidIdentifier(expr.to_string()));
    }
    if let Some(bad) = path.iter().find(|s| !is_identifier(s)) {
        return Err(QueryError::InvalidIdentifier(bad.clone()));
    }
    Ok(path)
}

fn parse_literal(raw: &str) -> Result<Value, QueryError> {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Ok(Value::String(raw[1..raw.len() - 1].to_string()));
    }
    serde_json::from_str(raw).map_err(|_| QueryError::InvalidLiteral(raw.to_string()))
}
