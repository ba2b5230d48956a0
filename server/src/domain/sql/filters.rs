//! Structured field filters → WHERE predicates
//!
//! Operator text is emitted lowercase (`like`, `not between`).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::sql::quote_literal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unsupported filter operator: {0}")]
    UnsupportedOperator(String),
    #[error("operator '{operator}' needs at least {expected} value(s), got {got}")]
    MissingValues {
        operator: FilterOperator,
        expected: usize,
        got: usize,
    },
    #[error("filter field name is empty")]
    EmptyFieldPath,
}

/// Comparison operator of a [`FilterCondition`]
///
/// Parsed case-insensitively; runs of inner whitespace collapse, so
/// `"NOT   LIKE"` is [`FilterOperator::NotLike`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String")]
pub enum FilterOperator {
    Eq,
    Ne,
    Like,
    NotLike,
    MatchAll,
    MatchAny,
    MatchPhrase,
    MatchPhrasePrefix,
    IsNull,
    IsNotNull,
    Between,
    NotBetween,
    In,
    NotIn,
    Unsupported(String),
}

impl From<String> for FilterOperator {
    fn from(raw: String) -> Self {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "=" => Self::Eq,
            "!=" => Self::Ne,
            "like" => Self::Like,
            "not like" => Self::NotLike,
            "match_all" => Self::MatchAll,
            "match_any" => Self::MatchAny,
            "match_phrase" => Self::MatchPhrase,
            "match_phrase_prefix" => Self::MatchPhrasePrefix,
            "is null" => Self::IsNull,
            "is not null" => Self::IsNotNull,
            "between" => Self::Between,
            "not between" => Self::NotBetween,
            "in" => Self::In,
            "not in" => Self::NotIn,
            _ => Self::Unsupported(raw),
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl FilterOperator {
    pub fn as_sql(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::MatchAll => "match_all",
            Self::MatchAny => "match_any",
            Self::MatchPhrase => "match_phrase",
            Self::MatchPhrasePrefix => "match_phrase_prefix",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
            Self::Between => "between",
            Self::NotBetween => "not between",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Unsupported(raw) => raw,
        }
    }

    /// Minimum number of values the operator consumes
    fn arity(&self) -> usize {
        match self {
            Self::IsNull | Self::IsNotNull | Self::Unsupported(_) => 0,
            Self::Between | Self::NotBetween => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A scalar filter operand as it arrives in JSON
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Null,
}

impl SqlValue {
    /// Strings become quoted literals; everything else renders bare
    pub fn to_sql(&self) -> String {
        match self {
            Self::Text(s) => quote_literal(s),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Null => "NULL".to_string(),
        }
    }
}

/// One structured filter from the UI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterCondition {
    #[serde(rename = "fieldName", alias = "field_name", alias = "FieldName")]
    pub field_name: String,
    #[serde(alias = "Operator")]
    pub operator: FilterOperator,
    #[serde(default, alias = "Value")]
    pub value: Vec<SqlValue>,
}

impl FilterCondition {
    /// Compile to a predicate without the surrounding parentheses
    pub fn compile(&self) -> Result<String, FilterError> {
        if self.field_name.is_empty() {
            return Err(FilterError::EmptyFieldPath);
        }
        if let FilterOperator::Unsupported(raw) = &self.operator {
            return Err(FilterError::UnsupportedOperator(raw.clone()));
        }

        let expected = self.operator.arity();
        if self.value.len() < expected {
            return Err(FilterError::MissingValues {
                operator: self.operator.clone(),
                expected,
                got: self.value.len(),
            });
        }

        let field = transform_field_path(&self.field_name);
        let op = self.operator.as_sql();
        let values: Vec<String> = self.value.iter().map(SqlValue::to_sql).collect();

        let sql = match self.operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => format!("{} {}", field, op),
            FilterOperator::Between | FilterOperator::NotBetween => {
                format!("{} {} {} AND {}", field, op, values[0], values[1])
            }
            FilterOperator::In | FilterOperator::NotIn => {
                format!("{} {} ({})", field, op, values.join(", "))
            }
            _ => format!("{} {} {}", field, op, values[0]),
        };
        Ok(sql)
    }
}

/// `a.b.c` → `a['b']['c']` (variant sub-column access)
pub fn transform_field_path(path: &str) -> String {
    let mut parts = path.split('.');
    let mut result = parts.next().unwrap_or_default().to_string();
    for part in parts {
        result.push('[');
        result.push_str(&quote_literal(part));
        result.push(']');
    }
    result
}

/// Append one filter as ` WHERE (…)` or ` AND (…)`.
///
/// The choice is made by a case-insensitive search for `WHERE` anywhere in
/// the statement. A filter that fails to compile is skipped with a warning.
pub fn add_sql_filter(statement: &mut String, filter: &FilterCondition) {
    let predicate = match filter.compile() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(field = %filter.field_name, error = %e, "Skipping filter");
            return;
        }
    };

    if statement.to_uppercase().contains("WHERE") {
        statement.push_str(" AND");
    } else {
        statement.push_str(" WHERE");
    }
    statement.push_str(" (");
    statement.push_str(&predicate);
    statement.push(')');
}

/// Append every filter in input order
pub fn apply_filters(statement: &mut String, filters: &[FilterCondition]) {
    for filter in filters {
        add_sql_filter(statement, filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(value: serde_json::Value) -> FilterCondition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_transform_field_path() {
        assert_eq!(transform_field_path("level"), "level");
        assert_eq!(
            transform_field_path("log_attributes.http.status"),
            "log_attributes['http']['status']"
        );
    }

    #[test]
    fn test_operator_parse_case_insensitive() {
        assert_eq!(FilterOperator::from("LIKE"), FilterOperator::Like);
        assert_eq!(FilterOperator::from(" Not   In "), FilterOperator::NotIn);
        assert_eq!(FilterOperator::from("IS NOT NULL"), FilterOperator::IsNotNull);
        assert_eq!(
            FilterOperator::from(">="),
            FilterOperator::Unsupported(">=".to_string())
        );
    }

    #[test]
    fn test_compile_binary_string() {
        let f = filter(json!({"fieldName": "service_name", "operator": "=", "value": ["checkout"]}));
        assert_eq!(f.compile().unwrap(), "service_name = 'checkout'");
    }

    #[test]
    fn test_compile_binary_number_uses_first_value() {
        let f = filter(json!({"fieldName": "status", "operator": "!=", "value": [200, 404]}));
        assert_eq!(f.compile().unwrap(), "status != 200");
    }

    #[test]
    fn test_compile_match_and_like_lowercased() {
        let f = filter(json!({"fieldName": "body", "operator": "MATCH_PHRASE", "value": ["timed out"]}));
        assert_eq!(f.compile().unwrap(), "body match_phrase 'timed out'");

        let f = filter(json!({"fieldName": "body", "operator": "Not Like", "value": ["%debug%"]}));
        assert_eq!(f.compile().unwrap(), "body not like '%debug%'");
    }

    #[test]
    fn test_compile_null_checks_ignore_values() {
        let f = filter(json!({"fieldName": "trace_id", "operator": "is null", "value": []}));
        assert_eq!(f.compile().unwrap(), "trace_id is null");

        let f = filter(json!({"fieldName": "trace_id", "operator": "is not null", "value": ["x"]}));
        assert_eq!(f.compile().unwrap(), "trace_id is not null");
    }

    #[test]
    fn test_compile_between() {
        let f = filter(json!({"fieldName": "duration", "operator": "between", "value": [10, 20.5]}));
        assert_eq!(f.compile().unwrap(), "duration between 10 AND 20.5");
    }

    #[test]
    fn test_compile_in_renders_all_values() {
        let f = filter(json!({"fieldName": "level", "operator": "in", "value": ["a", "b", "c"]}));
        assert_eq!(f.compile().unwrap(), "level in ('a', 'b', 'c')");

        let f = filter(json!({"fieldName": "code", "operator": "not in", "value": [1]}));
        assert_eq!(f.compile().unwrap(), "code not in (1)");
    }

    #[test]
    fn test_compile_bool_and_null_values() {
        let f = filter(json!({"fieldName": "attrs.cached", "operator": "=", "value": [true]}));
        assert_eq!(f.compile().unwrap(), "attrs['cached'] = true");

        let f = filter(json!({"fieldName": "x", "operator": "!=", "value": [null]}));
        assert_eq!(f.compile().unwrap(), "x != NULL");
    }

    #[test]
    fn test_compile_escapes_string_values() {
        let f = filter(json!({"fieldName": "user", "operator": "=", "value": ["o'brien"]}));
        assert_eq!(f.compile().unwrap(), "user = 'o''brien'");
    }

    #[test]
    fn test_compile_unsupported_operator() {
        let f = filter(json!({"fieldName": "x", "operator": "~", "value": ["a"]}));
        assert_eq!(
            f.compile(),
            Err(FilterError::UnsupportedOperator("~".to_string()))
        );
    }

    #[test]
    fn test_compile_missing_values() {
        let f = filter(json!({"fieldName": "x", "operator": "between", "value": [1]}));
        assert_eq!(
            f.compile(),
            Err(FilterError::MissingValues {
                operator: FilterOperator::Between,
                expected: 2,
                got: 1
            })
        );

        let f = filter(json!({"fieldName": "x", "operator": "in"}));
        assert!(matches!(f.compile(), Err(FilterError::MissingValues { .. })));
    }

    #[test]
    fn test_compile_empty_field() {
        let f = filter(json!({"fieldName": "", "operator": "=", "value": [1]}));
        assert_eq!(f.compile(), Err(FilterError::EmptyFieldPath));
    }

    #[test]
    fn test_field_name_aliases() {
        let f = filter(json!({"field_name": "a", "operator": "=", "value": [1]}));
        assert_eq!(f.field_name, "a");
        let f = filter(json!({"FieldName": "b", "Operator": "=", "Value": [1]}));
        assert_eq!(f.field_name, "b");
    }

    #[test]
    fn test_add_sql_filter_where_then_and() {
        let mut sql = "SELECT * FROM logs".to_string();
        apply_filters(
            &mut sql,
            &[
                filter(json!({"fieldName": "a", "operator": "=", "value": [1]})),
                filter(json!({"fieldName": "b", "operator": "=", "value": [2]})),
            ],
        );
        assert_eq!(sql, "SELECT * FROM logs WHERE (a = 1) AND (b = 2)");
    }

    #[test]
    fn test_add_sql_filter_existing_where_lowercase() {
        let mut sql = "select * from logs where (ts > 0)".to_string();
        add_sql_filter(
            &mut sql,
            &filter(json!({"fieldName": "a", "operator": "is null"})),
        );
        assert_eq!(sql, "select * from logs where (ts > 0) AND (a is null)");
    }

    #[test]
    fn test_add_sql_filter_skips_invalid() {
        let mut sql = "SELECT * FROM logs WHERE (x)".to_string();
        add_sql_filter(
            &mut sql,
            &filter(json!({"fieldName": "a", "operator": "between", "value": [1]})),
        );
        assert_eq!(sql, "SELECT * FROM logs WHERE (x)");
    }

    #[test]
    fn test_value_rejects_nested() {
        let res: Result<FilterCondition, _> =
            serde_json::from_value(json!({"fieldName": "a", "operator": "=", "value": [[1]]}));
        assert!(res.is_err());
    }
}
