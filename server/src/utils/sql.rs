//! SQL text helpers shared by the statement builders

use std::sync::LazyLock;

use regex::Regex;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.$-]+$").expect("Invalid regex"));

/// Escape a value for use inside a single-quoted SQL string literal
///
/// Doris treats backslash as an escape character inside string literals,
/// so both `\` and `'` need escaping.
///
/// ```
/// use olapscope_server::utils::sql::escape_string;
///
/// assert_eq!(escape_string("it's"), "it''s");
/// assert_eq!(escape_string(r"a\b"), r"a\\b");
/// ```
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "''")
}

/// Render a single-quoted SQL string literal
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Render a backtick-quoted identifier (database or table name)
pub fn quote_ident(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}

/// Whether `s` is a plain identifier: letters, digits, `_`, `.`, `$`, `-`
///
/// Dotted paths (`attrs.http.url`) and qualified names (`db.table`) pass.
pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER_RE.is_match(s)
}
