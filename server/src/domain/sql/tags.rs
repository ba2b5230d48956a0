//! logfmt tag expressions → attribute-map predicates
//!
//! `error=true http.url="http://x/y"` becomes
//! `span_attributes['error'] = 'true' AND span_attributes['http.url'] = 'http://x/y'`.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::utils::sql::quote_literal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    #[error("unterminated quoted value starting at byte {0}")]
    UnterminatedQuote(usize),
    #[error("empty key at byte {0}")]
    EmptyKey(usize),
    #[error("unexpected '{ch}' at byte {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("invalid escape '\\{ch}' at byte {position}")]
    InvalidEscape { ch: char, position: usize },
}

/// One `key=value` pair; a bare `key` has an empty value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub key: String,
    pub value: String,
}

/// Parse a logfmt string into key/value pairs, in input order.
///
/// A string that is itself one JSON-quoted string (`"a=b c=\"d\""`) is
/// unquoted first.
pub fn parse_tags(input: &str) -> Result<Vec<TagPair>, TagParseError> {
    let unquoted = unquote_json(input);
    let mut scanner = Scanner {
        chars: unquoted.char_indices().peekable(),
    };

    let mut pairs = Vec::new();
    while let Some(pair) = scanner.next_pair()? {
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Compile a logfmt string to `column['k'] = 'v'` predicates joined by ` AND `.
///
/// No pairs (including blank input) compiles to `1=1`.
pub fn tags_to_predicate(input: &str, column: &str) -> Result<String, TagParseError> {
    let pairs = parse_tags(input)?;
    if pairs.is_empty() {
        return Ok("1=1".to_string());
    }

    Ok(pairs
        .iter()
        .map(|p| {
            format!(
                "{}[{}] = {}",
                column,
                quote_literal(&p.key),
                quote_literal(&p.value)
            )
        })
        .collect::<Vec<_>>()
        .join(" AND "))
}

fn unquote_json(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.len() >= 2
        && trimmed.starts_with('"')
        && trimmed.ends_with('"')
        && let Ok(s) = serde_json::from_str::<String>(trimmed)
    {
        return s;
    }
    input.to_string()
}

struct Scanner<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl Scanner<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn next_pair(&mut self) -> Result<Option<TagPair>, TagParseError> {
        self.skip_whitespace();
        let Some(&(start, _)) = self.chars.peek() else {
            return Ok(None);
        };

        let key = self.read_key()?;
        if key.is_empty() {
            return Err(TagParseError::EmptyKey(start));
        }

        let value = match self.chars.next_if(|(_, c)| *c == '=') {
            None => String::new(),
            Some(_) => match self.chars.peek() {
                Some(&(pos, '"')) => {
                    self.chars.next();
                    self.read_quoted(pos)?
                }
                _ => self.read_bare()?,
            },
        };

        Ok(Some(TagPair { key, value }))
    }

    fn read_key(&mut self) -> Result<String, TagParseError> {
        let mut key = String::new();
        while let Some(&(position, ch)) = self.chars.peek() {
            match ch {
                '=' => break,
                c if c.is_whitespace() => break,
                '"' => return Err(TagParseError::UnexpectedChar { ch, position }),
                c => {
                    key.push(c);
                    self.chars.next();
                }
            }
        }
        Ok(key)
    }

    fn read_bare(&mut self) -> Result<String, TagParseError> {
        let mut value = String::new();
        while let Some(&(position, ch)) = self.chars.peek() {
            match ch {
                c if c.is_whitespace() => break,
                '"' | '=' => return Err(TagParseError::UnexpectedChar { ch, position }),
                c => {
                    value.push(c);
                    self.chars.next();
                }
            }
        }
        Ok(value)
    }

    fn read_quoted(&mut self, open: usize) -> Result<String, TagParseError> {
        let mut value = String::new();
        loop {
            let Some((_, ch)) = self.chars.next() else {
                return Err(TagParseError::UnterminatedQuote(open));
            };
            match ch {
                '"' => break,
                '\\' => {
                    let Some((position, esc)) = self.chars.next() else {
                        return Err(TagParseError::UnterminatedQuote(open));
                    };
                    value.push(match esc {
                        '"' => '"',
                        '\\' => '\\',
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        ch => return Err(TagParseError::InvalidEscape { ch, position }),
                    });
                }
                c => value.push(c),
            }
        }

        // A closing quote must end the pair
        if let Some(&(position, ch)) = self.chars.peek()
            && !ch.is_whitespace()
        {
            return Err(TagParseError::UnexpectedChar { ch, position });
        }
        Ok(value)
    }
}
