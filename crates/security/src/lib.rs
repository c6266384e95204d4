//! Access control for RosterDB queries.
//!
//! This crate provides the [`AccessMode`] used when opening store connections
//! and [`classify`], the gate every query passes before it reaches the store.
//!
//! Classification is an allow-list: a statement is read-only only if its
//! first keyword is `SELECT`, or it is a `WITH` whose main statement (the
//! first keyword after the common table expressions) is `SELECT` or
//! `VALUES`. Everything else, including empty input and input holding more
//! than one statement, is rejected. Comments, string literals and quoted
//! identifiers are skipped so they cannot smuggle keywords in or out.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Controls whether a store connection allows writes or is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// Allow both reads and writes. Only used while building a store.
    ReadWrite,
    /// Read-only mode (default); the engine refuses all writes.
    #[default]
    ReadOnly,
}

impl AccessMode {
    /// True if this mode permits writes
    pub fn allows_writes(self) -> bool {
        matches!(self, AccessMode::ReadWrite)
    }
}

/// Leading keywords accepted without further inspection.
const ALLOWED_LEADING: &[&str] = &["SELECT", "WITH"];

/// Keywords that can follow a CTE list as the main statement.
const CTE_MAIN_VERBS: &[&str] = &["SELECT", "VALUES", "INSERT", "UPDATE", "DELETE", "REPLACE"];

/// Main statements accepted after a CTE list.
const CTE_READ_VERBS: &[&str] = &["SELECT", "VALUES"];

/// Outcome of classifying a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementClass {
    /// Safe to run against a read-only store
    ReadOnly,
    /// Must not run
    Rejected(Rejection),
}

impl StatementClass {
    /// True for [`StatementClass::ReadOnly`]
    pub fn is_read_only(&self) -> bool {
        matches!(self, StatementClass::ReadOnly)
    }
}

/// Why a statement was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No statement at all (blank or only comments)
    Empty,
    /// The first keyword is not on the allow-list
    LeadingKeyword(String),
    /// A `WITH` statement whose main statement is not a read
    MutatingStatement(String),
    /// More than one statement separated by `;`
    MultipleStatements,
    /// A `WITH` list with no main statement
    Incomplete,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Empty => write!(f, "empty statement"),
            Rejection::LeadingKeyword(kw) => {
                write!(f, "only SELECT queries are allowed, got '{}'", kw)
            }
            Rejection::MutatingStatement(kw) => {
                write!(f, "only SELECT queries are allowed, WITH clause leads into '{}'", kw)
            }
            Rejection::MultipleStatements => write!(f, "only a single statement is allowed"),
            Rejection::Incomplete => write!(f, "WITH clause has no main statement"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    /// Bare word, uppercased, with the parenthesis depth it appeared at
    Word(String, usize),
    Semicolon,
    Other,
}

/// Split `sql` into words and separators, skipping whitespace, comments,
/// string literals and quoted identifiers.
fn tokenize(sql: &str) -> Vec<Token> {
    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();
    let mut depth: usize = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                i += 1;
                loop {
                    match chars.get(i) {
                        None => break,
                        // Doubled quote is an escaped quote inside the literal
                        Some(&q) if q == close && close != ']' && chars.get(i + 1) == Some(&close) => {
                            i += 2
                        }
                        Some(&q) if q == close => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token::Other);
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            '(' => {
                depth += 1;
                tokens.push(Token::Other);
                i += 1;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                tokens.push(Token::Other);
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(Token::Word(word.to_ascii_uppercase(), depth));
            }
            _ => {
                tokens.push(Token::Other);
                i += 1;
            }
        }
    }

    tokens
}

/// Classify a statement as read-only or rejected.
///
/// # Examples
///
/// ```
/// use roster_security::{classify, Rejection, StatementClass};
///
/// assert!(classify("SELECT sname FROM members").is_read_only());
/// assert_eq!(
///     classify("DROP TABLE members"),
///     StatementClass::Rejected(Rejection::LeadingKeyword("DROP".into()))
/// );
/// ```
pub fn classify(sql: &str) -> StatementClass {
    let tokens = tokenize(sql);

    // Everything after the first ';' must be empty (or more ';').
    let body_len = tokens
        .iter()
        .position(|t| *t == Token::Semicolon)
        .unwrap_or(tokens.len());
    if tokens[body_len..].iter().any(|t| *t != Token::Semicolon) {
        return StatementClass::Rejected(Rejection::MultipleStatements);
    }
    let body = &tokens[..body_len];

    let leading = match body.first() {
        None => return StatementClass::Rejected(Rejection::Empty),
        Some(Token::Word(word, _)) => word.as_str(),
        Some(_) => {
            return StatementClass::Rejected(Rejection::LeadingKeyword(
                sql.trim().chars().take(16).collect(),
            ))
        }
    };

    if !ALLOWED_LEADING.contains(&leading) {
        return StatementClass::Rejected(Rejection::LeadingKeyword(leading.to_string()));
    }
    if leading == "SELECT" {
        return StatementClass::ReadOnly;
    }

    // WITH: the first top-level verb after the CTE list decides.
    let verb = body.iter().skip(1).find_map(|t| match t {
        Token::Word(word, 0) if CTE_MAIN_VERBS.contains(&word.as_str()) => Some(word.as_str()),
        _ => None,
    });
    match verb {
        Some(v) if CTE_READ_VERBS.contains(&v) => StatementClass::ReadOnly,
        Some(v) => StatementClass::Rejected(Rejection::MutatingStatement(v.to_string())),
        None => StatementClass::Rejected(Rejection::Incomplete),
    }
}
