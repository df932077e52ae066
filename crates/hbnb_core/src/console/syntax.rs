//! Input line normalization and tokenization.
//!
//! # Responsibility
//! - Rewrite `ClassName.verb(args)` into canonical `verb ClassName args`.
//! - Split canonical lines into tokens, honoring double quotes.
//!
//! # Invariants
//! - Lines that are not in dotted-call form pass through unchanged.
//! - A normalized argument containing whitespace stays one token.

use once_cell::sync::Lazy;
use regex::Regex;

static DOTTED_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\w+)\.(\w+)\s*(?:\((.*)\))?\s*$").expect("valid dotted call regex")
});

/// Rewrites `ClassName.verb(args)` to `verb ClassName args`.
///
/// Parentheses, commas and quotes are stripped from `args`; arguments that
/// are empty or contain whitespace are re-quoted so the tokenizer keeps them
/// as one token.
/// `ClassName.verb` without parentheses is accepted as an empty call.
pub fn normalize_line(line: &str) -> String {
    let Some(captures) = DOTTED_CALL_RE.captures(line) else {
        return line.to_string();
    };

    let class_name = &captures[1];
    let verb = &captures[2];
    let mut canonical = format!("{verb} {class_name}");
    if let Some(args) = captures.get(3) {
        for arg in split_call_args(args.as_str()) {
            canonical.push(' ');
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                canonical.push('"');
                canonical.push_str(&arg);
                canonical.push('"');
            } else {
                canonical.push_str(&arg);
            }
        }
    }
    canonical
}

/// Splits a canonical command line into tokens.
///
/// Whitespace separates tokens; a double-quoted segment is part of the
/// current token with its quotes removed, so `"Betty Bar"` is one token.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            ch => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Splits call arguments on commas outside quotes, dropping quotes and
/// empty arguments.
/// Splits call arguments on commas outside quotes.
///
/// Unquoted empty pieces (the inside of `()`, a trailing comma) are dropped;
/// a quoted empty string is a real argument.
fn split_call_args(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;

    for ch in args.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            ',' if !in_quotes => {
                parts.push((std::mem::take(&mut current), quoted));
                quoted = false;
            }
            '(' | ')' if !in_quotes => {}
            ch => current.push(ch),
        }
    }
    parts.push((current, quoted));

    parts
        .into_iter()
        .map(|(part, quoted)| (part.trim().to_string(), quoted))
        .filter(|(part, quoted)| *quoted || !part.is_empty())
        .map(|(part, _)| part)
        .collect()
}
