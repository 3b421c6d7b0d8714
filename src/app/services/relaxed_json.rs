//! JSON with `//` line comments and `/* */` block comments.
//!
//! Comments are blanked out (newlines kept) before handing the text to
//! `serde_json`, so reported line and column numbers still point into the
//! text the user typed.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unterminated block comment at line {line} column {column}")]
    UnterminatedComment { line: usize, column: usize },

    #[error("{0}")]
    Syntax(#[from] serde_json::Error),
}

/// Parse comment-tolerant JSON into a value.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let stripped = strip_comments(text)?;
    Ok(serde_json::from_str(&stripped)?)
}

/// Pretty-print `value` with `indent` spaces per level.
pub fn serialize(value: &Value, indent: usize) -> String {
    let indent = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    // Writing a Value into a Vec cannot fail.
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Replace every comment outside string literals with spaces.
pub fn strip_comments(text: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;

    while let Some((pos, c)) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek().map(|(_, next)| *next)) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                chars.next();
                out.push_str("  ");
                while let Some((_, n)) = chars.peek() {
                    if *n == '\n' {
                        break;
                    }
                    blank(&mut out, *n);
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut closed = false;
                while let Some((_, n)) = chars.next() {
                    if n == '*' && matches!(chars.peek(), Some((_, '/'))) {
                        chars.next();
                        out.push_str("  ");
                        closed = true;
                        break;
                    }
                    blank(&mut out, n);
                }
                if !closed {
                    let (line, column) = line_col(text, pos);
                    return Err(ParseError::UnterminatedComment { line, column });
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn blank(out: &mut String, c: char) {
    if c == '\n' || c == '\r' {
        out.push(c);
    } else {
        out.push(' ');
    }
}

fn line_col(text: &str, pos: usize) -> (usize, usize) {
    let before = &text[..pos];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) + 1;
    (line, column)
}
