//! CLI output formatting utilities.
//!
//! - JSON syntax highlighting for `status`
//! - Cell helpers for the `inspect` table

use std::fmt::Write as _;

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Prints JSON with syntax highlighting.
///
/// Colors:
/// - Keys: Cyan
/// - Strings: Green
/// - Numbers: Yellow
/// - Booleans/Null: Magenta
/// - Brackets/Braces: White (bold)
pub fn print_highlighted_json(value: &Value) { println!("{}", highlight_json(value)); }

/// Renders JSON pretty-printed with syntax highlighting.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => {
            let _ = write!(out, "{}", "null".magenta());
        }
        Value::Bool(flag) => {
            let _ = write!(out, "{}", flag.to_string().magenta());
        }
        Value::Number(number) => {
            let _ = write!(out, "{}", number.to_string().yellow());
        }
        Value::String(_) => {
            let _ = write!(out, "{}", value.to_string().green());
        }
        Value::Array(items) => {
            write_container(out, ('[', ']'), depth, items.iter().map(|item| (None, item)));
        }
        Value::Object(map) => {
            write_container(out, ('{', '}'), depth, map.iter().map(|(key, item)| (Some(key), item)));
        }
    }
}

fn write_container<'a>(
    out: &mut String,
    (open, close): (char, char),
    depth: usize,
    entries: impl ExactSizeIterator<Item = (Option<&'a String>, &'a Value)>,
) {
    let _ = write!(out, "{}", open.to_string().white().bold());
    let count = entries.len();
    if count == 0 {
        let _ = write!(out, "{}", close.to_string().white().bold());
        return;
    }

    for (index, (key, item)) in entries.enumerate() {
        out.push('\n');
        out.push_str(&INDENT.repeat(depth + 1));
        if let Some(key) = key {
            let _ = write!(out, "{}{} ", Value::from(key.as_str()).to_string().cyan(), ":".white());
        }
        write_value(out, item, depth + 1);
        if index + 1 < count {
            let _ = write!(out, "{}", ",".white());
        }
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    let _ = write!(out, "{}", close.to_string().white().bold());
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// Counts characters, not bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}
