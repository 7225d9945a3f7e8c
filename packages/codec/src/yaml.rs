//! YAML codec
//!
//! Parsing goes through `serde_yaml`. Emitting is done here because the
//! output style depends on the indentation setting: minified produces a
//! single flow-style line, everything else produces block style with the
//! configured width.
//!
//! ```text
//! minified:  {a: 1, b: [true, null]}
//!
//! 2_spaces:  a: 1
//!            b:
//!              - true
//!              - null
//! ```

use crate::{Codec, Indentation};
use serde_json::{Map, Value};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn parse(&self, text: &str) -> Result<Value, String> {
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    }

    fn stringify(&self, value: &Value, indentation: Indentation) -> Result<String, String> {
        let mut out = String::new();

        match (indentation.yaml_width(), value) {
            (Some(width), Value::Object(map)) if !map.is_empty() => {
                write_mapping(map, 0, width, false, &mut out);
            }
            (Some(width), Value::Array(items)) if !items.is_empty() => {
                write_sequence(items, 0, width, false, &mut out);
            }
            _ => write_flow(value, &mut out),
        }

        if out.ends_with('\n') {
            out.pop();
        }
        Ok(out)
    }
}

fn write_flow(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow_key(key, out);
                out.push_str(": ");
                write_flow(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
    }
}

/// Block mapping whose keys start at `column`. With `inline_first` the
/// first key continues the current line (after a `- ` marker).
fn write_mapping(map: &Map<String, Value>, column: usize, width: usize, inline_first: bool, out: &mut String) {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(out, column);
        }
        write_block_key(key, column, out);
        out.push(':');

        match value {
            Value::Object(child) if !child.is_empty() => {
                out.push('\n');
                write_mapping(child, column + width, width, false, out);
            }
            Value::Array(items) if !items.is_empty() => {
                out.push('\n');
                write_sequence(items, column + width, width, false, out);
            }
            _ => {
                out.push(' ');
                write_flow(value, out);
                out.push('\n');
            }
        }
    }
}

fn write_sequence(items: &[Value], column: usize, width: usize, inline_first: bool, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(out, column);
        }
        out.push('-');

        match item {
            Value::Object(child) if !child.is_empty() => {
                pad(out, width - 1);
                write_mapping(child, column + width, width, true, out);
            }
            Value::Array(inner) if !inner.is_empty() => {
                pad(out, width - 1);
                write_sequence(inner, column + width, width, true, out);
            }
            _ => {
                out.push(' ');
                write_flow(item, out);
                out.push('\n');
            }
        }
    }
}

/// Readers only look this far ahead for the `:` of an implicit key.
/// Longer keys are written in the explicit `? key` form.
const MAX_IMPLICIT_KEY: usize = 1000;

fn write_flow_key(key: &str, out: &mut String) {
    let start = out.len();
    write_string(key, out);
    if out.len() - start > MAX_IMPLICIT_KEY {
        out.insert_str(start, "? ");
    }
}

/// Writes the key, leaving `out` where the `:` indicator goes
fn write_block_key(key: &str, column: usize, out: &mut String) {
    let start = out.len();
    write_string(key, out);
    if out.len() - start > MAX_IMPLICIT_KEY {
        out.insert_str(start, "? ");
        out.push('\n');
        pad(out, column);
    }
}

fn pad(out: &mut String, n: usize) {
    out.extend(std::iter::repeat(' ').take(n));
}

fn write_string(s: &str, out: &mut String) {
    if is_plain_safe(s) {
        out.push_str(s);
    } else {
        write_double_quoted(s, out);
    }
}

/// Words a YAML 1.1 or 1.2 resolver may read as something other than a string
const RESERVED: &[&str] = &[
    "true", "false", "null", "yes", "no", "on", "off", "y", "n", "inf", "infinity", "nan",
];

/// Whether `s` can be written unquoted in both block and flow context
/// and still parse back as the same string.
fn is_plain_safe(s: &str) -> bool {
    match s.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    if s.ends_with(' ') {
        return false;
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ' '))
    {
        return false;
    }

    let lower = s.to_ascii_lowercase();
    !RESERVED.contains(&lower.as_str())
}

fn write_double_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if needs_escape(c) => {
                let cp = c as u32;
                if cp > 0xFFFF {
                    let _ = write!(out, "\\U{cp:08X}");
                } else {
                    let _ = write!(out, "\\u{cp:04X}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Characters outside the YAML printable set, plus the ones a reader folds
/// as line breaks or strips as a byte order mark.
fn needs_escape(c: char) -> bool {
    let printable = matches!(c as u32,
        0x20..=0x7E | 0xA0..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF);
    !printable || matches!(c, '\u{2028}' | '\u{2029}' | '\u{FEFF}')
}
