//! JSON codec
//!
//! Output matches `JSON.stringify(value, null, indent)`. Input may carry
//! `//` and `/* */` comments, which are blanked out before parsing.

use crate::{Codec, Indentation};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn parse(&self, text: &str) -> Result<Value, String> {
        let stripped = strip_comments(text);
        serde_json::from_str(&stripped).map_err(|e| e.to_string())
    }

    fn stringify(&self, value: &Value, indentation: Indentation) -> Result<String, String> {
        let Some(indent) = indentation.json_indent() else {
            return serde_json::to_string(value).map_err(|e| e.to_string());
        };

        let mut buf = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
        value.serialize(&mut serializer).map_err(|e| e.to_string())?;

        String::from_utf8(buf).map_err(|e| e.to_string())
    }
}

/// Replace comments outside of string literals with whitespace.
///
/// Newlines inside block comments are kept so parser line/column positions
/// still point at the original text.
pub fn strip_comments(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        String,
        Escape,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match (c, chars.peek()) {
                ('"', _) => {
                    state = State::String;
                    out.push(c);
                }
                ('/', Some('/')) => {
                    chars.next();
                    state = State::LineComment;
                    out.push_str("  ");
                }
                ('/', Some('*')) => {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                }
                _ => out.push(c),
            },
            State::String => {
                match c {
                    '\\' => state = State::Escape,
                    '"' => state = State::Code,
                    _ => {}
                }
                out.push(c);
            }
            State::Escape => {
                state = State::String;
                out.push(c);
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    out.push_str("  ");
                } else if c == '\n' {
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
        }
    }

    out
}
