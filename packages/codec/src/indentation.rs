use crate::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output indentation setting
///
/// The string ids (`2_spaces`, `4_spaces`, `tabs`, `minified`) are the
/// persisted form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indentation {
    #[default]
    #[serde(rename = "2_spaces")]
    TwoSpaces,

    #[serde(rename = "4_spaces")]
    FourSpaces,

    #[serde(rename = "tabs")]
    Tabs,

    #[serde(rename = "minified")]
    Minified,
}

impl Indentation {
    /// All settings, in menu order
    pub const ALL: [Indentation; 4] = [
        Indentation::TwoSpaces,
        Indentation::FourSpaces,
        Indentation::Tabs,
        Indentation::Minified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indentation::TwoSpaces => "2_spaces",
            Indentation::FourSpaces => "4_spaces",
            Indentation::Tabs => "tabs",
            Indentation::Minified => "minified",
        }
    }

    /// Indent unit for JSON pretty printing, `None` for compact output
    pub fn json_indent(&self) -> Option<&'static [u8]> {
        match self {
            Indentation::TwoSpaces => Some(b"  "),
            Indentation::FourSpaces => Some(b"    "),
            Indentation::Tabs => Some(b"\t"),
            Indentation::Minified => None,
        }
    }

    /// Block indent width for YAML, `None` for flow style.
    ///
    /// YAML does not allow tabs for indentation, so `Tabs` maps to 4.
    pub fn yaml_width(&self) -> Option<usize> {
        match self {
            Indentation::TwoSpaces => Some(2),
            Indentation::FourSpaces | Indentation::Tabs => Some(4),
            Indentation::Minified => None,
        }
    }

    pub fn is_minified(&self) -> bool {
        matches!(self, Indentation::Minified)
    }
}

impl fmt::Display for Indentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indentation {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Indentation::ALL
            .into_iter()
            .find(|indentation| indentation.as_str() == s)
            .ok_or_else(|| CodecError::UnknownIndentation(s.to_string()))
    }
}
