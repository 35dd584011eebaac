//! Domain primitive types used across the mixdep workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A literal argument value parsed from a call-style mixin reference.
///
/// Call-style references such as `"paginate(25, true)"` carry literal
/// arguments that are handed to a dynamic mixin's factory at resolution
/// time. Only plain literals are representable; there is no expression
/// language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Boolean literal (`true` or `false`).
    Bool(bool),
    /// Integer literal (optional leading `-`).
    Int(i64),
    /// Floating point literal (optional leading `-`, one `.`).
    Float(f64),
    /// String literal, either quoted or a bare unclassifiable token.
    Str(String),
}

impl Literal {
    /// Returns the string value if this literal is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value if this literal is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value if this literal is an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the numeric value if this literal is an integer or a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Literal {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}
