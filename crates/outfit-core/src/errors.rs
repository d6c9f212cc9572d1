use std::fmt;

/// Failure while reading one data file.
///
/// Never surfaced to a caller of the loader: every variant is logged and
/// replaced by the field's fallback option list.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: \"{key}\" is not a list of strings")]
    Shape { path: String, key: String },
}

/// Rejection of a host field map before any prompt is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("selection must be a JSON object")]
    NotAnObject,
    #[error("unknown field \"{0}\"")]
    UnknownField(String),
    #[error("field \"{field}\": \"{value}\" is not one of its options")]
    UnknownOption { field: String, value: String },
    #[error("field \"{field}\" expects {expected}")]
    InvalidType {
        field: String,
        expected: Expected,
    },
    #[error("field \"{field}\": {value} is outside 0..=4294967295")]
    SeedOutOfRange { field: String, value: String },
    #[error("unknown preset \"{0}\"")]
    UnknownPreset(String),
}

/// JSON type a selection field requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    String,
    Bool,
    Integer,
    MakeupList,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::String => write!(f, "a string"),
            Expected::Bool => write!(f, "a boolean"),
            Expected::Integer => write!(f, "an unsigned integer"),
            Expected::MakeupList => write!(f, "a JSON-encoded makeup list"),
        }
    }
}
