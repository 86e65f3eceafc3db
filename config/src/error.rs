use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The rule a field value failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    String,
    Boolean,
    Number,
    Integer { max: u64 },
    Object,
    Array,
    OneOf(&'static [&'static str]),
    MinLength(usize),
    Finite,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("a string"),
            Self::Boolean => f.write_str("a boolean"),
            Self::Number => f.write_str("a number"),
            Self::Integer { max } => write!(f, "an integer between 0 and {max}"),
            Self::Object => f.write_str("an object"),
            Self::Array => f.write_str("an array"),
            Self::OneOf(members) => write!(f, "one of {}", members.join(", ")),
            Self::MinLength(min) => write!(f, "a string of at least {min} characters"),
            Self::Finite => f.write_str("a finite number"),
        }
    }
}

/// A field whose value does not match its declared type or constraint.
///
/// Normalization stops at the first one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: expected {expected}, received {found}")]
pub struct TypeError {
    /// Dotted path of the offending field, e.g. `core.secret`.
    pub path: String,
    pub expected: Expected,
    /// Short description of what was actually supplied.
    pub found: String,
}

/// Every backend field the active `datasource.type` needs but did not get.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} required field(s) missing: {}", .0.len(), .0.join("; "))]
pub struct RequiredFieldErrors(pub Vec<String>);

impl RequiredFieldErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Required(#[from] RequiredFieldErrors),
}

impl ValidationError {
    /// One human-readable line per violation.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Type(err) => vec![err.to_string()],
            Self::Required(errs) => errs.0.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Config is invalid: {0}")]
    Invalid(#[from] ValidationError),
}
