//! Error types for the rule tree builder

use thiserror::Error;

/// Result type for builder operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Builder errors
///
/// The first four variants are raised by tree construction and flattening;
/// the rest only surface from configuration and document loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Malformed call input (aggregate rule argument, reserved path token,
    /// unknown element-kind tag, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Structural misuse of the tree
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Property not found: {property} on {}", display_path(.path))]
    NotFound { path: String, property: String },

    #[error("Conflicting declaration for {}: already declared as {existing}, requested {requested}", display_path(.path))]
    Conflict {
        path: String,
        existing: String,
        requested: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SchemaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SchemaError::InvalidArgument(message.into())
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        SchemaError::IllegalState(message.into())
    }
}

/// Render a dot-path for messages; the root has no segment of its own.
pub(crate) fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_named_in_messages() {
        let err = SchemaError::NotFound {
            path: String::new(),
            property: "foo".to_string(),
        };
        assert_eq!(err.to_string(), "Property not found: foo on <root>");
    }

    #[test]
    fn test_conflict_message() {
        let err = SchemaError::Conflict {
            path: "user.name".to_string(),
            existing: "string".to_string(),
            requested: "integer".to_string(),
        };
        assert!(err.to_string().contains("user.name"));
        assert!(err.to_string().contains("already declared as string"));
    }
}
