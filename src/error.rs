//! Error types for the builder generator

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Builder generator errors
#[derive(Error, Debug)]
pub enum BuilderError {
    /// Recoverable: recorded as a warning diagnostic, the reference stays in place.
    #[error("Reference not found for {reference} (in schema {schema})")]
    UnresolvedReference { schema: String, reference: String },

    #[error("Cyclic schema {schema}: {}", cycle.join(" -> "))]
    CyclicSchema { schema: String, cycle: Vec<String> },

    #[error("Malformed schema {schema}: {reason}")]
    MalformedSchema { schema: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl BuilderError {
    /// Name of the schema this error is about, if any
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            Self::UnresolvedReference { schema, .. }
            | Self::CyclicSchema { schema, .. }
            | Self::MalformedSchema { schema, .. } => Some(schema),
            Self::Io(_) | Self::Json(_) | Self::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_path() {
        let err = BuilderError::CyclicSchema {
            schema: "Node".to_string(),
            cycle: vec!["Node".to_string(), "Child".to_string(), "Node".to_string()],
        };
        assert_eq!(err.to_string(), "Cyclic schema Node: Node -> Child -> Node");
        assert_eq!(err.schema_name(), Some("Node"));
    }
}
