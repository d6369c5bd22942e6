use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path does not exist: {path}")]
    PathNotFound { path: String },

    #[error("Failed to parse JSON document {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse XML document {path}: {reason}")]
    Xml { path: String, reason: String },

    #[error("Unknown configuration: {name}")]
    UnknownConfiguration { name: String },

    #[error("Project not found: {full_name}")]
    ProjectNotFound { full_name: String },

    #[error("Operation is not implemented: {operation}")]
    NotImplemented { operation: String },
}

impl ProjectError {
    /// Create a not-implemented error for a mutation operation
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Create an XML error for the document at `path`
    pub fn xml(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Xml {
            path: path.to_string_lossy().to_string(),
            reason: reason.to_string(),
        }
    }
}
