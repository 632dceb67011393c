use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditKitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Checker error: {0}")]
    Checker(String),

    #[error("Checker {checker} failed to set up")]
    SetUp {
        checker: String,
        #[source]
        source: Box<AuditKitError>,
    },

    #[error("Checker {checker} failed to tear down")]
    TearDown {
        checker: String,
        #[source]
        source: Box<AuditKitError>,
    },

    #[error("Malformed checker document: {0}")]
    Document(String),

    #[error("Checker file not found at: {path}")]
    FileNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditKitError {
    /// Returns the variant name, for log filtering and test assertions.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "Config",
            Self::Checker(_) => "Checker",
            Self::SetUp { .. } => "SetUp",
            Self::TearDown { .. } => "TearDown",
            Self::Document(_) => "Document",
            Self::FileNotFound { .. } => "FileNotFound",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
        }
    }

    /// Flattens this error and its source chain into one line.
    #[must_use]
    pub fn messages(&self) -> String {
        let mut parts = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            parts.push(err.to_string());
            source = err.source();
        }
        parts.join(": ")
    }
}

pub type Result<T> = std::result::Result<T, AuditKitError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
