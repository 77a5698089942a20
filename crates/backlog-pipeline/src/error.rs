//! Error types for the import pipeline
//!
//! Collaborator failures are mapped into [`PipelineError`] at the call site;
//! phases then turn them into failed phase results, so none of these ever
//! reach the caller of an import directly.

use backlog_model::FeedbackKind;
use backlog_scheduler::ScheduleError;
use backlog_store::StoreError;
use std::path::PathBuf;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Document analyzer failed
    #[error("error del analizador: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// Store rejected an operation
    #[error("error de almacenamiento: {0}")]
    Store(#[from] StoreError),

    /// Sprint planning failed
    #[error("error de planificación: {0}")]
    Schedule(#[from] ScheduleError),

    /// Uploader may not create projects
    #[error("permiso denegado: {0}")]
    PermissionDenied(String),

    /// Candidates rejected as a batch
    #[error("{0}")]
    Validation(String),

    /// A record references a parent that was not created in this import
    #[error("{record}: {target} '{key}' no existe en esta importación")]
    UnresolvedReference {
        record: String,
        target: &'static str,
        key: String,
    },

    /// The store returned a different number of records than requested
    #[error("se esperaban {expected} registros y el almacenamiento devolvió {actual}")]
    RecordCountMismatch { expected: usize, actual: usize },

    /// A collaborator call exceeded its time budget
    #[error("{operation} superó el tiempo límite de {duration_secs}s")]
    Timeout {
        operation: &'static str,
        duration_secs: u64,
    },
}

impl PipelineError {
    /// Feedback classification of the error
    #[must_use]
    pub fn kind(&self) -> FeedbackKind {
        match self {
            Self::Validation(_) | Self::UnresolvedReference { .. } => FeedbackKind::Validation,
            _ => FeedbackKind::Critical,
        }
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Store(err) => err.is_retryable(),
            Self::Analyzer(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Build unresolved-reference error
    #[inline]
    pub fn unresolved(record: &str, target: &'static str, key: &str) -> Self {
        Self::UnresolvedReference {
            record: record.to_string(),
            target,
            key: key.to_string(),
        }
    }
}

/// Document analyzer errors
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The extraction service could not be reached
    #[error("servicio de análisis no disponible: {0}")]
    Unavailable(String),

    /// The extraction service answered with something unusable
    #[error("respuesta inválida del analizador: {0}")]
    InvalidResponse(String),

    /// Fixture file could not be read
    #[error("cannot read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fixture file could not be parsed
    #[error("cannot parse fixture {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl AnalyzerError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::PipelineConfig`]
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
