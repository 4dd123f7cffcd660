//! Error taxonomy for docman.
//!
//! Configuration and resolution failures abort the current command;
//! per-document validation outcomes are collected and reported instead of
//! being raised through this type.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocmanError>;

#[derive(Debug, Error)]
pub enum DocmanError {
    /// The persisted registry could not be parsed. Never auto-repaired;
    /// losing tracked state must be an explicit user decision.
    #[error("registry file is corrupt: {0}")]
    RegistryCorrupt(String),

    /// No manifest exists for the requested document type.
    #[error("unknown document type '{0}' (no manifest found)")]
    UnknownDocType(String),

    /// The manifest declares no template and no fallback applies.
    #[error("no template available for document type '{0}'")]
    NoTemplate(String),

    /// A remote template could not be fetched. No silent local fallback.
    #[error("template fetch failed: {0}")]
    TemplateFetchFailed(String),

    /// An input path does not exist.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Refusing to overwrite an existing output file without --force.
    #[error("output file already exists: {} (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    /// Malformed manifest, bad CLI input, unusable project root.
    #[error("configuration error: {0}")]
    Config(String),

    /// Overall check verdict failed; carries a short summary for exit paths.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("watch error: {0}")]
    Watch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DocmanError {
    /// Stable machine-readable code for JSON error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RegistryCorrupt(_) => "registry_corrupt",
            Self::UnknownDocType(_) => "unknown_doc_type",
            Self::NoTemplate(_) => "no_template",
            Self::TemplateFetchFailed(_) => "template_fetch_failed",
            Self::PathNotFound(_) => "path_not_found",
            Self::OutputExists(_) => "output_exists",
            Self::Config(_) => "config",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Watch(_) => "watch",
            Self::Io(_) => "io",
        }
    }
}
