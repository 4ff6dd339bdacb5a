use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the generation engine and its collaborators.
///
/// Structural problems inside a schema (missing nested block bodies, unknown
/// nesting modes, rejected attributes that are already gone) are not errors;
/// they are logged and generation continues without the element.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid provider '{input}': {reason}")]
    InvalidProvider { input: String, reason: String },

    #[error("invalid resource '{input}': {reason}")]
    InvalidResource { input: String, reason: String },

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse provider schema at '{path}': {message}")]
    SchemaParse { path: String, message: String },

    #[error("failed to parse validation diagnostics at '{path}': {message}")]
    DiagnosticsParse { path: String, message: String },

    #[error("failed to write {}: {source}", .path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("terraform binary not found or not runnable: {0}")]
    BinaryNotFound(String),

    #[error("`{command}` failed: {message}")]
    Toolchain { command: String, message: String },

    #[error("HCL error: {0}")]
    Hcl(#[from] hcl::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
