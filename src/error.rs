use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the library; the binary reports them through anyhow.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed line in a distance or filtered table
    #[error("malformed table line {line} in {path}: {reason}")]
    InputFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    /// Invalid configuration (e.g. subgenome count of zero)
    #[error("invalid configuration: {0}")]
    Config(String),
    /// External tool exited non-zero or could not be launched
    #[error("{tool} failed ({status}): {stderr}")]
    ExternalTool {
        tool: String,
        status: String,
        stderr: String,
    },
    /// External tool executable could not be located
    #[error("could not find `{tool}` executable: {detail}")]
    ToolNotFound { tool: String, detail: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
