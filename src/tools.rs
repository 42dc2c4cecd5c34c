//! External tool configuration and invocation.
//!
//! The pipeline delegates FASTA splitting to `seqkit` and distance estimation
//! to `mash`. Tool locations are explicit state rather than ambient PATH
//! lookups at call sites: resolution happens once, up front, and the resolved
//! paths travel inside the pipeline configuration.
//!
//! Resolution order:
//! 1. Explicit path from the command line
//! 2. `SUBMASH_SEQKIT` / `SUBMASH_MASH` environment variables
//! 3. PATH scan

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Resolved locations of the external tools.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub seqkit: PathBuf,
    pub mash: PathBuf,
}

impl ToolPaths {
    /// Resolve both tools, preferring explicit overrides.
    pub fn resolve(seqkit: Option<&Path>, mash: Option<&Path>) -> Result<Self> {
        Ok(ToolPaths {
            seqkit: resolve_tool("seqkit", seqkit, "SUBMASH_SEQKIT")?,
            mash: resolve_tool("mash", mash, "SUBMASH_MASH")?,
        })
    }
}

/// Locate one tool executable.
pub fn resolve_tool(name: &str, explicit: Option<&Path>, env_var: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::ToolNotFound {
            tool: name.to_string(),
            detail: format!("explicit path {} does not exist", path.display()),
        });
    }

    if let Some(path) = env::var_os(env_var).map(PathBuf::from) {
        if path.is_file() {
            return Ok(path);
        }
        return Err(Error::ToolNotFound {
            tool: name.to_string(),
            detail: format!("{env_var} points at {}, which does not exist", path.display()),
        });
    }

    if let Some(paths) = env::var_os("PATH") {
        for dir in env::split_paths(&paths) {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(Error::ToolNotFound {
        tool: name.to_string(),
        detail: format!("not on PATH; install it or set {env_var}"),
    })
}

/// Run a prepared command, failing with the tool's stderr on non-zero exit.
/// Stdout is captured and returned so callers can redirect it to a file.
pub fn run_checked(mut command: Command, tool: &str) -> Result<Vec<u8>> {
    log::debug!("running {command:?}");
    let output = command.output().map_err(|e| Error::ExternalTool {
        tool: tool.to_string(),
        status: "failed to launch".to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(Error::ExternalTool {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }
    Ok(output.stdout)
}
