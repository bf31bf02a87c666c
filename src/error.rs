//! Error taxonomy for a run.
//!
//! Everything propagates as `anyhow::Error`; these types are attached so the
//! binary can pick an exit code and callers can tell recoverable per-item
//! problems from fatal ones with `downcast_ref`.

use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A selected mode needs a credential that was not supplied.
    #[error("{flag} is required for {mode} (or set {env})")]
    MissingCredential {
        flag: &'static str,
        env: &'static str,
        mode: &'static str,
    },

    /// Non-success HTTP response from a catalog.
    #[error("{method} {url} failed: HTTP {status}")]
    Http {
        method: &'static str,
        url: String,
        status: StatusCode,
    },

    /// The external pack tool exited unsuccessfully.
    #[error("`{command}` failed with exit code {code}{}", stderr_suffix(.stderr))]
    ExternalTool {
        command: String,
        code: i32,
        stderr: String,
    },

    /// An index entry points outside the pack root.
    #[error("{} is outside the pack root {}", .path.display(), .root.display())]
    PathEscapesRoot { path: PathBuf, root: PathBuf },

    /// A project declares itself unsupported on both client and server.
    #[error("project {project} is marked unsupported on both client and server")]
    SideConflict { project: String },
}

impl Error {
    /// Process exit code for a fatal error of this kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingCredential { .. } => 2,
            Error::ExternalTool { code, .. } => *code,
            _ => 1,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// Exit code for any error bubbling out of a run.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error.downcast_ref::<Error>().map_or(1, Error::exit_code)
}
