//! Runtime abstraction for system operations.
//!
//! Everything the engine does to the outside world (reading pack files,
//! rewriting metadata, deleting converted files, spawning the external pack
//! tool) goes through [`Runtime`], so the phases can be driven by a mock in
//! tests.
//!
//! # Structure
//!
//! - `path` - Lexical path helpers (normalize, containment under the pack root)
//! - `env` - Environment variables and hardware parallelism
//! - `fs` - File system operations (read, write, remove)
//! - `process` - Child process execution with captured output

mod env;
mod fs;
pub mod path;
mod process;

use anyhow::Result;
use async_trait::async_trait;
use std::env as std_env;
use std::path::Path;

pub use path::{is_path_under, normalize_path, relative_path_from_dir};
pub use process::{CommandOutput, CommandSpec};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    /// Number of workers the digest pool may run at once.
    fn available_parallelism(&self) -> usize;

    // File System
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;

    // Processes
    /// Run a command to completion and capture its exit status and output.
    /// A non-zero exit is not an error here; callers decide what it means.
    fn run_command(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn available_parallelism(&self) -> usize {
        self.available_parallelism_impl()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.read_impl(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn run_command(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.run_command_impl(command)
    }
}
