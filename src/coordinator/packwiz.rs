//! The external pack tool.

use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::pack::CurseForgeSource;
use crate::runtime::{CommandSpec, Runtime};

/// Operations delegated to the pack-management tool. Success is the
/// tool's exit status and nothing else.
#[cfg_attr(test, mockall::automock)]
pub trait PackTool: Send + Sync {
    /// Recompute the index from what is on disk.
    fn refresh(&self) -> Result<()>;

    /// Create a managed record for a CurseForge file inside `meta_folder`
    /// (relative to the pack root).
    fn add_curseforge(&self, source: &CurseForgeSource, meta_folder: &Path) -> Result<()>;

    /// Create a managed record from a direct download URL.
    fn add_url(&self, url: &str) -> Result<()>;
}

/// `packwiz`, run from the pack root.
pub struct Packwiz<'a, R: Runtime> {
    runtime: &'a R,
    program: String,
    root: PathBuf,
    pack_file: PathBuf,
}

impl<'a, R: Runtime> Packwiz<'a, R> {
    pub fn new(runtime: &'a R, program: &str, root: &Path, pack_file: &Path) -> Self {
        let pack_file = pack_file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| pack_file.to_path_buf());
        Self {
            runtime,
            program: program.to_string(),
            root: root.to_path_buf(),
            pack_file,
        }
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.program)
            .current_dir(&self.root)
            .arg("--pack-file")
            .arg(self.pack_file.to_string_lossy())
    }

    fn run(&self, command: CommandSpec) -> Result<()> {
        let display = command.display();
        debug!("Running {}", display);

        let output = self.runtime.run_command(&command)?;
        if !output.success() {
            return Err(Error::ExternalTool {
                command: display,
                code: output.code.unwrap_or(1),
                stderr: output.stderr,
            }
            .into());
        }
        Ok(())
    }
}

impl<R: Runtime> PackTool for Packwiz<'_, R> {
    #[tracing::instrument(skip(self))]
    fn refresh(&self) -> Result<()> {
        info!("Refreshing index");
        self.run(self.command().arg("refresh"))
    }

    #[tracing::instrument(skip(self))]
    fn add_curseforge(&self, source: &CurseForgeSource, meta_folder: &Path) -> Result<()> {
        self.run(
            self.command()
                .args(["--meta-folder".to_string(), meta_folder.to_string_lossy().into_owned()])
                .args([
                    "curseforge".to_string(),
                    "add".to_string(),
                    "--addon-id".to_string(),
                    source.project_id.to_string(),
                    "--file-id".to_string(),
                    source.file_id.to_string(),
                ]),
        )
    }

    #[tracing::instrument(skip(self))]
    fn add_url(&self, url: &str) -> Result<()> {
        // Decline the dependency prompt.
        self.run(self.command().args(["modrinth", "add", url]).stdin("n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{CommandOutput, MockRuntime};

    fn ok() -> CommandOutput {
        CommandOutput {
            code: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_refresh_runs_in_pack_root() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run_command()
            .withf(|spec| {
                spec.program == "packwiz"
                    && spec.current_dir.as_deref() == Some(Path::new("/packs/demo"))
                    && spec.args == ["--pack-file", "pack.toml", "refresh"]
                    && spec.stdin.is_none()
            })
            .times(1)
            .returning(|_| Ok(ok()));

        let tool = Packwiz::new(
            &runtime,
            "packwiz",
            Path::new("/packs/demo"),
            Path::new("/packs/demo/pack.toml"),
        );
        tool.refresh().unwrap();
    }

    #[test]
    fn test_add_curseforge_passes_ids_and_folder() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run_command()
            .withf(|spec| {
                spec.args
                    == [
                        "--pack-file",
                        "pack.toml",
                        "--meta-folder",
                        "mods",
                        "curseforge",
                        "add",
                        "--addon-id",
                        "238222",
                        "--file-id",
                        "4712866",
                    ]
            })
            .times(1)
            .returning(|_| Ok(ok()));

        let tool = Packwiz::new(&runtime, "packwiz", Path::new("."), Path::new("pack.toml"));
        tool.add_curseforge(
            &CurseForgeSource {
                file_id: 4712866,
                project_id: 238222,
            },
            Path::new("mods"),
        )
        .unwrap();
    }

    #[test]
    fn test_add_url_declines_prompt() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run_command()
            .withf(|spec| {
                spec.args.ends_with(&[
                    "modrinth".to_string(),
                    "add".to_string(),
                    "https://cdn.modrinth.com/data/p/versions/v/a.jar".to_string(),
                ]) && spec.stdin.as_deref() == Some(b"n\n".as_slice())
            })
            .times(1)
            .returning(|_| Ok(ok()));

        let tool = Packwiz::new(&runtime, "packwiz", Path::new("."), Path::new("pack.toml"));
        tool.add_url("https://cdn.modrinth.com/data/p/versions/v/a.jar")
            .unwrap();
    }

    #[test]
    fn test_non_zero_exit_is_external_tool_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_run_command().returning(|_| {
            Ok(CommandOutput {
                code: Some(3),
                stdout: String::new(),
                stderr: "index is corrupt\n".into(),
            })
        });

        let tool = Packwiz::new(&runtime, "packwiz", Path::new("."), Path::new("pack.toml"));
        let err = tool.refresh().unwrap_err();

        match err.downcast_ref::<Error>() {
            Some(Error::ExternalTool { code, stderr, .. }) => {
                assert_eq!(*code, 3);
                assert!(stderr.contains("index is corrupt"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(crate::error::exit_code(&err), 3);
    }

    #[test]
    fn test_killed_by_signal_exits_one() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run_command()
            .returning(|_| Ok(CommandOutput::default()));

        let tool = Packwiz::new(&runtime, "packwiz", Path::new("."), Path::new("pack.toml"));
        let err = tool.refresh().unwrap_err();

        assert_eq!(crate::error::exit_code(&err), 1);
    }
}
