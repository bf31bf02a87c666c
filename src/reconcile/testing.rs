use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::runtime::RealRuntime;

pub const PROVISIONAL_RECORD: &str = r#"
name = "Just Enough Items"
filename = "jei-1.20.1-forge-15.2.0.27.jar"
side = "both"

[download]
hash-format = "sha1"
hash = "a9993e364706816aba3e25717850c26c9cd0d89d"
mode = "metadata:curseforge"

[option]
optional = true
default = false

[update]
[update.curseforge]
file-id = 4712866
project-id = 238222
"#;

/// A pack in a temporary directory.
pub struct TestPack {
    pub dir: TempDir,
    pub runtime: Arc<RealRuntime>,
}

impl TestPack {
    /// `files` are (path, content, metafile) relative to the pack root.
    pub fn new(files: &[(&str, &[u8], bool)]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pack.toml"),
            r#"
name = "test"
pack-format = "packwiz:1.1.0"
[index]
file = "index.toml"
hash-format = "sha256"
hash = "00"
[versions]
minecraft = "1.20.1"
"#,
        )
        .unwrap();

        let mut index = String::from("hash-format = \"sha256\"\n");
        for (path, content, metafile) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, content).unwrap();
            index.push_str(&format!(
                "\n[[files]]\nfile = \"{}\"\nhash = \"00\"\nmetafile = {}\n",
                path, metafile
            ));
        }
        fs::write(dir.path().join("index.toml"), index).unwrap();

        Self {
            dir,
            runtime: Arc::new(RealRuntime),
        }
    }

    pub fn pack_file(&self) -> PathBuf {
        self.dir.path().join("pack.toml")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }
}
