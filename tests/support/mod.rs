#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub struct TestVault {
    dir: TempDir,
}

impl TestVault {
    pub fn init() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_host_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".tasktracker.toml", contents)
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = tasktracker_cmd();
        cmd.current_dir(self.path());
        cmd.env_remove("TASKTRACKER_VAULT");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

/// Path of the built binary, for tests that drive a long-running process.
pub fn tasktracker_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("tasktracker")
}

pub fn tasktracker_cmd() -> Command {
    Command::cargo_bin("tasktracker").expect("binary")
}

/// Markdown body of one tracker block.
pub fn tracker_block(body: &str) -> String {
    format!("```tasktracker\n{body}```\n")
}
