//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch config directory plus helpers for running the installer binary.
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the global config file; it does not need to exist.
    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.yaml")
    }

    /// Write an lvmd override next to the global config.
    pub fn write_lvmd(&self, contents: &str) {
        std::fs::write(self.root().join("lvmd.yaml"), contents.as_bytes())
            .expect("write lvmd override");
    }

    /// Write a file under the fixture root and return its path.
    pub fn write_file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(&path, contents.as_bytes()).expect("write file");
        path
    }

    /// Run the binary with `args`, isolated from the caller's kube settings.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_lvms-install"))
            .args(args)
            .env_remove("KUBECONFIG")
            .env_remove("LVMS_KUBECTL")
            .env("RUST_LOG", "warn")
            .current_dir(self.root())
            .output()
            .expect("run lvms-install")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
