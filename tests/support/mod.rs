#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use taskbuddy::goal::Goal;
use taskbuddy::task::Task;
use tempfile::TempDir;

/// Wednesday of a fixed week, so date windows are deterministic
pub const NOW: &str = "2024-06-05T08:00";

pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("taskbuddy.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_store_value(&self, key: &str, contents: &str) -> std::io::Result<PathBuf> {
        fs::create_dir_all(self.store_dir())?;
        let path = self.store_dir().join(format!("{key}.json"));
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_tasks(&self, uid: &str) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
        self.read_list(&format!("tasks-{uid}"))
    }

    pub fn read_goals(&self, uid: &str) -> Result<Vec<Goal>, Box<dyn std::error::Error>> {
        self.read_list(&format!("goals-{uid}"))
    }

    fn read_list<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, Box<dyn std::error::Error>> {
        let path = self.store_dir().join(format!("{key}.json"));
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Command rooted at this home with the clock pinned to [`NOW`]
    pub fn cmd(&self) -> Command {
        let mut cmd = taskbuddy_cmd();
        cmd.env("TASKBUDDY_HOME", self.path());
        cmd.env("TASKBUDDY_NOW", NOW);
        cmd
    }

    pub fn login(&self, uid: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.cmd().args(["auth", "login", uid]).assert().success();
        Ok(())
    }

    /// Run with `--json` and return the parsed envelope
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self.cmd().arg("--json").args(args).output()?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

pub fn taskbuddy_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskbuddy").expect("binary");
    cmd.env_remove("TASKBUDDY_HOME");
    cmd.env_remove("TASKBUDDY_NOW");
    cmd.env_remove("RUST_LOG");
    cmd
}
