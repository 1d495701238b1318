//! TestWorld pattern for declarative CLI test setup.
//!
//! Each world owns a temp directory. Span exports and config files are
//! written into it, and commands run with `SPANWEAVE_CONFIG` pointed at the
//! world's config path so the user's own config never leaks in.

use anyhow::Result;
use assert_cmd::Command;
use spanweave_types::Span;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::SampleFiles;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use spanweave_testing::{TestWorld, fixtures};
///
/// let world = TestWorld::new().with_spans("spans.jsonl", &fixtures::single_trace_forest());
///
/// let result = world.run(&["reconstruct", "spans.jsonl"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    config_path: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");

        Self {
            temp_dir,
            config_path,
            env_vars: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolve a path relative to the world root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write spans as an OpenInference NDJSON export.
    pub fn with_spans(self, name: &str, spans: &[Span]) -> Self {
        SampleFiles::write_ndjson(&self.path(name), spans).expect("Failed to write spans");
        self
    }

    /// Write raw lines, for malformed-input cases.
    pub fn with_lines(self, name: &str, lines: &[&str]) -> Self {
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        SampleFiles::write_lines(&self.path(name), &lines).expect("Failed to write lines");
        self
    }

    /// Write the config file commands will pick up.
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(&self.config_path, toml).expect("Failed to write config");
        self
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Configure a CLI command with this test environment's settings.
    ///
    /// The caller provides the base command (e.g. from `cargo_bin_cmd!("spanweave")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.root())
            .env("SPANWEAVE_CONFIG", &self.config_path)
            .env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute a CLI command in this environment.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("spanweave")
            .map_err(|e| anyhow::anyhow!("Failed to find spanweave binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
