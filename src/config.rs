//! Configuration loading from sievebench.toml
//!
//! Settings can be placed in a `sievebench.toml` discovered by walking up
//! from the current directory. Command-line flags always override file
//! values.

use crate::harness::HarnessKind;
use crate::sieve::DEFAULT_SIEVE_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which harness kind(s) a run benchmarks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Process fan-out only.
    Process,
    /// Thread fan-out only.
    Thread,
    /// Both backends, process first, with a comparison summary.
    #[default]
    Both,
}

impl Mode {
    /// The harness kinds to run, in execution order.
    pub fn kinds(self) -> Vec<HarnessKind> {
        match self {
            Mode::Process => vec![HarnessKind::Process],
            Mode::Thread => vec![HarnessKind::Thread],
            Mode::Both => vec![HarnessKind::Process, HarnessKind::Thread],
        }
    }
}

/// Sievebench configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SievebenchConfig {
    /// Runner configuration.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for harness execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Default mode when `--mode` is not passed.
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Sieve upper bound for every worker.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: None,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_SIEVE_LIMIT
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the report files.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Index-suffixed per-worker report files instead of the shared paths.
    #[serde(default)]
    pub unique_worker_files: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            unique_worker_files: false,
        }
    }
}

fn default_directory() -> String {
    ".".to_string()
}

impl SievebenchConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current
    /// directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("sievebench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SievebenchConfig::default();
        assert_eq!(config.runner.limit, DEFAULT_SIEVE_LIMIT);
        assert_eq!(config.runner.mode, None);
        assert_eq!(config.output.directory, ".");
        assert!(!config.output.unique_worker_files);
    }

    #[test]
    fn parse_toml_with_partial_sections() {
        let toml_str = r#"
            [runner]
            mode = "thread"
            limit = 500

            [output]
            unique_worker_files = true
        "#;

        let config: SievebenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.mode, Some(Mode::Thread));
        assert_eq!(config.runner.limit, 500);
        assert!(config.output.unique_worker_files);
        // Defaults still apply to omitted keys
        assert_eq!(config.output.directory, ".");
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config: SievebenchConfig = toml::from_str("").unwrap();
        assert_eq!(config.runner.limit, DEFAULT_SIEVE_LIMIT);
    }

    #[test]
    fn mode_kinds_order() {
        assert_eq!(Mode::Process.kinds(), vec![HarnessKind::Process]);
        assert_eq!(Mode::Thread.kinds(), vec![HarnessKind::Thread]);
        assert_eq!(
            Mode::Both.kinds(),
            vec![HarnessKind::Process, HarnessKind::Thread]
        );
    }
}
