//! Project configuration read from `.assetgraph/config.toml`.
//!
//! Every field has a default, so a missing file or a file with only some
//! sections is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::definition::ASSET_JOB_PREFIX;

/// Location of the config file relative to the project root.
pub const CONFIG_PATH: &str = ".assetgraph/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Make `ag cycles` exit non-zero when a cycle exists.
    #[serde(default)]
    pub fail_on_cycles: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `pretty`, `text` or `json`. Unknown values are ignored.
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Job names starting with this prefix are hidden from listings.
    #[serde(default = "default_hidden_prefix")]
    pub hidden_prefix: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            hidden_prefix: default_hidden_prefix(),
        }
    }
}

/// Load `.assetgraph/config.toml` under `project_root`, or defaults if the
/// file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(CONFIG_PATH);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_hidden_prefix() -> String {
    ASSET_JOB_PREFIX.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(root: &Path, content: &str) {
        let dir = root.join(".assetgraph");
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(dir.join("config.toml"), content).expect("write config");
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("tempdir");
        let cfg = load_project_config(root.path()).expect("load should succeed");

        assert!(!cfg.graph.fail_on_cycles);
        assert_eq!(cfg.output.format, None);
        assert_eq!(cfg.jobs.hidden_prefix, "__ASSET_JOB");
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let root = tempfile::tempdir().expect("tempdir");
        write_config(root.path(), "[graph]\nfail_on_cycles = true\n");

        let cfg = load_project_config(root.path()).expect("load should succeed");

        assert!(cfg.graph.fail_on_cycles);
        assert_eq!(cfg.jobs, JobsConfig::default());
    }

    #[test]
    fn full_config_parses() {
        let root = tempfile::tempdir().expect("tempdir");
        write_config(
            root.path(),
            r#"
[graph]
fail_on_cycles = true

[output]
format = "json"

[jobs]
hidden_prefix = "__INTERNAL"
"#,
        );

        let cfg = load_project_config(root.path()).expect("load should succeed");

        assert_eq!(cfg.output.format.as_deref(), Some("json"));
        assert_eq!(cfg.jobs.hidden_prefix, "__INTERNAL");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let root = tempfile::tempdir().expect("tempdir");
        write_config(root.path(), "[graph\nfail_on_cycles = ");

        let err = load_project_config(root.path()).expect_err("parse should fail");
        assert!(format!("{err:#}").contains("Failed to parse"));
    }
}
