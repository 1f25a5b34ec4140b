//! Loading definition and live-feed snapshots from JSON files.
//!
//! Documents use the query layer's payload shapes:
//!
//! - definitions: `{ "assetNodes": [AssetDefinition, ...] }`
//! - live feed: `{ "assetNodes": [...], "assetsLatestInfo": [...] }`
//!
//! A path of `-` reads standard input.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::definition::AssetDefinition;
use crate::live::LiveQuery;

/// Path spelling that selects standard input.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    /// The file the failure refers to (`-` for stdin).
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    /// `true` when the bytes were read but were not a valid document.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// A definitions snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionsDocument {
    #[serde(default)]
    pub asset_nodes: Vec<AssetDefinition>,
}

/// Load asset definitions from `path`.
///
/// # Errors
///
/// Returns [`SnapshotError::Read`] if the file cannot be read and
/// [`SnapshotError::Parse`] if it is not a definitions document.
#[instrument]
pub fn load_definitions(path: &Path) -> Result<Vec<AssetDefinition>, SnapshotError> {
    let doc: DefinitionsDocument = load_json(path)?;
    debug!(definitions = doc.asset_nodes.len(), "loaded definitions");
    Ok(doc.asset_nodes)
}

/// Load one live-feed refresh from `path`.
///
/// # Errors
///
/// Returns [`SnapshotError::Read`] if the file cannot be read and
/// [`SnapshotError::Parse`] if it is not a live-feed document.
#[instrument]
pub fn load_live_query(path: &Path) -> Result<LiveQuery, SnapshotError> {
    let query: LiveQuery = load_json(path)?;
    debug!(
        assets = query.asset_nodes.len(),
        runs = query.assets_latest_info.len(),
        "loaded live feed"
    );
    Ok(query)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let content = read_source(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_source(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut content = String::new();
        std::io::stdin().lock().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::AssetKey;
    use crate::live::RunStatus;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write snapshot");
        path
    }

    #[test]
    fn loads_definitions_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            "defs.json",
            r#"{"assetNodes": [
                {"assetKey": {"path": ["raw"]}, "dependedByKeys": [{"path": ["clean"]}]},
                {"assetKey": {"path": ["clean"]}, "dependencyKeys": [{"path": ["raw"]}], "opNames": ["clean_op"]}
            ]}"#,
        );

        let defs = load_definitions(&path).expect("load definitions");

        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].asset_key, AssetKey::new(["clean"]));
        assert_eq!(defs[1].step_key(), "clean_op");
    }

    #[test]
    fn empty_document_has_no_definitions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "defs.json", "{}");
        assert!(load_definitions(&path).expect("load").is_empty());
    }

    #[test]
    fn loads_live_query_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            "live.json",
            r#"{
                "assetNodes": [{"assetKey": {"path": ["raw"]}}],
                "assetsLatestInfo": [
                    {"assetKey": {"path": ["raw"]}, "latestRun": {"id": "R1", "status": "STARTED"},
                     "inProgressRunIds": ["R1"]}
                ]
            }"#,
        );

        let query = load_live_query(&path).expect("load live");

        assert_eq!(query.asset_nodes.len(), 1);
        assert_eq!(
            query.assets_latest_info[0]
                .latest_run
                .as_ref()
                .map(|r| r.status),
            Some(RunStatus::Started)
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.json");

        let err = load_definitions(&path).expect_err("missing file");

        assert!(matches!(err, SnapshotError::Read { .. }));
        assert_eq!(err.path(), path.as_path());
        assert!(!err.is_parse());
    }

    #[test]
    fn read_error_message_names_io_cause() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.json");

        let err = load_live_query(&path).expect_err("missing file");

        let SnapshotError::Read { source, .. } = &err else {
            panic!("expected read error, got {err:?}");
        };
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        let message = err.to_string();
        assert!(message.contains("nope.json: "), "{message}");
        assert!(message.ends_with(&source.to_string()), "{message}");
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "defs.json", r#"{"assetNodes": [{"assetKey": 3}]}"#);

        let err = load_definitions(&path).expect_err("bad document");

        assert!(err.is_parse());
        assert!(err.to_string().contains("defs.json"));
    }
}
