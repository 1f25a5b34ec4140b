//! Static asset definitions as delivered by the query layer.

use serde::{Deserialize, Serialize};

use crate::key::AssetKey;

/// Name prefix of the implicit jobs generated for asset groups.
pub const ASSET_JOB_PREFIX: &str = "__ASSET_JOB";

/// The static description of one asset.
///
/// `dependency_keys` are the assets this one reads from (upstream);
/// `depended_by_keys` are the assets that read from it (downstream).
/// `op_names` correlate the asset with run telemetry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDefinition {
    pub asset_key: AssetKey,
    #[serde(default)]
    pub dependency_keys: Vec<AssetKey>,
    #[serde(default)]
    pub depended_by_keys: Vec<AssetKey>,
    #[serde(default)]
    pub op_names: Vec<String>,
    #[serde(default)]
    pub job_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

impl AssetDefinition {
    /// A definition with only a key; builder-style setters fill the rest.
    #[must_use]
    pub fn new(asset_key: AssetKey) -> Self {
        Self {
            asset_key,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dependencies(mut self, keys: impl IntoIterator<Item = AssetKey>) -> Self {
        self.dependency_keys.extend(keys);
        self
    }

    #[must_use]
    pub fn with_dependents(mut self, keys: impl IntoIterator<Item = AssetKey>) -> Self {
        self.depended_by_keys.extend(keys);
        self
    }

    #[must_use]
    pub fn with_op_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.op_names.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_job_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Step key used to correlate this asset with run telemetry.
    #[must_use]
    pub fn step_key(&self) -> String {
        step_key_for_asset(&self.op_names)
    }

    /// Job names with the implicit asset-group jobs (`prefix…`) removed.
    pub fn visible_job_names<'a>(&'a self, hidden_prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.job_names
            .iter()
            .map(String::as_str)
            .filter(move |name| !is_hidden_asset_group_job(name, hidden_prefix))
    }
}

/// First declared op name, or `""` when there is none.
///
/// Consumers can highlight a single step per asset, so only the first op
/// is addressable.
#[must_use]
pub fn step_key_for_asset(op_names: &[String]) -> String {
    op_names.first().cloned().unwrap_or_default()
}

/// Returns `true` for the implicit jobs generated for asset groups, whose
/// names start with `prefix` (normally [`ASSET_JOB_PREFIX`]).
#[must_use]
pub fn is_hidden_asset_group_job(job_name: &str, prefix: &str) -> bool {
    job_name.starts_with(prefix)
}
