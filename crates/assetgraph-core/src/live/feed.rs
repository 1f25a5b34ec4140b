//! Record shapes of the live telemetry feed.
//!
//! Field names and enum spellings follow the query layer's JSON
//! (`camelCase` fields, `SCREAMING_SNAKE_CASE` enum values). Every list
//! defaults to empty and every optional field to `None` when absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::AssetKey;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Queued,
    NotStarted,
    Managed,
    Starting,
    Started,
    Success,
    Failure,
    Canceling,
    Canceled,
}

impl RunStatus {
    /// Wire spelling, e.g. `NOT_STARTED`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::NotStarted => "NOT_STARTED",
            Self::Managed => "MANAGED",
            Self::Starting => "STARTING",
            Self::Started => "STARTED",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Canceling => "CANCELING",
            Self::Canceled => "CANCELED",
        }
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failure)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an asset's materialized state still reflects its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaleStatus {
    Fresh,
    Stale,
    Missing,
}

impl StaleStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "FRESH",
            Self::Stale => "STALE",
            Self::Missing => "MISSING",
        }
    }
}

impl fmt::Display for StaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaleCauseCategory {
    Code,
    Data,
    Dependencies,
}

impl StaleCauseCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "CODE",
            Self::Data => "DATA",
            Self::Dependencies => "DEPENDENCIES",
        }
    }
}

impl fmt::Display for StaleCauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One reason an asset is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleCause {
    /// The asset the cause applies to.
    pub key: AssetKey,
    pub category: StaleCauseCategory,
    pub reason: String,
    /// The upstream asset that contributed, if any.
    #[serde(default)]
    pub dependency: Option<AssetKey>,
}

/// A run produced a concrete output for the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializationEvent {
    /// Milliseconds since the epoch, as delivered by the feed.
    pub timestamp: String,
    pub run_id: String,
}

/// A run inspected the asset without producing new output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationEvent {
    pub timestamp: String,
    pub run_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessInfo {
    #[serde(default)]
    pub current_minutes_late: Option<f64>,
}

/// Partition completion counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionStats {
    pub num_materialized: u64,
    pub num_materializing: u64,
    pub num_failed: u64,
    pub num_partitions: u64,
}

/// Live status of one asset. Event histories are most-recent-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveAssetNode {
    pub asset_key: AssetKey,
    #[serde(default)]
    pub op_names: Vec<String>,
    #[serde(default)]
    pub asset_materializations: Vec<MaterializationEvent>,
    #[serde(default)]
    pub asset_observations: Vec<ObservationEvent>,
    #[serde(default)]
    pub stale_status: Option<StaleStatus>,
    #[serde(default)]
    pub stale_causes: Vec<StaleCause>,
    #[serde(default)]
    pub freshness_info: Option<FreshnessInfo>,
    #[serde(default)]
    pub partition_stats: Option<PartitionStats>,
}

/// The most recent run that targeted an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRun {
    pub id: String,
    pub status: RunStatus,
}

/// Run activity for one asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLatestInfo {
    pub asset_key: AssetKey,
    #[serde(default)]
    pub latest_run: Option<LatestRun>,
    /// Runs executing this asset's step.
    #[serde(default)]
    pub in_progress_run_ids: Vec<String>,
    /// Runs in flight that have not reached this asset's step yet.
    #[serde(default)]
    pub unstarted_run_ids: Vec<String>,
}

/// One refresh of the live feed: asset records plus run records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveQuery {
    #[serde(default)]
    pub asset_nodes: Vec<LiveAssetNode>,
    #[serde(default)]
    pub assets_latest_info: Vec<AssetLatestInfo>,
}
