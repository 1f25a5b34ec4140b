//! Merging live asset records with latest-run records.
//!
//! # Join
//!
//! Run records are indexed once by [`GraphId`]. When several run records
//! share a key, the first in input order is used. When several asset
//! records share a key, the later one replaces the earlier entry.
//!
//! # Run attribution
//!
//! The latest run is attributed to the last materialization only when their
//! run ids match:
//!
//! | latest run | last materialization | failed-to-materialize | run status |
//! |------------|----------------------|-----------------------|------------|
//! | none       | any                  | `None`                | `None`     |
//! | FAILURE    | none / other run     | latest run            | `None`     |
//! | FAILURE    | same run             | `None`                | FAILURE    |
//! | other      | same run             | `None`                | its status |
//! | other      | none / other run     | `None`                | `None`     |
//!
//! A run can fail before emitting anything for an asset; the
//! failed-to-materialize field flags exactly that case. An older
//! materialization keeps its own outcome and is never relabelled with the
//! status of an unrelated newer run.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, instrument};

use super::feed::{
    AssetLatestInfo, FreshnessInfo, LatestRun, LiveAssetNode, LiveQuery, MaterializationEvent,
    ObservationEvent, PartitionStats, RunStatus, StaleCause, StaleStatus,
};
use crate::definition::step_key_for_asset;
use crate::key::{GraphId, to_graph_id};

// ---------------------------------------------------------------------------
// LiveDataForNode
// ---------------------------------------------------------------------------

/// Point-in-time status of one asset, rebuilt on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveDataForNode {
    /// Step used to correlate the asset with runs; `""` when none.
    pub step_key: String,
    /// Runs in progress that have not started this asset's step.
    pub unstarted_run_ids: Vec<String>,
    /// Runs in progress that are executing this asset's step.
    pub in_progress_run_ids: Vec<String>,
    pub run_which_failed_to_materialize: Option<LatestRun>,
    pub last_materialization: Option<MaterializationEvent>,
    /// Only set when the latest run produced `last_materialization`.
    pub last_materialization_run_status: Option<RunStatus>,
    pub last_observation: Option<ObservationEvent>,
    pub freshness_info: Option<FreshnessInfo>,
    pub stale_status: Option<StaleStatus>,
    pub stale_causes: Vec<StaleCause>,
    pub partition_stats: Option<PartitionStats>,
}

/// Stand-in for assets with no live record.
pub static MISSING_LIVE_DATA: LiveDataForNode = LiveDataForNode {
    step_key: String::new(),
    unstarted_run_ids: Vec::new(),
    in_progress_run_ids: Vec::new(),
    run_which_failed_to_materialize: None,
    last_materialization: None,
    last_materialization_run_status: None,
    last_observation: None,
    freshness_info: None,
    stale_status: None,
    stale_causes: Vec::new(),
    partition_stats: None,
};

impl Default for LiveDataForNode {
    fn default() -> Self {
        MISSING_LIVE_DATA.clone()
    }
}

impl LiveDataForNode {
    /// At least one run is in flight for this asset.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.in_progress_run_ids.is_empty() || !self.unstarted_run_ids.is_empty()
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale_status == Some(StaleStatus::Stale)
    }
}

/// Live status keyed by asset id.
pub type LiveData = BTreeMap<GraphId, LiveDataForNode>;

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge every live asset record with its run record.
///
/// Never fails; missing run records leave run fields empty.
#[must_use]
#[instrument(skip_all, fields(assets = asset_nodes.len(), runs = latest_info.len()))]
pub fn build_live_data(asset_nodes: &[LiveAssetNode], latest_info: &[AssetLatestInfo]) -> LiveData {
    let mut by_id: HashMap<GraphId, &AssetLatestInfo> = HashMap::with_capacity(latest_info.len());
    let mut duplicate_runs = 0_usize;
    for info in latest_info {
        let id = to_graph_id(&info.asset_key);
        if by_id.contains_key(&id) {
            duplicate_runs += 1;
            continue;
        }
        by_id.insert(id, info);
    }

    let mut data = LiveData::new();
    let mut unmatched = 0_usize;
    for node in asset_nodes {
        let id = to_graph_id(&node.asset_key);
        let info = by_id.get(&id).copied();
        if info.is_none() {
            unmatched += 1;
        }
        data.insert(id, build_live_data_for_node(node, info));
    }

    debug!(
        merged = data.len(),
        unmatched, duplicate_runs, "built live data"
    );

    data
}

/// Derive the status record for one asset.
#[must_use]
pub fn build_live_data_for_node(
    node: &LiveAssetNode,
    info: Option<&AssetLatestInfo>,
) -> LiveDataForNode {
    let last_materialization = node.asset_materializations.first().cloned();
    let last_observation = node.asset_observations.first().cloned();
    let latest_run = info.and_then(|i| i.latest_run.as_ref());

    let produced_last_materialization = |run: &LatestRun| {
        last_materialization
            .as_ref()
            .is_some_and(|m| m.run_id == run.id)
    };

    let run_which_failed_to_materialize = latest_run
        .filter(|&run| run.status.is_failure() && !produced_last_materialization(run))
        .cloned();

    let last_materialization_run_status = latest_run
        .filter(|&run| produced_last_materialization(run))
        .map(|run| run.status);

    LiveDataForNode {
        step_key: step_key_for_asset(&node.op_names),
        unstarted_run_ids: info.map(|i| i.unstarted_run_ids.clone()).unwrap_or_default(),
        in_progress_run_ids: info
            .map(|i| i.in_progress_run_ids.clone())
            .unwrap_or_default(),
        run_which_failed_to_materialize,
        last_materialization,
        last_materialization_run_status,
        last_observation,
        freshness_info: node.freshness_info.clone(),
        stale_status: node.stale_status,
        stale_causes: node.stale_causes.clone(),
        partition_stats: node.partition_stats,
    }
}

/// Status for `id`, or [`MISSING_LIVE_DATA`] when the feed had no record.
#[must_use]
pub fn live_data_for<'a>(data: &'a LiveData, id: &GraphId) -> &'a LiveDataForNode {
    data.get(id).unwrap_or(&MISSING_LIVE_DATA)
}

impl LiveQuery {
    /// Merge this refresh. See [`build_live_data`].
    #[must_use]
    pub fn build(&self) -> LiveData {
        build_live_data(&self.asset_nodes, &self.assets_latest_info)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
