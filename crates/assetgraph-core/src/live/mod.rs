//! Live status: feed records and their per-asset merge.
//!
//! ```text
//! LiveQuery ──build_live_data──▶ LiveData (GraphId → LiveDataForNode)
//!                                   │
//!                        live_data_for(id) ─▶ record or MISSING_LIVE_DATA
//! ```

pub mod feed;
pub mod merge;

pub use feed::{
    AssetLatestInfo, FreshnessInfo, LatestRun, LiveAssetNode, LiveQuery, MaterializationEvent,
    ObservationEvent, PartitionStats, RunStatus, StaleCause, StaleCauseCategory, StaleStatus,
};
pub use merge::{
    LiveData, LiveDataForNode, MISSING_LIVE_DATA, build_live_data, build_live_data_for_node,
    live_data_for,
};
