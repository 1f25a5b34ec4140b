//! assetgraph-core: asset dependency graphs and live status.
//!
//! - [`key`]: asset keys and the canonical [`key::GraphId`] codec.
//! - [`definition`]: static asset definitions.
//! - [`graph`]: graph construction and cycle detection.
//! - [`live`]: live feed records and their per-asset merge.
//! - [`snapshot`]: loading definitions and live feeds from JSON.
//! - [`config`]: `.assetgraph/config.toml`.
//!
//! # Conventions
//!
//! - **Errors**: the graph, cycle and merge operations are total and return
//!   plain values. I/O boundaries return typed errors (`thiserror`) or
//!   `anyhow::Result`.
//! - **Logging**: `tracing` spans on entry points, `debug!` summaries.

#![forbid(unsafe_code)]

pub mod config;
pub mod definition;
pub mod error;
pub mod graph;
pub mod key;
pub mod live;
pub mod snapshot;

pub use definition::AssetDefinition;
pub use graph::{GraphData, GraphNode, build_graph_data, has_cycles};
pub use key::{AssetKey, GraphId, to_graph_id};
pub use live::{LiveData, LiveDataForNode, MISSING_LIVE_DATA, build_live_data};
