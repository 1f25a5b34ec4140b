//! Asset dependency graph.
//!
//! # Pipeline
//!
//! ```text
//! [AssetDefinition]
//!        ↓  build::build_graph_data()
//! GraphData (node table + symmetric upstream/downstream adjacency)
//!        ↓  cycles::has_cycles() / find_cycle() / find_cycle_groups()
//! cycle flag, example cycle path, cycle groups
//! ```
//!
//! Both steps are pure: they allocate fresh structures on every call and
//! keep no state between calls.

pub mod build;
pub mod cycles;

pub use build::{GraphData, GraphNode, build_graph_data, node_depends_on_self};
pub use cycles::{find_cycle, find_cycle_groups, has_cycles};
