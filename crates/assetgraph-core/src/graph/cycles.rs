//! Cycle detection over a built asset graph.
//!
//! # Design
//!
//! - **Three colours**: white (unvisited), gray (on the current DFS path),
//!   black (fully explored). An edge into a gray node is a back edge and
//!   closes a cycle; black nodes are skipped.
//! - **Per call**: colour map and path live on the stack of one
//!   [`find_cycle`] call. Nothing is shared between calls.
//! - **Iterative**: an explicit frame stack replaces recursion so a long
//!   dependency chain cannot overflow the thread stack.
//! - **O(V+E)**: each node turns black once and each edge is followed once.
//!
//! Self-references are never edges (see [`crate::graph::build`]), so a
//! declared self-dependency on its own is not a cycle.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use tracing::{debug, instrument};

use super::build::GraphData;
use crate::key::GraphId;

/// DFS colours for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

/// Returns `true` if the graph contains any directed cycle.
///
/// Every id in the graph is a potential search root, including ids that
/// only appear as neighbours of defined assets.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn has_cycles(graph: &GraphData) -> bool {
    let found = find_cycle(graph).is_some();
    debug!(found, "cycle check complete");
    found
}

/// Find one cycle, returned as a closed path `[a, b, …, a]`.
///
/// Roots are tried in id order, so the result is deterministic for a given
/// graph. Returns `None` for an acyclic graph.
#[must_use]
pub fn find_cycle(graph: &GraphData) -> Option<Vec<GraphId>> {
    let ids = graph.all_ids();
    let mut color: HashMap<&GraphId, Color> = ids.iter().map(|id| (*id, Color::White)).collect();

    for root in ids {
        if color.get(root) != Some(&Color::White) {
            continue;
        }
        if let Some(cycle) = search_from(graph, root, &mut color) {
            return Some(cycle);
        }
    }

    None
}

/// Every group of mutually reachable ids (strongly connected component)
/// with more than one member.
///
/// Members are sorted within a group and groups are sorted, so output is
/// stable across runs.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn find_cycle_groups(graph: &GraphData) -> Vec<Vec<GraphId>> {
    let digraph = graph.to_digraph();

    let mut groups: Vec<Vec<GraphId>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut members: Vec<GraphId> = component
                .into_iter()
                .filter_map(|idx| digraph.node_weight(idx).cloned())
                .collect();
            members.sort_unstable();
            members
        })
        .collect();

    groups.sort_unstable();
    debug!(groups = groups.len(), "cycle groups computed");
    groups
}

/// Depth-first search from `root`, returning the first cycle found.
fn search_from<'a>(
    graph: &'a GraphData,
    root: &'a GraphId,
    color: &mut HashMap<&'a GraphId, Color>,
) -> Option<Vec<GraphId>> {
    color.insert(root, Color::Gray);
    let mut path: Vec<&GraphId> = vec![root];
    let mut frames = vec![graph.downstream_of(root)];

    while let Some(neighbors) = frames.last_mut() {
        if let Some(next) = neighbors.next() {
            match color.get(next).copied().unwrap_or(Color::White) {
                Color::White => {
                    color.insert(next, Color::Gray);
                    path.push(next);
                    frames.push(graph.downstream_of(next));
                }
                Color::Gray => {
                    // Back edge: `next` is an ancestor on the current path.
                    let start = path.iter().rposition(|id| *id == next).unwrap_or(0);
                    let mut cycle: Vec<GraphId> =
                        path[start..].iter().map(|id| (*id).clone()).collect();
                    cycle.push(next.clone());
                    return Some(cycle);
                }
                Color::Black => {}
            }
        } else {
            frames.pop();
            if let Some(done) = path.pop() {
                color.insert(done, Color::Black);
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
