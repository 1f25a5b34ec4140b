//! Graph construction from asset definitions.
//!
//! # Edge Direction
//!
//! An edge `U → V` means "V depends on U": U is upstream, V is downstream.
//! Each definition contributes edges from both sides of its declaration:
//!
//! - every key in `dependency_keys` yields `dep → self`;
//! - every key in `depended_by_keys` yields `self → dependent`.
//!
//! Both adjacency tables are written together by a single private
//! `add_edge`, so `v ∈ downstream[u] ⟺ u ∈ upstream[v]` holds for every
//! built graph.
//!
//! ## Self-references
//!
//! Assets partitioned over time commonly depend on an earlier partition of
//! themselves. Such declarations never become edges; the graph used for
//! cycle detection must not contain self-loops. [`node_depends_on_self`]
//! still reports the declaration for display purposes.
//!
//! ## Duplicates
//!
//! When two definitions share a [`GraphId`], the later one replaces the
//! earlier node entry. Edges declared by both are kept.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::definition::AssetDefinition;
use crate::key::{AssetKey, GraphId, to_graph_id};

// ---------------------------------------------------------------------------
// GraphNode / GraphData
// ---------------------------------------------------------------------------

/// One asset definition together with its computed id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: GraphId,
    pub asset_key: AssetKey,
    pub definition: AssetDefinition,
}

/// Node table plus symmetric upstream/downstream adjacency.
///
/// Immutable once built; call [`build_graph_data`] again when definitions
/// change. Adjacency may reference ids with no node entry (an asset that is
/// declared as a neighbour but whose definition was not supplied).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphData {
    nodes: BTreeMap<GraphId, GraphNode>,
    downstream: BTreeMap<GraphId, BTreeSet<GraphId>>,
    upstream: BTreeMap<GraphId, BTreeSet<GraphId>>,
}

impl GraphData {
    /// Insert `from → to` into both tables. Callers filter self-edges.
    fn add_edge(&mut self, from: GraphId, to: GraphId) {
        debug_assert_ne!(from, to, "self-edges are never inserted");
        self.downstream
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.upstream.entry(to).or_default().insert(from);
    }

    /// The node table keyed by id.
    #[must_use]
    pub const fn nodes(&self) -> &BTreeMap<GraphId, GraphNode> {
        &self.nodes
    }

    /// `id → ids that depend on it`.
    #[must_use]
    pub const fn downstream(&self) -> &BTreeMap<GraphId, BTreeSet<GraphId>> {
        &self.downstream
    }

    /// `id → ids it depends on`.
    #[must_use]
    pub const fn upstream(&self) -> &BTreeMap<GraphId, BTreeSet<GraphId>> {
        &self.upstream
    }

    #[must_use]
    pub fn node(&self, id: &GraphId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Ids that depend on `id`. Empty if `id` is unknown.
    pub fn downstream_of<'a>(
        &'a self,
        id: &GraphId,
    ) -> impl Iterator<Item = &'a GraphId> + use<'a> {
        self.downstream.get(id).into_iter().flatten()
    }

    /// Ids that `id` depends on. Empty if `id` is unknown.
    pub fn upstream_of<'a>(
        &'a self,
        id: &GraphId,
    ) -> impl Iterator<Item = &'a GraphId> + use<'a> {
        self.upstream.get(id).into_iter().flatten()
    }

    #[must_use]
    pub fn contains_edge(&self, from: &GraphId, to: &GraphId) -> bool {
        self.downstream
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    /// Number of entries in the node table.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.downstream.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.downstream.is_empty()
    }

    /// Every id that appears in the node table or in either adjacency table.
    #[must_use]
    pub fn all_ids(&self) -> BTreeSet<&GraphId> {
        self.nodes
            .keys()
            .chain(self.downstream.keys())
            .chain(self.upstream.keys())
            .collect()
    }

    /// Defined nodes with no upstream neighbours.
    #[must_use]
    pub fn roots(&self) -> Vec<&GraphNode> {
        self.nodes
            .values()
            .filter(|node| self.upstream_of(&node.id).next().is_none())
            .collect()
    }

    /// Defined nodes with no downstream neighbours.
    #[must_use]
    pub fn leaves(&self) -> Vec<&GraphNode> {
        self.nodes
            .values()
            .filter(|node| self.downstream_of(&node.id).next().is_none())
            .collect()
    }

    /// Defined nodes whose `/`-joined token equals `token`.
    ///
    /// Tokens are lossy, so more than one node can match.
    #[must_use]
    pub fn find_by_token(&self, token: &str) -> Vec<&GraphNode> {
        self.nodes
            .values()
            .filter(|node| node.asset_key.token() == token)
            .collect()
    }

    /// Copy the graph into a petgraph [`DiGraph`] for whole-graph algorithms.
    ///
    /// Every id from [`GraphData::all_ids`] becomes a node, in id order.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<GraphId, ()> {
        let ids = self.all_ids();
        let mut graph = DiGraph::<GraphId, ()>::with_capacity(ids.len(), self.edge_count());
        let mut index: HashMap<&GraphId, NodeIndex> = HashMap::with_capacity(ids.len());

        for id in ids {
            index.insert(id, graph.add_node(id.clone()));
        }

        for (from, targets) in &self.downstream {
            for to in targets {
                if let (Some(&a), Some(&b)) = (index.get(from), index.get(to)) {
                    graph.add_edge(a, b, ());
                }
            }
        }

        graph
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build a [`GraphData`] from definitions, in input order.
///
/// Never fails: duplicates overwrite the node entry and self-references are
/// excluded from the edge set.
///
/// # Complexity
///
/// O(N * L * log N) where N is the number of definitions and L the average
/// number of declared neighbours.
#[must_use]
#[instrument(skip(definitions), fields(definitions = definitions.len()))]
pub fn build_graph_data(definitions: &[AssetDefinition]) -> GraphData {
    let mut data = GraphData::default();
    let mut duplicates = 0_usize;
    let mut self_refs = 0_usize;

    for definition in definitions {
        let id = to_graph_id(&definition.asset_key);

        for key in &definition.dependency_keys {
            let upstream = to_graph_id(key);
            if upstream == id {
                self_refs += 1;
                continue;
            }
            data.add_edge(upstream, id.clone());
        }

        for key in &definition.depended_by_keys {
            let downstream = to_graph_id(key);
            if downstream == id {
                self_refs += 1;
                continue;
            }
            data.add_edge(id.clone(), downstream);
        }

        let node = GraphNode {
            id: id.clone(),
            asset_key: definition.asset_key.clone(),
            definition: definition.clone(),
        };
        if data.nodes.insert(id, node).is_some() {
            duplicates += 1;
        }
    }

    debug!(
        nodes = data.node_count(),
        edges = data.edge_count(),
        duplicates,
        self_refs,
        "built asset graph"
    );

    data
}

/// Returns `true` if the node's definition names its own key as a
/// dependency or a dependent.
///
/// Independent of the edge set: such declarations are never materialized
/// as edges.
#[must_use]
pub fn node_depends_on_self(node: &GraphNode) -> bool {
    let id = to_graph_id(&node.asset_key);
    node.definition
        .dependency_keys
        .iter()
        .chain(&node.definition.depended_by_keys)
        .any(|key| to_graph_id(key) == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> AssetKey {
        AssetKey::new([name])
    }

    fn id(name: &str) -> GraphId {
        key(name).graph_id()
    }

    fn def(name: &str, deps: &[&str], dependents: &[&str]) -> AssetDefinition {
        AssetDefinition::new(key(name))
            .with_dependencies(deps.iter().map(|d| key(d)))
            .with_dependents(dependents.iter().map(|d| key(d)))
    }

    fn ids<'a>(iter: impl Iterator<Item = &'a GraphId>) -> Vec<GraphId> {
        iter.cloned().collect()
    }

    #[test]
    fn empty_input_produces_empty_graph() {
        let graph = build_graph_data(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn linear_chain() {
        let graph = build_graph_data(&[
            def("A", &[], &["B"]),
            def("B", &["A"], &["C"]),
            def("C", &["B"], &[]),
        ]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(ids(graph.downstream_of(&id("A"))), vec![id("B")]);
        assert_eq!(ids(graph.downstream_of(&id("B"))), vec![id("C")]);
        assert_eq!(ids(graph.upstream_of(&id("B"))), vec![id("A")]);
        assert_eq!(ids(graph.upstream_of(&id("C"))), vec![id("B")]);
        assert!(graph.downstream_of(&id("C")).next().is_none());
    }

    #[test]
    fn edge_declared_from_one_side_is_symmetric() {
        // Only B declares the relationship.
        let graph = build_graph_data(&[def("A", &[], &[]), def("B", &["A"], &[])]);

        assert!(graph.contains_edge(&id("A"), &id("B")));
        assert_eq!(ids(graph.upstream_of(&id("B"))), vec![id("A")]);
        assert!(!graph.contains_edge(&id("B"), &id("A")));
    }

    #[test]
    fn duplicate_edges_are_idempotent() {
        let graph = build_graph_data(&[def("A", &[], &["B", "B"]), def("B", &["A", "A"], &[])]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.upstream()[&id("B")].len(), 1);
    }

    #[test]
    fn self_dependency_is_not_an_edge() {
        let graph = build_graph_data(&[def("A", &["A"], &["A", "B"]), def("B", &["A"], &[])]);

        assert!(!graph.contains_edge(&id("A"), &id("A")));
        assert!(graph.upstream_of(&id("A")).all(|u| *u != id("A")));
        assert_eq!(graph.edge_count(), 1);

        let node = graph.node(&id("A")).expect("A is defined");
        assert!(node_depends_on_self(node));
        let node = graph.node(&id("B")).expect("B is defined");
        assert!(!node_depends_on_self(node));
    }

    #[test]
    fn self_only_definition_leaves_adjacency_empty() {
        let graph = build_graph_data(&[def("S", &["S"], &["S"])]);

        assert!(graph.downstream().is_empty());
        assert!(graph.upstream().is_empty());
        assert_eq!(graph.all_ids().len(), 1);
    }

    #[test]
    fn self_dependency_via_dependency_keys_is_reported() {
        let graph = build_graph_data(&[def("P", &["P"], &[])]);
        let node = graph.node(&id("P")).expect("P is defined");
        assert!(node_depends_on_self(node));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn later_duplicate_definition_wins() {
        let first = def("A", &[], &[]).with_op_names(["first_op"]);
        let second = def("A", &[], &[]).with_op_names(["second_op"]);
        let graph = build_graph_data(&[first, second]);

        assert_eq!(graph.node_count(), 1);
        let node = graph.node(&id("A")).expect("A is defined");
        assert_eq!(node.definition.op_names, vec!["second_op".to_string()]);
    }

    #[test]
    fn edges_from_overwritten_definition_remain() {
        let graph = build_graph_data(&[def("A", &["X"], &[]), def("A", &["Y"], &[])]);
        assert!(graph.contains_edge(&id("X"), &id("A")));
        assert!(graph.contains_edge(&id("Y"), &id("A")));
    }

    #[test]
    fn undefined_neighbours_appear_only_in_adjacency() {
        let graph = build_graph_data(&[def("A", &["external"], &[])]);

        assert_eq!(graph.node_count(), 1);
        assert!(graph.node(&id("external")).is_none());
        assert!(graph.contains_edge(&id("external"), &id("A")));
        assert_eq!(graph.all_ids().len(), 2);
    }

    #[test]
    fn roots_and_leaves() {
        let graph = build_graph_data(&[
            def("A", &[], &["B"]),
            def("B", &["A"], &["C"]),
            def("C", &["B"], &[]),
        ]);

        let roots: Vec<&GraphId> = graph.roots().iter().map(|n| &n.id).collect();
        let leaves: Vec<&GraphId> = graph.leaves().iter().map(|n| &n.id).collect();
        assert_eq!(roots, vec![&id("A")]);
        assert_eq!(leaves, vec![&id("C")]);
    }

    #[test]
    fn find_by_token_reports_every_match() {
        let graph = build_graph_data(&[
            AssetDefinition::new(AssetKey::new(["a", "b"])),
            AssetDefinition::new(AssetKey::new(["a/b"])),
            AssetDefinition::new(AssetKey::new(["c"])),
        ]);

        assert_eq!(graph.find_by_token("a/b").len(), 2);
        assert_eq!(graph.find_by_token("c").len(), 1);
        assert!(graph.find_by_token("missing").is_empty());
    }

    #[test]
    fn digraph_mirrors_adjacency() {
        let graph = build_graph_data(&[
            def("A", &[], &["B"]),
            def("B", &["A"], &["C"]),
            def("C", &["B"], &[]),
        ]);
        let digraph = graph.to_digraph();

        assert_eq!(digraph.node_count(), 3);
        assert_eq!(digraph.edge_count(), 2);
    }

    #[test]
    fn building_twice_is_structurally_equal() {
        let defs = [def("A", &[], &["B"]), def("B", &["A"], &[])];
        assert_eq!(build_graph_data(&defs), build_graph_data(&defs));
    }
}
