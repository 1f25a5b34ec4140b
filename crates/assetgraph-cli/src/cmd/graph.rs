//! `ag graph`: node and edge summary of a definitions snapshot.

use std::io::Write;
use std::path::PathBuf;

use assetgraph_core::config::ProjectConfig;
use assetgraph_core::graph::{GraphData, GraphNode, build_graph_data, node_depends_on_self};
use clap::Args;
use serde::Serialize;

use super::{join_or_dash, load_definitions, resolve_asset, token_for_id, tokens};
use crate::output::{
    OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};

/// Arguments for `ag graph`.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Definitions snapshot (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub defs: PathBuf,

    /// Limit output to one asset (token or JSON key array).
    #[arg(long, value_name = "TOKEN")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssetSummary {
    pub id: String,
    pub token: String,
    pub step_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub jobs: Vec<String>,
    pub depends_on_self: bool,
    pub upstream: Vec<String>,
    pub downstream: Vec<String>,
}

impl AssetSummary {
    pub fn new(graph: &GraphData, node: &GraphNode, hidden_job_prefix: &str) -> Self {
        Self {
            id: node.id.to_string(),
            token: node.asset_key.token(),
            step_key: node.definition.step_key(),
            group: node.definition.group_name.clone(),
            jobs: node
                .definition
                .visible_job_names(hidden_job_prefix)
                .map(str::to_string)
                .collect(),
            depends_on_self: node_depends_on_self(node),
            upstream: tokens(graph.upstream_of(&node.id)),
            downstream: tokens(graph.downstream_of(&node.id)),
        }
    }
}

#[derive(Debug, Serialize)]
struct GraphOutput {
    nodes: usize,
    edges: usize,
    /// Neighbours with no definition of their own.
    undefined: Vec<String>,
    roots: Vec<String>,
    leaves: Vec<String>,
    assets: Vec<AssetSummary>,
}

/// Execute `ag graph`.
pub fn run_graph(
    args: &GraphArgs,
    output: OutputMode,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let definitions = load_definitions(&args.defs, output)?;
    let graph = build_graph_data(&definitions);
    let prefix = config.jobs.hidden_prefix.as_str();

    if let Some(reference) = &args.id {
        let node = match resolve_asset(&graph, reference) {
            Ok(node) => node,
            Err(err) => {
                render_error(output, &err)?;
                anyhow::bail!("{}", err.message);
            }
        };
        let summary = AssetSummary::new(&graph, node, prefix);
        return render_mode(output, &summary, render_asset_text, render_asset_pretty);
    }

    let payload = GraphOutput {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        undefined: graph
            .all_ids()
            .into_iter()
            .filter(|id| graph.node(id).is_none())
            .map(token_for_id)
            .collect(),
        roots: graph.roots().iter().map(|n| n.asset_key.token()).collect(),
        leaves: graph.leaves().iter().map(|n| n.asset_key.token()).collect(),
        assets: graph
            .nodes()
            .values()
            .map(|node| AssetSummary::new(&graph, node, prefix))
            .collect(),
    };

    render_mode(output, &payload, render_graph_text, render_graph_pretty)
}

fn render_graph_text(payload: &GraphOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "nodes={} edges={} undefined={}",
        payload.nodes,
        payload.edges,
        payload.undefined.len()
    )?;
    for asset in &payload.assets {
        render_asset_text(asset, w)?;
    }
    Ok(())
}

fn render_graph_pretty(payload: &GraphOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Asset graph")?;
    pretty_kv(w, "Nodes", payload.nodes.to_string())?;
    pretty_kv(w, "Edges", payload.edges.to_string())?;
    pretty_kv(w, "Roots", join_or_dash(&payload.roots))?;
    pretty_kv(w, "Leaves", join_or_dash(&payload.leaves))?;
    if !payload.undefined.is_empty() {
        pretty_kv(w, "Undefined", payload.undefined.join(", "))?;
    }

    for asset in &payload.assets {
        writeln!(w)?;
        render_asset_pretty(asset, w)?;
    }
    Ok(())
}

fn render_asset_text(asset: &AssetSummary, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}  up={}  down={}{}",
        asset.token,
        join_or_dash(&asset.upstream),
        join_or_dash(&asset.downstream),
        if asset.depends_on_self { "  self" } else { "" }
    )
}

fn render_asset_pretty(asset: &AssetSummary, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", asset.token)?;
    pretty_rule(w)?;
    pretty_kv(w, "Id", &asset.id)?;
    pretty_kv(
        w,
        "Step",
        if asset.step_key.is_empty() {
            "-"
        } else {
            asset.step_key.as_str()
        },
    )?;
    if let Some(group) = &asset.group {
        pretty_kv(w, "Group", group)?;
    }
    pretty_kv(w, "Jobs", join_or_dash(&asset.jobs))?;
    pretty_kv(w, "Upstream", join_or_dash(&asset.upstream))?;
    pretty_kv(w, "Downstream", join_or_dash(&asset.downstream))?;
    if asset.depends_on_self {
        pretty_kv(w, "Self-dep", "yes (ignored for cycles)")?;
    }
    Ok(())
}
