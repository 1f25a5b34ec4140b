//! `ag show`: one asset's definition, neighbours and live status.

use std::io::Write;
use std::path::PathBuf;

use assetgraph_core::config::ProjectConfig;
use assetgraph_core::definition::AssetDefinition;
use assetgraph_core::graph::build_graph_data;
use assetgraph_core::key::GraphId;
use assetgraph_core::live::{LiveData, LiveDataForNode, live_data_for};
use clap::Args;
use serde::Serialize;

use super::graph::AssetSummary;
use super::live::{render_status_pretty, status_fields};
use super::{join_or_dash, load_definitions, load_live_query, resolve_asset};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `ag show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Asset token (`a/b`) or JSON key array (`["a","b"]`).
    #[arg(value_name = "TOKEN")]
    pub reference: String,

    /// Definitions snapshot (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub defs: PathBuf,

    /// Live-feed snapshot to merge status from.
    #[arg(long, value_name = "FILE")]
    pub live: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    summary: AssetSummary,
    display_name: String,
    definition: &'a AssetDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    live: Option<LiveDataForNode>,
    /// The live feed had no record for this asset.
    live_missing: bool,
}

/// Execute `ag show`.
pub fn run_show(
    args: &ShowArgs,
    output: OutputMode,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let definitions = load_definitions(&args.defs, output)?;
    let graph = build_graph_data(&definitions);

    let node = match resolve_asset(&graph, &args.reference) {
        Ok(node) => node,
        Err(err) => {
            render_error(output, &err)?;
            anyhow::bail!("{}", err.message);
        }
    };

    let (live, live_missing) = match &args.live {
        Some(path) => {
            let data = load_live_query(path, output)?.build();
            let (status, missing) = live_status(&data, &node.id);
            (Some(status), missing)
        }
        None => (None, false),
    };

    let payload = ShowOutput {
        summary: AssetSummary::new(&graph, node, &config.jobs.hidden_prefix),
        display_name: node.asset_key.display_name(),
        definition: &node.definition,
        live,
        live_missing,
    };

    render_mode(output, &payload, render_show_text, render_show_pretty)
}

/// The asset's status and whether the feed lacked a record for it.
///
/// A record with every field empty still counts as present.
fn live_status(data: &LiveData, id: &GraphId) -> (LiveDataForNode, bool) {
    (live_data_for(data, id).clone(), !data.contains_key(id))
}

fn render_show_text(payload: &ShowOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    let summary = &payload.summary;
    writeln!(w, "id={}", summary.id)?;
    writeln!(w, "token={}", summary.token)?;
    writeln!(w, "upstream={}", join_or_dash(&summary.upstream))?;
    writeln!(w, "downstream={}", join_or_dash(&summary.downstream))?;
    writeln!(w, "depends_on_self={}", summary.depends_on_self)?;
    if let Some(live) = &payload.live {
        writeln!(w, "live_missing={}", payload.live_missing)?;
        for field in status_fields(live) {
            writeln!(w, "{field}")?;
        }
    }
    Ok(())
}

fn render_show_pretty(payload: &ShowOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    let summary = &payload.summary;
    pretty_section(w, &payload.display_name)?;
    pretty_kv(w, "Id", &summary.id)?;
    pretty_kv(w, "Token", &summary.token)?;
    if let Some(group) = &summary.group {
        pretty_kv(w, "Group", group)?;
    }
    pretty_kv(w, "Ops", join_or_dash(&payload.definition.op_names))?;
    pretty_kv(w, "Jobs", join_or_dash(&summary.jobs))?;
    pretty_kv(w, "Upstream", join_or_dash(&summary.upstream))?;
    pretty_kv(w, "Downstream", join_or_dash(&summary.downstream))?;
    if summary.depends_on_self {
        pretty_kv(w, "Self-dep", "yes (ignored for cycles)")?;
    }

    if let Some(live) = &payload.live {
        writeln!(w)?;
        pretty_section(w, "Live status")?;
        if payload.live_missing {
            writeln!(w, "No live record for this asset.")?;
        } else {
            render_status_pretty(live, w)?;
        }
    }
    Ok(())
}
