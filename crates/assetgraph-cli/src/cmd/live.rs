//! `ag live`: per-asset status merged from a live-feed snapshot.

use std::io::Write;
use std::path::PathBuf;

use assetgraph_core::live::LiveDataForNode;
use clap::Args;
use serde::Serialize;

use super::{load_live_query, token_for_id};
use crate::output::{OutputMode, pretty_kv, pretty_rule, render_mode};

/// Arguments for `ag live`.
#[derive(Args, Debug)]
pub struct LiveArgs {
    /// Live-feed snapshot (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub live: PathBuf,

    /// Only assets whose stale status is STALE.
    #[arg(long)]
    pub stale: bool,

    /// Only assets whose latest run failed before materializing.
    #[arg(long)]
    pub failed: bool,
}

#[derive(Debug, Serialize)]
struct LiveRow<'a> {
    id: String,
    token: String,
    #[serde(flatten)]
    status: &'a LiveDataForNode,
}

/// Execute `ag live`.
pub fn run_live(args: &LiveArgs, output: OutputMode) -> anyhow::Result<()> {
    let query = load_live_query(&args.live, output)?;
    let data = query.build();

    let rows: Vec<LiveRow<'_>> = data
        .iter()
        .filter(|(_, status)| !args.stale || status.is_stale())
        .filter(|(_, status)| !args.failed || status.run_which_failed_to_materialize.is_some())
        .map(|(id, status)| LiveRow {
            id: id.to_string(),
            token: token_for_id(id),
            status,
        })
        .collect();

    render_mode(output, &rows, render_live_text, render_live_pretty)
}

fn render_live_text(rows: &Vec<LiveRow<'_>>, w: &mut dyn Write) -> std::io::Result<()> {
    for row in rows {
        writeln!(w, "{}  {}", row.token, status_fields(row.status).join("  "))?;
    }
    Ok(())
}

fn render_live_pretty(rows: &Vec<LiveRow<'_>>, w: &mut dyn Write) -> std::io::Result<()> {
    if rows.is_empty() {
        writeln!(w, "No live assets.")?;
        return Ok(());
    }
    for (idx, row) in rows.iter().enumerate() {
        if idx > 0 {
            writeln!(w)?;
        }
        writeln!(w, "{}", row.token)?;
        pretty_rule(w)?;
        render_status_pretty(row.status, w)?;
    }
    Ok(())
}

/// `key=value` fields for one status record, in a fixed order.
pub fn status_fields(status: &LiveDataForNode) -> Vec<String> {
    let mut fields = vec![
        format!("step={}", or_dash(&status.step_key)),
        format!("run={}", run_state(status)),
    ];
    if let Some(last) = &status.last_materialization {
        match status.last_materialization_run_status {
            Some(run_status) => fields.push(format!("last={}({run_status})", last.run_id)),
            None => fields.push(format!("last={}", last.run_id)),
        }
    }
    if let Some(failed) = &status.run_which_failed_to_materialize {
        fields.push(format!("failed={}", failed.id));
    }
    if let Some(stale) = status.stale_status {
        fields.push(format!("stale={stale}"));
    }
    if let Some(stats) = status.partition_stats {
        fields.push(format!(
            "partitions={}/{}",
            stats.num_materialized, stats.num_partitions
        ));
    }
    fields
}

/// Human sections for one status record.
pub fn render_status_pretty(status: &LiveDataForNode, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_kv(w, "Step", or_dash(&status.step_key))?;
    pretty_kv(w, "Run state", run_state(status))?;
    if !status.in_progress_run_ids.is_empty() {
        pretty_kv(w, "In progress", status.in_progress_run_ids.join(", "))?;
    }
    if !status.unstarted_run_ids.is_empty() {
        pretty_kv(w, "Unstarted", status.unstarted_run_ids.join(", "))?;
    }
    match &status.last_materialization {
        Some(last) => {
            let run_status = status
                .last_materialization_run_status
                .map_or_else(String::new, |s| format!(" ({s})"));
            pretty_kv(
                w,
                "Materialized",
                format!("run {} at {}{run_status}", last.run_id, last.timestamp),
            )?;
        }
        None => pretty_kv(w, "Materialized", "never")?,
    }
    if let Some(observation) = &status.last_observation {
        pretty_kv(
            w,
            "Observed",
            format!("run {} at {}", observation.run_id, observation.timestamp),
        )?;
    }
    if let Some(failed) = &status.run_which_failed_to_materialize {
        pretty_kv(w, "Failed run", format!("{} ({})", failed.id, failed.status))?;
    }
    if let Some(stale) = status.stale_status {
        pretty_kv(w, "Stale", stale.as_str())?;
    }
    for cause in &status.stale_causes {
        let dependency = cause
            .dependency
            .as_ref()
            .map_or_else(String::new, |d| format!(" via {d}"));
        pretty_kv(
            w,
            "  cause",
            format!("[{}] {}{dependency}", cause.category, cause.reason),
        )?;
    }
    if let Some(minutes) = status
        .freshness_info
        .as_ref()
        .and_then(|f| f.current_minutes_late)
    {
        pretty_kv(w, "Late", format!("{minutes:.1} min"))?;
    }
    if let Some(stats) = status.partition_stats {
        pretty_kv(
            w,
            "Partitions",
            format!(
                "{}/{} materialized, {} in progress, {} failed",
                stats.num_materialized,
                stats.num_partitions,
                stats.num_materializing,
                stats.num_failed
            ),
        )?;
    }
    Ok(())
}

fn run_state(status: &LiveDataForNode) -> &'static str {
    match (status.is_running(), status.in_progress_run_ids.is_empty()) {
        (false, _) => "idle",
        (true, true) => "queued",
        (true, false) => "running",
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
