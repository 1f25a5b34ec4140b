//! `ag cycles`: report dependency cycles in a definitions snapshot.

use std::io::Write;
use std::path::PathBuf;

use assetgraph_core::config::ProjectConfig;
use assetgraph_core::error::ErrorCode;
use assetgraph_core::graph::{build_graph_data, find_cycle, find_cycle_groups};
use clap::Args;
use serde::Serialize;

use super::{load_definitions, tokens};
use crate::output::{CliError, OutputMode, render_error, render_mode};

/// Arguments for `ag cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    /// Definitions snapshot (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub defs: PathBuf,

    /// Exit non-zero when a cycle exists (overrides `graph.fail_on_cycles`).
    #[arg(long)]
    pub fail: bool,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    has_cycles: bool,
    /// One closed path `[a, ..., a]`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<Vec<String>>,
    groups: Vec<Vec<String>>,
}

/// Execute `ag cycles`.
pub fn run_cycles(
    args: &CyclesArgs,
    output: OutputMode,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let definitions = load_definitions(&args.defs, output)?;
    let graph = build_graph_data(&definitions);

    let example = find_cycle(&graph).map(|cycle| tokens(&cycle));
    let payload = CyclesOutput {
        has_cycles: example.is_some(),
        example,
        groups: find_cycle_groups(&graph)
            .iter()
            .map(|group| tokens(group))
            .collect(),
    };

    render_mode(output, &payload, render_cycles_text, render_cycles_pretty)?;

    if payload.has_cycles && (args.fail || config.graph.fail_on_cycles) {
        let message = format!("{} dependency cycle group(s) found", payload.groups.len());
        render_error(output, &CliError::from_code(ErrorCode::CycleDetected, &message))?;
        anyhow::bail!(message);
    }

    Ok(())
}

fn render_cycles_text(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "has_cycles={}", payload.has_cycles)?;
    for group in &payload.groups {
        writeln!(w, "{}", group.join("  "))?;
    }
    Ok(())
}

fn render_cycles_pretty(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if !payload.has_cycles {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Dependency cycles ({})", payload.groups.len())?;
    if let Some(example) = &payload.example {
        writeln!(w, "\nExample: {}", example.join(" -> "))?;
    }

    for (idx, group) in payload.groups.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        for token in group {
            writeln!(w, "  - {token}")?;
        }
    }

    Ok(())
}
