//! Subcommand handlers and the lookups they share.

pub mod completions;
pub mod cycles;
pub mod graph;
pub mod live;
pub mod show;

use std::path::Path;

use anyhow::Context;
use assetgraph_core::definition::AssetDefinition;
use assetgraph_core::error::ErrorCode;
use assetgraph_core::graph::{GraphData, GraphNode};
use assetgraph_core::key::{AssetKey, GraphId};
use assetgraph_core::live::LiveQuery;
use assetgraph_core::snapshot::{self, SnapshotError};

use crate::output::{CliError, OutputMode, render_error};

/// Load definitions, reporting failures as structured errors.
pub fn load_definitions(path: &Path, output: OutputMode) -> anyhow::Result<Vec<AssetDefinition>> {
    snapshot::load_definitions(path).or_else(|err| {
        let code = if err.is_parse() {
            ErrorCode::DefinitionsInvalid
        } else {
            ErrorCode::DefinitionsUnreadable
        };
        report_snapshot_error(code, err, output)
    })
}

/// Load a live feed, reporting failures as structured errors.
pub fn load_live_query(path: &Path, output: OutputMode) -> anyhow::Result<LiveQuery> {
    snapshot::load_live_query(path).or_else(|err| {
        let code = if err.is_parse() {
            ErrorCode::LiveFeedInvalid
        } else {
            ErrorCode::LiveFeedUnreadable
        };
        report_snapshot_error(code, err, output)
    })
}

fn report_snapshot_error<T>(
    code: ErrorCode,
    err: SnapshotError,
    output: OutputMode,
) -> anyhow::Result<T> {
    render_error(output, &CliError::from_code(code, err.to_string()))?;
    Err(err).with_context(|| code.message())
}

/// Resolve a user-supplied asset reference against the defined nodes.
///
/// A reference starting with `[` is parsed as a JSON array of segments and
/// matched exactly. Anything else is matched against `/`-joined tokens,
/// which can be ambiguous.
pub fn resolve_asset<'a>(graph: &'a GraphData, reference: &str) -> Result<&'a GraphNode, CliError> {
    if reference.trim_start().starts_with('[') {
        let path: Vec<String> = serde_json::from_str(reference).map_err(|err| {
            CliError::from_code(
                ErrorCode::AssetNotFound,
                format!("invalid asset key `{reference}`: {err}"),
            )
        })?;
        let key = AssetKey { path };
        return graph.node(&key.graph_id()).ok_or_else(|| {
            CliError::from_code(
                ErrorCode::AssetNotFound,
                format!("no asset with key {}", key.graph_id()),
            )
        });
    }

    let matches = graph.find_by_token(reference);
    match matches.as_slice() {
        [node] => Ok(*node),
        [] => Err(CliError::from_code(
            ErrorCode::AssetNotFound,
            format!("no asset matches `{reference}`"),
        )),
        many => {
            let ids: Vec<&str> = many.iter().map(|node| node.id.as_str()).collect();
            Err(CliError::from_code(
                ErrorCode::AmbiguousAssetKey,
                format!("`{reference}` matches {} assets", many.len()),
            )
            .with_suggestion(format!("Pass one of these keys: {}", ids.join(", "))))
        }
    }
}

/// `/`-joined token for an id, falling back to the raw id.
pub fn token_for_id(id: &GraphId) -> String {
    id.to_asset_key()
        .map_or_else(|| id.to_string(), |key| key.token())
}

/// Tokens for a sequence of ids, in iteration order.
pub fn tokens<'a>(ids: impl IntoIterator<Item = &'a GraphId>) -> Vec<String> {
    ids.into_iter().map(token_for_id).collect()
}

/// Render `items` as a comma-separated list, or `-` when empty.
pub fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
