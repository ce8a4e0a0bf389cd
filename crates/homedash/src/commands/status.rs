//! `homedash status` — one refresh cycle, then a per-source summary.

use std::sync::Arc;

use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use homedash_core::store::SourceState;
use homedash_core::units::format_relative;
use homedash_core::{Engine, SourceId};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Serializable per-source summary (also the JSON shape).
#[derive(Debug, Serialize)]
pub struct SourceSummary {
    pub source: String,
    pub kind: String,
    pub items: usize,
    pub ok: bool,
    pub error: Option<String>,
    pub updated: Option<String>,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Items")]
    items: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

pub fn summarize(snapshot: &[(SourceId, Arc<SourceState>)]) -> Vec<SourceSummary> {
    let now = Utc::now();
    snapshot
        .iter()
        .map(|(id, state)| SourceSummary {
            source: id.to_string(),
            kind: state.kind.to_string(),
            items: state.data.as_ref().map_or(0, homedash_core::SourceData::len),
            ok: state.last_error.is_none(),
            error: state.last_error.as_ref().map(|e| e.message.clone()),
            updated: state.last_updated.map(|t| format_relative(t, now)),
        })
        .collect()
}

fn to_row(summary: &SourceSummary, color: bool) -> StatusRow {
    let status = match (&summary.error, color) {
        (None, true) => "ok".green().to_string(),
        (None, false) => "ok".to_owned(),
        (Some(e), true) => format!("{}", e.red()),
        (Some(e), false) => e.clone(),
    };
    StatusRow {
        source: summary.source.clone(),
        kind: summary.kind.clone(),
        items: summary.items.to_string(),
        status,
        updated: summary.updated.clone().unwrap_or_else(|| "-".into()),
    }
}

/// Render the per-source summary for the current snapshot. Shared with
/// `homedash watch`, which re-renders it on every store change.
pub(crate) fn render_summary(
    snapshot: &[(SourceId, Arc<SourceState>)],
    global: &GlobalOpts,
) -> String {
    let summaries = summarize(snapshot);
    let color = output::should_color(&global.color);
    output::render_list(
        &global.output,
        &summaries,
        |s| to_row(s, color),
        |s| s.source.clone(),
    )
}

pub async fn handle(engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    engine.oneshot().await;
    let out = render_summary(&engine.snapshot(), global);
    output::print_output(&out, global.quiet);
    Ok(())
}
