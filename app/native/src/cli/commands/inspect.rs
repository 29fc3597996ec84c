//! Status and inspection output.

use std::path::Path;

use colored::Colorize;
use serde_json::json;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::ConfigStore;
use crate::host::Host;
use crate::resize::geometry::{ExcludedPaneInfo, ExcludedPanes, compute_target};
use crate::resize::orchestrator::should_apply;
use crate::session::SessionState;

/// Maximum characters shown for content names.
const NAME_WIDTH: usize = 28;

/// One row of the `inspect` table.
#[derive(Debug, Clone, Tabled)]
pub struct PaneRow {
    #[tabled(rename = "Pane")]
    pub id: String,
    #[tabled(rename = "Position")]
    pub position: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Active")]
    pub active: String,
    #[tabled(rename = "Floating")]
    pub floating: String,
    #[tabled(rename = "Filetype")]
    pub filetype: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Excluded")]
    pub excluded: String,
}

/// Collects one row per pane the host enumerates.
#[must_use]
pub fn pane_rows<H: Host + ?Sized>(host: &H, store: &ConfigStore) -> Vec<PaneRow> {
    let active = host.active_pane();
    let Ok(ids) = host.panes() else {
        return Vec::new();
    };

    ids.into_iter()
        .filter_map(|id| host.pane(id).ok())
        .map(|pane| {
            let content = host.content(pane.content);
            let excluded = store.rules().classify(&pane, content.as_ref());
            let geometry = pane.geometry;
            PaneRow {
                id: pane.id.to_string(),
                position: format!("{}, {}", geometry.row_start, geometry.col_start),
                size: format!("{}x{}", geometry.width, geometry.height),
                active: output::format_bool(Some(pane.id) == active),
                floating: output::format_bool(pane.floating),
                filetype: content.as_ref().map_or_else(String::new, |c| c.filetype.clone()),
                name: content.as_ref().map_or_else(String::new, |c| output::truncate(&c.name, NAME_WIDTH)),
                excluded: excluded.map_or_else(|| "-".to_string(), |reason| reason.to_string()),
            }
        })
        .collect()
}

/// Describes what a pass would do for the active pane right now.
#[must_use]
pub fn target_summary<H: Host + ?Sized>(host: &H, store: &ConfigStore) -> String {
    let Some(active) = host.active_pane().and_then(|id| host.pane(id).ok()) else {
        return "no active pane".to_string();
    };
    let panes: Vec<_> = host
        .panes()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|id| host.pane(id).ok())
        .collect();

    if let Err(reason) = should_apply(host, store.rules(), &active, &panes) {
        return format!("{} would be skipped: {reason:?}", active.id);
    }

    let excluded: ExcludedPanes = panes
        .iter()
        .filter(|pane| pane.is_normal() && pane.id != active.id)
        .filter(|pane| store.rules().is_excluded(pane, host.content(pane.content).as_ref()))
        .map(|pane| (pane.id, ExcludedPaneInfo::from(&pane.geometry)))
        .collect();

    match host.canvas() {
        Ok(canvas) => {
            let target = compute_target(canvas, &active.geometry, &excluded, store.config());
            format!("{} target {}x{}", active.id, target.width, target.height)
        }
        Err(err) => format!("canvas unavailable: {err}"),
    }
}

/// Prints the pane table.
pub fn print_inspect(rows: Vec<PaneRow>, summary: &str) {
    let count = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .with(Modify::new(Columns::new(3..5)).with(Alignment::center()))
        .to_string();

    println!("{}", format!("Panes ({count})").bold());
    println!("{table}");
    println!("{summary}");
}

/// Prints the session state and the active configuration.
pub fn print_status(state: SessionState, store: &ConfigStore, config_path: Option<&Path>, json: bool) {
    let config = serde_json::to_value(store.config()).unwrap_or_default();

    if json {
        let status = json!({
            "phase": state.phase(),
            "widescreen": store.config().is_widescreen(),
            "configPath": config_path.map(|path| path.display().to_string()),
            "config": config,
        });
        println!("{status}");
        return;
    }

    let phase = state.phase().to_string();
    let phase = if state.enabled { phase.green() } else { phase.yellow() };
    println!("{} {phase}", "Session:".bold());
    println!("{} {}", "Widescreen:".bold(), output::format_bool(store.config().is_widescreen()));
    match config_path {
        Some(path) => println!("{} {}", "Config:".bold(), path.display()),
        None => println!("{} {}", "Config:".bold(), "defaults".dimmed()),
    }
    println!();
    output::print_highlighted_json(&config);
}
