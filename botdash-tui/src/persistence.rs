//! UI preferences - JSON save/load across restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use botdash_core::chart::ChartType;
use botdash_core::format::Timeframe;

use crate::app::{AppState, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPrefs {
    pub active_panel: Panel,
    pub chart_type: ChartType,
    pub timeframe: Timeframe,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            active_panel: Panel::Metrics,
            chart_type: ChartType::default(),
            timeframe: Timeframe::default(),
        }
    }
}

/// `<config dir>/botdash/tui_prefs.json`, or the working directory without one.
pub fn prefs_path(config_dir: Option<PathBuf>) -> PathBuf {
    config_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join("botdash")
        .join("tui_prefs.json")
}

/// Load preferences from disk. Returns defaults if the file is missing or corrupt.
pub fn load(path: &Path) -> UiPrefs {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preferences");
            UiPrefs::default()
        }),
        Err(_) => UiPrefs::default(),
    }
}

/// Save preferences to disk. Creates parent directories if needed.
pub fn save(path: &Path, prefs: &UiPrefs) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(prefs)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> UiPrefs {
    UiPrefs {
        active_panel: app.active_panel,
        chart_type: app.chart_type,
        timeframe: app.market.timeframe,
    }
}

pub fn apply(app: &mut AppState, prefs: UiPrefs) {
    app.active_panel = prefs.active_panel;
    app.chart_type = prefs.chart_type;
    app.market.timeframe = prefs.timeframe;
}
