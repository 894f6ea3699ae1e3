use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::chart::Chart;
use crate::color::BatteryColors;
use crate::data::model::Value;
use crate::pipeline::{Diagnostics, PipelineOutput};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Rct and Re charts, in display order.
    pub charts: [Chart; 2],

    /// Colour per battery, shared by both charts.
    pub colors: BatteryColors,

    /// Batteries the user switched off in the side panel.
    pub hidden: BTreeSet<Value>,

    /// Stage counts from the pipeline run.
    pub diagnostics: Diagnostics,

    /// Target directory for "Export SVG".
    pub export_dir: PathBuf,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(output: &PipelineOutput, export_dir: Option<PathBuf>) -> Self {
        let charts = [Chart::rct(&output.aggregated), Chart::re(&output.aggregated)];
        let colors = BatteryColors::new(&charts);
        Self {
            charts,
            colors,
            hidden: BTreeSet::new(),
            diagnostics: output.diagnostics.clone(),
            export_dir: export_dir.unwrap_or_else(|| PathBuf::from("charts")),
            status_message: None,
        }
    }

    pub fn is_visible(&self, battery: &Value) -> bool {
        !self.hidden.contains(battery)
    }

    /// Toggle a single battery in both charts.
    pub fn toggle_battery(&mut self, battery: &Value) {
        if !self.hidden.remove(battery) {
            self.hidden.insert(battery.clone());
        }
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    pub fn hide_all(&mut self) {
        self.hidden = self.colors.batteries().cloned().collect();
    }

    /// Write both charts as SVG and report the outcome in the status line.
    pub fn export(&mut self) {
        match crate::export::export_charts(&self.charts, &self.colors, &self.export_dir) {
            Ok(paths) => {
                self.status_message = Some(format!(
                    "Exported {} charts to {}",
                    paths.len(),
                    self.export_dir.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{AggregatedRow, AggregatedTable};

    fn state() -> AppState {
        let row = |b: i64, t: i64| AggregatedRow {
            battery_id: Value::Integer(b),
            test_id: Value::Integer(t),
            re: Some(0.05),
            rct: Some(0.2),
            capacity: None,
            ambient_temperature: Some(24.0),
        };
        let output = PipelineOutput {
            aggregated: AggregatedTable {
                rows: vec![row(5, 1), row(5, 2), row(6, 1)],
                ungrouped_rows: 0,
            },
            diagnostics: Diagnostics::default(),
        };
        AppState::new(&output, None)
    }

    #[test]
    fn toggling_hides_and_shows_a_battery() {
        let mut s = state();
        let b5 = Value::Integer(5);
        assert!(s.is_visible(&b5));
        s.toggle_battery(&b5);
        assert!(!s.is_visible(&b5));
        s.toggle_battery(&b5);
        assert!(s.is_visible(&b5));
    }

    #[test]
    fn hide_all_then_show_all() {
        let mut s = state();
        s.hide_all();
        assert_eq!(s.hidden.len(), 2);
        s.show_all();
        assert!(s.hidden.is_empty());
    }

    #[test]
    fn export_reports_status() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = state();
        s.export_dir = dir.path().join("out");
        s.export();
        assert_eq!(
            s.status_message.as_deref(),
            Some(format!("Exported 2 charts to {}", s.export_dir.display()).as_str())
        );
    }
}
