use eframe::egui::{Ui, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::chart::Chart;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Impedance trend plot
// ---------------------------------------------------------------------------

/// Render one chart: a line per visible battery, broken wherever the
/// aggregated value is missing.
pub fn trend_plot(ui: &mut Ui, chart: &Chart, state: &AppState) {
    ui.label(RichText::new(chart.title).strong());

    if chart.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No data to plot");
        });
        return;
    }

    Plot::new(chart.id)
        .legend(Legend::default())
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                if !state.is_visible(&series.battery_id) {
                    continue;
                }
                let color = state.colors.color_for(&series.battery_id);

                // Segments share the series name so the legend shows one entry.
                for segment in series.segments() {
                    let points: PlotPoints = segment.into_iter().collect();
                    let line = Line::new(points)
                        .name(&series.name)
                        .color(color)
                        .width(1.5);
                    plot_ui.line(line);
                }
            }
        });
}
