use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – battery selection
// ---------------------------------------------------------------------------

/// Render the left panel listing every battery with a visibility toggle.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Batteries");
    ui.separator();

    let batteries: Vec<_> = state.colors.batteries().cloned().collect();
    if batteries.is_empty() {
        ui.label("No aggregated data.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.hide_all();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for battery in &batteries {
                let text = RichText::new(battery.to_string()).color(state.colors.color_for(battery));
                let mut checked = state.is_visible(battery);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_battery(battery);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar with the pipeline summary.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export SVG").clicked() {
                state.export();
                ui.close_menu();
            }
        });

        ui.separator();

        let d = &state.diagnostics;
        ui.label(format!(
            "{} files, {} metadata rows, {} measurement rows, {} (battery, test) groups",
            d.files, d.metadata_rows, d.unified_shape.0, d.aggregated_shape.0
        ));

        if d.missing_metadata_rows > 0 {
            ui.separator();
            ui.label(
                RichText::new(format!("{} rows missing test_id, Rct or Re", d.missing_metadata_rows))
                    .color(Color32::YELLOW),
            );
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}
