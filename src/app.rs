use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ImpedanceApp {
    pub state: AppState,
}

impl ImpedanceApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ImpedanceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: batteries ----
        egui::SidePanel::left("battery_panel")
            .default_width(160.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: Rct above Re ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let half = (ui.available_height() / 2.0 - 8.0).max(100.0);
            let [rct, re] = &self.state.charts;
            ui.allocate_ui(egui::vec2(ui.available_width(), half), |ui| {
                plot::trend_plot(ui, rct, &self.state);
            });
            ui.separator();
            plot::trend_plot(ui, re, &self.state);
        });
    }
}
