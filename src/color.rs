use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::chart::Chart;
use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Battery → colour
// ---------------------------------------------------------------------------

/// One colour per battery, shared by both charts so a battery looks the
/// same everywhere.
#[derive(Debug, Clone, Default)]
pub struct BatteryColors {
    mapping: BTreeMap<Value, [u8; 3]>,
}

const FALLBACK: [u8; 3] = [128, 128, 128];

impl BatteryColors {
    /// Assign colours to every battery appearing in any of `charts`.
    pub fn new<'a>(charts: impl IntoIterator<Item = &'a Chart>) -> Self {
        let batteries: std::collections::BTreeSet<&Value> = charts
            .into_iter()
            .flat_map(|c| c.series.iter().map(|s| &s.battery_id))
            .collect();
        let palette = generate_palette(batteries.len());
        let mapping = batteries
            .into_iter()
            .cloned()
            .zip(palette)
            .collect();
        BatteryColors { mapping }
    }

    pub fn rgb_for(&self, battery: &Value) -> [u8; 3] {
        self.mapping.get(battery).copied().unwrap_or(FALLBACK)
    }

    pub fn color_for(&self, battery: &Value) -> Color32 {
        let [r, g, b] = self.rgb_for(battery);
        Color32::from_rgb(r, g, b)
    }

    /// Batteries in legend order.
    pub fn batteries(&self) -> impl Iterator<Item = &Value> {
        self.mapping.keys()
    }
}
