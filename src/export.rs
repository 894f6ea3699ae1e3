use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::chart::Chart;
use crate::color::BatteryColors;
use crate::error::ExportError;

/// Write each chart to `<dir>/<chart id>.svg`, returning the written paths.
pub fn export_charts(
    charts: &[Chart],
    colors: &BatteryColors,
    dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;
    charts
        .iter()
        .map(|chart| {
            let path = dir.join(format!("{}.svg", chart.id));
            draw_svg(chart, colors, &path)?;
            log::info!("Chart saved as {}", path.display());
            Ok(path)
        })
        .collect()
}

fn draw_svg(chart: &Chart, colors: &BatteryColors, path: &Path) -> Result<(), ExportError> {
    let draw_err = |e: &dyn std::fmt::Display| ExportError::Draw {
        title: chart.title.to_string(),
        message: e.to_string(),
    };

    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(&e))?;

    let (x_range, y_range) = ranges(chart);
    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| draw_err(&e))?;

    ctx.configure_mesh()
        .x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .draw()
        .map_err(|e| draw_err(&e))?;

    let mut labelled = false;
    for series in &chart.series {
        let [r, g, b] = colors.rgb_for(&series.battery_id);
        let color = RGBColor(r, g, b);
        for (i, segment) in series.segments().into_iter().enumerate() {
            let drawn = ctx
                .draw_series(LineSeries::new(
                    segment.into_iter().map(|[x, y]| (x, y)),
                    color.stroke_width(2),
                ))
                .map_err(|e| draw_err(&e))?;
            if i == 0 {
                drawn
                    .label(series.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                labelled = true;
            }
        }
    }

    if labelled {
        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(|e| draw_err(&e))?;
    }

    root.present().map_err(|e| draw_err(&e))?;
    Ok(())
}

/// Axis ranges covering every finite point, padded so a single point or a
/// flat line still gets a visible span.
fn ranges(chart: &Chart) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let points = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter())
        .filter(|p| p[1].is_finite());

    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        x = (x.0.min(p[0]), x.1.max(p[0]));
        y = (y.0.min(p[1]), y.1.max(p[1]));
    }
    (pad(x), pad(y))
}

fn pad((lo, hi): (f64, f64)) -> std::ops::Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let margin = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - margin)..(hi + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Series;
    use crate::data::model::Value;

    fn chart(points: Vec<[f64; 2]>) -> Chart {
        Chart {
            id: "rct_chart",
            title: "Charge Transfer Resistance (Rct) vs. Test ID",
            x_label: "Test ID",
            y_label: "Charge Transfer Resistance (Ohms)",
            series: vec![Series {
                battery_id: Value::Text("B0005".into()),
                name: "Rct_B0005".into(),
                points,
            }],
        }
    }

    #[test]
    fn ranges_ignore_gaps_and_pad_flat_lines() {
        let c = chart(vec![[1.0, 0.2], [2.0, f64::NAN], [3.0, 0.2]]);
        let (x, y) = ranges(&c);
        assert!(x.start < 1.0 && x.end > 3.0);
        assert!(y.start < 0.2 && y.end > 0.2);
        assert_eq!(ranges(&chart(Vec::new())), (0.0..1.0, 0.0..1.0));
    }

    #[test]
    fn writes_one_svg_per_chart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let charts = [chart(vec![[1.0, 0.2], [2.0, 0.25]]), Chart {
            id: "re_chart",
            series: Vec::new(),
            ..chart(Vec::new())
        }];
        let colors = BatteryColors::new(&charts);
        let out = dir.path().join("charts");

        let written = export_charts(&charts, &colors, &out).expect("export");
        assert_eq!(written.len(), 2);
        let svg = std::fs::read_to_string(&written[0]).expect("read");
        assert!(svg.contains("<svg"));
        assert!(out.join("re_chart.svg").exists());
    }
}
