use crate::data::aggregate::{AggregatedRow, AggregatedTable};
use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Chart model – what gets drawn, independent of any backend
// ---------------------------------------------------------------------------

/// One line per battery.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub battery_id: Value,
    /// Legend label, e.g. `Rct_B0005`.
    pub name: String,
    /// `[test_id, value]` in test order. A `NaN` value marks a gap.
    pub points: Vec<[f64; 2]>,
}

impl Series {
    /// Contiguous runs of finite points; lines are never drawn across a gap.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        self.points
            .split(|p| !p[1].is_finite())
            .filter(|run| !run.is_empty())
            .map(|run| run.to_vec())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub id: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub series: Vec<Series>,
}

impl Chart {
    /// Rct against test_id over every aggregated row. Groups without an Rct
    /// value leave a gap in their battery's line.
    pub fn rct(table: &AggregatedTable) -> Self {
        Chart {
            id: "rct_chart",
            title: "Charge Transfer Resistance (Rct) vs. Test ID",
            x_label: "Test ID",
            y_label: "Charge Transfer Resistance (Ohms)",
            series: series_by_battery(table.rows.iter(), "Rct", |row| row.rct),
        }
    }

    /// Re against test_id, restricted to rows that have an Re value.
    pub fn re(table: &AggregatedTable) -> Self {
        let rows = table.rows.iter().filter(|row| row.re.is_some());
        Chart {
            id: "re_chart",
            title: "Electrolyte Resistance (Re) vs. Test ID",
            x_label: "Test ID",
            y_label: "Electrolyte Resistance (Ohms)",
            series: series_by_battery(rows, "Re", |row| row.re),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Partition rows by battery_id. Rows arrive sorted by (battery_id,
/// test_id), so each battery's points are already in test order.
fn series_by_battery<'a>(
    rows: impl Iterator<Item = &'a AggregatedRow>,
    prefix: &str,
    y: impl Fn(&AggregatedRow) -> Option<f64>,
) -> Vec<Series> {
    let mut series: Vec<Series> = Vec::new();
    for row in rows {
        let Some(x) = row.test_id.as_f64() else {
            log::debug!("test_id {} is not numeric, not plotted", row.test_id);
            continue;
        };
        let point = [x, y(row).unwrap_or(f64::NAN)];
        match series.last_mut() {
            Some(s) if s.battery_id == row.battery_id => s.points.push(point),
            _ => series.push(Series {
                battery_id: row.battery_id.clone(),
                name: format!("{prefix}_{}", row.battery_id),
                points: vec![point],
            }),
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(battery: &str, test: i64, re: Option<f64>, rct: Option<f64>) -> AggregatedRow {
        AggregatedRow {
            battery_id: Value::Text(battery.into()),
            test_id: Value::Integer(test),
            re,
            rct,
            capacity: None,
            ambient_temperature: None,
        }
    }

    fn table() -> AggregatedTable {
        AggregatedTable {
            rows: vec![
                agg("B0005", 1, Some(0.05), Some(0.20)),
                agg("B0005", 2, None, Some(0.21)),
                agg("B0006", 1, None, None),
                agg("B0006", 3, None, Some(0.30)),
            ],
            ungrouped_rows: 0,
        }
    }

    #[test]
    fn rct_chart_has_one_series_per_battery() {
        let chart = Chart::rct(&table());
        let names: Vec<_> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rct_B0005", "Rct_B0006"]);
        assert_eq!(chart.series[0].points, vec![[1.0, 0.20], [2.0, 0.21]]);
        // missing Rct stays in the chart as a gap
        assert_eq!(chart.series[1].points.len(), 2);
        assert_eq!(chart.series[1].segments(), vec![vec![[3.0, 0.30]]]);
    }

    #[test]
    fn re_chart_drops_rows_without_re() {
        let chart = Chart::re(&table());
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "Re_B0005");
        assert_eq!(chart.series[0].points, vec![[1.0, 0.05]]);
    }

    #[test]
    fn all_missing_re_group_only_in_rct_chart() {
        let t = AggregatedTable {
            rows: vec![agg("B0007", 4, None, Some(0.4))],
            ungrouped_rows: 0,
        };
        assert!(Chart::re(&t).is_empty());
        assert_eq!(Chart::rct(&t).series.len(), 1);
    }

    #[test]
    fn empty_table_renders_no_series() {
        let t = AggregatedTable::default();
        assert!(Chart::rct(&t).is_empty());
        assert!(Chart::re(&t).is_empty());
    }

    #[test]
    fn gaps_split_segments() {
        let s = Series {
            battery_id: Value::Integer(1),
            name: "Rct_1".into(),
            points: vec![[0.0, 1.0], [1.0, f64::NAN], [2.0, 2.0], [3.0, 3.0]],
        };
        assert_eq!(s.segments(), vec![vec![[0.0, 1.0]], vec![[2.0, 2.0], [3.0, 3.0]]]);
    }
}
