use std::collections::BTreeMap;
use std::fmt;

use super::model::{MeasurementTable, MetadataField, Value};

// ---------------------------------------------------------------------------
// AggregatedRow – one (battery, test) summary
// ---------------------------------------------------------------------------

/// Per-(battery_id, test_id) summary. `None` is the missing marker: a group
/// with no usable value for a field never reports zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub battery_id: Value,
    pub test_id: Value,
    pub re: Option<f64>,
    pub rct: Option<f64>,
    pub capacity: Option<f64>,
    pub ambient_temperature: Option<f64>,
}

/// The aggregated table, sorted by (battery_id, test_id).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    pub rows: Vec<AggregatedRow>,
    /// Input rows dropped because battery_id or test_id was missing.
    pub ungrouped_rows: usize,
}

const COLUMNS: [&str; 6] = ["battery_id", "test_id", "Re", "Rct", "Capacity", "ambient_temperature"];

impl AggregatedTable {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), COLUMNS.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text rendering of the first `n` rows for the console diagnostics.
    pub fn head(&self, n: usize) -> String {
        let mut out = COLUMNS.join("\t");
        for row in self.rows.iter().take(n) {
            out.push('\n');
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.battery_id,
                row.test_id,
                Cell(row.re),
                Cell(row.rct),
                Cell(row.capacity),
                Cell(row.ambient_temperature),
            ));
        }
        out
    }
}

struct Cell(Option<f64>);

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.6}"),
            None => write!(f, "NaN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Group-by
// ---------------------------------------------------------------------------

/// Running mean that skips missing values.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
struct Group {
    re: Mean,
    rct: Mean,
    capacity: Mean,
    ambient_temperature: Option<f64>,
}

/// Group `table` by (battery_id, test_id) and summarise each group.
///
/// Re, Rct and Capacity are averaged over their non-missing numeric
/// values. ambient_temperature takes the first non-missing value in the
/// table's row order, which the corpus assembler pins to
/// (filename, row index).
pub fn aggregate(table: &MeasurementTable) -> AggregatedTable {
    let mut groups: BTreeMap<(Value, Value), Group> = BTreeMap::new();
    let mut ungrouped_rows = 0;

    for row in &table.rows {
        let battery_id = row.field(MetadataField::BatteryId);
        let test_id = row.field(MetadataField::TestId);
        if battery_id.is_missing() || test_id.is_missing() {
            ungrouped_rows += 1;
            continue;
        }

        let group = groups
            .entry((battery_id.clone(), test_id.clone()))
            .or_default();
        group.re.push(row.field(MetadataField::Re).as_f64());
        group.rct.push(row.field(MetadataField::Rct).as_f64());
        group.capacity.push(row.field(MetadataField::Capacity).as_f64());
        if group.ambient_temperature.is_none() {
            group.ambient_temperature = row.field(MetadataField::AmbientTemperature).as_f64();
        }
    }

    if ungrouped_rows > 0 {
        log::warn!("{ungrouped_rows} rows without battery_id or test_id left out of aggregation");
    }

    let rows = groups
        .into_iter()
        .map(|((battery_id, test_id), group)| AggregatedRow {
            battery_id,
            test_id,
            re: group.re.value(),
            rct: group.rct.value(),
            capacity: group.capacity.value(),
            ambient_temperature: group.ambient_temperature,
        })
        .collect();

    AggregatedTable {
        rows,
        ungrouped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MeasurementRow, MetadataFields};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn row(file: &str, battery: Value, test: Value, configure: impl FnOnce(&mut MetadataFields)) -> MeasurementRow {
        let mut fields = MetadataFields {
            battery_id: battery,
            test_id: test,
            ..Default::default()
        };
        configure(&mut fields);
        MeasurementRow {
            filename: Arc::from(file),
            row_index: 0,
            channels: BTreeMap::new(),
            metadata: Arc::new(fields),
        }
    }

    fn table(rows: Vec<MeasurementRow>) -> MeasurementTable {
        MeasurementTable {
            rows,
            ..Default::default()
        }
    }

    #[test]
    fn rct_mean_over_two_rows() {
        let t = table(vec![
            row("a.csv", Value::Integer(1), Value::Integer(5), |m| m.rct = Value::Float(2.0)),
            row("b.csv", Value::Integer(1), Value::Integer(5), |m| m.rct = Value::Float(4.0)),
        ]);
        let agg = aggregate(&t);
        assert_eq!(agg.rows.len(), 1);
        assert_eq!(agg.rows[0].rct, Some(3.0));
        assert_eq!(agg.shape(), (1, 6));
    }

    #[test]
    fn all_missing_re_gives_missing_mean() {
        let t = table(vec![
            row("a.csv", Value::Integer(1), Value::Integer(5), |m| m.rct = Value::Float(1.0)),
            row("a.csv", Value::Integer(1), Value::Integer(5), |m| m.re = Value::Text("n/a".into())),
        ]);
        let agg = aggregate(&t);
        assert_eq!(agg.rows[0].re, None);
        assert_eq!(agg.rows[0].rct, Some(1.0));
        assert_eq!(agg.rows[0].capacity, None);
    }

    #[test]
    fn one_row_per_pair_sorted_by_key() {
        let pairs = [(2, 1), (1, 7), (1, 5), (2, 1), (1, 5)];
        let t = table(
            pairs
                .iter()
                .map(|&(b, t)| row("x.csv", Value::Integer(b), Value::Integer(t), |_| {}))
                .collect(),
        );
        let keys: Vec<_> = aggregate(&t)
            .rows
            .into_iter()
            .map(|r| (r.battery_id, r.test_id))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Value::Integer(1), Value::Integer(5)),
                (Value::Integer(1), Value::Integer(7)),
                (Value::Integer(2), Value::Integer(1)),
            ]
        );
    }

    #[test]
    fn first_ambient_temperature_skips_missing_and_coerces() {
        let t = table(vec![
            row("a.csv", Value::Text("B0005".into()), Value::Integer(0), |m| {
                m.ambient_temperature = Value::Text("warm".into())
            }),
            row("b.csv", Value::Text("B0005".into()), Value::Integer(0), |m| {
                m.ambient_temperature = Value::Text("24".into());
                m.capacity = Value::Text("1.8".into());
            }),
            row("c.csv", Value::Text("B0005".into()), Value::Integer(0), |m| {
                m.ambient_temperature = Value::Integer(4);
                m.capacity = Value::Float(1.6);
            }),
        ]);
        let agg = aggregate(&t);
        assert_eq!(agg.rows[0].ambient_temperature, Some(24.0));
        let capacity = agg.rows[0].capacity.expect("capacity");
        assert!((capacity - 1.7).abs() < 1e-12);
    }

    #[test]
    fn rows_without_key_are_counted_not_grouped() {
        let t = table(vec![
            row("a.csv", Value::Null, Value::Null, |_| {}),
            row("b.csv", Value::Integer(1), Value::Integer(2), |_| {}),
        ]);
        let agg = aggregate(&t);
        assert_eq!(agg.rows.len(), 1);
        assert_eq!(agg.ungrouped_rows, 1);
    }

    #[test]
    fn empty_table_aggregates_to_empty() {
        let agg = aggregate(&MeasurementTable::default());
        assert!(agg.is_empty());
        assert_eq!(agg.head(5), COLUMNS.join("\t"));
    }

    #[test]
    fn aggregation_is_repeatable() {
        let t = table(vec![
            row("a.csv", Value::Integer(1), Value::Integer(5), |m| m.re = Value::Float(0.05)),
            row("b.csv", Value::Integer(1), Value::Integer(6), |m| m.re = Value::Float(0.06)),
        ]);
        let first = aggregate(&t);
        assert_eq!(first, aggregate(&t));
        assert_eq!(first.head(10), aggregate(&t).head(10));
    }
}
