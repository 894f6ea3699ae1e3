use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::schema::Channel;

// ---------------------------------------------------------------------------
// Value – a single cell in the joined table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what a CSV reader infers per column.
/// `Null` is the missing-value marker used everywhere in the pipeline.
/// Group keys live in `BTreeMap`s downstream so `Value` must be `Ord`.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can group and sort by Value --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            // Numbers compare by magnitude regardless of how they were parsed,
            // so battery 5 and battery 5.0 land in the same group.
            (Integer(a), Integer(b)) => a.cmp(b),
            (Integer(a), Float(b)) => cmp_int_float(*a, *b),
            (Float(a), Integer(b)) => cmp_int_float(*b, *a).reverse(),
            // `0.0 == -0.0`; NaN never reaches a `Value` but still needs a place.
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)),
            (Text(_), Integer(_) | Float(_)) => Ordering::Greater,
            (Integer(_) | Float(_), Text(_)) => Ordering::Less,
            (Text(a), Text(b)) => a.cmp(b),
        }
    }
}

/// Exact comparison of an integer with a float. Going through `f64` would
/// collapse neighbouring integers above 2^53 and break transitivity.
fn cmp_int_float(i: i64, f: f64) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    // i64 covers [-2^63, 2^63).
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return Ordering::Less;
    }
    if f >= UPPER {
        return Ordering::Less;
    }
    if f < LOWER {
        return Ordering::Greater;
    }
    let floor = f.floor();
    match i.cmp(&(floor as i64)) {
        Ordering::Equal if f > floor => Ordering::Less,
        ordering => ordering,
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Text(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            // Integer and Float share one hash space to agree with `Ord`.
            Value::Integer(_) | Value::Float(_) => {
                1u8.hash(state);
                // `+ 0.0` folds -0.0 into 0.0.
                (self.as_f64().unwrap_or(f64::NAN) + 0.0).to_bits().hash(state);
            }
            Value::Null => 2u8.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl Value {
    /// Infer the narrowest type for a raw CSV cell. Empty cells are missing.
    pub fn infer(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_nan() {
                return Value::Null;
            }
            return Value::Float(f);
        }
        Value::Text(s.to_string())
    }

    /// Coerce a raw CSV cell straight to a float, mapping anything
    /// unparsable to `Null`.
    pub fn numeric(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(f) if !f.is_nan() => Value::Float(f),
            _ => Value::Null,
        }
    }

    /// Interpret the value as an `f64`. Text that reads as a number is
    /// accepted; everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Metadata – one row of the experiment metadata table
// ---------------------------------------------------------------------------

/// The metadata columns attached to every measurement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataField {
    TestId,
    BatteryId,
    AmbientTemperature,
    Re,
    Rct,
    Type,
    Capacity,
    StartTime,
}

impl MetadataField {
    pub const ALL: [MetadataField; 8] = [
        MetadataField::TestId,
        MetadataField::BatteryId,
        MetadataField::AmbientTemperature,
        MetadataField::Re,
        MetadataField::Rct,
        MetadataField::Type,
        MetadataField::Capacity,
        MetadataField::StartTime,
    ];

    /// Column header in the metadata CSV.
    pub const fn column(self) -> &'static str {
        match self {
            MetadataField::TestId => "test_id",
            MetadataField::BatteryId => "battery_id",
            MetadataField::AmbientTemperature => "ambient_temperature",
            MetadataField::Re => "Re",
            MetadataField::Rct => "Rct",
            MetadataField::Type => "type",
            MetadataField::Capacity => "Capacity",
            MetadataField::StartTime => "start_time",
        }
    }
}

/// Experiment attributes for one file. `Default` is the all-missing record
/// attached to files that have no metadata row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFields {
    pub test_id: Value,
    pub battery_id: Value,
    pub ambient_temperature: Value,
    pub re: Value,
    pub rct: Value,
    pub kind: Value,
    pub capacity: Value,
    pub start_time: Value,
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl MetadataFields {
    pub fn get(&self, field: MetadataField) -> &Value {
        match field {
            MetadataField::TestId => &self.test_id,
            MetadataField::BatteryId => &self.battery_id,
            MetadataField::AmbientTemperature => &self.ambient_temperature,
            MetadataField::Re => &self.re,
            MetadataField::Rct => &self.rct,
            MetadataField::Type => &self.kind,
            MetadataField::Capacity => &self.capacity,
            MetadataField::StartTime => &self.start_time,
        }
    }

    pub fn set(&mut self, field: MetadataField, value: Value) {
        let slot = match field {
            MetadataField::TestId => &mut self.test_id,
            MetadataField::BatteryId => &mut self.battery_id,
            MetadataField::AmbientTemperature => &mut self.ambient_temperature,
            MetadataField::Re => &mut self.re,
            MetadataField::Rct => &mut self.rct,
            MetadataField::Type => &mut self.kind,
            MetadataField::Capacity => &mut self.capacity,
            MetadataField::StartTime => &mut self.start_time,
        };
        *slot = value;
    }
}

/// One row of the metadata CSV, keyed by `filename`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub filename: String,
    pub fields: MetadataFields,
}

// ---------------------------------------------------------------------------
// MeasurementRow – one sampled instant of one file, joined with metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MeasurementRow {
    /// Basename of the file this row was read from.
    pub filename: Arc<str>,
    /// Zero-based position of the row inside its file.
    pub row_index: usize,
    /// Allow-listed channels present in the source file.
    pub channels: BTreeMap<Channel, Value>,
    /// Metadata shared by every row of the same file.
    pub metadata: Arc<MetadataFields>,
}

static MISSING: Value = Value::Null;

impl MeasurementRow {
    /// Channel value, or the missing marker when the file lacks that column.
    pub fn channel(&self, channel: Channel) -> &Value {
        self.channels.get(&channel).unwrap_or(&MISSING)
    }

    pub fn field(&self, field: MetadataField) -> &Value {
        self.metadata.get(field)
    }
}

// ---------------------------------------------------------------------------
// MeasurementTable – per-file tables and the unified corpus
// ---------------------------------------------------------------------------

/// A set of measurement rows plus the union of channels seen in them.
#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    pub rows: Vec<MeasurementRow>,
    pub channels: BTreeSet<Channel>,
}

impl MeasurementTable {
    /// Number of columns in the joined view: channels + filename + metadata.
    pub fn width(&self) -> usize {
        self.channels.len() + 1 + MetadataField::ALL.len()
    }

    /// (rows, columns), as reported in the stage diagnostics.
    pub fn shape(&self) -> (usize, usize) {
        if self.rows.is_empty() && self.channels.is_empty() {
            return (0, 0);
        }
        (self.rows.len(), self.width())
    }

    /// Union-concatenate tables, preserving the order they are given in.
    /// Rows keep only their own channels; lookups of absent channels yield
    /// the missing marker.
    pub fn concat(tables: impl IntoIterator<Item = MeasurementTable>) -> Self {
        let mut out = MeasurementTable::default();
        for table in tables {
            out.channels.extend(table.channels);
            out.rows.extend(table.rows);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
