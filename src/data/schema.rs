use super::model::Value;

// ---------------------------------------------------------------------------
// Declared column schemas
// ---------------------------------------------------------------------------

/// How a column's raw text is turned into a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Always numeric: parsed as `f64`, unparsable cells become `Null`.
    Numeric,
    /// Type inferred per cell (integer, float, text).
    Inferred,
}

impl ColumnKind {
    pub fn parse(self, raw: &str) -> Value {
        match self {
            ColumnKind::Numeric => Value::numeric(raw),
            ColumnKind::Inferred => Value::infer(raw),
        }
    }

    /// Parse a raw CSV cell. Bytes that are not UTF-8 become `Null`.
    pub fn parse_bytes(self, raw: &[u8]) -> Value {
        std::str::from_utf8(raw).map_or(Value::Null, |text| self.parse(text))
    }
}

/// One declared column: its header, how to parse it, whether it must exist.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec<K> {
    pub key: K,
    pub header: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

/// Raised when a file lacks a column declared as required.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required column '{0}'")]
pub struct MissingColumn(pub &'static str);

/// Match a header row against a declared schema.
///
/// Returns `(key, kind, header position)` for every declared column found.
/// Headers not in the schema are ignored; absent optional columns are
/// skipped; an absent required column is an error.
pub fn resolve<K: Copy>(
    specs: &[ColumnSpec<K>],
    headers: &csv::StringRecord,
) -> Result<Vec<(K, ColumnKind, usize)>, MissingColumn> {
    let mut resolved = Vec::with_capacity(specs.len());
    for spec in specs {
        match headers.iter().position(|h| h.trim() == spec.header) {
            Some(idx) => resolved.push((spec.key, spec.kind, idx)),
            None if spec.required => return Err(MissingColumn(spec.header)),
            None => {}
        }
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Measurement channels
// ---------------------------------------------------------------------------

/// The allow-listed columns of a measurement file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    VoltageMeasured,
    CurrentMeasured,
    TemperatureMeasured,
    CurrentLoad,
    VoltageLoad,
    Time,
    SenseCurrent,
    BatteryCurrent,
    CurrentRatio,
    BatteryImpedance,
    RectifiedImpedance,
    CurrentCharge,
    VoltageCharge,
}

const fn channel(key: Channel, header: &'static str, kind: ColumnKind) -> ColumnSpec<Channel> {
    ColumnSpec {
        key,
        header,
        kind,
        required: false,
    }
}

/// Every measurement column is optional: discharge, charge and impedance
/// runs each carry a different subset.
pub const MEASUREMENT_SCHEMA: [ColumnSpec<Channel>; 13] = [
    channel(Channel::VoltageMeasured, "Voltage_measured", ColumnKind::Numeric),
    channel(Channel::CurrentMeasured, "Current_measured", ColumnKind::Inferred),
    channel(Channel::TemperatureMeasured, "Temperature_measured", ColumnKind::Numeric),
    channel(Channel::CurrentLoad, "Current_load", ColumnKind::Inferred),
    channel(Channel::VoltageLoad, "Voltage_load", ColumnKind::Numeric),
    channel(Channel::Time, "Time", ColumnKind::Numeric),
    channel(Channel::SenseCurrent, "Sense_current", ColumnKind::Inferred),
    channel(Channel::BatteryCurrent, "Battery_current", ColumnKind::Inferred),
    channel(Channel::CurrentRatio, "Current_ratio", ColumnKind::Inferred),
    channel(Channel::BatteryImpedance, "Battery_impedance", ColumnKind::Inferred),
    channel(Channel::RectifiedImpedance, "Rectified_Impedance", ColumnKind::Inferred),
    channel(Channel::CurrentCharge, "Current_charge", ColumnKind::Inferred),
    channel(Channel::VoltageCharge, "Voltage_charge", ColumnKind::Inferred),
];

impl Channel {
    pub fn header(self) -> &'static str {
        MEASUREMENT_SCHEMA
            .iter()
            .find(|spec| spec.key == self)
            .map(|spec| spec.header)
            .unwrap_or("?")
    }
}
