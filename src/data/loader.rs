use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::metadata::MetadataIndex;
use super::model::{MeasurementRow, MeasurementTable, MetadataFields};
use super::schema::{self, MEASUREMENT_SCHEMA};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one measurement file and attach its metadata.
///
/// Never fails: a file that cannot be opened or whose header cannot be read
/// is logged and yields an empty table, so one bad run cannot take down the
/// others. Bad rows inside a readable file only lose their bad cells.
pub fn load_measurement_file(path: &Path, index: &MetadataIndex) -> MeasurementTable {
    let filename = basename(path);
    let metadata = index.lookup(&filename).unwrap_or_else(|| {
        log::debug!("No metadata for {filename}");
        Arc::new(MetadataFields::default())
    });

    let table = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))
        .and_then(|file| read_measurements(file, &filename, metadata));

    match table {
        Ok(table) => {
            if table.is_empty() {
                log::warn!("No data loaded from: {filename}. Check column names or data.");
            }
            table
        }
        Err(e) => {
            log::warn!("Failed to load {filename}: {e:#}");
            MeasurementTable::default()
        }
    }
}

/// File name without its directory, used as the metadata join key.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row, then one sampled instant per row. Only columns
/// in [`MEASUREMENT_SCHEMA`] are kept. Short rows leave the trailing
/// channels missing and undecodable cells become missing values. Only the
/// header can fail the file; a read error mid-file keeps the rows read so
/// far.
fn read_measurements<R: Read>(
    input: R,
    filename: &str,
    metadata: Arc<MetadataFields>,
) -> Result<MeasurementTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let columns = schema::resolve(&MEASUREMENT_SCHEMA, &headers)?;
    log::debug!(
        "{filename}: keeping columns {:?}",
        columns.iter().map(|(c, _, _)| c.header()).collect::<Vec<_>>()
    );

    let filename: Arc<str> = Arc::from(filename);
    let mut table = MeasurementTable {
        rows: Vec::new(),
        channels: columns.iter().map(|(channel, _, _)| *channel).collect(),
    };

    for (row_index, result) in reader.byte_records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{filename}: stopped at CSV row {row_index}: {e}");
                break;
            }
        };
        let channels: BTreeMap<_, _> = columns
            .iter()
            .filter_map(|&(channel, kind, idx)| {
                record.get(idx).map(|raw| (channel, kind.parse_bytes(raw)))
            })
            .collect();
        table.rows.push(MeasurementRow {
            filename: Arc::clone(&filename),
            row_index,
            channels,
            metadata: Arc::clone(&metadata),
        });
    }

    Ok(table)
}
