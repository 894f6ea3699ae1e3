use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::error::PipelineError;

use super::model::{MetadataField, MetadataFields, MetadataRecord};
use super::schema::{self, ColumnKind, ColumnSpec};

/// Schema key for the metadata table: the join key or one attached field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataColumn {
    Filename,
    Field(MetadataField),
}

const fn field(f: MetadataField) -> ColumnSpec<MetadataColumn> {
    ColumnSpec {
        key: MetadataColumn::Field(f),
        header: f.column(),
        kind: ColumnKind::Inferred,
        required: false,
    }
}

const METADATA_SCHEMA: [ColumnSpec<MetadataColumn>; 9] = [
    ColumnSpec {
        key: MetadataColumn::Filename,
        header: "filename",
        kind: ColumnKind::Inferred,
        required: true,
    },
    field(MetadataField::TestId),
    field(MetadataField::BatteryId),
    field(MetadataField::AmbientTemperature),
    field(MetadataField::Re),
    field(MetadataField::Rct),
    field(MetadataField::Type),
    field(MetadataField::Capacity),
    field(MetadataField::StartTime),
];

// ---------------------------------------------------------------------------
// Reading the metadata table
// ---------------------------------------------------------------------------

/// Read every row of the metadata CSV at `path`.
pub fn read_metadata(path: &Path) -> Result<Vec<MetadataRecord>, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::Metadata {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    read_metadata_from(file, path)
}

fn read_metadata_from<R: Read>(input: R, path: &Path) -> Result<Vec<MetadataRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader
        .headers()
        .map_err(|source| PipelineError::Metadata {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let columns = schema::resolve(&METADATA_SCHEMA, &headers).map_err(|source| {
        PipelineError::JoinKey {
            path: path.to_path_buf(),
            source,
        }
    })?;

    // Past the header a bad row never fails the table: undecodable cells
    // become missing and a row without a usable filename is skipped.
    let mut records = Vec::new();
    for (row_index, result) in reader.byte_records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("{}: stopped at metadata row {row_index}: {e}", path.display());
                break;
            }
        };
        let mut filename = None;
        let mut fields = MetadataFields::default();
        for &(key, kind, idx) in &columns {
            let raw = row.get(idx).unwrap_or_default();
            match key {
                MetadataColumn::Filename => {
                    filename = std::str::from_utf8(raw).ok().map(|name| name.trim().to_string())
                }
                MetadataColumn::Field(f) => fields.set(f, kind.parse_bytes(raw)),
            }
        }
        match filename {
            Some(filename) if !filename.is_empty() => {
                records.push(MetadataRecord { filename, fields })
            }
            _ => log::warn!("Skipping metadata row {row_index} without a readable filename"),
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// MetadataIndex – filename → metadata lookup
// ---------------------------------------------------------------------------

/// Metadata restricted to files that exist on disk, keyed by file basename.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    by_filename: HashMap<String, Arc<MetadataFields>>,
    /// Rows whose filename has no file on disk.
    pub dropped: usize,
    /// Rows discarded because an earlier row used the same filename.
    pub duplicates: usize,
}

impl MetadataIndex {
    /// Keep only records whose filename is in `existing`. The first record
    /// for a filename wins.
    pub fn build(records: Vec<MetadataRecord>, existing: &HashSet<String>) -> Self {
        let mut index = MetadataIndex::default();
        for record in records {
            if !existing.contains(&record.filename) {
                index.dropped += 1;
                continue;
            }
            if index.by_filename.contains_key(&record.filename) {
                index.duplicates += 1;
                continue;
            }
            index
                .by_filename
                .insert(record.filename, Arc::new(record.fields));
        }
        if index.duplicates > 0 {
            log::warn!(
                "{} duplicate metadata rows ignored (first row per filename kept)",
                index.duplicates
            );
        }
        index
    }

    /// Metadata for `filename`, if the index has a row for it.
    pub fn lookup(&self, filename: &str) -> Option<Arc<MetadataFields>> {
        self.by_filename.get(filename).cloned()
    }

    /// Number of metadata rows retained.
    pub fn len(&self) -> usize {
        self.by_filename.len()
    }
}
