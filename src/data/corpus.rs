use std::collections::HashSet;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

use super::loader::{basename, load_measurement_file};
use super::metadata::MetadataIndex;
use super::model::{MeasurementTable, MetadataField};

/// Every file under the data directory matching the configured pattern,
/// sorted by path.
pub fn discover(config: &PipelineConfig) -> Result<Vec<PathBuf>, PipelineError> {
    let pattern = config.file_glob();
    let paths = glob::glob(&pattern).map_err(|source| PipelineError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut files: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Basenames of the discovered files, for filtering the metadata table.
pub fn basenames(files: &[PathBuf]) -> HashSet<String> {
    files.iter().map(|p| basename(p)).collect()
}

/// Load every file in parallel and union the results.
///
/// Row order of the result is pinned to (file order, in-file row index):
/// the parallel map collects in input order before concatenation.
pub fn assemble(files: &[PathBuf], index: &MetadataIndex) -> MeasurementTable {
    let tables: Vec<MeasurementTable> = files
        .par_iter()
        .map(|path| load_measurement_file(path, index))
        .collect();
    MeasurementTable::concat(tables)
}

/// Rows missing any of test_id, Rct or Re, a sign of a metadata join
/// mismatch.
pub fn missing_metadata_rows(table: &MeasurementTable) -> usize {
    table
        .rows
        .iter()
        .filter(|row| {
            [MetadataField::TestId, MetadataField::Rct, MetadataField::Re]
                .iter()
                .any(|f| row.field(*f).is_missing())
        })
        .count()
}
