use crate::config::PipelineConfig;
use crate::data::aggregate::{aggregate, AggregatedTable};
use crate::data::corpus;
use crate::data::metadata::{read_metadata, MetadataIndex};
use crate::error::PipelineError;

/// Counts reported at each stage, shown in the console and the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub metadata_rows_read: usize,
    pub metadata_rows: usize,
    pub files: usize,
    pub unified_shape: (usize, usize),
    pub missing_metadata_rows: usize,
    pub aggregated_shape: (usize, usize),
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub aggregated: AggregatedTable,
    pub diagnostics: Diagnostics,
}

/// Metadata index → file loader → corpus → aggregation.
///
/// Only missing inputs, an unreadable metadata table, or a bad pattern are
/// fatal. Problems inside individual measurement files surface as missing
/// values and log warnings.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;

    let records = read_metadata(&config.metadata_path)?;
    let metadata_rows_read = records.len();
    let files = corpus::discover(config)?;
    let index = MetadataIndex::build(records, &corpus::basenames(&files));
    log::info!("Metadata rows: {metadata_rows_read}");
    log::info!("Number of CSV files: {}", files.len());
    log::info!(
        "Filtered metadata rows: {} ({} without a matching file)",
        index.len(),
        index.dropped
    );

    let unified = corpus::assemble(&files, &index);
    let unified_shape = unified.shape();
    log::info!("Unified table shape: {unified_shape:?}");

    let missing_metadata_rows = corpus::missing_metadata_rows(&unified);
    if missing_metadata_rows > 0 {
        log::warn!("Rows missing test_id, Rct or Re: {missing_metadata_rows}");
    } else {
        log::info!("No rows missing test_id, Rct or Re");
    }

    let aggregated = aggregate(&unified);
    let aggregated_shape = aggregated.shape();
    log::info!("Aggregated table shape: {aggregated_shape:?}");
    log::info!("\n{}", aggregated.head(5));

    Ok(PipelineOutput {
        aggregated,
        diagnostics: Diagnostics {
            metadata_rows_read,
            metadata_rows: index.len(),
            files: files.len(),
            unified_shape,
            missing_metadata_rows,
            aggregated_shape,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use std::path::Path;

    fn setup(dir: &Path) -> PipelineConfig {
        let data = dir.join("data");
        std::fs::create_dir(&data).expect("mkdir");
        std::fs::write(
            dir.join("metadata.csv"),
            "filename,test_id,battery_id,ambient_temperature,Re,Rct,type,Capacity,start_time\n\
             a.csv,5,1,24,,2.0,impedance,,t0\n\
             b.csv,5,1,24,,4.0,impedance,,t1\n\
             d.csv,6,1,24,0.05,1.0,impedance,,t2\n",
        )
        .expect("write");
        std::fs::write(data.join("a.csv"), "Time,Voltage_measured\n0,4.2\n").expect("write");
        std::fs::write(data.join("b.csv"), "Time,Voltage_measured\n0,4.1\n").expect("write");
        std::fs::write(data.join("c.csv"), "Time\n0\n1\n").expect("write");
        PipelineConfig {
            data_dir: data,
            metadata_path: dir.join("metadata.csv"),
            show_window: false,
            ..Default::default()
        }
    }

    #[test]
    fn end_to_end_join_and_aggregate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = setup(dir.path());

        let output = run(&config).expect("pipeline");
        let d = &output.diagnostics;
        assert_eq!(d.metadata_rows_read, 3);
        assert_eq!(d.metadata_rows, 2);
        assert_eq!(d.files, 3);
        assert_eq!(d.unified_shape, (4, 2 + 1 + 8));
        // b.csv/a.csv have no Re; c.csv has nothing
        assert_eq!(d.missing_metadata_rows, 4);

        let rows = &output.aggregated.rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].battery_id, Value::Integer(1));
        assert_eq!(rows[0].test_id, Value::Integer(5));
        assert_eq!(rows[0].rct, Some(3.0));
        assert_eq!(rows[0].re, None);
        assert_eq!(rows[0].ambient_temperature, Some(24.0));
        assert_eq!(output.aggregated.ungrouped_rows, 2);
    }

    #[test]
    fn rerun_is_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = setup(dir.path());
        let first = run(&config).expect("pipeline");
        let second = run(&config).expect("pipeline");
        assert_eq!(first.aggregated, second.aggregated);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn empty_data_directory_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("metadata.csv"), "filename,test_id\nx.csv,1\n").expect("write");
        let data = dir.path().join("data");
        std::fs::create_dir(&data).expect("mkdir");
        let config = PipelineConfig {
            data_dir: data,
            metadata_path: dir.path().join("metadata.csv"),
            ..Default::default()
        };
        let output = run(&config).expect("pipeline");
        assert!(output.aggregated.is_empty());
        assert_eq!(output.diagnostics.files, 0);
        assert_eq!(output.diagnostics.metadata_rows, 0);
    }

    #[test]
    fn missing_metadata_file_fails_fast() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig {
            data_dir: dir.path().to_path_buf(),
            metadata_path: dir.path().join("absent.csv"),
            ..Default::default()
        };
        let err = run(&config).expect_err("missing metadata");
        assert!(matches!(err, PipelineError::MissingInput { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }
}
