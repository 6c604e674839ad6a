//! Loading of emissions-inventory CSV trees and the SCC reference table.
//!
//! [`DataReader`] discovers every CSV under the input directory, parses each
//! one independently (a bad file is logged and skipped), concatenates the
//! survivors into one polars frame and normalizes the `scc` and `stkhgt`
//! columns.

pub mod discover;
pub mod normalize;
pub mod parser;

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::frame::concat_diagonal;

pub use discover::{find_csv_files, log_directory_structure};
pub use normalize::normalize_records;
pub use parser::{read_csv, read_csv_with_comments};

/// Owns the tables loaded for one run.
#[derive(Debug)]
pub struct DataReader {
    data_dir: PathBuf,
    scc_path: PathBuf,
    csv_files: Vec<PathBuf>,
    combined: Option<DataFrame>,
    scc: Option<DataFrame>,
}

impl DataReader {
    /// Creates a reader and discovers the CSV files under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>, scc_dir: &Path, scc_filename: &str) -> Self {
        let data_dir = data_dir.into();
        let csv_files = find_csv_files(&data_dir);
        info!(data_dir = %data_dir.display(), files = csv_files.len(), "Discovered CSV files");
        Self {
            scc_path: scc_dir.join(scc_filename),
            data_dir,
            csv_files,
            combined: None,
            scc: None,
        }
    }

    pub fn csv_files(&self) -> &[PathBuf] {
        &self.csv_files
    }

    /// The combined record frame, or `None` when no input file could be read.
    pub fn combined(&self) -> Option<&DataFrame> {
        self.combined.as_ref()
    }

    pub fn scc(&self) -> Option<&DataFrame> {
        self.scc.as_ref()
    }

    pub fn log_directory_structure(&self) {
        log_directory_structure(&self.data_dir);
    }

    /// Reads and concatenates every discovered CSV file.
    ///
    /// # Errors
    ///
    /// Per-file read and parse failures are logged and never returned. An
    /// error is returned only when normalizing the combined table fails.
    pub fn read_and_combine_data(&mut self) -> Result<()> {
        let total = self.csv_files.len();
        let mut frames = Vec::with_capacity(total);

        for (i, path) in self.csv_files.iter().enumerate() {
            info!(file = %path.display(), "{}/{}: Reading", i, total);
            match read_csv_with_comments(path) {
                Ok(frame) => {
                    debug!(file = %path.display(), rows = frame.height(), "Successfully read");
                    frames.push(frame);
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "Error reading CSV file");
                }
            }
        }

        if frames.is_empty() {
            warn!("No CSV files were successfully read");
            self.combined = None;
            return Ok(());
        }

        let file_count = frames.len();
        let combined = normalize_records(&concat_diagonal(frames)?)?;
        let (rows, cols) = combined.shape();
        info!(file_count, rows, cols, "Combined CSV files into one table");
        self.combined = Some(combined);

        Ok(())
    }

    /// Reads the SCC reference file as text columns, without type coercion.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or malformed.
    pub fn read_scc_data(&mut self) -> Result<()> {
        let frame = read_csv(&self.scc_path)?;
        let (rows, cols) = frame.shape();
        info!(path = %self.scc_path.display(), rows, cols, "Loaded SCC reference table");
        self.scc = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InventoryError;
    use std::fs;

    #[test]
    fn test_read_and_combine_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("ptnonipm");
        fs::create_dir_all(&sub).unwrap();
        fs::write(
            dir.path().join("a.csv"),
            "#FORMAT=FF10_POINT\nscc,poll,stkhgt\n30100101,PM25-PRI,50.0\n",
        )
        .unwrap();
        fs::write(
            sub.join("b.csv"),
            "scc,poll,stkhgt,design_capacity\n30300101,NOX,,12\n,,,\n",
        )
        .unwrap();
        fs::write(sub.join("broken.csv"), "scc,poll\n1,2,3\n").unwrap();

        let mut reader = DataReader::new(dir.path(), dir.path(), "unused.csv");
        assert_eq!(reader.csv_files().len(), 3);
        reader.read_and_combine_data().unwrap();

        let combined = reader.combined().unwrap();
        assert_eq!(combined.height(), 2);
        assert!(combined.get_column_index("design_capacity").is_some());
        let scc: Vec<Option<i64>> = combined.column("scc").unwrap().i64().unwrap().into_iter().collect();
        assert!(scc.contains(&Some(30100101)));
        assert!(scc.contains(&Some(30300101)));
    }

    #[test]
    fn test_read_and_combine_no_files_leaves_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = DataReader::new(dir.path(), dir.path(), "unused.csv");
        reader.read_and_combine_data().unwrap();
        assert!(reader.combined().is_none());
    }

    #[test]
    fn test_read_and_combine_coercion_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "scc,poll,stkhgt\nabc,NOX,1\n").unwrap();

        let mut reader = DataReader::new(dir.path(), dir.path(), "unused.csv");
        let err = reader.read_and_combine_data().unwrap_err();
        assert!(matches!(err, InventoryError::Coercion { .. }));
    }

    #[test]
    fn test_read_and_combine_tolerates_short_rows_and_na() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.csv"),
            "scc,poll,stkhgt,design_capacity\n30100101,PM25-PRI,NA\n30100101,PM25-PRI,12\n30100101,NOX\n",
        )
        .unwrap();

        let mut reader = DataReader::new(dir.path(), dir.path(), "unused.csv");
        reader.read_and_combine_data().unwrap();

        let combined = reader.combined().unwrap();
        assert_eq!(combined.height(), 3);
        let stkhgt: Vec<Option<f64>> = combined.column("stkhgt").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(stkhgt, vec![None, Some(12.0), None]);
    }

    #[test]
    fn test_read_scc_data_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = DataReader::new(dir.path(), dir.path(), "SCCDownload.csv");
        assert!(reader.read_scc_data().is_err());
        assert!(reader.scc().is_none());
    }

    #[test]
    fn test_read_scc_data_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("scc.csv"),
            "SCC,data category,status\n30100101,Point,Active\n",
        )
        .unwrap();
        let mut reader = DataReader::new(dir.path().join("inputs"), dir.path(), "scc.csv");
        reader.read_scc_data().unwrap();

        let scc = reader.scc().unwrap();
        let codes = scc.column("SCC").unwrap().str().unwrap();
        assert_eq!(codes.get(0), Some("30100101"));
    }
}
