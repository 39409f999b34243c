//! CSV ingestion and result persistence.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;
use tracing::{info, warn};

use crate::error::EmissionsError;

/// Load every `*.csv` file in `dir` into a frame keyed by file stem.
///
/// Empty or unparseable files are skipped with a warning.
pub fn load_data_from_directory(
    dir: impl AsRef<Path>,
) -> Result<HashMap<String, DataFrame>, EmissionsError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(EmissionsError::DirectoryNotFound(dir.display().to_string()));
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let mut frames = HashMap::new();
    for path in paths {
        let Some(key) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let filename = path.display();

        if fs::metadata(&path)?.len() == 0 {
            warn!("'{filename}' is empty. Skipping.");
            continue;
        }

        match read_csv(&path) {
            Ok(df) if df.width() == 0 => warn!("'{filename}' is empty. Skipping."),
            Ok(df) => {
                info!(rows = df.height(), "Loaded '{filename}' into table '{key}'");
                frames.insert(key, df);
            }
            Err(err) => warn!("Could not parse '{filename}': {err}. Skipping."),
        }
    }

    if frames.is_empty() {
        warn!("No CSV files found in '{}'", dir.display());
    }

    Ok(frames)
}

/// Read one CSV with a header row and whole-file schema inference.
/// Column names are trimmed.
pub fn read_csv(path: &Path) -> Result<DataFrame, EmissionsError> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    Ok(df)
}

/// Write `df` as CSV with a header, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<(), EmissionsError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    info!(rows = df.height(), "Saved results to '{}'", path.display());
    Ok(())
}
