use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

/// One row of the fossil-construction history table (BNetzA records of
/// fossil plants commissioned from 1990 on).
#[derive(Debug, Clone, Deserialize)]
pub struct FossilBuildRow {
    pub name: String,
    #[serde(alias = "type")]
    pub fuel: String,
    pub capacity_mw: f64,
    #[serde(alias = "commission_year", alias = "date")]
    pub commission_date: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub municipality: String,
}

#[derive(Debug)]
pub enum FossilBuildLoadError {
    IoError(std::io::Error),
    CsvError(csv::Error),
}

impl From<std::io::Error> for FossilBuildLoadError {
    fn from(err: std::io::Error) -> Self {
        FossilBuildLoadError::IoError(err)
    }
}

impl From<csv::Error> for FossilBuildLoadError {
    fn from(err: csv::Error) -> Self {
        FossilBuildLoadError::CsvError(err)
    }
}

impl std::fmt::Display for FossilBuildLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FossilBuildLoadError::IoError(e) => write!(f, "IO error: {}", e),
            FossilBuildLoadError::CsvError(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for FossilBuildLoadError {}

pub fn load_fossil_builds(csv_path: &Path) -> Result<Vec<FossilBuildRow>, FossilBuildLoadError> {
    let file = File::open(csv_path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
