use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

/// Raw plant-table row as produced by the external loader. Validation and
/// normalization happen in the registry, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantRow {
    #[serde(default)]
    pub site: String,
    pub name: String,
    #[serde(alias = "fuel_bucket")]
    pub fuel_class: String,
    #[serde(default)]
    pub technology: String,
    #[serde(default)]
    pub protected_flag: String,
    pub capacity_mw: f64,
    #[serde(alias = "commission_year", default)]
    pub commission_date: String,
    #[serde(alias = "closure_year", default)]
    pub decommission_date: String,
    #[serde(default)]
    pub municipality: String,
}

#[derive(Debug)]
pub enum PlantLoadError {
    IoError(std::io::Error),
    CsvError(csv::Error),
}

impl From<std::io::Error> for PlantLoadError {
    fn from(err: std::io::Error) -> Self {
        PlantLoadError::IoError(err)
    }
}

impl From<csv::Error> for PlantLoadError {
    fn from(err: csv::Error) -> Self {
        PlantLoadError::CsvError(err)
    }
}

impl std::fmt::Display for PlantLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlantLoadError::IoError(e) => write!(f, "IO error: {}", e),
            PlantLoadError::CsvError(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for PlantLoadError {}

/// Load the plant table. Rows aggregating a whole fleet segment
/// (`technology == "aggregate"`) carry no unit identity and are skipped.
pub fn load_plants(csv_path: &Path) -> Result<Vec<PlantRow>, PlantLoadError> {
    let file = File::open(csv_path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: PlantRow = result?;
        if row.technology.trim() == "aggregate" {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}
