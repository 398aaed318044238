use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::config::constants::*;

/// Published generation sources. Coal covers both hard coal and lignite;
/// the published figures do not distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GenerationSource {
    Coal,
    Gas,
    Oil,
    Nuclear,
    Hydro,
    Solar,
    Wind,
    Bioenergy,
    OtherRenewables,
}

impl GenerationSource {
    pub fn is_fossil(&self) -> bool {
        matches!(
            self,
            GenerationSource::Coal | GenerationSource::Gas | GenerationSource::Oil
        )
    }

    pub fn is_renewable(&self) -> bool {
        matches!(
            self,
            GenerationSource::Hydro
                | GenerationSource::Solar
                | GenerationSource::Wind
                | GenerationSource::Bioenergy
                | GenerationSource::OtherRenewables
        )
    }

    pub fn emission_factor_t_per_mwh(&self) -> f64 {
        match self {
            GenerationSource::Coal => COAL_EMISSIONS_T_PER_MWH,
            GenerationSource::Gas => GAS_EMISSIONS_T_PER_MWH,
            GenerationSource::Oil => OIL_EMISSIONS_T_PER_MWH,
            GenerationSource::Nuclear => NUCLEAR_EMISSIONS_T_PER_MWH,
            _ => 0.0,
        }
    }
}

impl FromStr for GenerationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coal" => Ok(GenerationSource::Coal),
            "gas" | "natural_gas" => Ok(GenerationSource::Gas),
            "oil" => Ok(GenerationSource::Oil),
            "nuclear" => Ok(GenerationSource::Nuclear),
            "hydro" => Ok(GenerationSource::Hydro),
            "solar" => Ok(GenerationSource::Solar),
            "wind" => Ok(GenerationSource::Wind),
            "bioenergy" => Ok(GenerationSource::Bioenergy),
            "other_renewables" => Ok(GenerationSource::OtherRenewables),
            other => Err(format!("Unknown generation source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GenerationRow {
    year: i32,
    source: String,
    twh: f64,
}

/// Published generation by source for one year, TWh.
#[derive(Debug, Clone, Default)]
pub struct GenerationYear {
    pub by_source: BTreeMap<GenerationSource, f64>,
}

impl GenerationYear {
    pub fn get(&self, source: GenerationSource) -> f64 {
        self.by_source.get(&source).copied().unwrap_or(0.0)
    }

    pub fn fossil_twh(&self) -> f64 {
        self.by_source
            .iter()
            .filter(|(s, _)| s.is_fossil())
            .map(|(_, v)| v)
            .sum()
    }

    pub fn renewables_twh(&self) -> f64 {
        self.by_source
            .iter()
            .filter(|(s, _)| s.is_renewable())
            .map(|(_, v)| v)
            .sum()
    }

    pub fn total_twh(&self) -> f64 {
        self.fossil_twh() + self.get(GenerationSource::Nuclear) + self.renewables_twh()
    }

    /// Mt CO2 implied by the published mix under the fixed per-fuel factors.
    pub fn co2_mt(&self) -> f64 {
        self.by_source
            .iter()
            .map(|(s, twh)| twh * s.emission_factor_t_per_mwh())
            .sum()
    }
}

/// The published generation-by-source table, indexed by year.
#[derive(Debug, Clone, Default)]
pub struct GenerationTable {
    pub years: BTreeMap<i32, GenerationYear>,
}

impl GenerationTable {
    pub fn from_rows(rows: &[(i32, GenerationSource, f64)]) -> Self {
        let mut years: BTreeMap<i32, GenerationYear> = BTreeMap::new();
        for (year, source, twh) in rows {
            *years
                .entry(*year)
                .or_default()
                .by_source
                .entry(*source)
                .or_insert(0.0) += twh;
        }
        GenerationTable { years }
    }

    pub fn get(&self, year: i32) -> Option<&GenerationYear> {
        self.years.get(&year)
    }

    /// Pad the table to cover `[start_year, end_year]` by repeating the first
    /// and last published rows, and drop years outside the range. The engine
    /// needs a figure for every simulated year.
    pub fn extended_to_range(&self, start_year: i32, end_year: i32) -> GenerationTable {
        let mut years = BTreeMap::new();
        if let (Some((&first_year, first)), Some((&last_year, last))) =
            (self.years.iter().next(), self.years.iter().next_back())
        {
            for year in start_year..=end_year {
                let row = if year < first_year {
                    first
                } else if year > last_year {
                    last
                } else {
                    self.years.get(&year).unwrap_or(first)
                };
                years.insert(year, row.clone());
            }
        }
        GenerationTable { years }
    }
}

#[derive(Debug)]
pub enum GenerationLoadError {
    IoError(std::io::Error),
    CsvError(csv::Error),
    UnknownSource(String),
}

impl From<std::io::Error> for GenerationLoadError {
    fn from(err: std::io::Error) -> Self {
        GenerationLoadError::IoError(err)
    }
}

impl From<csv::Error> for GenerationLoadError {
    fn from(err: csv::Error) -> Self {
        GenerationLoadError::CsvError(err)
    }
}

impl std::fmt::Display for GenerationLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationLoadError::IoError(e) => write!(f, "IO error: {}", e),
            GenerationLoadError::CsvError(e) => write!(f, "CSV error: {}", e),
            GenerationLoadError::UnknownSource(s) => write!(f, "Unknown generation source: {}", s),
        }
    }
}

impl std::error::Error for GenerationLoadError {}

/// Load the long-format generation table `{year, source, twh}`.
pub fn load_generation(csv_path: &Path) -> Result<GenerationTable, GenerationLoadError> {
    let file = File::open(csv_path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: GenerationRow = result?;
        let source = row
            .source
            .parse::<GenerationSource>()
            .map_err(GenerationLoadError::UnknownSource)?;
        rows.push((row.year, source, row.twh));
    }
    Ok(GenerationTable::from_rows(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_extends_by_repeating_edge_rows() {
        let table = GenerationTable::from_rows(&[
            (1995, GenerationSource::Coal, 250.0),
            (1995, GenerationSource::Nuclear, 150.0),
            (1996, GenerationSource::Coal, 240.0),
        ]);
        let extended = table.extended_to_range(1993, 1998);
        assert_eq!(extended.years.len(), 6);
        assert_eq!(extended.get(1993).unwrap().get(GenerationSource::Coal), 250.0);
        assert_eq!(extended.get(1998).unwrap().get(GenerationSource::Coal), 240.0);
        assert_eq!(extended.get(1998).unwrap().get(GenerationSource::Nuclear), 0.0);
    }

    #[test]
    fn co2_uses_per_fuel_factors() {
        let table = GenerationTable::from_rows(&[
            (2000, GenerationSource::Coal, 100.0),
            (2000, GenerationSource::Gas, 10.0),
            (2000, GenerationSource::Wind, 50.0),
        ]);
        let year = table.get(2000).unwrap();
        assert!((year.co2_mt() - (100.0 * 0.95 + 10.0 * 0.45)).abs() < 1e-9);
        assert!((year.renewables_twh() - 50.0).abs() < 1e-9);
    }
}
