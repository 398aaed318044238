use serde::{Deserialize, Serialize};

use crate::config::constants::*;
use crate::error::EngineError;

/// Parameters of one simulation run. The cadence and equalization knobs are
/// approximate targets in the source material; the concrete accumulation rule
/// (fractional carry-forward, see the scheduler) is fixed here so re-runs are
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// First year the counterfactual schedules new nuclear units.
    pub build_start_year: i32,
    /// Target long-run construction cadence, new units per year.
    pub build_rate_units_per_year: f64,
    /// Nameplate capacity assigned to each counterfactual unit.
    pub unit_size_mw: f64,
    pub nuclear_capacity_factor: f64,
    pub renewable_freeze_year: i32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            build_start_year: DEFAULT_BUILD_START_YEAR,
            build_rate_units_per_year: DEFAULT_BUILD_RATE_UNITS_PER_YEAR,
            unit_size_mw: DEFAULT_UNIT_SIZE_MW,
            nuclear_capacity_factor: NUCLEAR_CAPACITY_FACTOR,
            renewable_freeze_year: DEFAULT_RENEWABLE_FREEZE_YEAR,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.end_year < self.start_year {
            return Err(EngineError::InvalidConfig(format!(
                "end_year {} before start_year {}",
                self.end_year, self.start_year
            )));
        }
        if self.build_rate_units_per_year <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "build rate must be positive, got {}",
                self.build_rate_units_per_year
            )));
        }
        if self.unit_size_mw <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "unit size must be positive, got {} MW",
                self.unit_size_mw
            )));
        }
        Ok(())
    }
}
