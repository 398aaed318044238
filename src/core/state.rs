use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::event::ScenarioEvent;
use crate::models::plant::FossilFuel;

/// Running fossil capacity split by fuel, carried so the aggregator can scale
/// published per-fuel generation by the capacity actually remaining.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FossilBreakdown {
    pub hard_coal_mw: f64,
    pub lignite_mw: f64,
    pub natural_gas_mw: f64,
    pub oil_mw: f64,
}

impl FossilBreakdown {
    pub fn get(&self, fuel: FossilFuel) -> f64 {
        match fuel {
            FossilFuel::HardCoal => self.hard_coal_mw,
            FossilFuel::Lignite => self.lignite_mw,
            FossilFuel::NaturalGas => self.natural_gas_mw,
            FossilFuel::Oil => self.oil_mw,
        }
    }

    pub fn add(&mut self, fuel: FossilFuel, mw: f64) {
        let slot = match fuel {
            FossilFuel::HardCoal => &mut self.hard_coal_mw,
            FossilFuel::Lignite => &mut self.lignite_mw,
            FossilFuel::NaturalGas => &mut self.natural_gas_mw,
            FossilFuel::Oil => &mut self.oil_mw,
        };
        *slot += mw;
    }

    pub fn subtract(&mut self, fuel: FossilFuel, mw: f64) {
        let slot = match fuel {
            FossilFuel::HardCoal => &mut self.hard_coal_mw,
            FossilFuel::Lignite => &mut self.lignite_mw,
            FossilFuel::NaturalGas => &mut self.natural_gas_mw,
            FossilFuel::Oil => &mut self.oil_mw,
        };
        *slot = (*slot - mw).max(0.0);
    }

    pub fn total(&self) -> f64 {
        self.hard_coal_mw + self.lignite_mw + self.natural_gas_mw + self.oil_mw
    }

    /// Spread an anonymous (residual) reduction across fuels proportionally
    /// to their remaining capacity.
    pub fn subtract_proportionally(&mut self, mw: f64) {
        let total = self.total();
        if total <= 0.0 {
            return;
        }
        for fuel in FossilFuel::ALL {
            let share = self.get(fuel) / total;
            self.subtract(fuel, mw * share);
        }
    }
}

/// Why a scheduled action could not be executed in its period. Deferrals are
/// recoverable and carried forward, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeferralKind {
    /// Construction target reached but no eligible site this period.
    Construction { units: u32 },
    /// Closure target outstanding but no closable capacity this period.
    Closure { shortfall_mw: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deferral {
    pub year: i32,
    pub kind: DeferralKind,
}

/// The running simulation state of one scenario. Exclusively owned and
/// mutated by the scheduling components, read-only once handed to the
/// aggregator.
#[derive(Debug, Clone, Default)]
pub struct ScenarioState {
    pub nuclear_mw: f64,
    pub fossil_mw: f64,
    pub fossil_breakdown: FossilBreakdown,
    /// Unit counter per site key, seeds the sequential "Block N" names.
    pub site_units: BTreeMap<String, u32>,
    /// Site keys currently hosting nuclear units (pre-existing or built here).
    pub nuclear_sites: BTreeSet<String>,
    /// Plants retired by the counterfactual closure selector.
    pub closed_plants: BTreeSet<usize>,
    /// Closure MW licensed by new nuclear but not yet realized.
    pub closure_shortfall_mw: f64,
    /// Whole units due but not yet sited.
    pub deferred_units: u32,
    pub events: Vec<ScenarioEvent>,
    pub deferrals: Vec<Deferral>,
}

impl ScenarioState {
    pub fn next_unit_number(&mut self, site_key: &str) -> u32 {
        let counter = self.site_units.entry(site_key.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}
