use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::config::constants::MW_EPSILON;
use crate::config::scenario_config::ScenarioConfig;
use crate::core::baseline::{baseline_fleet, build_capacity_index, replay_historical, CapacityIndex};
use crate::core::closures::ClosureSelector;
use crate::core::scheduler::{event_month, ConstructionScheduler};
use crate::core::sites::SiteResolver;
use crate::core::state::{Deferral, DeferralKind, FossilBreakdown, ScenarioState};
use crate::error::EngineError;
use crate::models::event::{EventKind, ScenarioEvent};
use crate::models::plant::Plant;

/// Label used for residual fossil reductions that name no specific unit.
pub const RESIDUAL_FLEET_LABEL: &str = "Residual fossil fleet";

/// One (scenario, year) capacity snapshot, end-of-year state.
#[derive(Debug, Clone)]
pub struct CapacityRow {
    pub year: i32,
    pub nuclear_mw: f64,
    pub fossil_mw: f64,
    pub breakdown: FossilBreakdown,
}

/// Everything one scenario produced: the chronological event stream, the
/// derived annual capacity rows, and the deferral log.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub timeseries: Vec<CapacityRow>,
    pub events: Vec<ScenarioEvent>,
    pub deferrals: Vec<Deferral>,
}

#[derive(Debug)]
pub struct EngineOutput {
    pub historical: ScenarioResult,
    pub counterfactual: ScenarioResult,
}

/// The scenario simulation engine. Consumes the validated plant set and
/// produces both scenarios' event streams and capacity series. The two
/// scenarios run concurrently, each owning its own state; the historical
/// capacity index they share is built up front and read-only.
pub struct ScenarioEngine {
    config: ScenarioConfig,
}

impl ScenarioEngine {
    pub fn new(config: ScenarioConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn run(&self, plants: &[Plant]) -> EngineOutput {
        let index = build_capacity_index(plants, self.config.start_year, self.config.end_year);

        let (historical, counterfactual) = rayon::join(
            || self.run_historical(plants, &index),
            || self.run_counterfactual(plants, &index),
        );

        EngineOutput { historical, counterfactual }
    }

    /// Direct replay of the real records into the shared event shape.
    fn run_historical(&self, plants: &[Plant], index: &CapacityIndex) -> ScenarioResult {
        let events = replay_historical(plants, self.config.start_year, self.config.end_year);
        let timeseries = index
            .rows
            .iter()
            .map(|(&year, row)| CapacityRow {
                year,
                nuclear_mw: row.nuclear_mw,
                fossil_mw: row.fossil_mw,
                breakdown: row.breakdown.clone(),
            })
            .collect();
        ScenarioResult { timeseries, events, deferrals: Vec::new() }
    }

    /// The coupled construction/closure loop. Construction follows the
    /// fractional cadence; each committed unit licenses an equal fossil
    /// retirement, capped so the counterfactual nuclear+fossil total never
    /// runs away above the historical one.
    fn run_counterfactual(&self, plants: &[Plant], index: &CapacityIndex) -> ScenarioResult {
        let config = &self.config;
        let resolver = SiteResolver::index(plants);
        let baseline = baseline_fleet(plants, config.start_year);

        let mut state = ScenarioState {
            nuclear_mw: baseline.nuclear_mw,
            fossil_mw: baseline.fossil_mw,
            fossil_breakdown: baseline.breakdown.clone(),
            ..ScenarioState::default()
        };
        for site in resolver.nuclear_sites_open_at(config.start_year) {
            state.nuclear_sites.insert(site.key.clone());
        }
        // Seed unit counters so synthesized names continue the real numbering.
        for plant in plants {
            if plant.fuel.is_nuclear() && plant.commissioned.year() <= config.start_year {
                *state.site_units.entry(plant.site_key.clone()).or_insert(0) += 1;
            }
        }

        let mut scheduler = ConstructionScheduler::new(config);
        let selector = ClosureSelector::new(plants, config.start_year);
        let mut timeseries = Vec::new();

        for year in config.start_year..=config.end_year {
            let due = scheduler.units_due(year) + state.deferred_units;
            state.deferred_units = 0;
            let mut expanded_this_year: BTreeSet<String> = BTreeSet::new();

            for unit_index in 0..due {
                let choice = match scheduler.pick_site(
                    year,
                    config.start_year,
                    &resolver,
                    &state,
                    &expanded_this_year,
                ) {
                    Some(choice) => choice,
                    None => {
                        let remaining = due - unit_index;
                        state.deferred_units = remaining;
                        state.deferrals.push(Deferral {
                            year,
                            kind: DeferralKind::Construction { units: remaining },
                        });
                        warn!(year, units = remaining, "no eligible site, deferring construction");
                        break;
                    }
                };

                let month = event_month(due, unit_index);
                let date = NaiveDate::from_ymd_opt(year, month, 1)
                    .expect("month table only yields valid months");
                self.commit_unit(plants, index, &selector, &mut state, &choice.key, &choice.municipality, date);
                expanded_this_year.insert(choice.key);
            }

            debug!(
                year,
                nuclear_mw = state.nuclear_mw,
                fossil_mw = state.fossil_mw,
                "counterfactual year complete"
            );
            timeseries.push(CapacityRow {
                year,
                nuclear_mw: state.nuclear_mw,
                fossil_mw: state.fossil_mw,
                breakdown: state.fossil_breakdown.clone(),
            });
        }

        ScenarioResult {
            timeseries,
            events: state.events,
            deferrals: state.deferrals,
        }
    }

    /// Commit one nuclear unit at the chosen site, then retire fossil
    /// capacity up to the equalization target.
    fn commit_unit(
        &self,
        plants: &[Plant],
        index: &CapacityIndex,
        selector: &ClosureSelector,
        state: &mut ScenarioState,
        site_key: &str,
        municipality: &str,
        date: NaiveDate,
    ) {
        let year = date.year();
        let unit_mw = self.config.unit_size_mw;
        let historical = index.get(year);

        // Each MW of new nuclear licenses up to one MW of fossil retirement,
        // floored so the counterfactual total tracks the historical one.
        let nuclear_after = state.nuclear_mw + unit_mw;
        let fossil_floor = (historical.nuclear_mw + historical.fossil_mw - nuclear_after).max(0.0);
        let allowed_mw = (state.fossil_mw - fossil_floor).max(0.0);
        let desired_mw = unit_mw + state.closure_shortfall_mw;
        let target_mw = desired_mw.min(allowed_mw);

        let pick = selector.select(plants, target_mw, &state.closed_plants);
        let mut sites_closed: Vec<String> = Vec::new();

        let named_count = pick.plant_ids.len();
        for (idx, &plant_id) in pick.plant_ids.iter().enumerate() {
            let plant = &plants[plant_id];
            let fuel = match plant.fuel {
                crate::models::plant::FuelClass::Fossil(fuel) => fuel,
                crate::models::plant::FuelClass::Nuclear => unreachable!("closure pool is fossil only"),
            };
            let is_last = idx + 1 == named_count;
            let dummy_mw = if is_last { pick.residual_mw } else { 0.0 };

            state.closed_plants.insert(plant_id);
            state.fossil_mw -= plant.capacity_mw;
            state.fossil_breakdown.subtract(fuel, plant.capacity_mw);
            if dummy_mw > MW_EPSILON {
                state.fossil_mw = (state.fossil_mw - dummy_mw).max(fossil_floor);
                state.fossil_breakdown.subtract_proportionally(dummy_mw);
            }
            sites_closed.push(plant.descriptor());

            state.events.push(ScenarioEvent {
                date,
                year,
                site: plant.site_key.clone(),
                name: plant.descriptor(),
                municipality: plant.municipality.clone(),
                kind: EventKind::FossilClosure {
                    fuel: Some(fuel),
                    mw_removed: plant.capacity_mw,
                    fossil_capacity_closed_mw: plant.capacity_mw + dummy_mw,
                    dummy_capacity_closed_mw: dummy_mw,
                    residual_only: false,
                },
                running_nuclear_mw: Some(state.nuclear_mw),
                running_fossil_mw: Some(state.fossil_mw),
                running_total_mw: Some(state.nuclear_mw + state.fossil_mw),
            });
        }

        if named_count == 0 && pick.residual_mw > MW_EPSILON {
            state.fossil_mw = (state.fossil_mw - pick.residual_mw).max(fossil_floor);
            state.fossil_breakdown.subtract_proportionally(pick.residual_mw);
            sites_closed.push(RESIDUAL_FLEET_LABEL.to_string());
            state.events.push(ScenarioEvent {
                date,
                year,
                site: RESIDUAL_FLEET_LABEL.to_string(),
                name: RESIDUAL_FLEET_LABEL.to_string(),
                municipality: String::new(),
                kind: EventKind::FossilClosure {
                    fuel: None,
                    mw_removed: 0.0,
                    fossil_capacity_closed_mw: pick.residual_mw,
                    dummy_capacity_closed_mw: pick.residual_mw,
                    residual_only: true,
                },
                running_nuclear_mw: Some(state.nuclear_mw),
                running_fossil_mw: Some(state.fossil_mw),
                running_total_mw: Some(state.nuclear_mw + state.fossil_mw),
            });
        }

        // Whatever the equalization cap left unrealized carries forward.
        let shortfall = (desired_mw - target_mw).max(0.0);
        if shortfall > MW_EPSILON {
            state.deferrals.push(Deferral {
                year,
                kind: DeferralKind::Closure { shortfall_mw: shortfall },
            });
            warn!(year, shortfall_mw = shortfall, "closure target outstanding, carrying forward");
        }
        state.closure_shortfall_mw = shortfall;

        // The build itself.
        state.nuclear_mw += unit_mw;
        state.nuclear_sites.insert(site_key.to_string());
        let unit_number = state.next_unit_number(site_key);
        state.events.push(ScenarioEvent {
            date,
            year,
            site: site_key.to_string(),
            name: format!("{} Block {}", site_key, unit_number),
            municipality: municipality.to_string(),
            kind: EventKind::NuclearBuild {
                mw_added: unit_mw,
                fossil_capacity_closed_mw: target_mw,
                dummy_capacity_closed_mw: pick.residual_mw,
                fossil_sites_closed: sites_closed,
            },
            running_nuclear_mw: Some(state.nuclear_mw),
            running_fossil_mw: Some(state.fossil_mw),
            running_total_mw: Some(state.nuclear_mw + state.fossil_mw),
        });
    }
}
