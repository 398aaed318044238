use std::collections::BTreeMap;

use chrono::Datelike;

use crate::core::state::FossilBreakdown;
use crate::models::event::{EventKind, ScenarioEvent};
use crate::models::plant::{FuelClass, Plant};

/// Capacity on the grid for one year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacityYear {
    pub nuclear_mw: f64,
    pub fossil_mw: f64,
    pub breakdown: FossilBreakdown,
}

/// Historical capacity by year, end-of-year state. This is the reference the
/// capacity-equalization policy tracks against.
#[derive(Debug, Clone)]
pub struct CapacityIndex {
    pub rows: BTreeMap<i32, CapacityYear>,
}

impl CapacityIndex {
    /// Years past the indexed range fall back to the last row.
    pub fn get(&self, year: i32) -> &CapacityYear {
        self.rows.get(&year).unwrap_or_else(|| {
            self.rows
                .values()
                .next_back()
                .expect("capacity index is never empty for a validated year range")
        })
    }
}

/// End-of-year fleet: commissioned in or before `year`, not yet decommissioned
/// by the end of it.
pub fn build_capacity_index(plants: &[Plant], start_year: i32, end_year: i32) -> CapacityIndex {
    let mut rows = BTreeMap::new();
    for year in start_year..=end_year {
        let mut row = CapacityYear::default();
        for plant in plants {
            if !plant.operating_at_end_of(year) {
                continue;
            }
            match plant.fuel {
                FuelClass::Nuclear => row.nuclear_mw += plant.capacity_mw,
                FuelClass::Fossil(fuel) => {
                    row.fossil_mw += plant.capacity_mw;
                    row.breakdown.add(fuel, plant.capacity_mw);
                }
            }
        }
        rows.insert(year, row);
    }
    CapacityIndex { rows }
}

/// The fleet active at any point during the start year. Both scenarios begin
/// from this baseline; start-year closures then play out as events.
pub fn baseline_fleet(plants: &[Plant], start_year: i32) -> CapacityYear {
    let mut row = CapacityYear::default();
    for plant in plants {
        if !plant.operating_in(start_year) || plant.commissioned.year() > start_year {
            continue;
        }
        match plant.fuel {
            FuelClass::Nuclear => row.nuclear_mw += plant.capacity_mw,
            FuelClass::Fossil(fuel) => {
                row.fossil_mw += plant.capacity_mw;
                row.breakdown.add(fuel, plant.capacity_mw);
            }
        }
    }
    row
}

/// Deterministic projection of the real records into the shared event shape.
/// No scheduling decisions are made here: every commission after the baseline
/// year becomes a build event and every decommission in range becomes a
/// closure event, in strict chronological order with running totals attached.
pub fn replay_historical(plants: &[Plant], start_year: i32, end_year: i32) -> Vec<ScenarioEvent> {
    let mut events: Vec<ScenarioEvent> = Vec::new();

    for plant in plants {
        let commission_year = plant.commissioned.year();
        if commission_year > start_year && commission_year <= end_year {
            let kind = match plant.fuel {
                FuelClass::Nuclear => EventKind::NuclearBuild {
                    mw_added: plant.capacity_mw,
                    fossil_capacity_closed_mw: 0.0,
                    dummy_capacity_closed_mw: 0.0,
                    fossil_sites_closed: Vec::new(),
                },
                FuelClass::Fossil(fuel) => EventKind::FossilBuild {
                    fuel,
                    mw_added: plant.capacity_mw,
                },
            };
            events.push(ScenarioEvent {
                date: plant.commissioned,
                year: commission_year,
                site: plant.site_key.clone(),
                name: plant.name.clone(),
                municipality: plant.municipality.clone(),
                kind,
                running_nuclear_mw: None,
                running_fossil_mw: None,
                running_total_mw: None,
            });
        }

        if let Some(decommissioned) = plant.decommissioned {
            let closure_year = decommissioned.year();
            if closure_year >= start_year && closure_year <= end_year {
                let kind = match plant.fuel {
                    FuelClass::Nuclear => EventKind::NuclearClosure {
                        mw_removed: plant.capacity_mw,
                    },
                    FuelClass::Fossil(fuel) => EventKind::FossilClosure {
                        fuel: Some(fuel),
                        mw_removed: plant.capacity_mw,
                        fossil_capacity_closed_mw: plant.capacity_mw,
                        dummy_capacity_closed_mw: 0.0,
                        residual_only: false,
                    },
                };
                events.push(ScenarioEvent {
                    date: decommissioned,
                    year: closure_year,
                    site: plant.site_key.clone(),
                    name: plant.name.clone(),
                    municipality: plant.municipality.clone(),
                    kind,
                    running_nuclear_mw: None,
                    running_fossil_mw: None,
                    running_total_mw: None,
                });
            }
        }
    }

    events.sort_by(|a, b| {
        (a.date, a.kind.wire_name(), &a.name, &a.site)
            .cmp(&(b.date, b.kind.wire_name(), &b.name, &b.site))
    });

    // Attach running totals by walking the sorted stream from the baseline.
    let baseline = baseline_fleet(plants, start_year);
    let mut nuclear_mw = baseline.nuclear_mw;
    let mut fossil_mw = baseline.fossil_mw;
    for event in &mut events {
        match &event.kind {
            EventKind::NuclearBuild { mw_added, .. } => nuclear_mw += mw_added,
            EventKind::FossilBuild { mw_added, .. } => fossil_mw += mw_added,
            EventKind::NuclearClosure { mw_removed } => nuclear_mw -= mw_removed,
            EventKind::FossilClosure { mw_removed, .. } => fossil_mw -= mw_removed,
        }
        event.running_nuclear_mw = Some(nuclear_mw);
        event.running_fossil_mw = Some(fossil_mw);
        event.running_total_mw = Some(nuclear_mw + fossil_mw);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plant::{FossilFuel, Protection};
    use chrono::NaiveDate;

    fn plant(id: usize, fuel: FuelClass, capacity: f64, commissioned: i32, decommissioned: Option<i32>) -> Plant {
        Plant {
            id,
            site_key: format!("Site{}", id),
            name: format!("Block {}", id),
            fuel,
            protection: Protection::None,
            capacity_mw: capacity,
            commissioned: NaiveDate::from_ymd_opt(commissioned, 7, 1).unwrap(),
            decommissioned: decommissioned.and_then(|y| NaiveDate::from_ymd_opt(y, 11, 1)),
            municipality: format!("Stadt{}", id),
        }
    }

    #[test]
    fn replay_projects_every_record_into_events() {
        let plants = vec![
            plant(0, FuelClass::Nuclear, 1200.0, 1985, Some(2011)),
            plant(1, FuelClass::Fossil(FossilFuel::HardCoal), 600.0, 1995, Some(2018)),
        ];
        let events = replay_historical(&plants, 1989, 2025);
        let kinds: Vec<_> = events.iter().map(|e| e.kind.wire_name()).collect();
        // Pre-baseline nuclear commission emits no build; everything else replays.
        assert_eq!(kinds, vec!["fossil_build", "nuclear_closure", "fossil_closure"]);
        assert_eq!(events[0].year, 1995);
        assert_eq!(events[1].year, 2011);
    }

    #[test]
    fn running_totals_reconcile_with_capacity_index() {
        let plants = vec![
            plant(0, FuelClass::Nuclear, 1200.0, 1985, Some(2011)),
            plant(1, FuelClass::Fossil(FossilFuel::HardCoal), 600.0, 1995, Some(2018)),
            plant(2, FuelClass::Fossil(FossilFuel::NaturalGas), 400.0, 1970, None),
        ];
        let index = build_capacity_index(&plants, 1989, 2025);
        let baseline = baseline_fleet(&plants, 1989);
        let events = replay_historical(&plants, 1989, 2025);

        for year in 1989..=2025 {
            let mut nuclear = baseline.nuclear_mw;
            let mut fossil = baseline.fossil_mw;
            for event in events.iter().filter(|e| e.year <= year) {
                match &event.kind {
                    EventKind::NuclearBuild { mw_added, .. } => nuclear += mw_added,
                    EventKind::FossilBuild { mw_added, .. } => fossil += mw_added,
                    EventKind::NuclearClosure { mw_removed } => nuclear -= mw_removed,
                    EventKind::FossilClosure { mw_removed, .. } => fossil -= mw_removed,
                }
            }
            let row = index.get(year);
            assert!((nuclear - row.nuclear_mw).abs() < 1e-9, "nuclear mismatch in {}", year);
            assert!((fossil - row.fossil_mw).abs() < 1e-9, "fossil mismatch in {}", year);
        }
    }

    #[test]
    fn breakdown_tracks_per_fuel_capacity() {
        let plants = vec![
            plant(0, FuelClass::Fossil(FossilFuel::HardCoal), 600.0, 1970, None),
            plant(1, FuelClass::Fossil(FossilFuel::Lignite), 300.0, 1975, Some(2000)),
        ];
        let index = build_capacity_index(&plants, 1989, 2005);
        assert!((index.get(1999).breakdown.lignite_mw - 300.0).abs() < 1e-9);
        assert!((index.get(2001).breakdown.lignite_mw).abs() < 1e-9);
        assert!((index.get(2001).breakdown.hard_coal_mw - 600.0).abs() < 1e-9);
    }
}
