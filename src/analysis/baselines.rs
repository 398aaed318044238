use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::config::constants::round_mw;
use crate::models::plant::{FuelClass, Plant};

/// Unit count and capacity of the fleet active at the start year, used by the
/// external rendering layer to seed its cumulative tallies before the
/// animated timeline begins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    pub count: u32,
    pub capacity_mw: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineSet {
    pub nuclear: BTreeMap<String, BaselineStats>,
    pub fossil: BTreeMap<String, BaselineStats>,
}

fn accumulate(set: &mut BaselineSet, fuel: FuelClass, key: String, capacity_mw: f64) {
    let bucket = match fuel {
        FuelClass::Nuclear => &mut set.nuclear,
        FuelClass::Fossil(_) => &mut set.fossil,
    };
    let stats = bucket.entry(key).or_default();
    stats.count += 1;
    stats.capacity_mw = round_mw(stats.capacity_mw + capacity_mw);
}

/// Baselines keyed by site.
pub fn site_baselines(plants: &[Plant], start_year: i32) -> BaselineSet {
    let mut set = BaselineSet::default();
    for plant in plants {
        if plant.commissioned.year() > start_year || !plant.operating_in(start_year) {
            continue;
        }
        accumulate(&mut set, plant.fuel, plant.site_key.clone(), plant.capacity_mw);
    }
    set
}

/// Baselines keyed by municipality; plants without one are left out.
pub fn municipality_baselines(plants: &[Plant], start_year: i32) -> BaselineSet {
    let mut set = BaselineSet::default();
    for plant in plants {
        if plant.commissioned.year() > start_year || !plant.operating_in(start_year) {
            continue;
        }
        let municipality = plant.municipality.trim();
        if municipality.is_empty() {
            continue;
        }
        accumulate(&mut set, plant.fuel, municipality.to_string(), plant.capacity_mw);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plant::{FossilFuel, Protection};
    use chrono::NaiveDate;

    fn plant(id: usize, site: &str, fuel: FuelClass, capacity: f64, commissioned: i32) -> Plant {
        Plant {
            id,
            site_key: site.to_string(),
            name: format!("{} Block {}", site, id),
            fuel,
            protection: Protection::None,
            capacity_mw: capacity,
            commissioned: NaiveDate::from_ymd_opt(commissioned, 7, 1).unwrap(),
            decommissioned: None,
            municipality: site.to_string(),
        }
    }

    #[test]
    fn only_the_start_year_fleet_is_counted() {
        let plants = vec![
            plant(0, "Biblis", FuelClass::Nuclear, 1167.0, 1974),
            plant(1, "Biblis", FuelClass::Nuclear, 1240.0, 1976),
            plant(2, "Neurath", FuelClass::Fossil(FossilFuel::Lignite), 600.0, 1972),
            plant(3, "Datteln", FuelClass::Fossil(FossilFuel::HardCoal), 1052.0, 2020),
        ];
        let set = site_baselines(&plants, 1989);
        assert_eq!(set.nuclear["Biblis"].count, 2);
        assert!((set.nuclear["Biblis"].capacity_mw - 2407.0).abs() < 1e-9);
        assert_eq!(set.fossil["Neurath"].count, 1);
        assert!(!set.fossil.contains_key("Datteln"));
    }
}
