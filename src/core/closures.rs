use std::collections::BTreeSet;

use chrono::Datelike;

use crate::config::constants::MW_EPSILON;
use crate::models::plant::Plant;

/// Outcome of one equalization step: whole units to retire plus the residual
/// capacity the named units could not cover.
#[derive(Debug, Clone)]
pub struct ClosurePick {
    pub plant_ids: Vec<usize>,
    pub named_mw: f64,
    pub residual_mw: f64,
}

/// Selects fossil retirements under the capacity-equalization policy.
/// Cogeneration and district-heating units are excluded outright; the
/// candidate pool is the baseline fleet, oldest commission first, ties broken
/// by smallest capacity to avoid single-year capacity cliffs.
#[derive(Debug)]
pub struct ClosureSelector {
    /// Candidate plant ids in fixed selection order.
    candidates: Vec<usize>,
}

impl ClosureSelector {
    pub fn new(plants: &[Plant], baseline_year: i32) -> Self {
        let mut candidates: Vec<usize> = plants
            .iter()
            .filter(|p| {
                p.fuel.is_fossil()
                    && !p.is_protected()
                    && p.commissioned.year() <= baseline_year
            })
            .map(|p| p.id)
            .collect();
        candidates.sort_by(|&a, &b| {
            let pa = &plants[a];
            let pb = &plants[b];
            pa.commissioned
                .cmp(&pb.commissioned)
                .then(pa.capacity_mw.partial_cmp(&pb.capacity_mw).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.cmp(&b))
        });
        ClosureSelector { candidates }
    }

    /// Close whole units up to `target_mw`. A unit larger than the remaining
    /// target is skipped rather than overshooting; whatever the named units
    /// cannot cover is returned as the residual component.
    pub fn select(
        &self,
        plants: &[Plant],
        target_mw: f64,
        closed: &BTreeSet<usize>,
    ) -> ClosurePick {
        let mut picked = Vec::new();
        let mut named_mw = 0.0;
        if target_mw > MW_EPSILON {
            for &id in &self.candidates {
                let remaining = target_mw - named_mw;
                if remaining <= MW_EPSILON {
                    break;
                }
                if closed.contains(&id) {
                    continue;
                }
                let plant = &plants[id];
                if plant.capacity_mw > remaining + MW_EPSILON {
                    continue;
                }
                picked.push(id);
                named_mw += plant.capacity_mw;
            }
        }
        let residual_mw = (target_mw - named_mw).max(0.0);
        ClosurePick { plant_ids: picked, named_mw, residual_mw }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plant::{FossilFuel, FuelClass, Plant, Protection};
    use chrono::NaiveDate;

    fn plant(id: usize, capacity: f64, year: i32, protection: Protection) -> Plant {
        Plant {
            id,
            site_key: format!("Site{}", id),
            name: format!("Block {}", id),
            fuel: FuelClass::Fossil(FossilFuel::HardCoal),
            protection,
            capacity_mw: capacity,
            commissioned: NaiveDate::from_ymd_opt(year, 7, 1).unwrap(),
            decommissioned: None,
            municipality: format!("Stadt{}", id),
        }
    }

    #[test]
    fn oldest_units_close_first_with_capacity_tiebreak() {
        let plants = vec![
            plant(0, 300.0, 1975, Protection::None),
            plant(1, 100.0, 1960, Protection::None),
            plant(2, 50.0, 1960, Protection::None),
        ];
        let selector = ClosureSelector::new(&plants, 1989);
        let pick = selector.select(&plants, 160.0, &BTreeSet::new());
        // 1960 units first, smaller one before larger.
        assert_eq!(pick.plant_ids, vec![2, 1]);
        assert!((pick.named_mw - 150.0).abs() < 1e-9);
        assert!((pick.residual_mw - 10.0).abs() < 1e-9);
    }

    #[test]
    fn protected_units_are_never_candidates() {
        let plants = vec![
            plant(0, 100.0, 1960, Protection::Heating),
            plant(1, 100.0, 1970, Protection::Cogeneration),
            plant(2, 100.0, 1980, Protection::None),
        ];
        let selector = ClosureSelector::new(&plants, 1989);
        let pick = selector.select(&plants, 300.0, &BTreeSet::new());
        assert_eq!(pick.plant_ids, vec![2]);
        assert!((pick.residual_mw - 200.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_units_are_skipped_not_overshot() {
        let plants = vec![plant(0, 500.0, 1960, Protection::None)];
        let selector = ClosureSelector::new(&plants, 1989);
        let pick = selector.select(&plants, 200.0, &BTreeSet::new());
        assert!(pick.plant_ids.is_empty());
        assert!((pick.residual_mw - 200.0).abs() < 1e-9);
    }

    #[test]
    fn already_closed_units_are_not_reselected() {
        let plants = vec![
            plant(0, 100.0, 1960, Protection::None),
            plant(1, 100.0, 1965, Protection::None),
        ];
        let selector = ClosureSelector::new(&plants, 1989);
        let mut closed = BTreeSet::new();
        closed.insert(0);
        let pick = selector.select(&plants, 100.0, &closed);
        assert_eq!(pick.plant_ids, vec![1]);
    }

    #[test]
    fn post_baseline_plants_are_outside_the_pool() {
        let plants = vec![plant(0, 100.0, 1995, Protection::None)];
        let selector = ClosureSelector::new(&plants, 1989);
        let pick = selector.select(&plants, 100.0, &BTreeSet::new());
        assert!(pick.plant_ids.is_empty());
    }
}
