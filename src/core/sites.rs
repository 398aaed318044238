use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;

use crate::models::plant::Plant;
use crate::models::site::Site;

/// Site-level lookup over the normalized plant set. Sites are grouped by the
/// string key derived in `models::site`; matching is exact normalized-string
/// equality, not geographic distance.
#[derive(Debug)]
pub struct SiteResolver<'a> {
    plants: &'a [Plant],
    pub by_site: BTreeMap<String, Site>,
    pub by_municipality: BTreeMap<String, Vec<String>>,
}

impl<'a> SiteResolver<'a> {
    pub fn index(plants: &'a [Plant]) -> Self {
        let mut by_site: BTreeMap<String, Site> = BTreeMap::new();
        for plant in plants {
            let site = by_site.entry(plant.site_key.clone()).or_insert_with(|| Site {
                key: plant.site_key.clone(),
                label: plant.site_key.clone(),
                municipality: plant.municipality.clone(),
                plant_ids: Vec::new(),
            });
            if site.municipality.is_empty() && !plant.municipality.is_empty() {
                site.municipality = plant.municipality.clone();
            }
            site.plant_ids.push(plant.id);
        }
        for site in by_site.values_mut() {
            site.plant_ids
                .sort_by_key(|&id| (plants[id].commissioned, id));
        }

        let mut by_municipality: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for site in by_site.values() {
            if !site.municipality.is_empty() {
                by_municipality
                    .entry(site.municipality.clone())
                    .or_default()
                    .push(site.key.clone());
            }
        }

        SiteResolver { plants, by_site, by_municipality }
    }

    pub fn plant(&self, id: usize) -> &Plant {
        &self.plants[id]
    }

    /// Sites with at least one nuclear unit commissioned and not yet
    /// decommissioned at the end of `year`, per the real records.
    pub fn nuclear_sites_open_at(&self, year: i32) -> Vec<&Site> {
        self.by_site
            .values()
            .filter(|site| {
                site.plant_ids.iter().any(|&id| {
                    let p = &self.plants[id];
                    p.fuel.is_nuclear() && p.operating_at_end_of(year)
                })
            })
            .collect()
    }

    /// Fossil sites whose location can host a new nuclear unit in `year`:
    /// every unit present in the counterfactual fleet is either really
    /// decommissioned by `year` or already retired by the closure selector.
    /// Units commissioned after `baseline_year` never exist in the
    /// counterfactual (fossil construction is forbidden there) and do not
    /// block reuse. Returns `(earliest_reuse_year, site)` sorted by reuse
    /// year, then site key.
    pub fn fossil_sites_eligible_for_reuse(
        &self,
        year: i32,
        baseline_year: i32,
        closed: &BTreeSet<usize>,
    ) -> Vec<(i32, &Site)> {
        let mut eligible = Vec::new();
        'sites: for site in self.by_site.values() {
            let mut reuse_year = i32::MIN;
            let mut fossil_units = 0usize;
            for &id in &site.plant_ids {
                let p = &self.plants[id];
                if p.fuel.is_nuclear() {
                    continue 'sites;
                }
                if p.commissioned.year() > baseline_year {
                    continue;
                }
                fossil_units += 1;
                let unit_gone_at = match p.decommissioned {
                    Some(d) if d.year() <= year => d.year(),
                    _ if closed.contains(&id) => year,
                    _ => continue 'sites,
                };
                reuse_year = reuse_year.max(unit_gone_at);
            }
            if fossil_units > 0 {
                eligible.push((reuse_year, site));
            }
        }
        eligible.sort_by(|a, b| (a.0, &a.1.key).cmp(&(b.0, &b.1.key)));
        eligible
    }
}
