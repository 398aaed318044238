use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::data::fossil_builds_loader::FossilBuildRow;
use crate::data::plants_loader::PlantRow;
use crate::error::EngineError;
use crate::models::plant::{detect_protection, FuelClass, Plant, Protection};
use crate::models::site::site_key;

/// Two source records plausibly describing one physical unit. The registry
/// keeps one deterministically; the discarded alternative is retained for
/// audit.
#[derive(Debug, Clone)]
pub struct DuplicateWarning {
    pub kept_id: usize,
    pub discarded: Plant,
}

/// Normalized in-memory entity set for one simulation run.
#[derive(Debug, Clone)]
pub struct PlantRegistry {
    pub plants: Vec<Plant>,
    pub warnings: Vec<DuplicateWarning>,
}

/// Accept full ISO dates or bare years. Year-only commissions resolve to
/// July 1 (mid-year), year-only decommissions to November 1 (fossil) or
/// November 15 (nuclear), matching the dates the source material synthesizes.
fn parse_flexible_date(
    raw: &str,
    fuel: FuelClass,
    is_decommission: bool,
) -> Result<Option<NaiveDate>, EngineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    // Bare years may arrive as "1975" or "1975.0" from spreadsheet exports.
    let year = trimmed
        .parse::<f64>()
        .ok()
        .filter(|y| y.fract() == 0.0 && *y >= 1800.0 && *y <= 2200.0)
        .map(|y| y as i32)
        .ok_or_else(|| EngineError::InvalidDate(trimmed.to_string()))?;
    let (month, day) = match (is_decommission, fuel) {
        (false, _) => (7, 1),
        (true, FuelClass::Nuclear) => (11, 15),
        (true, FuelClass::Fossil(_)) => (11, 1),
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| EngineError::InvalidDate(trimmed.to_string()))
}

fn validate(plant: &Plant) -> Result<(), EngineError> {
    if plant.capacity_mw <= 0.0 {
        return Err(EngineError::NonPositiveCapacity {
            name: plant.name.clone(),
            capacity_mw: plant.capacity_mw,
        });
    }
    if let Some(decommissioned) = plant.decommissioned {
        if plant.commissioned > decommissioned {
            return Err(EngineError::CommissionAfterDecommission {
                name: plant.name.clone(),
            });
        }
    }
    if plant.site_key.is_empty() {
        return Err(EngineError::UnresolvedSite(plant.name.clone()));
    }
    Ok(())
}

/// Field-population score used by the duplicate rule: the more complete
/// record wins.
fn completeness(plant: &Plant) -> u32 {
    let mut score = 0;
    if !plant.municipality.trim().is_empty() {
        score += 1;
    }
    if plant.decommissioned.is_some() {
        score += 1;
    }
    if plant.protection != Protection::None {
        score += 1;
    }
    score
}

fn operating_ranges_overlap(a: &Plant, b: &Plant) -> bool {
    let a_end = a.decommissioned.unwrap_or(NaiveDate::MAX);
    let b_end = b.decommissioned.unwrap_or(NaiveDate::MAX);
    a.commissioned <= b_end && b.commissioned <= a_end
}

impl PlantRegistry {
    /// Normalize the raw plant table and the fossil-construction history into
    /// one uniform plant set. Fossil-construction rows become ordinary plants
    /// with no decommission date, so the historical replay can treat both
    /// tables through a single schema.
    pub fn load(
        plant_rows: &[PlantRow],
        fossil_build_rows: &[FossilBuildRow],
    ) -> Result<Self, EngineError> {
        let mut plants: Vec<Plant> = Vec::new();
        let mut next_id = 0usize;

        for row in plant_rows {
            let fuel = match FuelClass::from_str(&row.fuel_class) {
                Ok(fuel) => fuel,
                Err(_) => {
                    // The plant table also carries fuels outside the modeled
                    // nuclear/fossil classes (hydro, wind); those rows are not
                    // part of either scenario's fleet.
                    debug!(fuel = %row.fuel_class, name = %row.name, "skipping unmodeled fuel class");
                    continue;
                }
            };
            let protection = if row.protected_flag.trim().is_empty() {
                detect_protection(&row.name, &row.technology)
            } else {
                Protection::from_str(&row.protected_flag)
                    .map_err(EngineError::InvalidConfig)?
            };
            let commissioned = parse_flexible_date(&row.commission_date, fuel, false)?
                .ok_or_else(|| EngineError::InvalidDate(format!("missing commission date for '{}'", row.name)))?;
            let decommissioned = parse_flexible_date(&row.decommission_date, fuel, true)?;
            let key = if row.site.trim().is_empty() {
                site_key(&row.name, &row.municipality)
            } else {
                site_key(&row.site, &row.municipality)
            };
            let plant = Plant {
                id: next_id,
                site_key: key,
                name: row.name.trim().to_string(),
                fuel,
                protection,
                capacity_mw: row.capacity_mw,
                commissioned,
                decommissioned,
                municipality: row.municipality.trim().to_string(),
            };
            validate(&plant)?;
            plants.push(plant);
            next_id += 1;
        }

        for row in fossil_build_rows {
            let fuel = FuelClass::Fossil(
                row.fuel
                    .parse()
                    .map_err(|_| EngineError::InvalidConfig(format!(
                        "unknown fuel '{}' in fossil construction table",
                        row.fuel
                    )))?,
            );
            let commissioned = parse_flexible_date(&row.commission_date, fuel, false)?
                .ok_or_else(|| EngineError::InvalidDate(format!("missing commission date for '{}'", row.name)))?;
            let key = if row.site.trim().is_empty() {
                site_key(&row.name, &row.municipality)
            } else {
                site_key(&row.site, &row.municipality)
            };
            let plant = Plant {
                id: next_id,
                site_key: key,
                name: row.name.trim().to_string(),
                fuel,
                protection: detect_protection(&row.name, ""),
                capacity_mw: row.capacity_mw,
                commissioned,
                decommissioned: None,
                municipality: row.municipality.trim().to_string(),
            };
            validate(&plant)?;
            plants.push(plant);
            next_id += 1;
        }

        let (plants, warnings) = dedup(plants);
        for warning in &warnings {
            warn!(
                kept = warning.kept_id,
                discarded = %warning.discarded.name,
                site = %warning.discarded.site_key,
                "ambiguous duplicate plant record, keeping the more complete one"
            );
        }
        Ok(PlantRegistry { plants, warnings })
    }
}

/// Duplicate rule: two records are merged when they share site key, fuel
/// class and normalized name, and their operating ranges overlap. The more
/// complete record is kept; ties go to the larger capacity, then to the
/// record seen first. This is deliberate and documented, not silent.
fn dedup(plants: Vec<Plant>) -> (Vec<Plant>, Vec<DuplicateWarning>) {
    let mut kept: Vec<Plant> = Vec::with_capacity(plants.len());
    let mut warnings = Vec::new();

    for plant in plants {
        let existing = kept.iter().position(|p| {
            p.site_key == plant.site_key
                && p.fuel == plant.fuel
                && p.name.eq_ignore_ascii_case(&plant.name)
                && operating_ranges_overlap(p, &plant)
        });
        match existing {
            Some(index) => {
                let previous = &mut kept[index];
                let keep_new = (completeness(&plant), plant.capacity_mw)
                    > (completeness(previous), previous.capacity_mw);
                if keep_new {
                    let discarded = std::mem::replace(previous, plant);
                    warnings.push(DuplicateWarning { kept_id: previous.id, discarded });
                } else {
                    warnings.push(DuplicateWarning { kept_id: previous.id, discarded: plant });
                }
            }
            None => kept.push(plant),
        }
    }

    // Downstream lookups index the plant vec by id, so ids must equal vec
    // positions again after merged records drop out.
    let mut new_ids: BTreeMap<usize, usize> = BTreeMap::new();
    for (index, plant) in kept.iter_mut().enumerate() {
        new_ids.insert(plant.id, index);
        plant.id = index;
    }
    for warning in &mut warnings {
        if let Some(&id) = new_ids.get(&warning.kept_id) {
            warning.kept_id = id;
        }
    }
    (kept, warnings)
}
