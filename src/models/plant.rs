use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::config::constants::{COGENERATION_NAME_PATTERNS, HEATING_NAME_PATTERNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FossilFuel {
    HardCoal,
    Lignite,
    NaturalGas,
    Oil,
}

impl FossilFuel {
    pub const ALL: [FossilFuel; 4] = [
        FossilFuel::HardCoal,
        FossilFuel::Lignite,
        FossilFuel::NaturalGas,
        FossilFuel::Oil,
    ];
}

lazy_static! {
    static ref FUEL_ALIASES: HashMap<&'static str, FossilFuel> = {
        let mut m = HashMap::new();
        m.insert("coal", FossilFuel::HardCoal);
        m.insert("hard coal", FossilFuel::HardCoal);
        m.insert("hard_coal", FossilFuel::HardCoal);
        m.insert("lignite", FossilFuel::Lignite);
        m.insert("brown coal", FossilFuel::Lignite);
        m.insert("gas", FossilFuel::NaturalGas);
        m.insert("natural gas", FossilFuel::NaturalGas);
        m.insert("natural_gas", FossilFuel::NaturalGas);
        m.insert("oil", FossilFuel::Oil);
        m
    };
}

impl FromStr for FossilFuel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FUEL_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| format!("Unknown fossil fuel: {}", s))
    }
}

impl fmt::Display for FossilFuel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FossilFuel::HardCoal => write!(f, "hard_coal"),
            FossilFuel::Lignite => write!(f, "lignite"),
            FossilFuel::NaturalGas => write!(f, "natural_gas"),
            FossilFuel::Oil => write!(f, "oil"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelClass {
    Nuclear,
    Fossil(FossilFuel),
}

impl FuelClass {
    pub fn is_nuclear(&self) -> bool {
        matches!(self, FuelClass::Nuclear)
    }

    pub fn is_fossil(&self) -> bool {
        matches!(self, FuelClass::Fossil(_))
    }
}

impl FromStr for FuelClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("nuclear") {
            return Ok(FuelClass::Nuclear);
        }
        FossilFuel::from_str(s).map(FuelClass::Fossil)
    }
}

/// Protected plant classes are never named by the counterfactual closure
/// selector; only the anonymous residual bucket may draw on their capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protection {
    None,
    Cogeneration,
    Heating,
}

impl Protection {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Protection::None)
    }
}

impl FromStr for Protection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "false" | "0" => Ok(Protection::None),
            "cogeneration" | "chp" | "kwk" => Ok(Protection::Cogeneration),
            "heating" | "district_heating" => Ok(Protection::Heating),
            other => Err(format!("Unknown protection flag: {}", other)),
        }
    }
}

/// Fallback classification for records without an explicit protected flag.
/// District-heating and cogeneration plants are identified by the name
/// patterns German operators actually use (HKW, Heizkraftwerk, Fernwärme, KWK).
pub fn detect_protection(name: &str, technology: &str) -> Protection {
    let blob = format!("{} {}", name, technology).to_lowercase();
    if HEATING_NAME_PATTERNS.iter().any(|p| blob.contains(p)) {
        return Protection::Heating;
    }
    if COGENERATION_NAME_PATTERNS.iter().any(|p| blob.contains(p)) {
        return Protection::Cogeneration;
    }
    Protection::None
}

/// A single generation unit, normalized from the raw plant table or the
/// fossil-construction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: usize,
    pub site_key: String,
    pub name: String,
    pub fuel: FuelClass,
    pub protection: Protection,
    pub capacity_mw: f64,
    pub commissioned: NaiveDate,
    /// None means the unit is still operating at dataset end.
    pub decommissioned: Option<NaiveDate>,
    pub municipality: String,
}

impl Plant {
    /// Whether the unit is on the grid at the end of `year` according to the
    /// real records.
    pub fn operating_at_end_of(&self, year: i32) -> bool {
        self.commissioned.year() <= year
            && self.decommissioned.map_or(true, |d| d.year() > year)
    }

    /// Whether the unit is on the grid at any point during `year`.
    pub fn operating_in(&self, year: i32) -> bool {
        self.commissioned.year() <= year
            && self.decommissioned.map_or(true, |d| d.year() >= year)
    }

    pub fn is_protected(&self) -> bool {
        self.protection.is_protected()
    }

    /// Display label used in event names, "Name (Municipality)" when the
    /// municipality is known.
    pub fn descriptor(&self) -> String {
        let municipality = self.municipality.trim();
        if municipality.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, municipality)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_class_parses_aliases() {
        assert_eq!("nuclear".parse::<FuelClass>().unwrap(), FuelClass::Nuclear);
        assert_eq!(
            "Hard Coal".parse::<FuelClass>().unwrap(),
            FuelClass::Fossil(FossilFuel::HardCoal)
        );
        assert_eq!(
            "natural gas".parse::<FuelClass>().unwrap(),
            FuelClass::Fossil(FossilFuel::NaturalGas)
        );
        assert!("hydro".parse::<FuelClass>().is_err());
    }

    #[test]
    fn protection_detected_from_name_patterns() {
        assert_eq!(detect_protection("HKW Berlin-Mitte", "steam"), Protection::Heating);
        assert_eq!(detect_protection("Fernwärme Nord", ""), Protection::Heating);
        assert_eq!(detect_protection("GuD Leipzig KWK", "ccgt"), Protection::Cogeneration);
        assert_eq!(detect_protection("Kraftwerk Staudinger", "steam"), Protection::None);
    }

    #[test]
    fn operating_window_respects_decommission_year() {
        let plant = Plant {
            id: 0,
            site_key: "Biblis".to_string(),
            name: "Biblis A".to_string(),
            fuel: FuelClass::Nuclear,
            protection: Protection::None,
            capacity_mw: 1167.0,
            commissioned: NaiveDate::from_ymd_opt(1974, 8, 26).unwrap(),
            decommissioned: NaiveDate::from_ymd_opt(2011, 8, 6),
            municipality: "Biblis".to_string(),
        };
        assert!(plant.operating_in(1974));
        assert!(plant.operating_in(2011));
        assert!(!plant.operating_at_end_of(2011));
        assert!(!plant.operating_in(2012));
        assert!(!plant.operating_in(1973));
    }
}
