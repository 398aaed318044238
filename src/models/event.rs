use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::plant::FossilFuel;

/// Payload of an atomic, dated capacity change. Consumers match on this
/// exhaustively; the wire strings in the output document come from
/// [`EventKind::wire_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    NuclearBuild {
        mw_added: f64,
        /// Fossil capacity retired in the same step under capacity equalization,
        /// including any residual component.
        fossil_capacity_closed_mw: f64,
        dummy_capacity_closed_mw: f64,
        fossil_sites_closed: Vec<String>,
    },
    FossilBuild {
        fuel: FossilFuel,
        mw_added: f64,
    },
    NuclearClosure {
        mw_removed: f64,
    },
    FossilClosure {
        /// None only for the residual bucket, which never names a unit.
        fuel: Option<FossilFuel>,
        mw_removed: f64,
        fossil_capacity_closed_mw: f64,
        dummy_capacity_closed_mw: f64,
        residual_only: bool,
    },
}

impl EventKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventKind::NuclearBuild { .. } => "nuclear_build",
            EventKind::FossilBuild { .. } => "fossil_build",
            EventKind::NuclearClosure { .. } => "nuclear_closure",
            EventKind::FossilClosure { .. } => "fossil_closure",
        }
    }

    pub fn is_build(&self) -> bool {
        matches!(self, EventKind::NuclearBuild { .. } | EventKind::FossilBuild { .. })
    }
}

/// One auditable change to a scenario's fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEvent {
    pub date: NaiveDate,
    pub year: i32,
    pub site: String,
    pub name: String,
    pub municipality: String,
    pub kind: EventKind,
    /// Running totals after the event was applied.
    pub running_nuclear_mw: Option<f64>,
    pub running_fossil_mw: Option<f64>,
    pub running_total_mw: Option<f64>,
}
