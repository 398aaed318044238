use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::analysis::aggregate::EmissionsRecord;
use crate::analysis::baselines::BaselineSet;
use crate::config::constants::round_mw;
use crate::config::scenario_config::ScenarioConfig;
use crate::core::engine::{CapacityRow, EngineOutput};
use crate::models::event::{EventKind, ScenarioEvent};

/// The committed output contract. The rendering layer indexes by year and by
/// the `event_type` strings exactly as serialized here.
#[derive(Debug, Serialize)]
pub struct ScenarioDocument {
    pub metadata: Metadata,
    pub historical: ScenarioSection,
    pub counterfactual: ScenarioSection,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub start_year: i32,
    pub end_year: i32,
    pub notes: Vec<String>,
    pub site_baselines: BaselineSet,
    pub municipality_baselines: BaselineSet,
}

#[derive(Debug, Serialize)]
pub struct ScenarioSection {
    pub capacity_timeseries: Vec<CapacityRowOut>,
    pub emissions: Vec<EmissionsRecord>,
    pub events: Vec<EventRow>,
}

#[derive(Debug, Serialize)]
pub struct CapacityRowOut {
    pub year: i32,
    pub nuclear_mw: f64,
    pub fossil_mw: f64,
    pub total_mw: f64,
    pub fossil_hard_coal_mw: f64,
    pub fossil_lignite_mw: f64,
    pub fossil_natural_gas_mw: f64,
    pub fossil_oil_mw: f64,
}

#[derive(Debug, Serialize)]
pub struct EventRow {
    pub date: String,
    pub year: i32,
    pub event_type: &'static str,
    pub site: String,
    pub name: String,
    pub municipality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mw_added: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mw_removed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fossil_capacity_closed_mw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dummy_capacity_closed_mw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fossil_sites_closed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_nuclear_mw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_fossil_mw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_total_mw: Option<f64>,
}

fn event_row(event: &ScenarioEvent) -> EventRow {
    let mut row = EventRow {
        date: event.date.format("%Y-%m-%d").to_string(),
        year: event.year,
        event_type: event.kind.wire_name(),
        site: event.site.clone(),
        name: event.name.clone(),
        municipality: event.municipality.clone(),
        fuel: None,
        mw_added: None,
        mw_removed: None,
        fossil_capacity_closed_mw: None,
        dummy_capacity_closed_mw: None,
        residual_only: None,
        fossil_sites_closed: None,
        running_nuclear_mw: event.running_nuclear_mw.map(round_mw),
        running_fossil_mw: event.running_fossil_mw.map(round_mw),
        running_total_mw: event.running_total_mw.map(round_mw),
    };
    match &event.kind {
        EventKind::NuclearBuild {
            mw_added,
            fossil_capacity_closed_mw,
            dummy_capacity_closed_mw,
            fossil_sites_closed,
        } => {
            row.mw_added = Some(round_mw(*mw_added));
            row.fossil_capacity_closed_mw = Some(round_mw(*fossil_capacity_closed_mw));
            row.dummy_capacity_closed_mw = Some(round_mw(*dummy_capacity_closed_mw));
            row.fossil_sites_closed = Some(fossil_sites_closed.clone());
        }
        EventKind::FossilBuild { fuel, mw_added } => {
            row.fuel = Some(fuel.to_string());
            row.mw_added = Some(round_mw(*mw_added));
        }
        EventKind::NuclearClosure { mw_removed } => {
            row.mw_removed = Some(round_mw(*mw_removed));
        }
        EventKind::FossilClosure {
            fuel,
            mw_removed,
            fossil_capacity_closed_mw,
            dummy_capacity_closed_mw,
            residual_only,
        } => {
            row.fuel = fuel.map(|f| f.to_string());
            row.mw_removed = Some(round_mw(*mw_removed));
            row.fossil_capacity_closed_mw = Some(round_mw(*fossil_capacity_closed_mw));
            row.dummy_capacity_closed_mw = Some(round_mw(*dummy_capacity_closed_mw));
            row.residual_only = Some(*residual_only);
        }
    }
    row
}

fn capacity_row(row: &CapacityRow) -> CapacityRowOut {
    CapacityRowOut {
        year: row.year,
        nuclear_mw: round_mw(row.nuclear_mw),
        fossil_mw: round_mw(row.fossil_mw),
        total_mw: round_mw(row.nuclear_mw + row.fossil_mw),
        fossil_hard_coal_mw: round_mw(row.breakdown.hard_coal_mw),
        fossil_lignite_mw: round_mw(row.breakdown.lignite_mw),
        fossil_natural_gas_mw: round_mw(row.breakdown.natural_gas_mw),
        fossil_oil_mw: round_mw(row.breakdown.oil_mw),
    }
}

pub fn build_document(
    config: &ScenarioConfig,
    output: &EngineOutput,
    historical_emissions: Vec<EmissionsRecord>,
    counterfactual_emissions: Vec<EmissionsRecord>,
    site_baselines: BaselineSet,
    municipality_baselines: BaselineSet,
) -> ScenarioDocument {
    ScenarioDocument {
        metadata: Metadata {
            start_year: config.start_year,
            end_year: config.end_year,
            notes: vec![
                "Counterfactual nuclear units use the 1980s Konvoi reactor size.".to_string(),
                "Fossil closures retire the oldest non-CHP plants still online each year.".to_string(),
                "Site matching is by normalized municipality string, not geographic distance.".to_string(),
                "Emission factors are approximate tonnes CO2 per MWh for each fuel group.".to_string(),
            ],
            site_baselines,
            municipality_baselines,
        },
        historical: ScenarioSection {
            capacity_timeseries: output.historical.timeseries.iter().map(capacity_row).collect(),
            emissions: historical_emissions,
            events: output.historical.events.iter().map(event_row).collect(),
        },
        counterfactual: ScenarioSection {
            capacity_timeseries: output.counterfactual.timeseries.iter().map(capacity_row).collect(),
            emissions: counterfactual_emissions,
            events: output.counterfactual.events.iter().map(event_row).collect(),
        },
    }
}

/// Serialize fully in memory, then write through a temp file and rename, so a
/// failed run never leaves a partial or corrupt document behind.
pub fn write_document(document: &ScenarioDocument, path: &Path) -> anyhow::Result<()> {
    let payload = serde_json::to_string_pretty(document).context("serializing scenario document")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &payload)
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
