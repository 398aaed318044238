use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::constants::*;
use crate::config::scenario_config::ScenarioConfig;
use crate::core::engine::CapacityRow;
use crate::data::generation_loader::{GenerationSource, GenerationTable, GenerationYear};

/// Where an annual record's generation figures come from. Published rows use
/// the external generation-by-source table; estimated rows are derived from
/// capacity via the configured capacity factors. Never blended silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "published")]
    Published,
    #[serde(rename = "estimated")]
    Estimated,
}

/// One (scenario, year) row of generation and emissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsRecord {
    pub year: i32,
    pub co2_mt: f64,
    pub clean_twh: f64,
    pub nuclear_twh: f64,
    pub renewables_twh: f64,
    pub fossil_twh: f64,
    pub total_twh: f64,
    pub data_source: DataSource,
}

fn published_record(year: i32, generation: &GenerationYear) -> EmissionsRecord {
    let nuclear_twh = generation.get(GenerationSource::Nuclear);
    let renewables_twh = generation.renewables_twh();
    let fossil_twh = generation.fossil_twh();
    EmissionsRecord {
        year,
        co2_mt: round_twh(generation.co2_mt()),
        clean_twh: round_twh(nuclear_twh + renewables_twh),
        nuclear_twh: round_twh(nuclear_twh),
        renewables_twh: round_twh(renewables_twh),
        fossil_twh: round_twh(fossil_twh),
        total_twh: round_twh(fossil_twh + nuclear_twh + renewables_twh),
        data_source: DataSource::Published,
    }
}

/// Walks both scenarios' capacity series and converts to annual generation
/// and CO2. Historical years use the published figures directly; the
/// counterfactual is estimated from the capacity actually built and retired.
pub fn aggregate(
    config: &ScenarioConfig,
    historical_ts: &[CapacityRow],
    counterfactual_ts: &[CapacityRow],
    generation: &GenerationTable,
) -> (Vec<EmissionsRecord>, Vec<EmissionsRecord>) {
    let generation = generation.extended_to_range(config.start_year, config.end_year);
    let hist_by_year: BTreeMap<i32, &CapacityRow> =
        historical_ts.iter().map(|r| (r.year, r)).collect();
    let cf_by_year: BTreeMap<i32, &CapacityRow> =
        counterfactual_ts.iter().map(|r| (r.year, r)).collect();

    let empty = GenerationYear::default();
    let baseline_gen = generation.get(config.start_year).unwrap_or(&empty);
    let baseline_nuclear_twh = baseline_gen.get(GenerationSource::Nuclear);
    let frozen_renewables_twh = generation
        .get(config.renewable_freeze_year)
        .unwrap_or(baseline_gen)
        .renewables_twh();

    let mut historical_records = Vec::new();
    let mut counterfactual_records = Vec::new();
    let mut prev_cf_nuclear_twh = baseline_nuclear_twh;

    for (&year, published) in &generation.years {
        let historical_record = published_record(year, published);

        let (hist_row, cf_row) = match (hist_by_year.get(&year), cf_by_year.get(&year)) {
            (Some(h), Some(c)) => (*h, *c),
            // No capacity row means the year is outside the simulated range.
            _ => continue,
        };

        // Nuclear output the extra counterfactual capacity could deliver,
        // assumed never to regress once reached.
        let extra_capacity_mw = (cf_row.nuclear_mw - hist_row.nuclear_mw).max(0.0);
        let potential_extra_twh = if year <= config.start_year {
            0.0
        } else {
            extra_capacity_mw * HOURS_PER_YEAR * config.nuclear_capacity_factor / 1_000_000.0
        };
        let cf_nuclear_twh = prev_cf_nuclear_twh.max(baseline_nuclear_twh + potential_extra_twh);
        prev_cf_nuclear_twh = cf_nuclear_twh;

        // Renewables build-out is frozen once nuclear covers the clean share.
        let cf_renewables_twh = if year < config.renewable_freeze_year {
            published.renewables_twh()
        } else {
            frozen_renewables_twh
        };

        let required_total_twh = published.total_twh();
        let mut cf_fossil_twh = (required_total_twh - cf_nuclear_twh - cf_renewables_twh).max(0.0);

        // Split the remaining fossil generation across fuels by scaling the
        // published output with the capacity actually left, then renormalize.
        let coal_hist_cap = hist_row.breakdown.hard_coal_mw + hist_row.breakdown.lignite_mw;
        let coal_cf_cap = cf_row.breakdown.hard_coal_mw + cf_row.breakdown.lignite_mw;
        let gas_hist_cap = hist_row.breakdown.natural_gas_mw;
        let gas_cf_cap = cf_row.breakdown.natural_gas_mw;
        let oil_hist_cap = hist_row.breakdown.oil_mw;
        let oil_cf_cap = cf_row.breakdown.oil_mw;

        let ratio = |cf_cap: f64, hist_cap: f64| if hist_cap > 0.0 { cf_cap / hist_cap } else { 0.0 };
        let mut coal_twh = published.get(GenerationSource::Coal) * ratio(coal_cf_cap, coal_hist_cap);
        let mut gas_twh = published.get(GenerationSource::Gas) * ratio(gas_cf_cap, gas_hist_cap);
        let mut oil_twh = published.get(GenerationSource::Oil) * ratio(oil_cf_cap, oil_hist_cap);

        let scaled_total = coal_twh + gas_twh + oil_twh;
        if cf_fossil_twh > 0.0 && scaled_total > 0.0 {
            let adjust = cf_fossil_twh / scaled_total;
            coal_twh *= adjust;
            gas_twh *= adjust;
            oil_twh *= adjust;
        } else if cf_fossil_twh > 0.0 {
            let cap_total = coal_cf_cap + gas_cf_cap + oil_cf_cap;
            if cap_total > 0.0 {
                coal_twh = cf_fossil_twh * coal_cf_cap / cap_total;
                gas_twh = cf_fossil_twh * gas_cf_cap / cap_total;
                oil_twh = cf_fossil_twh * oil_cf_cap / cap_total;
            } else {
                coal_twh = 0.0;
                gas_twh = 0.0;
                oil_twh = 0.0;
                cf_fossil_twh = 0.0;
            }
        } else {
            coal_twh = 0.0;
            gas_twh = 0.0;
            oil_twh = 0.0;
            cf_fossil_twh = 0.0;
        }

        let cf_co2_mt = cf_nuclear_twh * NUCLEAR_EMISSIONS_T_PER_MWH
            + coal_twh * COAL_EMISSIONS_T_PER_MWH
            + gas_twh * GAS_EMISSIONS_T_PER_MWH
            + oil_twh * OIL_EMISSIONS_T_PER_MWH;

        let counterfactual_record = if year <= config.start_year {
            // Before the build-out begins the scenarios are identical.
            historical_record.clone()
        } else {
            EmissionsRecord {
                year,
                co2_mt: round_twh(cf_co2_mt),
                clean_twh: round_twh(cf_nuclear_twh + cf_renewables_twh),
                nuclear_twh: round_twh(cf_nuclear_twh),
                renewables_twh: round_twh(cf_renewables_twh),
                fossil_twh: round_twh(cf_fossil_twh),
                total_twh: round_twh(cf_nuclear_twh + cf_renewables_twh + cf_fossil_twh),
                data_source: DataSource::Estimated,
            }
        };

        historical_records.push(historical_record);
        counterfactual_records.push(counterfactual_record);
    }

    (historical_records, counterfactual_records)
}
