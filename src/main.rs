use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use atomstrom::analysis::aggregate::aggregate;
use atomstrom::analysis::baselines::{municipality_baselines, site_baselines};
use atomstrom::cli::cli::Args;
use atomstrom::config::constants::DEFAULT_RENEWABLE_FREEZE_YEAR;
use atomstrom::config::constants::NUCLEAR_CAPACITY_FACTOR;
use atomstrom::data::fossil_builds_loader::load_fossil_builds;
use atomstrom::data::generation_loader::load_generation;
use atomstrom::data::plants_loader::load_plants;
use atomstrom::output::document::{build_document, write_document};
use atomstrom::utils::logging::init_logging;
use atomstrom::{PlantRegistry, ScenarioConfig, ScenarioEngine};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose());

    let config = ScenarioConfig {
        start_year: args.start_year(),
        end_year: args.end_year(),
        build_start_year: args.build_start_year(),
        build_rate_units_per_year: args.build_rate(),
        unit_size_mw: args.unit_size_mw(),
        nuclear_capacity_factor: NUCLEAR_CAPACITY_FACTOR,
        renewable_freeze_year: DEFAULT_RENEWABLE_FREEZE_YEAR,
    };

    let plant_rows = load_plants(Path::new(args.plants()))
        .with_context(|| format!("loading plant inventory from {}", args.plants()))?;
    let fossil_build_rows = load_fossil_builds(Path::new(args.fossil_builds()))
        .with_context(|| format!("loading fossil construction history from {}", args.fossil_builds()))?;
    let generation = load_generation(Path::new(args.generation()))
        .with_context(|| format!("loading generation table from {}", args.generation()))?;

    let registry = PlantRegistry::load(&plant_rows, &fossil_build_rows)
        .context("normalizing plant records")?;
    info!(
        plants = registry.plants.len(),
        duplicates = registry.warnings.len(),
        "plant inventory loaded"
    );

    let engine = ScenarioEngine::new(config.clone()).context("invalid scenario configuration")?;
    let output = engine.run(&registry.plants);

    for deferral in output
        .counterfactual
        .deferrals
        .iter()
        .chain(&output.historical.deferrals)
    {
        warn!(year = deferral.year, kind = ?deferral.kind, "scheduling deferral");
    }

    let (historical_emissions, counterfactual_emissions) = aggregate(
        &config,
        &output.historical.timeseries,
        &output.counterfactual.timeseries,
        &generation,
    );

    let document = build_document(
        &config,
        &output,
        historical_emissions,
        counterfactual_emissions,
        site_baselines(&registry.plants, config.start_year),
        municipality_baselines(&registry.plants, config.start_year),
    );
    write_document(&document, Path::new(args.output()))?;

    let last_hist = output.historical.timeseries.last();
    let last_cf = output.counterfactual.timeseries.last();
    println!("Scenario run complete: {}", args.output());
    println!("----------------------------------------");
    if let (Some(hist), Some(cf)) = (last_hist, last_cf) {
        println!(
            "{}: historical nuclear {:.0} MW / fossil {:.0} MW",
            hist.year, hist.nuclear_mw, hist.fossil_mw
        );
        println!(
            "{}: counterfactual nuclear {:.0} MW / fossil {:.0} MW",
            cf.year, cf.nuclear_mw, cf.fossil_mw
        );
    }
    println!(
        "Events: {} historical, {} counterfactual",
        output.historical.events.len(),
        output.counterfactual.events.len()
    );

    Ok(())
}
