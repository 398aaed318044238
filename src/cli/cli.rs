use clap::Parser;

use crate::config::constants::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "data/plants.csv", help = "Unified plant inventory CSV")]
    plants: String,

    #[arg(long, default_value = "data/fossil_builds.csv", help = "Historical fossil construction CSV")]
    fossil_builds: String,

    #[arg(long, default_value = "data/generation.csv", help = "Annual generation by source CSV")]
    generation: String,

    #[arg(short, long, default_value = "out/scenarios.json")]
    output: String,

    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    start_year: i32,

    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    end_year: i32,

    #[arg(long, default_value_t = DEFAULT_BUILD_START_YEAR, help = "First year counterfactual units come online")]
    build_start_year: i32,

    #[arg(long, default_value_t = DEFAULT_BUILD_RATE_UNITS_PER_YEAR, help = "Reactor units commissioned per year")]
    build_rate: f64,

    #[arg(long, default_value_t = DEFAULT_UNIT_SIZE_MW)]
    unit_size_mw: f64,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// Add getter methods for all fields
impl Args {
    pub fn plants(&self) -> &str {
        &self.plants
    }

    pub fn fossil_builds(&self) -> &str {
        &self.fossil_builds
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn build_start_year(&self) -> i32 {
        self.build_start_year
    }

    pub fn build_rate(&self) -> f64 {
        self.build_rate
    }

    pub fn unit_size_mw(&self) -> f64 {
        self.unit_size_mw
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
