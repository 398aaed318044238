// Module declarations for the scenario engine

// Core simulation modules
pub mod core {
    pub mod baseline;
    pub mod closures;
    pub mod engine;
    pub mod registry;
    pub mod scheduler;
    pub mod sites;
    pub mod state;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod scenario_config;
}

// Model definitions
pub mod models {
    pub mod event;
    pub mod plant;
    pub mod site;
}

// Data loaders
pub mod data {
    pub mod fossil_builds_loader;
    pub mod generation_loader;
    pub mod plants_loader;
}

// Derived series and UI seed baselines
pub mod analysis {
    pub mod aggregate;
    pub mod baselines;
}

// Output document assembly
pub mod output {
    pub mod document;
}

// Utility functions
pub mod utils {
    pub mod logging;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

pub mod error;

// Re-export commonly used items
pub use crate::config::scenario_config::ScenarioConfig;
pub use crate::core::engine::ScenarioEngine;
pub use crate::core::registry::PlantRegistry;
pub use crate::error::EngineError;
pub use crate::models::plant::Plant;
