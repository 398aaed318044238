// Time Constants
pub const DEFAULT_START_YEAR: i32 = 1989;
pub const DEFAULT_END_YEAR: i32 = 2025;
pub const DEFAULT_BUILD_START_YEAR: i32 = 1990;

// Counterfactual Build-Out
pub const DEFAULT_BUILD_RATE_UNITS_PER_YEAR: f64 = 1.5;
pub const DEFAULT_UNIT_SIZE_MW: f64 = 1410.0;       // 1980s Konvoi reactor class

// Generation Conversion
pub const HOURS_PER_YEAR: f64 = 8760.0;
pub const NUCLEAR_CAPACITY_FACTOR: f64 = 0.90;      // stylised baseload availability

// Counterfactual renewables are frozen at their published level from this year on
pub const DEFAULT_RENEWABLE_FREEZE_YEAR: i32 = 1998;

// Emission Intensities (tonnes CO2 per MWh of generation)
pub const COAL_EMISSIONS_T_PER_MWH: f64 = 0.95;
pub const GAS_EMISSIONS_T_PER_MWH: f64 = 0.45;
pub const OIL_EMISSIONS_T_PER_MWH: f64 = 0.78;
pub const NUCLEAR_EMISSIONS_T_PER_MWH: f64 = 0.01;

// Name patterns marking district-heating plants, excluded from closure selection
pub const HEATING_NAME_PATTERNS: [&str; 5] = ["hkw", "heiz", "fern", "wärme", "warme"];

// Name patterns marking cogeneration plants, excluded from closure selection
pub const COGENERATION_NAME_PATTERNS: [&str; 3] = ["kwk", "chp", "cogen"];

// Capacity comparison tolerance
pub const MW_EPSILON: f64 = 1e-6;

/// Round a capacity figure to the 0.1 MW used in the output document.
pub fn round_mw(mw: f64) -> f64 {
    (mw * 10.0).round() / 10.0
}

/// Round a generation or emissions figure to two decimals.
pub fn round_twh(twh: f64) -> f64 {
    (twh * 100.0).round() / 100.0
}
