use std::fmt;

/// Fatal data-integrity failures. Any of these aborts dataset generation
/// before the output document is written.
#[derive(Debug)]
pub enum EngineError {
    InvalidDate(String),
    NonPositiveCapacity { name: String, capacity_mw: f64 },
    CommissionAfterDecommission { name: String },
    UnresolvedSite(String),
    InvalidConfig(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidDate(s) => write!(f, "Unparseable date: {}", s),
            EngineError::NonPositiveCapacity { name, capacity_mw } => {
                write!(f, "Non-positive capacity {} MW for plant '{}'", capacity_mw, name)
            }
            EngineError::CommissionAfterDecommission { name } => {
                write!(f, "Plant '{}' has commission date after decommission date", name)
            }
            EngineError::UnresolvedSite(s) => write!(f, "Unresolvable site reference: {}", s),
            EngineError::InvalidConfig(s) => write!(f, "Invalid configuration: {}", s),
        }
    }
}

impl std::error::Error for EngineError {}
