//! Engine error taxonomy.
//!
//! Pure arithmetic never fails. Errors only come from the boundary (a driver
//! outside its declared range) or from configuration that does not cover a
//! required key.

use serde::Serialize;
use thiserror::Error;

/// Broad class of an [`EngineError`], used to pick the HTTP status.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller supplied a value outside what the driver accepts.
    DomainInput,
    /// The plant configuration is missing something the engine needs.
    Configuration,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("{driver} = {value} is outside its valid range [{min}, {max}]")]
    OutOfRange {
        driver: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("bag specification {gsm} GSM is not an allowed level (allowed: {allowed:?})")]
    UnsupportedSpec { gsm: u32, allowed: Vec<u32> },

    #[error("mix component '{0}' is not part of the configured raw mix")]
    UnknownComponent(String),

    #[error("mix is missing a share for component '{0}'")]
    MissingComponent(String),

    #[error("breakage table has no entry for {0} GSM")]
    MissingBreakageRate(u32),

    #[error("no unit cost configured for mix component '{0}'")]
    MissingUnitCost(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::OutOfRange { .. }
            | EngineError::UnsupportedSpec { .. }
            | EngineError::UnknownComponent(_)
            | EngineError::MissingComponent(_) => ErrorKind::DomainInput,
            EngineError::MissingBreakageRate(_) | EngineError::MissingUnitCost(_) => {
                ErrorKind::Configuration
            }
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
