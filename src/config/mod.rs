//! Plant Configuration Module
//!
//! Provides per-plant baseline figures loaded from TOML files, replacing the
//! pilot's hardcoded constants with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `MARGIN_DEFENSE_CONFIG` environment variable (path to TOML file)
//! 2. `plant_config.toml` in the current working directory
//! 3. Built-in defaults (the pilot's demo figures)
//!
//! The loaded config is handed around as an `Arc<PlantConfig>` rather than
//! held in a global, so tests and sessions can each use their own.

mod plant_config;
pub mod defaults;
pub mod validation;

pub use plant_config::*;
