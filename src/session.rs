//! Scenario sessions: the per-user driver values behind the sliders.
//!
//! A session is the only mutable state in the system. It owns the current
//! value of every driver, enforces the configured ranges at the boundary,
//! and rebuilds the full [`ScenarioReport`] on demand. Sessions never share
//! state with each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{DriverRange, PlantConfig};
use crate::error::EngineError;
use crate::projection_engine::{
    project_clinker_factor_impact, project_financials, project_packaging_impact,
    project_power_arbitrage, project_raw_material_savings,
};
use crate::types::{MixComposition, ScenarioReport};

// ============================================================================
// Drivers
// ============================================================================

/// Scalar what-if levers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// HFO/gas price variance (%)
    FuelPrice,
    /// Clinker production volume change (%)
    ProductionVolume,
    /// Cement market price change (%)
    CementPrice,
    /// Gas share of power generation (%)
    GasUtilization,
    /// Target clinker factor (%)
    ClinkerFactor,
}

impl Driver {
    pub const ALL: [Driver; 5] = [
        Driver::FuelPrice,
        Driver::ProductionVolume,
        Driver::CementPrice,
        Driver::GasUtilization,
        Driver::ClinkerFactor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Driver::FuelPrice => "fuel_price",
            Driver::ProductionVolume => "production_volume",
            Driver::CementPrice => "cement_price",
            Driver::GasUtilization => "gas_utilization",
            Driver::ClinkerFactor => "clinker_factor",
        }
    }

    pub fn range(self, config: &PlantConfig) -> DriverRange {
        let d = &config.drivers;
        match self {
            Driver::FuelPrice => d.fuel_price,
            Driver::ProductionVolume => d.production_volume,
            Driver::CementPrice => d.cement_price,
            Driver::GasUtilization => d.gas_utilization,
            Driver::ClinkerFactor => d.clinker_factor,
        }
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What to do with a value outside its declared range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Pull the value back to the nearest bound, like a slider would.
    #[default]
    Clamp,
    /// Refuse the update with a domain input error.
    Reject,
}

/// Current value of every driver in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverValues {
    pub fuel_price_delta_pct: f64,
    pub volume_delta_pct: f64,
    pub price_delta_pct: f64,
    pub gas_utilization_pct: f64,
    pub clinker_factor_pct: f64,
    pub raw_mix: MixComposition,
    pub bag_spec_gsm: u32,
}

impl DriverValues {
    /// Untouched sliders: zero deltas, baseline shares and specs.
    pub fn baseline(config: &PlantConfig) -> Self {
        Self {
            fuel_price_delta_pct: 0.0,
            volume_delta_pct: 0.0,
            price_delta_pct: 0.0,
            gas_utilization_pct: config.power.baseline_gas_pct,
            clinker_factor_pct: config.clinker.baseline_clinker_pct,
            raw_mix: config.raw_material.baseline_mix(),
            bag_spec_gsm: config.packaging.baseline_spec_gsm,
        }
    }

    pub fn get(&self, driver: Driver) -> f64 {
        match driver {
            Driver::FuelPrice => self.fuel_price_delta_pct,
            Driver::ProductionVolume => self.volume_delta_pct,
            Driver::CementPrice => self.price_delta_pct,
            Driver::GasUtilization => self.gas_utilization_pct,
            Driver::ClinkerFactor => self.clinker_factor_pct,
        }
    }

    fn slot(&mut self, driver: Driver) -> &mut f64 {
        match driver {
            Driver::FuelPrice => &mut self.fuel_price_delta_pct,
            Driver::ProductionVolume => &mut self.volume_delta_pct,
            Driver::CementPrice => &mut self.price_delta_pct,
            Driver::GasUtilization => &mut self.gas_utilization_pct,
            Driver::ClinkerFactor => &mut self.clinker_factor_pct,
        }
    }
}

/// A single driver change, as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverUpdate {
    Driver { driver: Driver, value: f64 },
    MixShare { component: String, value: f64 },
    BagSpec { gsm: u32 },
}

// ============================================================================
// Session
// ============================================================================

/// One user's what-if scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub policy: RangePolicy,
    pub drivers: DriverValues,
}

impl ScenarioSession {
    pub fn new(config: &PlantConfig, policy: RangePolicy) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            policy,
            drivers: DriverValues::baseline(config),
        };
        info!(session = %session.id, ?policy, "Scenario session created");
        session
    }

    /// Put every driver back to its baseline value.
    pub fn reset(&mut self, config: &PlantConfig) {
        self.drivers = DriverValues::baseline(config);
        debug!(session = %self.id, "Drivers reset to baseline");
    }

    /// Apply the range policy and return the value that should be stored.
    fn admit(&self, name: &str, value: f64, range: DriverRange) -> Result<f64, EngineError> {
        if range.contains(value) {
            return Ok(value);
        }
        match self.policy {
            RangePolicy::Clamp => {
                let clamped = range.clamp(value);
                warn!(session = %self.id, driver = name, value, clamped, "Driver outside range, clamped");
                Ok(clamped)
            }
            RangePolicy::Reject => range.check(name, value),
        }
    }

    /// Set a scalar driver. Returns the value actually stored.
    pub fn set_driver(
        &mut self,
        config: &PlantConfig,
        driver: Driver,
        value: f64,
    ) -> Result<f64, EngineError> {
        let stored = self.admit(driver.name(), value, driver.range(config))?;
        *self.drivers.slot(driver) = stored;
        debug!(session = %self.id, %driver, value = stored, "Driver updated");
        Ok(stored)
    }

    /// Set one raw mix share. Returns the value actually stored.
    ///
    /// Shares are not renormalized here; the mix is normalized when priced.
    pub fn set_mix_share(
        &mut self,
        config: &PlantConfig,
        component: &str,
        value: f64,
    ) -> Result<f64, EngineError> {
        let range = config
            .drivers
            .mix_shares
            .get(component)
            .copied()
            .ok_or_else(|| EngineError::UnknownComponent(component.to_string()))?;
        let stored = self.admit(&format!("mix_shares.{component}"), value, range)?;
        self.drivers.raw_mix.set(component, stored);
        debug!(session = %self.id, component, value = stored, "Mix share updated");
        Ok(stored)
    }

    /// Select a bag spec. Only the levels in the breakage table are accepted,
    /// whatever the range policy.
    pub fn set_bag_spec(&mut self, config: &PlantConfig, gsm: u32) -> Result<u32, EngineError> {
        let allowed = config.packaging.allowed_specs();
        if !allowed.contains(&gsm) {
            return Err(EngineError::UnsupportedSpec { gsm, allowed });
        }
        self.drivers.bag_spec_gsm = gsm;
        debug!(session = %self.id, gsm, "Bag spec updated");
        Ok(gsm)
    }

    /// Apply a client update.
    pub fn apply(&mut self, config: &PlantConfig, update: &DriverUpdate) -> Result<(), EngineError> {
        match update {
            DriverUpdate::Driver { driver, value } => {
                self.set_driver(config, *driver, *value)?;
            }
            DriverUpdate::MixShare { component, value } => {
                self.set_mix_share(config, component, *value)?;
            }
            DriverUpdate::BagSpec { gsm } => {
                self.set_bag_spec(config, *gsm)?;
            }
        }
        Ok(())
    }

    /// Recompute every projection from the current driver values.
    pub fn project(&self, config: &PlantConfig) -> Result<ScenarioReport, EngineError> {
        let d = &self.drivers;
        let rm = &config.raw_material;

        Ok(ScenarioReport {
            financials: project_financials(
                &config.financials,
                d.fuel_price_delta_pct,
                d.volume_delta_pct,
                d.price_delta_pct,
            ),
            raw_material: project_raw_material_savings(
                rm.total_tonnage,
                &rm.unit_costs,
                &rm.baseline_mix(),
                &d.raw_mix,
                rm.baseline_pricing,
            )?,
            clinker: project_clinker_factor_impact(
                d.clinker_factor_pct,
                &config.clinker,
                &config.guardrails,
            )?,
            packaging: project_packaging_impact(d.bag_spec_gsm, &config.packaging)?,
            power: project_power_arbitrage(d.gas_utilization_pct, &config.power)?,
        })
    }
}
