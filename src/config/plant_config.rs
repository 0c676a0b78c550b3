//! Plant Configuration - baseline figures and thresholds as TOML values
//!
//! Every figure the projection engine reads lives in this module. Each
//! struct implements `Default` with the pilot's demo values (see
//! `defaults.rs`), so a missing config file reproduces the pilot exactly.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::error::EngineError;
use crate::types::{BaselinePricing, MixComposition};

/// Environment variable holding an explicit config path.
pub const CONFIG_ENV_VAR: &str = "MARGIN_DEFENSE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "plant_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one plant / scenario category.
///
/// Load with `PlantConfig::load()` which searches:
/// 1. `$MARGIN_DEFENSE_CONFIG`
/// 2. `./plant_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantConfig {
    /// Plant identification
    #[serde(default)]
    pub plant: PlantInfo,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Top-line figures for the P&L scenario simulator
    #[serde(default)]
    pub financials: FinancialBaseline,

    /// P&L lines for the margin waterfall
    #[serde(default)]
    pub pnl: PnlBaseline,

    /// Raw meal composition and unit costs
    #[serde(default)]
    pub raw_material: RawMaterialBaseline,

    /// Clinker factor economics and strength model
    #[serde(default)]
    pub clinker: ClinkerBaseline,

    /// Strength guardrail thresholds
    #[serde(default)]
    pub guardrails: GuardrailThresholds,

    /// Paper bag specification economics
    #[serde(default)]
    pub packaging: PackagingBaseline,

    /// Power generation fuel mix
    #[serde(default)]
    pub power: PowerBaseline,

    /// Valid ranges for every user-adjustable driver
    #[serde(default)]
    pub drivers: DriverRanges,
}

impl PlantConfig {
    /// Load configuration using the standard search order:
    /// 1. `$MARGIN_DEFENSE_CONFIG` environment variable
    /// 2. `./plant_config.toml` in the current working directory
    /// 3. Built-in demo defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), plant = %config.plant.name, "Loaded plant config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(plant = %config.plant.name, "Loaded plant config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found, using built-in pilot defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys only produce warnings; range and consistency failures
    /// reject the whole document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check the config for internal consistency.
    ///
    /// Rules:
    /// - Warning strength must sit above critical strength
    /// - Financial figures must be finite, and revenue must stay positive
    ///   anywhere inside the price and volume driver ranges
    /// - Every raw mix component needs a unit cost and a driver range
    /// - The breakage table must be monotonic and cover the baseline spec
    /// - Driver ranges must be non-empty with a positive step
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let g = &self.guardrails;
        if !g.critical_strength_mpa.is_finite() || !g.warning_strength_mpa.is_finite() {
            errors.push(format!(
                "guardrails: values must be finite (got warning={}, critical={})",
                g.warning_strength_mpa, g.critical_strength_mpa
            ));
        } else if g.critical_strength_mpa >= g.warning_strength_mpa {
            errors.push(format!(
                "guardrails.critical_strength_mpa ({:.2}) must be less than warning_strength_mpa ({:.2})",
                g.critical_strength_mpa, g.warning_strength_mpa
            ));
        }

        if self.server.max_sessions == 0 {
            errors.push("server.max_sessions must be > 0".to_string());
        }

        self.check_financials(&mut errors);

        // Raw mix: every priced component must be costed and adjustable
        let rm = &self.raw_material;
        if rm.total_tonnage <= 0.0 {
            errors.push(format!(
                "raw_material.total_tonnage must be > 0 (got {})",
                rm.total_tonnage
            ));
        }
        if rm.baseline_tonnage.is_empty() {
            errors.push("raw_material.baseline_tonnage must list at least one component".to_string());
        }
        if rm.baseline_tonnage.values().sum::<f64>() <= 0.0 {
            errors.push("raw_material.baseline_tonnage must have a positive total".to_string());
        }
        for component in rm.baseline_tonnage.keys() {
            if !rm.unit_costs.contains_key(component) {
                errors.push(format!("raw_material.unit_costs has no entry for '{component}'"));
            }
            if !self.drivers.mix_shares.contains_key(component) {
                errors.push(format!("drivers.mix_shares has no range for '{component}'"));
            }
        }
        for component in self.drivers.mix_shares.keys() {
            if !rm.baseline_tonnage.contains_key(component) {
                errors.push(format!(
                    "drivers.mix_shares.{component} does not match any raw_material component"
                ));
            }
        }

        // Packaging: total over its domain and monotonic
        let p = &self.packaging;
        if p.breakage_table.is_empty() {
            errors.push("packaging.breakage_table must not be empty".to_string());
        }
        let mut seen = HashSet::new();
        for entry in &p.breakage_table {
            if !seen.insert(entry.gsm) {
                errors.push(format!("packaging.breakage_table lists {} GSM twice", entry.gsm));
            }
        }
        let mut sorted = p.breakage_table.clone();
        sorted.sort_by_key(|e| e.gsm);
        for pair in sorted.windows(2) {
            if pair[1].breakage_pct > pair[0].breakage_pct {
                errors.push(format!(
                    "packaging.breakage_table must not increase with GSM ({} GSM = {:.2}% > {} GSM = {:.2}%)",
                    pair[1].gsm, pair[1].breakage_pct, pair[0].gsm, pair[0].breakage_pct
                ));
            }
        }
        if !p.breakage_table.is_empty() && !seen.contains(&p.baseline_spec_gsm) {
            errors.push(format!(
                "packaging.baseline_spec_gsm ({}) is missing from breakage_table",
                p.baseline_spec_gsm
            ));
        }

        // Driver ranges
        for (name, range) in self.drivers.named_ranges() {
            Self::check_range(&name, range, &mut errors);
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_financials(&self, errors: &mut Vec<String>) {
        let f = &self.financials;
        for (name, value) in [
            ("revenue", f.revenue),
            ("fuel_cost", f.fuel_cost),
            ("profit", f.profit),
            ("volume_revenue_factor", f.volume_revenue_factor),
        ] {
            if !value.is_finite() {
                errors.push(format!("financials.{name} must be finite (got {value})"));
            }
        }
        if !f.revenue.is_finite() {
            return;
        }
        if f.revenue <= 0.0 {
            errors.push(format!("financials.revenue must be > 0 (got {})", f.revenue));
            return;
        }

        let price = &self.drivers.cement_price;
        let volume = &self.drivers.production_volume;
        let bounds = [price.min, price.max, volume.min, volume.max, f.volume_revenue_factor];
        if bounds.iter().any(|v| !v.is_finite()) {
            return;
        }
        // Revenue is linear in both drivers, so its minimum sits at a corner
        let worst_volume_pct = (volume.min * f.volume_revenue_factor)
            .min(volume.max * f.volume_revenue_factor);
        let worst_revenue = f.revenue * (1.0 + (price.min + worst_volume_pct) / 100.0);
        if worst_revenue <= 0.0 {
            errors.push(format!(
                "drivers.cement_price.min ({:.1}) and drivers.production_volume ({:.1}..{:.1}) \
                 can drive projected revenue to {worst_revenue:.1}; it must stay > 0",
                price.min, volume.min, volume.max
            ));
        }
    }

    fn check_range(name: &str, range: &DriverRange, errors: &mut Vec<String>) {
        if !range.min.is_finite() || !range.max.is_finite() || !range.step.is_finite() {
            errors.push(format!(
                "drivers.{name}: values must be finite (got min={}, max={}, step={})",
                range.min, range.max, range.step
            ));
            return;
        }
        if range.min >= range.max {
            errors.push(format!(
                "drivers.{name}: min ({:.3}) must be less than max ({:.3})",
                range.min, range.max
            ));
        }
        if range.step <= 0.0 {
            errors.push(format!("drivers.{name}: step must be > 0 (got {})", range.step));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {e}"),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Plant Info
// ============================================================================

/// Identification metadata. Not used for logic, but appears in logs and
/// API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantInfo {
    #[serde(default = "default_plant_name")]
    pub name: String,

    /// Reporting period the baseline figures describe
    #[serde(default = "default_period")]
    pub period: String,

    /// Currency label for financial figures
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_plant_name() -> String {
    "PILOT".to_string()
}
fn default_period() -> String {
    "Jan 2026".to_string()
}
fn default_currency() -> String {
    "PKR".to_string()
}

impl Default for PlantInfo {
    fn default() -> Self {
        Self {
            name: default_plant_name(),
            period: default_period(),
            currency: default_currency(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `MARGIN_DEFENSE_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Sessions are never expired; creation fails once this many are open.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}
fn default_max_sessions() -> usize {
    defaults::MAX_SESSIONS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            max_sessions: default_max_sessions(),
        }
    }
}

// ============================================================================
// Financials
// ============================================================================

/// Monthly top-line figures (millions).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FinancialBaseline {
    #[serde(default = "default_revenue")]
    pub revenue: f64,

    #[serde(default = "default_fuel_cost")]
    pub fuel_cost: f64,

    #[serde(default = "default_profit")]
    pub profit: f64,

    /// Fraction of a production volume change that flows into revenue.
    #[serde(default = "default_volume_revenue_factor")]
    pub volume_revenue_factor: f64,
}

fn default_revenue() -> f64 {
    defaults::REVENUE
}
fn default_fuel_cost() -> f64 {
    defaults::FUEL_COST
}
fn default_profit() -> f64 {
    defaults::NET_PROFIT
}
fn default_volume_revenue_factor() -> f64 {
    defaults::VOLUME_REVENUE_FACTOR
}

impl Default for FinancialBaseline {
    fn default() -> Self {
        Self {
            revenue: default_revenue(),
            fuel_cost: default_fuel_cost(),
            profit: default_profit(),
            volume_revenue_factor: default_volume_revenue_factor(),
        }
    }
}

impl FinancialBaseline {
    /// Margin with every driver at zero.
    pub fn baseline_margin_pct(&self) -> f64 {
        self.profit / self.revenue * 100.0
    }
}

// ============================================================================
// P&L Waterfall
// ============================================================================

/// P&L lines for the margin waterfall (millions).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PnlBaseline {
    #[serde(default = "default_revenue")]
    pub revenue: f64,

    #[serde(default = "default_pnl_raw_material")]
    pub raw_material: f64,

    #[serde(default = "default_pnl_power_fuel")]
    pub power_fuel: f64,

    #[serde(default = "default_pnl_distribution")]
    pub distribution: f64,

    #[serde(default = "default_pnl_fixed_costs")]
    pub fixed_costs: f64,
}

fn default_pnl_raw_material() -> f64 {
    defaults::PNL_RAW_MATERIAL
}
fn default_pnl_power_fuel() -> f64 {
    defaults::PNL_POWER_FUEL
}
fn default_pnl_distribution() -> f64 {
    defaults::PNL_DISTRIBUTION
}
fn default_pnl_fixed_costs() -> f64 {
    defaults::PNL_FIXED_COSTS
}

impl Default for PnlBaseline {
    fn default() -> Self {
        Self {
            revenue: default_revenue(),
            raw_material: default_pnl_raw_material(),
            power_fuel: default_pnl_power_fuel(),
            distribution: default_pnl_distribution(),
            fixed_costs: default_pnl_fixed_costs(),
        }
    }
}

// ============================================================================
// Raw Material
// ============================================================================

/// Raw meal tonnages and unit costs, keyed by component name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterialBaseline {
    /// Tonnage the savings delta is multiplied by.
    #[serde(default = "default_total_tonnage")]
    pub total_tonnage: f64,

    /// `raw` prices the baseline shares as configured; `normalized`
    /// rescales them to 100% first.
    #[serde(default)]
    pub baseline_pricing: BaselinePricing,

    /// Baseline tons consumed per component.
    #[serde(default = "default_baseline_tonnage")]
    pub baseline_tonnage: BTreeMap<String, f64>,

    /// Cost per ton per component.
    #[serde(default = "default_unit_costs")]
    pub unit_costs: BTreeMap<String, f64>,
}

fn default_total_tonnage() -> f64 {
    defaults::RAW_MIX_TOTAL_TONNAGE
}
fn default_baseline_tonnage() -> BTreeMap<String, f64> {
    defaults::RAW_MIX_COMPONENTS
        .iter()
        .map(|(name, tons, _)| ((*name).to_string(), *tons))
        .collect()
}
fn default_unit_costs() -> BTreeMap<String, f64> {
    defaults::RAW_MIX_COMPONENTS
        .iter()
        .map(|(name, _, cost)| ((*name).to_string(), *cost))
        .collect()
}

impl Default for RawMaterialBaseline {
    fn default() -> Self {
        Self {
            total_tonnage: default_total_tonnage(),
            baseline_pricing: BaselinePricing::default(),
            baseline_tonnage: default_baseline_tonnage(),
            unit_costs: default_unit_costs(),
        }
    }
}

impl RawMaterialBaseline {
    /// Baseline shares in percent of `total_tonnage`.
    ///
    /// Not normalized: the configured total may include minor components
    /// outside the priced mix. `baseline_pricing` decides whether the
    /// engine rescales these shares before pricing them.
    pub fn baseline_mix(&self) -> MixComposition {
        self.baseline_tonnage
            .iter()
            .map(|(name, tons)| (name.clone(), tons / self.total_tonnage * 100.0))
            .collect()
    }
}

// ============================================================================
// Clinker
// ============================================================================

/// Clinker factor economics and the linear strength model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClinkerBaseline {
    #[serde(default = "default_cement_volume")]
    pub cement_volume_tons: f64,

    #[serde(default = "default_baseline_clinker_pct")]
    pub baseline_clinker_pct: f64,

    /// 28-day strength of the baseline blend.
    #[serde(default = "default_baseline_strength")]
    pub baseline_strength_mpa: f64,

    /// MPa lost per percentage point of clinker removed.
    #[serde(default = "default_strength_slope")]
    pub strength_slope_mpa_per_pct: f64,

    #[serde(default = "default_clinker_cost")]
    pub clinker_cost_per_ton: f64,

    #[serde(default = "default_additive_cost")]
    pub additive_cost_per_ton: f64,
}

fn default_cement_volume() -> f64 {
    defaults::CEMENT_VOLUME_TONS
}
fn default_baseline_clinker_pct() -> f64 {
    defaults::BASELINE_CLINKER_PCT
}
fn default_baseline_strength() -> f64 {
    defaults::BASELINE_STRENGTH_MPA
}
fn default_strength_slope() -> f64 {
    defaults::STRENGTH_SLOPE_MPA_PER_PCT
}
fn default_clinker_cost() -> f64 {
    defaults::CLINKER_COST_PER_TON
}
fn default_additive_cost() -> f64 {
    defaults::ADDITIVE_COST_PER_TON
}

impl Default for ClinkerBaseline {
    fn default() -> Self {
        Self {
            cement_volume_tons: default_cement_volume(),
            baseline_clinker_pct: default_baseline_clinker_pct(),
            baseline_strength_mpa: default_baseline_strength(),
            strength_slope_mpa_per_pct: default_strength_slope(),
            clinker_cost_per_ton: default_clinker_cost(),
            additive_cost_per_ton: default_additive_cost(),
        }
    }
}

// ============================================================================
// Guardrails
// ============================================================================

/// Strength thresholds (MPa) that drive the guardrail verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuardrailThresholds {
    /// Strictly below this: `CriticalFail`.
    #[serde(default = "default_critical_strength")]
    pub critical_strength_mpa: f64,

    /// Strictly below this: `QualityRisk`.
    #[serde(default = "default_warning_strength")]
    pub warning_strength_mpa: f64,
}

fn default_critical_strength() -> f64 {
    defaults::CRITICAL_STRENGTH_MPA
}
fn default_warning_strength() -> f64 {
    defaults::WARNING_STRENGTH_MPA
}

impl Default for GuardrailThresholds {
    fn default() -> Self {
        Self {
            critical_strength_mpa: default_critical_strength(),
            warning_strength_mpa: default_warning_strength(),
        }
    }
}

// ============================================================================
// Packaging
// ============================================================================

/// One row of the GSM → breakage lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BreakageEntry {
    pub gsm: u32,
    pub breakage_pct: f64,
}

/// Paper bag economics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingBaseline {
    #[serde(default = "default_total_bags")]
    pub total_bags: f64,

    /// Cost of one bag at the baseline spec.
    #[serde(default = "default_avg_bag_cost")]
    pub avg_bag_cost: f64,

    #[serde(default = "default_baseline_spec")]
    pub baseline_spec_gsm: u32,

    /// Fractional unit cost change per GSM away from the baseline spec.
    #[serde(default = "default_cost_slope")]
    pub cost_slope_per_gsm: f64,

    /// Spilled product value per broken bag, on top of the bag cost.
    #[serde(default = "default_breakage_loss")]
    pub breakage_loss_per_bag: f64,

    /// Allowed specs and their breakage rates.
    #[serde(default = "default_breakage_table")]
    pub breakage_table: Vec<BreakageEntry>,
}

fn default_total_bags() -> f64 {
    defaults::TOTAL_BAGS
}
fn default_avg_bag_cost() -> f64 {
    defaults::AVG_BAG_COST
}
fn default_baseline_spec() -> u32 {
    defaults::BASELINE_SPEC_GSM
}
fn default_cost_slope() -> f64 {
    defaults::BAG_COST_SLOPE_PER_GSM
}
fn default_breakage_loss() -> f64 {
    defaults::BREAKAGE_LOSS_PER_BAG
}
fn default_breakage_table() -> Vec<BreakageEntry> {
    defaults::BREAKAGE_TABLE
        .iter()
        .map(|&(gsm, breakage_pct)| BreakageEntry { gsm, breakage_pct })
        .collect()
}

impl Default for PackagingBaseline {
    fn default() -> Self {
        Self {
            total_bags: default_total_bags(),
            avg_bag_cost: default_avg_bag_cost(),
            baseline_spec_gsm: default_baseline_spec(),
            cost_slope_per_gsm: default_cost_slope(),
            breakage_loss_per_bag: default_breakage_loss(),
            breakage_table: default_breakage_table(),
        }
    }
}

impl PackagingBaseline {
    /// Breakage rate for an allowed spec.
    ///
    /// A spec missing from the table is a configuration error, never a
    /// silent default.
    pub fn breakage_rate(&self, gsm: u32) -> Result<f64, EngineError> {
        self.breakage_table
            .iter()
            .find(|e| e.gsm == gsm)
            .map(|e| e.breakage_pct)
            .ok_or(EngineError::MissingBreakageRate(gsm))
    }

    /// Allowed discrete specs in ascending order.
    pub fn allowed_specs(&self) -> Vec<u32> {
        let mut specs: Vec<u32> = self.breakage_table.iter().map(|e| e.gsm).collect();
        specs.sort_unstable();
        specs
    }
}

// ============================================================================
// Power
// ============================================================================

/// Monthly power generation energy demand and fuel prices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerBaseline {
    #[serde(default = "default_energy_requirement")]
    pub energy_requirement_mmbtu: f64,

    #[serde(default = "default_gas_cost")]
    pub gas_cost_per_mmbtu: f64,

    #[serde(default = "default_hfo_cost")]
    pub hfo_cost_per_mmbtu: f64,

    /// Current gas share of power generation.
    #[serde(default = "default_baseline_gas_pct")]
    pub baseline_gas_pct: f64,
}

fn default_energy_requirement() -> f64 {
    defaults::ENERGY_REQUIREMENT_MMBTU
}
fn default_gas_cost() -> f64 {
    defaults::GAS_COST_PER_MMBTU
}
fn default_hfo_cost() -> f64 {
    defaults::HFO_COST_PER_MMBTU
}
fn default_baseline_gas_pct() -> f64 {
    defaults::BASELINE_GAS_PCT
}

impl Default for PowerBaseline {
    fn default() -> Self {
        Self {
            energy_requirement_mmbtu: default_energy_requirement(),
            gas_cost_per_mmbtu: default_gas_cost(),
            hfo_cost_per_mmbtu: default_hfo_cost(),
            baseline_gas_pct: default_baseline_gas_pct(),
        }
    }
}

// ============================================================================
// Driver Ranges
// ============================================================================

/// Declared valid range for one driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DriverRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl DriverRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    const fn from_tuple(t: (f64, f64, f64)) -> Self {
        Self::new(t.0, t.1, t.2)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Pass `value` through if in range, otherwise a domain input error
    /// naming `driver`.
    pub fn check(&self, driver: &str, value: f64) -> Result<f64, EngineError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(EngineError::OutOfRange {
                driver: driver.to_string(),
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Ranges for every adjustable driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRanges {
    /// HFO/gas price variance (%)
    #[serde(default = "default_fuel_price_range")]
    pub fuel_price: DriverRange,

    /// Clinker production volume change (%)
    #[serde(default = "default_production_volume_range")]
    pub production_volume: DriverRange,

    /// Cement market price change (%)
    #[serde(default = "default_cement_price_range")]
    pub cement_price: DriverRange,

    /// Gas share of power generation (%)
    #[serde(default = "default_gas_utilization_range")]
    pub gas_utilization: DriverRange,

    /// Target clinker factor (%)
    #[serde(default = "default_clinker_factor_range")]
    pub clinker_factor: DriverRange,

    /// Raw mix share ranges (%), keyed by component
    #[serde(default = "default_mix_share_ranges")]
    pub mix_shares: BTreeMap<String, DriverRange>,
}

fn default_fuel_price_range() -> DriverRange {
    DriverRange::from_tuple(defaults::FUEL_PRICE_RANGE)
}
fn default_production_volume_range() -> DriverRange {
    DriverRange::from_tuple(defaults::PRODUCTION_VOLUME_RANGE)
}
fn default_cement_price_range() -> DriverRange {
    DriverRange::from_tuple(defaults::CEMENT_PRICE_RANGE)
}
fn default_gas_utilization_range() -> DriverRange {
    DriverRange::from_tuple(defaults::GAS_UTILIZATION_RANGE)
}
fn default_clinker_factor_range() -> DriverRange {
    DriverRange::from_tuple(defaults::CLINKER_FACTOR_RANGE)
}
fn default_mix_share_ranges() -> BTreeMap<String, DriverRange> {
    defaults::RAW_MIX_SHARE_RANGES
        .iter()
        .map(|&(name, min, max, step)| (name.to_string(), DriverRange::new(min, max, step)))
        .collect()
}

impl Default for DriverRanges {
    fn default() -> Self {
        Self {
            fuel_price: default_fuel_price_range(),
            production_volume: default_production_volume_range(),
            cement_price: default_cement_price_range(),
            gas_utilization: default_gas_utilization_range(),
            clinker_factor: default_clinker_factor_range(),
            mix_shares: default_mix_share_ranges(),
        }
    }
}

impl DriverRanges {
    /// Every range with its dotted name under `drivers.`.
    pub fn named_ranges(&self) -> Vec<(String, &DriverRange)> {
        let mut out = vec![
            ("fuel_price".to_string(), &self.fuel_price),
            ("production_volume".to_string(), &self.production_volume),
            ("cement_price".to_string(), &self.cement_price),
            ("gas_utilization".to_string(), &self.gas_utilization),
            ("clinker_factor".to_string(), &self.clinker_factor),
        ];
        out.extend(
            self.mix_shares
                .iter()
                .map(|(name, range)| (format!("mix_shares.{name}"), range)),
        );
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
