//! Demo baseline constants.
//!
//! These are the figures the pilot dashboard was grounded on (Jan 2026 P&L
//! projection, COP sheet, board deck). They seed every `Default` impl in
//! `plant_config.rs`, so a deployment without a TOML file behaves exactly
//! like the pilot.

// ============================================================================
// Financials (millions, local currency)
// ============================================================================

pub const REVENUE: f64 = 8_500.0;
pub const FUEL_COST: f64 = 3_200.0;
pub const NET_PROFIT: f64 = 1_400.0;

/// Share of a volume change that reaches revenue. Below 1.0 because part of
/// the volume moves through fixed-price contracts.
pub const VOLUME_REVENUE_FACTOR: f64 = 0.8;

// ============================================================================
// P&L Waterfall (millions, local currency)
// ============================================================================

pub const PNL_RAW_MATERIAL: f64 = 2_900.0;
pub const PNL_POWER_FUEL: f64 = 3_628.0;
pub const PNL_DISTRIBUTION: f64 = 800.0;
pub const PNL_FIXED_COSTS: f64 = 600.0;

// ============================================================================
// Raw Material Mix (tons / cost per ton)
// ============================================================================

pub const RAW_MIX_TOTAL_TONNAGE: f64 = 3_078_885.0;

/// (component, baseline tons, unit cost per ton)
pub const RAW_MIX_COMPONENTS: &[(&str, f64, f64)] = &[
    ("limestone", 2_775_265.0, 1.84),
    ("clay", 243_417.0, 2.36),
    ("iron_ore", 57_343.0, 44.08),
];

/// (component, min %, max %, step %)
pub const RAW_MIX_SHARE_RANGES: &[(&str, f64, f64, f64)] = &[
    ("limestone", 80.0, 95.0, 0.1),
    ("clay", 5.0, 15.0, 0.1),
    ("iron_ore", 0.0, 5.0, 0.1),
];

// ============================================================================
// Clinker Factor
// ============================================================================

pub const CEMENT_VOLUME_TONS: f64 = 135_686.0;
pub const BASELINE_CLINKER_PCT: f64 = 83.1;
pub const BASELINE_STRENGTH_MPA: f64 = 53.0;

/// 28-day strength lost per percentage point of clinker removed.
pub const STRENGTH_SLOPE_MPA_PER_PCT: f64 = 0.6;

pub const CLINKER_COST_PER_TON: f64 = 35.0;
pub const ADDITIVE_COST_PER_TON: f64 = 2.5;

/// Below this the blend fails the 42.5 grade standard.
pub const CRITICAL_STRENGTH_MPA: f64 = 42.5;

/// Below this the blend is sellable but has little margin for premium markets.
pub const WARNING_STRENGTH_MPA: f64 = 45.0;

// ============================================================================
// Packaging
// ============================================================================

pub const TOTAL_BAGS: f64 = 2_100_000.0;
pub const AVG_BAG_COST: f64 = 0.195;
pub const BASELINE_SPEC_GSM: u32 = 80;

/// Fractional unit-cost change per GSM below (or above) the baseline spec.
pub const BAG_COST_SLOPE_PER_GSM: f64 = 0.006;

/// Value lost per broken bag on top of the bag itself (spilled cement).
pub const BREAKAGE_LOSS_PER_BAG: f64 = 0.5;

/// (GSM, breakage %). Heavier paper breaks less.
pub const BREAKAGE_TABLE: &[(u32, f64)] = &[(70, 4.5), (75, 2.5), (80, 1.2), (85, 0.8)];

// ============================================================================
// Power Generation
// ============================================================================

pub const ENERGY_REQUIREMENT_MMBTU: f64 = 500_000.0;
pub const GAS_COST_PER_MMBTU: f64 = 4.5;
pub const HFO_COST_PER_MMBTU: f64 = 12.0;
pub const BASELINE_GAS_PCT: f64 = 20.0;

// ============================================================================
// Driver Ranges (min, max, step)
// ============================================================================

pub const FUEL_PRICE_RANGE: (f64, f64, f64) = (-20.0, 20.0, 1.0);
pub const PRODUCTION_VOLUME_RANGE: (f64, f64, f64) = (-15.0, 15.0, 1.0);
pub const CEMENT_PRICE_RANGE: (f64, f64, f64) = (-10.0, 10.0, 1.0);
pub const GAS_UTILIZATION_RANGE: (f64, f64, f64) = (0.0, 100.0, 1.0);
pub const CLINKER_FACTOR_RANGE: (f64, f64, f64) = (72.0, 85.0, 0.1);

// ============================================================================
// Mix Normalization
// ============================================================================

/// Deviation from 100% (percentage points) tolerated before a mix is flagged
/// as off-target.
pub const MIX_TOTAL_TOLERANCE_PCT: f64 = 0.1;

// ============================================================================
// Server
// ============================================================================

pub const SERVER_ADDR: &str = "0.0.0.0:8080";

/// Open scenario sessions kept in memory before new ones are refused.
pub const MAX_SESSIONS: usize = 1000;
