//! Projection Engine Module
//!
//! Deterministic what-if calculations for plant cost and margin.
//! Every function here is pure: the same baseline and drivers always give
//! the same result, and nothing is cached between calls.
//!
//! ## Scenario Simulator
//! - `project_financials()` - Net profit and gross margin under price,
//!   volume and fuel drivers
//!
//! ## Cost of Production
//! - `normalize_mix()` - Rescale raw shares to 100%
//! - `project_raw_material_savings()` - Re-price the raw meal
//! - `project_clinker_factor_impact()` - Clinker factor vs strength guardrail
//! - `project_packaging_impact()` - Bag spec vs breakage trade-off
//! - `project_power_arbitrage()` - Gas/HFO generation mix
//!
//! ## Margin Radar
//! - `build_waterfall()` - P&L waterfall with running totals

pub mod clinker;
pub mod financials;
pub mod mix;
pub mod packaging;
pub mod power;
pub mod waterfall;

pub use clinker::{classify_strength, project_clinker_factor_impact};
pub use financials::project_financials;
pub use mix::{
    cost_per_ton, normalize_mix, normalize_with_report, price_mix_change,
    project_raw_material_savings, MixCostDelta,
};
pub use packaging::project_packaging_impact;
pub use power::project_power_arbitrage;
pub use waterfall::{build_waterfall, BarMeasure, MarginWaterfall, WaterfallBar};
