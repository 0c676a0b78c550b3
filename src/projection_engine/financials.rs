//! Top-line P&L scenario: cement price, production volume and fuel price.

use crate::config::FinancialBaseline;
use crate::types::FinancialProjection;

/// Project net profit and gross margin under the three top-line drivers.
///
/// All deltas are in percent (`10.0` = +10%).
///
/// - `revenue_impact = revenue * price% + revenue * volume% * volume_revenue_factor`
/// - `fuel_impact = fuel_cost * fuel% + fuel_cost * volume%`
/// - `net_profit = profit + revenue_impact - fuel_impact`
/// - `gross_margin = net_profit / (revenue + revenue_impact) * 100`
///
/// The margin denominator is not guarded. A config that passes
/// `PlantConfig::validate` keeps projected revenue positive for every
/// price and volume inside the driver ranges.
pub fn project_financials(
    baseline: &FinancialBaseline,
    fuel_price_delta_pct: f64,
    volume_delta_pct: f64,
    price_delta_pct: f64,
) -> FinancialProjection {
    let revenue_impact = baseline.revenue * (price_delta_pct / 100.0)
        + baseline.revenue * (volume_delta_pct / 100.0) * baseline.volume_revenue_factor;

    // Fuel scales fully with volume; there is no fixed fuel component
    let fuel_impact = baseline.fuel_cost * (fuel_price_delta_pct / 100.0)
        + baseline.fuel_cost * (volume_delta_pct / 100.0);

    let net_profit = baseline.profit + revenue_impact - fuel_impact;
    let gross_margin_pct = net_profit / (baseline.revenue + revenue_impact) * 100.0;

    FinancialProjection {
        revenue_impact,
        fuel_impact,
        net_profit,
        gross_margin_pct,
        profit_delta: net_profit - baseline.profit,
        margin_delta_pct: gross_margin_pct - baseline.baseline_margin_pct(),
    }
}
