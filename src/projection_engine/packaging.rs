//! Paper bag specification: cheaper paper vs. more breakage.

use crate::config::PackagingBaseline;
use crate::error::EngineError;
use crate::types::{CostImpact, PackagingProjection};

/// Project spend and breakage for a bag specification.
///
/// - `unit_cost_factor = 1 - (baseline_spec - spec) * cost_slope`
/// - `breakage_cost = bags * breakage% * (unit_cost + loss_per_broken_bag)`
/// - `net = baseline_spend - (bags * unit_cost + breakage_cost)`
///
/// The baseline spend uses the table's breakage rate for the baseline spec.
/// A spec missing from the breakage table is a configuration error.
pub fn project_packaging_impact(
    spec_gsm: u32,
    baseline: &PackagingBaseline,
) -> Result<PackagingProjection, EngineError> {
    let breakage_rate_pct = baseline.breakage_rate(spec_gsm)?;
    let baseline_breakage_pct = baseline.breakage_rate(baseline.baseline_spec_gsm)?;

    let gsm_delta = f64::from(baseline.baseline_spec_gsm) - f64::from(spec_gsm);
    let unit_cost_factor = 1.0 - gsm_delta * baseline.cost_slope_per_gsm;
    let unit_bag_cost = baseline.avg_bag_cost * unit_cost_factor;

    let breakage_cost = baseline.total_bags
        * (breakage_rate_pct / 100.0)
        * (unit_bag_cost + baseline.breakage_loss_per_bag);
    let total_spend = baseline.total_bags * unit_bag_cost + breakage_cost;

    let baseline_spend = baseline.total_bags * baseline.avg_bag_cost
        + baseline.total_bags
            * (baseline_breakage_pct / 100.0)
            * (baseline.avg_bag_cost + baseline.breakage_loss_per_bag);

    Ok(PackagingProjection {
        spec_gsm,
        breakage_rate_pct,
        unit_cost_factor,
        unit_bag_cost,
        breakage_cost,
        total_spend,
        baseline_spend,
        impact: CostImpact::from_net(baseline_spend - total_spend),
    })
}
