//! Power generation arbitrage between gas and HFO.

use std::collections::BTreeMap;

use super::mix::price_mix_change;
use crate::config::PowerBaseline;
use crate::error::EngineError;
use crate::types::{BaselinePricing, CostImpact, MixComposition, PowerProjection};

const GAS: &str = "gas";
const HFO: &str = "hfo";

fn fuel_mix(gas_pct: f64) -> MixComposition {
    MixComposition::new().with(GAS, gas_pct).with(HFO, 100.0 - gas_pct)
}

/// Monthly generation cost at a given gas share, compared to the baseline share.
///
/// HFO covers whatever gas does not; the energy requirement is fixed.
pub fn project_power_arbitrage(
    gas_utilization_pct: f64,
    baseline: &PowerBaseline,
) -> Result<PowerProjection, EngineError> {
    let unit_costs: BTreeMap<String, f64> = [
        (GAS.to_string(), baseline.gas_cost_per_mmbtu),
        (HFO.to_string(), baseline.hfo_cost_per_mmbtu),
    ]
    .into_iter()
    .collect();

    let delta = price_mix_change(
        baseline.energy_requirement_mmbtu,
        &unit_costs,
        &fuel_mix(baseline.baseline_gas_pct),
        &fuel_mix(gas_utilization_pct),
        BaselinePricing::Raw,
    )?;

    Ok(PowerProjection {
        gas_utilization_pct,
        hfo_utilization_pct: 100.0 - gas_utilization_pct,
        power_cost: delta.new_cost_per_ton * baseline.energy_requirement_mmbtu,
        baseline_power_cost: delta.baseline_cost_per_ton * baseline.energy_requirement_mmbtu,
        impact: CostImpact::from_net(delta.net),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pilot_cost_at_baseline_share() {
        // 500k * (0.2 * 4.5 + 0.8 * 12.0) = 5.25M
        let p = project_power_arbitrage(20.0, &PowerBaseline::default()).expect("costed");
        assert!((p.power_cost - 5_250_000.0).abs() < 1e-3);
        assert!(p.impact.net().abs() < 1e-6);
        assert_eq!(p.hfo_utilization_pct, 80.0);
    }

    #[test]
    fn test_more_gas_saves() {
        // each point of gas saves 500k * 0.01 * 7.5 = 37.5k
        let p = project_power_arbitrage(40.0, &PowerBaseline::default()).expect("costed");
        assert!((p.impact.net() - 750_000.0).abs() < 1e-3);
        assert!(!p.impact.is_loss());
    }

    #[test]
    fn test_less_gas_is_a_loss() {
        let p = project_power_arbitrage(0.0, &PowerBaseline::default()).expect("costed");
        assert!(p.impact.is_loss());
        assert!((p.power_cost - 6_000_000.0).abs() < 1e-3);
    }
}
