//! Mix normalization and pricing.
//!
//! A new mix is always normalized before pricing. The baseline mix is
//! priced as configured unless the caller asks for it to be normalized too.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::defaults::MIX_TOTAL_TOLERANCE_PCT;
use crate::error::EngineError;
use crate::types::{
    BaselinePricing, CostImpact, MixComposition, MixWarning, NormalizedMix, RawMaterialProjection,
};

/// Rescale shares so they total 100%.
///
/// `factor = 100 / sum`. A zero-sum mix is returned unchanged (factor 1);
/// use [`normalize_with_report`] to see the warning.
pub fn normalize_mix(shares: &MixComposition) -> MixComposition {
    normalize_with_report(shares).mix
}

/// Normalize and report the raw total, the factor applied and any warning.
pub fn normalize_with_report(shares: &MixComposition) -> NormalizedMix {
    let raw_total_pct = shares.total();

    if raw_total_pct == 0.0 {
        return NormalizedMix {
            mix: shares.clone(),
            raw_total_pct,
            factor: 1.0,
            warning: Some(MixWarning::ZeroTotal),
        };
    }

    let factor = 100.0 / raw_total_pct;
    let warning = ((raw_total_pct - 100.0).abs() > MIX_TOTAL_TOLERANCE_PCT)
        .then_some(MixWarning::OffTarget { total_pct: raw_total_pct });

    NormalizedMix {
        mix: shares.scaled(factor),
        raw_total_pct,
        factor,
        warning,
    }
}

/// Weighted cost per ton of a mix given in percent shares.
///
/// Every component in the mix must have a unit cost.
pub fn cost_per_ton(
    mix: &MixComposition,
    unit_costs: &BTreeMap<String, f64>,
) -> Result<f64, EngineError> {
    mix.iter().try_fold(0.0, |acc, (component, share_pct)| {
        let unit_cost = unit_costs
            .get(component)
            .ok_or_else(|| EngineError::MissingUnitCost(component.to_string()))?;
        Ok(acc + share_pct / 100.0 * unit_cost)
    })
}

/// Cost comparison of two mixes over the same tonnage.
#[derive(Debug, Clone, PartialEq)]
pub struct MixCostDelta {
    pub baseline_cost_per_ton: f64,
    pub new_cost_per_ton: f64,
    /// Normalized new mix that was priced.
    pub effective_mix: MixComposition,
    pub warning: Option<MixWarning>,
    /// `(baseline - new) * tonnage`; positive means cheaper.
    pub net: f64,
}

/// Price a change from `baseline_mix` to `new_mix` over `tonnage`.
///
/// `new_mix` is always normalized. With [`BaselinePricing::Raw`] a baseline
/// whose shares miss 100% is priced as is, so even an untouched mix shows
/// the normalization gap as a delta.
pub fn price_mix_change(
    tonnage: f64,
    unit_costs: &BTreeMap<String, f64>,
    baseline_mix: &MixComposition,
    new_mix: &MixComposition,
    baseline_pricing: BaselinePricing,
) -> Result<MixCostDelta, EngineError> {
    let baseline_cost_per_ton = match baseline_pricing {
        BaselinePricing::Raw => cost_per_ton(baseline_mix, unit_costs)?,
        BaselinePricing::Normalized => cost_per_ton(&normalize_mix(baseline_mix), unit_costs)?,
    };

    let normalized = normalize_with_report(new_mix);
    match normalized.warning {
        Some(MixWarning::ZeroTotal) => {
            warn!("Mix shares total 0%, pricing an empty mix");
        }
        Some(MixWarning::OffTarget { total_pct }) => {
            debug!(total_pct, factor = normalized.factor, "Mix off target, normalized");
        }
        None => {}
    }
    let new_cost_per_ton = cost_per_ton(&normalized.mix, unit_costs)?;

    Ok(MixCostDelta {
        baseline_cost_per_ton,
        new_cost_per_ton,
        net: (baseline_cost_per_ton - new_cost_per_ton) * tonnage,
        effective_mix: normalized.mix,
        warning: normalized.warning,
    })
}

/// Savings (or loss) from moving the raw meal to `new_mix`.
pub fn project_raw_material_savings(
    total_tonnage: f64,
    unit_costs: &BTreeMap<String, f64>,
    baseline_mix: &MixComposition,
    new_mix: &MixComposition,
    baseline_pricing: BaselinePricing,
) -> Result<RawMaterialProjection, EngineError> {
    let delta = price_mix_change(total_tonnage, unit_costs, baseline_mix, new_mix, baseline_pricing)?;
    Ok(RawMaterialProjection {
        baseline_cost_per_ton: delta.baseline_cost_per_ton,
        new_cost_per_ton: delta.new_cost_per_ton,
        effective_mix: delta.effective_mix,
        impact: CostImpact::from_net(delta.net),
        mix_warning: delta.warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawMaterialBaseline;

    fn raw_mix(limestone: f64, clay: f64, iron_ore: f64) -> MixComposition {
        MixComposition::new()
            .with("limestone", limestone)
            .with("clay", clay)
            .with("iron_ore", iron_ore)
    }

    #[test]
    fn test_normalized_mix_sums_to_100() {
        for mix in [
            raw_mix(90.0, 8.0, 2.0),
            raw_mix(95.0, 15.0, 5.0),
            raw_mix(80.0, 5.0, 0.0),
            raw_mix(0.3, 0.2, 0.1),
            raw_mix(1e6, 3.0, 7.5),
        ] {
            let total = normalize_mix(&mix).total();
            assert!((total - 100.0).abs() < 1e-6, "total {total} for {mix:?}");
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_mix(&raw_mix(93.0, 12.0, 4.0));
        let twice = normalize_mix(&once);
        for (component, share) in once.iter() {
            let again = twice.get(component).expect("component kept");
            assert!((share - again).abs() < 1e-9);
        }
        assert!(normalize_with_report(&once).warning.is_none());
    }

    #[test]
    fn test_zero_total_is_identity_with_warning() {
        let zero = raw_mix(0.0, 0.0, 0.0);
        let report = normalize_with_report(&zero);
        assert_eq!(report.mix, zero);
        assert_eq!(report.factor, 1.0);
        assert_eq!(report.warning, Some(MixWarning::ZeroTotal));
    }

    #[test]
    fn test_off_target_warning_respects_tolerance() {
        let close = normalize_with_report(&raw_mix(90.0, 8.0, 2.05));
        assert!(close.warning.is_none());
        let off = normalize_with_report(&raw_mix(95.0, 8.0, 2.0));
        assert_eq!(off.warning, Some(MixWarning::OffTarget { total_pct: 105.0 }));
    }

    fn project(new_mix: &MixComposition, pricing: BaselinePricing) -> RawMaterialProjection {
        let rm = RawMaterialBaseline::default();
        project_raw_material_savings(rm.total_tonnage, &rm.unit_costs, &rm.baseline_mix(), new_mix, pricing)
            .expect("all components costed")
    }

    #[test]
    fn test_untouched_mix_shows_normalization_gap() {
        // Pilot baseline shares total 99.907%; the raw baseline is cheaper
        // than the same mix rescaled to 100%.
        let baseline = RawMaterialBaseline::default().baseline_mix();
        let p = project(&baseline, BaselinePricing::Raw);
        assert!((p.baseline_cost_per_ton - 2.666_105_151_7).abs() < 1e-9);
        assert!((p.new_cost_per_ton - 2.668_584_019_9).abs() < 1e-9);
        assert!(p.impact.is_loss());
        assert!((p.impact.net() + 7_632.15).abs() < 0.01);
    }

    #[test]
    fn test_normalized_baseline_prices_untouched_mix_at_zero() {
        let baseline = RawMaterialBaseline::default().baseline_mix();
        let p = project(&baseline, BaselinePricing::Normalized);
        assert!(p.impact.net().abs() < 1e-6);
    }

    #[test]
    fn test_pilot_target_mix_delta() {
        let p = project(&raw_mix(90.0, 8.0, 2.0), BaselinePricing::Raw);
        assert!((p.new_cost_per_ton - 2.7264).abs() < 1e-12);
        assert!((p.impact.net() + 185_640.90).abs() < 0.01);
    }

    #[test]
    fn test_less_iron_ore_saves_money() {
        let p = project(&raw_mix(91.0, 8.0, 1.0), BaselinePricing::Raw);
        assert!(matches!(p.impact, crate::types::CostImpact::Savings(v) if v > 0.0));
        assert!(p.new_cost_per_ton < p.baseline_cost_per_ton);
    }

    #[test]
    fn test_more_iron_ore_is_a_loss_not_negative_savings() {
        let p = project(&raw_mix(86.0, 9.0, 5.0), BaselinePricing::Raw);
        assert!(p.impact.is_loss());
        assert!(p.impact.net() < 0.0);
    }

    #[test]
    fn test_unpriced_component_is_configuration_error() {
        let rm = RawMaterialBaseline::default();
        let mix = raw_mix(90.0, 8.0, 1.0).with("slag", 1.0);
        let err = project_raw_material_savings(
            rm.total_tonnage,
            &rm.unit_costs,
            &rm.baseline_mix(),
            &mix,
            BaselinePricing::Raw,
        )
        .expect_err("slag has no unit cost");
        assert_eq!(err, EngineError::MissingUnitCost("slag".into()));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_cost_per_ton_weighted_average() {
        let costs: BTreeMap<String, f64> =
            [("a".to_string(), 10.0), ("b".to_string(), 20.0)].into_iter().collect();
        let mix = MixComposition::new().with("a", 50.0).with("b", 50.0);
        let cost = cost_per_ton(&mix, &costs).expect("costed");
        assert!((cost - 15.0).abs() < 1e-12);
    }
}
