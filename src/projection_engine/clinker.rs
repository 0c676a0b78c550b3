//! Clinker factor optimization with a strength guardrail.
//!
//! Replacing clinker with cheaper additive saves money but costs strength.
//! The guardrail verdict decides whether the saving can be credited at all.

use std::collections::BTreeMap;

use super::mix::price_mix_change;
use crate::config::{ClinkerBaseline, GuardrailThresholds};
use crate::error::EngineError;
use crate::types::{
    BaselinePricing, ClinkerProjection, CostImpact, GuardrailVerdict, MixComposition,
};

const CLINKER: &str = "clinker";
const ADDITIVE: &str = "additive";

/// Classify a projected 28-day strength.
///
/// Thresholds are strict: a strength exactly at the critical threshold is
/// `QualityRisk`, exactly at the warning threshold is `Approved`.
pub fn classify_strength(strength_mpa: f64, thresholds: &GuardrailThresholds) -> GuardrailVerdict {
    if strength_mpa < thresholds.critical_strength_mpa {
        GuardrailVerdict::CriticalFail
    } else if strength_mpa < thresholds.warning_strength_mpa {
        GuardrailVerdict::QualityRisk
    } else {
        GuardrailVerdict::Approved
    }
}

fn blend(clinker_pct: f64) -> MixComposition {
    MixComposition::new()
        .with(CLINKER, clinker_pct)
        .with(ADDITIVE, 100.0 - clinker_pct)
}

/// Project strength, verdict and savings for a target clinker factor.
///
/// `strength = baseline_strength - (baseline_clinker - target) * slope`.
/// Savings are priced as a two-component clinker/additive mix over the
/// cement volume. A `CriticalFail` blend is unsellable, so its savings are
/// forced to zero whatever the cost delta.
pub fn project_clinker_factor_impact(
    target_clinker_pct: f64,
    baseline: &ClinkerBaseline,
    thresholds: &GuardrailThresholds,
) -> Result<ClinkerProjection, EngineError> {
    let strength_penalty_mpa =
        (baseline.baseline_clinker_pct - target_clinker_pct) * baseline.strength_slope_mpa_per_pct;
    let projected_strength_mpa = baseline.baseline_strength_mpa - strength_penalty_mpa;
    let verdict = classify_strength(projected_strength_mpa, thresholds);

    let unit_costs: BTreeMap<String, f64> = [
        (CLINKER.to_string(), baseline.clinker_cost_per_ton),
        (ADDITIVE.to_string(), baseline.additive_cost_per_ton),
    ]
    .into_iter()
    .collect();
    let delta = price_mix_change(
        baseline.cement_volume_tons,
        &unit_costs,
        &blend(baseline.baseline_clinker_pct),
        &blend(target_clinker_pct),
        BaselinePricing::Raw,
    )?;

    let raw_impact = CostImpact::from_net(delta.net);
    let impact = if verdict.is_sellable() {
        raw_impact
    } else {
        CostImpact::Savings(0.0)
    };

    Ok(ClinkerProjection {
        target_clinker_pct,
        strength_penalty_mpa,
        projected_strength_mpa,
        verdict,
        raw_impact,
        impact,
        savings: impact.net(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(target: f64) -> ClinkerProjection {
        project_clinker_factor_impact(
            target,
            &ClinkerBaseline::default(),
            &GuardrailThresholds::default(),
        )
        .expect("clinker blend is always costed")
    }

    #[test]
    fn test_pilot_target_72_is_approved() {
        let p = project(72.0);
        assert!((p.strength_penalty_mpa - 6.66).abs() < 1e-9);
        assert!((p.projected_strength_mpa - 46.34).abs() < 1e-9);
        assert_eq!(p.verdict, GuardrailVerdict::Approved);
        assert!(p.savings > 0.0);
    }

    #[test]
    fn test_savings_match_spend_difference() {
        // base: 135686 * (0.831*35 + 0.169*2.5); new at 80%: 135686 * (0.80*35 + 0.20*2.5)
        let p = project(80.0);
        let base = 135_686.0 * (0.831 * 35.0 + 0.169 * 2.5);
        let new = 135_686.0 * (0.80 * 35.0 + 0.20 * 2.5);
        assert!((p.savings - (base - new)).abs() < 1e-6);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let t = GuardrailThresholds::default();
        assert_eq!(classify_strength(45.0, &t), GuardrailVerdict::Approved);
        assert_eq!(classify_strength(44.999, &t), GuardrailVerdict::QualityRisk);
        assert_eq!(classify_strength(42.5, &t), GuardrailVerdict::QualityRisk);
        assert_eq!(classify_strength(42.499, &t), GuardrailVerdict::CriticalFail);
    }

    #[test]
    fn test_critical_fail_forces_zero_savings() {
        let steep = ClinkerBaseline {
            strength_slope_mpa_per_pct: 1.2,
            ..ClinkerBaseline::default()
        };
        let p = project_clinker_factor_impact(72.0, &steep, &GuardrailThresholds::default())
            .expect("costed");
        // 53.0 - 11.1 * 1.2 = 39.68
        assert_eq!(p.verdict, GuardrailVerdict::CriticalFail);
        assert!(matches!(p.raw_impact, CostImpact::Savings(v) if v > 0.0));
        assert_eq!(p.savings, 0.0);
        assert_eq!(p.impact, CostImpact::Savings(0.0));
    }

    #[test]
    fn test_critical_fail_zero_even_when_delta_negative() {
        // Raising clinker costs money; a weak baseline still fails the guardrail
        let weak = ClinkerBaseline {
            baseline_strength_mpa: 40.0,
            ..ClinkerBaseline::default()
        };
        let p = project_clinker_factor_impact(85.0, &weak, &GuardrailThresholds::default())
            .expect("costed");
        assert_eq!(p.verdict, GuardrailVerdict::CriticalFail);
        assert!(p.raw_impact.is_loss());
        assert_eq!(p.savings, 0.0);
    }

    #[test]
    fn test_quality_risk_still_credits_savings() {
        // 53.0 - (83.1 - t) * 0.6 < 45.0  =>  t < 69.77; use a steeper slope instead
        let steeper = ClinkerBaseline {
            strength_slope_mpa_per_pct: 0.8,
            ..ClinkerBaseline::default()
        };
        // 53.0 - 11.1 * 0.8 = 44.12
        let p = project_clinker_factor_impact(72.0, &steeper, &GuardrailThresholds::default())
            .expect("costed");
        assert_eq!(p.verdict, GuardrailVerdict::QualityRisk);
        assert!(p.savings > 0.0);
    }

    #[test]
    fn test_baseline_target_has_no_penalty_or_savings() {
        let p = project(83.1);
        assert_eq!(p.strength_penalty_mpa, 0.0);
        assert_eq!(p.verdict, GuardrailVerdict::Approved);
        assert!(p.savings.abs() < 1e-9);
    }
}
