//! Core value types for the scenario projection engine.
//!
//! Everything here is an immutable value record rebuilt on every
//! recomputation. The only long-lived state is the driver values held by a
//! [`crate::session::ScenarioSession`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Guardrail Verdict
// ============================================================================

/// Quality classification of a projected blend.
///
/// Ordered by severity so threshold logic can use plain comparisons:
/// `Approved < QualityRisk < CriticalFail`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailVerdict {
    #[default]
    Approved = 0,
    QualityRisk = 1,
    CriticalFail = 2,
}

impl GuardrailVerdict {
    /// Whether product under this verdict can be sold at all.
    pub fn is_sellable(self) -> bool {
        self < GuardrailVerdict::CriticalFail
    }

    /// Operator-facing explanation shown next to the verdict.
    pub fn message(self) -> &'static str {
        match self {
            GuardrailVerdict::Approved => "Quality approved: strength within standard.",
            GuardrailVerdict::QualityRisk => "Quality risk: low safety margin for premium markets.",
            GuardrailVerdict::CriticalFail => {
                "Critical fail: predicted strength below standard. This mix is unsellable."
            }
        }
    }
}

impl std::fmt::Display for GuardrailVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardrailVerdict::Approved => write!(f, "APPROVED"),
            GuardrailVerdict::QualityRisk => write!(f, "QUALITY_RISK"),
            GuardrailVerdict::CriticalFail => write!(f, "CRITICAL_FAIL"),
        }
    }
}

// ============================================================================
// Cost Impact
// ============================================================================

/// Signed cost delta surfaced as either a saving or a loss.
///
/// Amounts are always non-negative; the variant carries the sign. A zero
/// delta is reported as `Savings(0.0)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum CostImpact {
    Savings(f64),
    Loss(f64),
}

impl CostImpact {
    /// Classify a signed delta where positive means cost went down.
    pub fn from_net(net: f64) -> Self {
        if net >= 0.0 {
            CostImpact::Savings(net)
        } else {
            CostImpact::Loss(-net)
        }
    }

    /// Signed value: positive for savings, negative for a loss.
    pub fn net(self) -> f64 {
        match self {
            CostImpact::Savings(v) => v,
            CostImpact::Loss(v) => -v,
        }
    }

    pub fn is_loss(self) -> bool {
        matches!(self, CostImpact::Loss(_))
    }

    pub fn label(self) -> &'static str {
        match self {
            CostImpact::Savings(_) => "savings",
            CostImpact::Loss(_) => "loss",
        }
    }
}

impl std::fmt::Display for CostImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostImpact::Savings(v) => write!(f, "savings {v:.0}"),
            CostImpact::Loss(v) => write!(f, "loss {v:.0}"),
        }
    }
}

// ============================================================================
// Mix Composition
// ============================================================================

/// Named component shares in percent.
///
/// Shares are expected to total 100 but raw user input may not; use
/// [`crate::projection_engine::normalize_mix`] before pricing a mix.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MixComposition {
    shares: BTreeMap<String, f64>,
}

impl MixComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literals in tests and defaults.
    #[must_use]
    pub fn with(mut self, component: impl Into<String>, share_pct: f64) -> Self {
        self.shares.insert(component.into(), share_pct);
        self
    }

    pub fn set(&mut self, component: impl Into<String>, share_pct: f64) {
        self.shares.insert(component.into(), share_pct);
    }

    pub fn get(&self, component: &str) -> Option<f64> {
        self.shares.get(component).copied()
    }

    pub fn contains(&self, component: &str) -> bool {
        self.shares.contains_key(component)
    }

    pub fn total(&self) -> f64 {
        self.shares.values().sum()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.shares.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.shares.keys().map(String::as_str)
    }

    /// Every share multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            shares: self
                .shares
                .iter()
                .map(|(k, v)| (k.clone(), v * factor))
                .collect(),
        }
    }
}

impl FromIterator<(String, f64)> for MixComposition {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            shares: iter.into_iter().collect(),
        }
    }
}

/// How the baseline side of a mix change is priced.
///
/// `Raw` prices the configured shares as they are, so a baseline that does
/// not total 100% carries its gap into every delta. `Normalized` rescales
/// the baseline first, which makes an untouched mix price to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePricing {
    #[default]
    Raw,
    Normalized,
}

/// Non-fatal issue found while normalizing a mix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MixWarning {
    /// Shares sum to zero; the mix was passed through unchanged and any
    /// cost computed from it is meaningless.
    ZeroTotal,
    /// Shares did not total 100% and were rescaled.
    OffTarget { total_pct: f64 },
}

impl std::fmt::Display for MixWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixWarning::ZeroTotal => write!(f, "mix shares total 0%; normalization skipped"),
            MixWarning::OffTarget { total_pct } => write!(
                f,
                "mix shares total {total_pct:.1}% (target 100%); calculations were normalized"
            ),
        }
    }
}

/// Outcome of normalizing a mix: the rescaled shares plus what was done.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedMix {
    pub mix: MixComposition,
    pub raw_total_pct: f64,
    pub factor: f64,
    pub warning: Option<MixWarning>,
}

// ============================================================================
// Projection Results
// ============================================================================

/// Result of the top-line P&L scenario.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FinancialProjection {
    pub revenue_impact: f64,
    pub fuel_impact: f64,
    pub net_profit: f64,
    pub gross_margin_pct: f64,
    /// Change in net profit against the unadjusted baseline.
    pub profit_delta: f64,
    /// Change in margin (percentage points) against the unadjusted baseline.
    pub margin_delta_pct: f64,
}

/// Result of re-pricing the raw meal composition.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RawMaterialProjection {
    pub baseline_cost_per_ton: f64,
    pub new_cost_per_ton: f64,
    /// The normalized shares actually priced.
    pub effective_mix: MixComposition,
    pub impact: CostImpact,
    pub mix_warning: Option<MixWarning>,
}

/// Result of moving the clinker factor.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ClinkerProjection {
    pub target_clinker_pct: f64,
    pub strength_penalty_mpa: f64,
    pub projected_strength_mpa: f64,
    pub verdict: GuardrailVerdict,
    /// Cost delta before the guardrail is applied.
    pub raw_impact: CostImpact,
    /// Credited cost delta; `Savings(0.0)` for `CriticalFail`.
    pub impact: CostImpact,
    /// Signed credited savings (`impact.net()`); always zero for `CriticalFail`.
    pub savings: f64,
}

/// Result of changing the paper bag specification.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PackagingProjection {
    pub spec_gsm: u32,
    pub breakage_rate_pct: f64,
    pub unit_cost_factor: f64,
    pub unit_bag_cost: f64,
    pub breakage_cost: f64,
    pub total_spend: f64,
    pub baseline_spend: f64,
    pub impact: CostImpact,
}

/// Result of shifting power generation between gas and HFO.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PowerProjection {
    pub gas_utilization_pct: f64,
    pub hfo_utilization_pct: f64,
    pub power_cost: f64,
    pub baseline_power_cost: f64,
    pub impact: CostImpact,
}

/// Every projection for one session snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScenarioReport {
    pub financials: FinancialProjection,
    pub raw_material: RawMaterialProjection,
    pub clinker: ClinkerProjection,
    pub packaging: PackagingProjection,
    pub power: PowerProjection,
}
