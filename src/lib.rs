//! Margin Defense: cement plant cost-margin scenario engine
//!
//! What-if projections behind the margin defense dashboard: driver sliders
//! feed normalized shares into cost and margin projections, and the
//! clinker projection is gated by a strength guardrail.
//!
//! ## Architecture
//!
//! - **Projection Engine**: Pure calculations (financials, raw mix, clinker
//!   factor, packaging, power arbitrage, margin waterfall)
//! - **Sessions**: Per-user driver values with range enforcement
//! - **Config**: Baseline figures and thresholds from TOML
//! - **Insights**: Closed topic lookup for executive questions
//! - **API**: Axum HTTP surface

pub mod api;
pub mod config;
pub mod error;
pub mod insights;
pub mod projection_engine;
pub mod session;
pub mod types;

// Re-export plant configuration
pub use config::PlantConfig;

// Re-export commonly used types
pub use error::{EngineError, ErrorKind};
pub use types::{
    BaselinePricing, ClinkerProjection, CostImpact, FinancialProjection, GuardrailVerdict,
    MixComposition, MixWarning, PackagingProjection, PowerProjection, RawMaterialProjection,
    ScenarioReport,
};

// Re-export sessions
pub use session::{Driver, DriverUpdate, RangePolicy, ScenarioSession};
