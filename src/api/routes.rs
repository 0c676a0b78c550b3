//! API route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, DashboardState};

/// Build the `/api/v2` router.
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        // System
        .route("/system/health", get(handlers::system_health))
        .route("/baseline", get(handlers::get_baseline))
        .route("/drivers", get(handlers::get_drivers))
        // Margin radar
        .route("/margin/waterfall", get(handlers::margin_waterfall))
        // Stateless projections
        .route("/scenario/financials", post(handlers::scenario_financials))
        .route("/scenario/raw-mix", post(handlers::scenario_raw_mix))
        .route("/scenario/clinker", post(handlers::scenario_clinker))
        .route("/scenario/packaging", post(handlers::scenario_packaging))
        .route("/scenario/power", post(handlers::scenario_power))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/sessions/:id/drivers",
            axum::routing::patch(handlers::update_session_drivers),
        )
        .route("/sessions/:id/reset", post(handlers::reset_session))
        // Insights
        .route("/insights/ask", post(handlers::ask_insight))
        .route("/insights/presets", get(handlers::insight_presets))
        .with_state(state)
}
