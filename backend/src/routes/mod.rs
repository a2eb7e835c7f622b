//! Route definitions for the godown inventory API

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::{
    handlers,
    middleware::{admin_middleware, auth_middleware},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Admin portal (Basic auth)
        .nest("/admin", admin_routes(state.clone()))
        // Protected routes - warehouse structure
        .nest("/godowns", godown_routes(state.clone()))
        .nest("/unit-types", unit_type_routes(state.clone()))
        .nest("/companies", company_routes(state.clone()))
        .nest("/products", product_routes(state.clone()))
        // Protected routes - stock ledger
        .nest("/movements", movement_routes(state.clone()))
        // Protected routes - reports, dashboard and alerts
        .nest("/reports", report_routes(state.clone()))
        .merge(insight_routes(state))
}

/// Godown routes (protected)
fn godown_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_godowns).post(handlers::create_godown),
        )
        .route(
            "/:id",
            get(handlers::get_godown)
                .put(handlers::update_godown)
                .delete(handlers::delete_godown),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Unit type routes (protected)
fn unit_type_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_unit_types).post(handlers::create_unit_type),
        )
        .route(
            "/:id",
            get(handlers::get_unit_type)
                .put(handlers::update_unit_type)
                .delete(handlers::delete_unit_type),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Company routes (protected)
fn company_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route(
            "/:id",
            get(handlers::get_company)
                .put(handlers::update_company)
                .delete(handlers::delete_company),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Product routes (protected)
fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock movement routes (protected)
fn movement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::create_movement),
        )
        .route(
            "/:id",
            patch(handlers::update_movement).delete(handlers::delete_movement),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Report routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_report))
        .route("/closing-stock", get(handlers::get_closing_stock_report))
        .route("/current-stock", get(handlers::get_current_stock_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard and alert routes (protected)
fn insight_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route(
            "/alert-settings",
            get(handlers::get_alert_settings).post(handlers::save_alert_settings),
        )
        .route("/alerts", get(handlers::list_alerts))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin routes (Basic auth)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/overview", get(handlers::get_overview))
        .route_layer(middleware::from_fn_with_state(state, admin_middleware))
}
