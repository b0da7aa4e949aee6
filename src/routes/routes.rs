//! Defines routes for the map record API.
//!
//! ## Structure
//! - **Record endpoints**
//!   - `GET  /all`    — list every record
//!   - `GET  /one`    — fetch one record by `?id=` or `?name=`
//!   - `POST /create` — insert a record, server generates `object_id`
//!   - `POST /update` — overwrite `map`/`uri` of a record
//!
//! - **Probes**
//!   - `GET /healthz`, `GET /readyz`
//!
//! CORS is open to every origin on every route.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        map_handlers::{create_map, get_map, list_maps, update_map},
    },
    services::map_service::MapService,
};
use axum::{
    Router,
    extract::Request,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

/// Build the router for all record routes.
///
/// The router carries shared state (`MapService`) to all handlers.
pub fn routes() -> Router<MapService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/all", get(list_maps))
        .route("/one", get(get_map))
        .route("/create", post(create_map))
        .route("/update", post(update_map))
}

/// The complete application: routes, state, CORS and request tracing.
pub fn app(service: MapService) -> Router {
    routes()
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
        .with_state(service)
}
