//! HTTP handlers for map record operations.
//! Bodies are read raw so that an empty body can be told apart from a
//! malformed one; validation then happens in `models::requests`.

use crate::{
    errors::AppError,
    models::{
        map_record::MapRecord,
        requests::{CreateMapRequest, GetOneQuery, UpdateMapRequest, parse_json_body},
    },
    services::map_service::MapService,
};
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use bytes::Bytes;
use serde_json::json;

/// `GET /all` — every record, unpaginated.
pub async fn list_maps(
    State(service): State<MapService>,
) -> Result<Json<Vec<MapRecord>>, AppError> {
    Ok(Json(service.list_all().await?))
}

/// `GET /one?id=` or `GET /one?name=` — a single record; `id` wins.
/// A repeated key keeps its first value.
pub async fn get_map(
    State(service): State<MapService>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<MapRecord>, AppError> {
    let selector = GetOneQuery::from_pairs(pairs).into_selector()?;
    Ok(Json(service.get_one(selector).await?))
}

/// `POST /create` — insert a record; responds `{"result": <record>}`.
pub async fn create_map(
    State(service): State<MapService>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req = parse_json_body::<CreateMapRequest>(&body)?.validate()?;
    let created = service.create(req).await?;
    Ok(Json(json!({ "result": created })))
}

/// `POST /update` — overwrite `map`/`uri`; responds `{"error": null}`.
pub async fn update_map(
    State(service): State<MapService>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req = parse_json_body::<UpdateMapRequest>(&body)?.validate()?;
    service.update(req).await?;
    Ok(Json(json!({ "error": null })))
}
