use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use models::Customer;
use serde::Deserialize;
use service::errors::ServiceError;
use tracing::{debug, info};

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

fn path_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ServiceError> {
    path.map(|Path(id)| id)
        .map_err(|e| ServiceError::InvalidInput(e.body_text()))
}

/// `null` bodies come through as `None`; unreadable bodies are invalid input.
fn body(json: Result<Json<Option<Customer>>, JsonRejection>) -> Result<Option<Customer>, ServiceError> {
    json.map(|Json(c)| c)
        .map_err(|e| ServiceError::InvalidInput(e.body_text()))
}

/// `GET /api/customers`
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Customer>>, JsonApiError> {
    let customers = state.customers.list().await?;
    Ok(Json(customers))
}

/// `GET /api/customers/:id`
pub async fn get(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Customer>, JsonApiError> {
    let id = path_id(path)?;
    match state.customers.get_by_id(id).await? {
        Some(c) => Ok(Json(c)),
        None => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", None)),
    }
}

/// `POST /api/customers` → 201 with `Location` pointing at the new record.
pub async fn create(
    State(state): State<ServerState>,
    json: Result<Json<Option<Customer>>, JsonRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let created = state.customers.create(body(json)?).await?;
    let location = format!("/api/customers/{}", created.id);
    info!(customer_id = created.id, %location, "customer_create_request");
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// `PATCH /api/customers/:id` → 204, also when there was no record to update.
pub async fn update(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
    json: Result<Json<Option<Customer>>, JsonRejection>,
) -> Result<StatusCode, JsonApiError> {
    let id = path_id(path)?;
    state.customers.update(id, body(json)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/customers/:id`
pub async fn delete(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let id = path_id(path)?;
    state.customers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/customers/search?name=` never rejects the query; a bad or missing `name` matches all.
pub async fn search(
    State(state): State<ServerState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Customer>>, JsonApiError> {
    let q = query.map(|Query(q)| q).unwrap_or_default();
    debug!(name = ?q.name, "customer_search_request");
    let hits = state.customers.search_by_name(q.name.as_deref()).await?;
    Ok(Json(hits))
}
