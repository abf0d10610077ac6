//! HTTP handlers for the lodging and booking routes

use crate::booking::{CommitBookingRequest, PaymentIntentRequest};
use crate::core::error::{HavenError, HavenResult, RequestError, ValidationError};
use crate::core::lodging::NewLodging;
use crate::core::query::SearchCriteria;
use crate::server::host::ServerHost;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

pub type HostState = State<Arc<ServerHost>>;

fn parse_id(raw: &str) -> HavenResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        ValidationError::InvalidUuid {
            value: raw.to_string(),
        }
        .into()
    })
}

/// Accept any JSON body, then decode it into `T` so shape errors render as
/// validation errors rather than axum's plain-text rejections
fn decode_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> HavenResult<T> {
    let Json(value) = body.map_err(|e| RequestError::InvalidBody {
        message: e.body_text(),
    })?;

    serde_json::from_value(value).map_err(|e| {
        ValidationError::InvalidJson {
            message: e.to_string(),
        }
        .into()
    })
}

/// GET /api/hotels/search
pub async fn search(
    State(host): HostState,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, HavenError> {
    let Query(pairs) = query.map_err(|e| RequestError::InvalidQuery {
        message: e.body_text(),
    })?;

    let criteria = SearchCriteria::from_query_pairs(&pairs)?;
    let response = host.catalog.search(&criteria).await?;

    Ok(Json(response))
}

/// GET /api/hotels
pub async fn list_hotels(State(host): HostState) -> Result<impl IntoResponse, HavenError> {
    Ok(Json(host.catalog.latest().await?))
}

/// GET /api/hotels/{id}
pub async fn get_hotel(
    State(host): HostState,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HavenError> {
    let id = parse_id(&id)?;
    Ok(Json(host.catalog.get(id).await?))
}

/// POST /api/hotels/{id}/bookings/payment-intent
pub async fn create_payment_intent(
    State(host): HostState,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, HavenError> {
    let user_id = host.require_user(&headers).await?;
    let hotel_id = parse_id(&id)?;
    let request: PaymentIntentRequest = decode_body(body)?;
    let nights = request.nights()?;

    let response = host
        .engine
        .create_authorization(hotel_id, nights, &user_id)
        .await?;

    Ok(Json(response))
}

/// POST /api/hotels/{id}/bookings
pub async fn commit_booking(
    State(host): HostState,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, HavenError> {
    let user_id = host.require_user(&headers).await?;
    let hotel_id = parse_id(&id)?;
    let request: CommitBookingRequest = decode_body(body)?;

    let receipt = host
        .engine
        .commit_booking(hotel_id, request, &user_id)
        .await?;

    Ok(Json(receipt))
}

/// GET /api/my-bookings
pub async fn my_bookings(
    State(host): HostState,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HavenError> {
    let user_id = host.require_user(&headers).await?;
    Ok(Json(host.catalog.bookings_for(&user_id).await?))
}

/// POST /api/my-hotels
pub async fn create_my_hotel(
    State(host): HostState,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, HavenError> {
    let user_id = host.require_user(&headers).await?;
    let listing: NewLodging = decode_body(body)?;

    let record = host.catalog.list_lodging(&user_id, listing).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /health
pub async fn health(State(host): HostState) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "haven",
        "storage": host.backend_name(),
        "gateway": host.gateway_name(),
    }))
}
