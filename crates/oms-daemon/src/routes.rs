//! Axum router and all HTTP handlers for oms-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.
//!
//! Each handler is one short-lived unit of work: validate the input shape,
//! run the database operation, map the result. No retries, no background
//! work, no queues.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    api_types::{CreateOrderRequest, HealthResponse, ListOrdersParams, UpdateStatusRequest},
    error::ApiError,
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/orders", get(list_orders).post(create_order))
        .route("/v1/orders/:id", get(get_order))
        .route("/v1/orders/:id/status", post(update_status))
        .with_state(state)
}

/// Parse a path segment as an order id. A malformed id is a validation
/// failure, not a not-found.
fn parse_order_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::validation("id", format!("not a valid order id: `{raw}`")))
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/orders/:id
// ---------------------------------------------------------------------------

/// Fetch one order with its line items eagerly loaded. No side effects.
pub(crate) async fn get_order(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = oms_db::fetch_order(&st.pool, order_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok((StatusCode::OK, Json(order)))
}

// ---------------------------------------------------------------------------
// GET /v1/orders
// ---------------------------------------------------------------------------

/// Paginated list, newest first. The page fetch and the total count are
/// independent reads; the pair may be inconsistent under concurrent writes,
/// which is acceptable for this domain.
pub(crate) async fn list_orders(
    State(st): State<Arc<AppState>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = params.resolve()?;

    let page_result = oms_db::fetch_orders_page(&st.pool, page, limit).await?;

    Ok((StatusCode::OK, Json(page_result)))
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

/// Atomic nested create: the order row and all line-item rows are inserted
/// in one transaction. Status is always PENDING on creation.
pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = req.validate()?;

    let created = oms_db::create_order(&st.pool, &new).await?;

    info!(order_id = %created.order.id, items = created.order_line_items.len(), "orders/create");
    Ok((StatusCode::CREATED, Json(created)))
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:id/status
// ---------------------------------------------------------------------------

/// Unconditional status overwrite. Any status may move to any other status;
/// no transition legality check. Not-found if the id matches no row.
pub(crate) async fn update_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status = req.parse_status()?;

    let updated = oms_db::update_order_status(&st.pool, order_id, status)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(order_id = %order_id, status = status.as_str(), "orders/update_status");
    Ok((StatusCode::OK, Json(updated)))
}
