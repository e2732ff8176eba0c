use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};

use crate::{
    dto::orders::{OrderStatusRequest, PaymentCompletion},
    error::{AppResult, ErrorBody},
    middleware::policy::AccessPolicy,
    models::{Collection, Document},
    routes::params::{JsonBody, parse_id},
    services::order_service,
    state::AppState,
    store::{DeleteResult, Filter, InsertOneResult, UpdateResult},
};

pub fn router(state: &AppState) -> Router<AppState> {
    use AccessPolicy::{Admin, Authenticated, Public, SelfOnly};

    Router::new()
        .route("/orders", Admin.protect(get(list_orders), state))
        .route(
            "/order/{id}",
            Authenticated
                .protect(get(get_order).patch(complete_payment), state)
                .merge(Public.protect(delete(delete_order), state)),
        )
        .route("/orders/{email}", SelfOnly.protect(get(orders_by_email), state))
        .route("/add-order", Public.protect(post(add_order), state))
        .route("/update-order/{id}", Admin.protect(put(update_status), state))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = Vec<serde_json::Value>),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let orders = state.store.find_all(Collection::Orders).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/order/{id}",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order, or null when absent", body = serde_json::Value),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<Document>>> {
    let id = parse_id(&id)?;
    let order = state.store.find_one(Collection::Orders, &Filter::Id(id)).await?;
    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/orders/{email}",
    params(("email" = String, Path, description = "Caller's own email")),
    responses(
        (status = 200, description = "Orders placed by the caller", body = Vec<serde_json::Value>),
        (status = 403, description = "Email does not match the token", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn orders_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    let orders = state
        .store
        .find_many(Collection::Orders, &Filter::email(email))
        .await?;
    Ok(Json(orders))
}

#[utoipa::path(
    post,
    path = "/add-order",
    request_body = serde_json::Value,
    responses((status = 200, description = "Order placed", body = InsertOneResult)),
    tag = "Orders"
)]
pub async fn add_order(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Document>,
) -> AppResult<Json<InsertOneResult>> {
    let result = state.store.insert_one(Collection::Orders, payload).await?;
    tracing::info!(order_id = %result.inserted_id, "order placed");
    Ok(Json(result))
}

#[utoipa::path(
    patch,
    path = "/order/{id}",
    params(("id" = String, Path, description = "Order ID")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Order marked paid and payment recorded", body = PaymentCompletion),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn complete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Document>,
) -> AppResult<Json<PaymentCompletion>> {
    let id = parse_id(&id)?;
    let resp = order_service::complete_payment(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/update-order/{id}",
    params(("id" = String, Path, description = "Order ID")),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Order status set", body = UpdateResult),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<OrderStatusRequest>,
) -> AppResult<Json<UpdateResult>> {
    let id = parse_id(&id)?;
    let result = order_service::update_status(&state, id, payload.status).await?;
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/order/{id}",
    params(("id" = String, Path, description = "Order ID")),
    responses((status = 200, description = "Deletion result", body = DeleteResult)),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let id = parse_id(&id)?;
    let result = state.store.delete_one(Collection::Orders, &Filter::Id(id)).await?;
    Ok(Json(result))
}
