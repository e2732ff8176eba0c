use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    error::AppResult,
    middleware::policy::AccessPolicy,
    models::{Collection, Document},
    routes::params::JsonBody,
    state::AppState,
    store::InsertOneResult,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/reviews", AccessPolicy::Public.protect(get(list_reviews), state))
        .route("/add-review", AccessPolicy::Public.protect(post(add_review), state))
}

#[utoipa::path(
    get,
    path = "/reviews",
    responses((status = 200, description = "All reviews", body = Vec<serde_json::Value>)),
    tag = "Reviews"
)]
pub async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let reviews = state.store.find_all(Collection::Reviews).await?;
    Ok(Json(reviews))
}

#[utoipa::path(
    post,
    path = "/add-review",
    request_body = serde_json::Value,
    responses((status = 200, description = "Review stored", body = InsertOneResult)),
    tag = "Reviews"
)]
pub async fn add_review(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Document>,
) -> AppResult<Json<InsertOneResult>> {
    let result = state.store.insert_one(Collection::Reviews, payload).await?;
    Ok(Json(result))
}
