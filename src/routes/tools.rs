use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};

use crate::{
    dto::tools::ToolStockUpdateRequest,
    error::{AppResult, ErrorBody},
    middleware::policy::AccessPolicy,
    models::{Collection, Document},
    routes::params::{JsonBody, parse_id},
    state::AppState,
    store::{DeleteResult, Filter, InsertOneResult, Update, UpdateResult},
};

pub fn router(state: &AppState) -> Router<AppState> {
    use AccessPolicy::{Admin, Authenticated, Public};

    Router::new()
        .route("/tools", Public.protect(get(list_tools), state))
        .route(
            "/tool/{id}",
            Public
                .protect(get(get_tool), state)
                .merge(Admin.protect(delete(delete_tool), state)),
        )
        .route("/add-tool", Authenticated.protect(post(add_tool), state))
        .route("/update-tool/{id}", Public.protect(put(update_stock), state))
}

#[utoipa::path(
    get,
    path = "/tools",
    responses((status = 200, description = "All tools", body = Vec<serde_json::Value>)),
    tag = "Tools"
)]
pub async fn list_tools(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let tools = state.store.find_all(Collection::Tools).await?;
    Ok(Json(tools))
}

#[utoipa::path(
    get,
    path = "/tool/{id}",
    params(("id" = String, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Tool, or null when absent", body = serde_json::Value),
        (status = 400, description = "Malformed id", body = ErrorBody),
    ),
    tag = "Tools"
)]
pub async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<Document>>> {
    let id = parse_id(&id)?;
    let tool = state.store.find_one(Collection::Tools, &Filter::Id(id)).await?;
    Ok(Json(tool))
}

#[utoipa::path(
    post,
    path = "/add-tool",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Tool created", body = InsertOneResult),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Tools"
)]
pub async fn add_tool(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Document>,
) -> AppResult<Json<InsertOneResult>> {
    let result = state.store.insert_one(Collection::Tools, payload).await?;
    tracing::info!(tool_id = %result.inserted_id, "tool added");
    Ok(Json(result))
}

#[utoipa::path(
    put,
    path = "/update-tool/{id}",
    params(("id" = String, Path, description = "Tool ID")),
    request_body = ToolStockUpdateRequest,
    responses((status = 200, description = "Stock counters replaced", body = UpdateResult)),
    tag = "Tools"
)]
pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ToolStockUpdateRequest>,
) -> AppResult<Json<UpdateResult>> {
    let id = parse_id(&id)?;
    let result = state
        .store
        .update_one(
            Collection::Tools,
            &Filter::Id(id),
            Update::set(payload.into_fields()),
            false,
        )
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/tool/{id}",
    params(("id" = String, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Deletion result, zero when nothing matched", body = DeleteResult),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Tools"
)]
pub async fn delete_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let id = parse_id(&id)?;
    let result = state.store.delete_one(Collection::Tools, &Filter::Id(id)).await?;
    Ok(Json(result))
}
