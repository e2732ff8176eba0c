use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::users::{AdminRoleResponse, LoginResponse, ProfileUpdateRequest, UserRoleResponse},
    error::{AppResult, ErrorBody},
    middleware::{auth::AuthUser, policy::AccessPolicy},
    models::{Collection, Document, Role},
    routes::params::JsonBody,
    services::user_service,
    state::AppState,
    store::{Filter, UpdateResult},
};

pub fn router(state: &AppState) -> Router<AppState> {
    use AccessPolicy::{Admin, Public, SelfOnly};

    Router::new()
        .route("/users", Public.protect(get(list_users), state))
        .route("/users/{email}", Public.protect(put(login), state))
        .route("/user/{email}", Public.protect(get(get_user), state))
        .route("/update-user/{email}", Public.protect(put(update_profile), state))
        .route("/user-role/{email}", SelfOnly.protect(get(user_role), state))
        .route("/admin/{email}", SelfOnly.protect(get(admin_role), state))
        .route("/user/make-admin/{email}", Admin.protect(put(make_admin), state))
        .route("/user/remove-admin/{email}", Admin.protect(put(remove_admin), state))
}

#[utoipa::path(
    put,
    path = "/users/{email}",
    params(("email" = String, Path, description = "User email")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "User upserted, fresh token issued", body = LoginResponse)
    ),
    tag = "Users"
)]
pub async fn login(
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(payload): JsonBody<Document>,
) -> AppResult<Json<LoginResponse>> {
    let resp = user_service::login(&state, &email, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = Vec<serde_json::Value>)),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let users = state.store.find_all(Collection::Users).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/user/{email}",
    params(("email" = String, Path, description = "User email")),
    responses((status = 200, description = "User, or null when absent", body = serde_json::Value)),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Option<Document>>> {
    let user = state
        .store
        .find_one(Collection::Users, &Filter::email(email))
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/update-user/{email}",
    params(("email" = String, Path, description = "User email")),
    request_body = ProfileUpdateRequest,
    responses((status = 200, description = "Profile fields updated", body = UpdateResult)),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(payload): JsonBody<ProfileUpdateRequest>,
) -> AppResult<Json<UpdateResult>> {
    let result = user_service::update_profile(&state, &email, payload).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/user-role/{email}",
    params(("email" = String, Path, description = "Caller's own email")),
    responses(
        (status = 200, description = "Whether the caller is a plain user", body = UserRoleResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn user_role(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserRoleResponse>> {
    let is_user = state.authorizer.has_role(&user.email, Role::User).await?;
    Ok(Json(UserRoleResponse { user: is_user }))
}

#[utoipa::path(
    get,
    path = "/admin/{email}",
    params(("email" = String, Path, description = "Caller's own email")),
    responses(
        (status = 200, description = "Whether the caller is an admin", body = AdminRoleResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn admin_role(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<AdminRoleResponse>> {
    let admin = state.authorizer.has_role(&user.email, Role::Admin).await?;
    Ok(Json(AdminRoleResponse { admin }))
}

#[utoipa::path(
    put,
    path = "/user/make-admin/{email}",
    params(("email" = String, Path, description = "User to promote")),
    responses(
        (status = 200, description = "Role set to admin", body = UpdateResult),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn make_admin(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<UpdateResult>> {
    let result = user_service::set_role(&state, &email, Role::Admin).await?;
    Ok(Json(result))
}

#[utoipa::path(
    put,
    path = "/user/remove-admin/{email}",
    params(("email" = String, Path, description = "User to demote")),
    responses(
        (status = 200, description = "Role set back to user", body = UpdateResult),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn remove_admin(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<UpdateResult>> {
    let result = user_service::set_role(&state, &email, Role::User).await?;
    Ok(Json(result))
}
