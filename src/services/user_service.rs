use serde_json::Value;

use crate::{
    dto::users::{LoginResponse, ProfileUpdateRequest},
    error::AppResult,
    models::{Collection, Document, EMAIL_FIELD, ID_FIELD, ROLE_FIELD, Role},
    state::AppState,
    store::{Filter, Update, UpdateResult},
};

/// Creates the user on first login, merges the submitted fields otherwise, and
/// always hands back a fresh token.
pub async fn login(state: &AppState, email: &str, mut payload: Document) -> AppResult<LoginResponse> {
    // Roles only change through the admin endpoints.
    payload.remove(ROLE_FIELD);
    payload.remove(ID_FIELD);
    payload.insert(EMAIL_FIELD.into(), Value::String(email.to_string()));

    let result = state
        .store
        .update_one(
            Collection::Users,
            &Filter::email(email),
            Update::set(payload).on_insert(new_user_defaults()),
            true,
        )
        .await?;

    let token = state.tokens.issue(email)?;
    tracing::info!(email = %email, created = result.upserted_count > 0, "user signed in");

    Ok(LoginResponse { result, token })
}

pub async fn update_profile(
    state: &AppState,
    email: &str,
    payload: ProfileUpdateRequest,
) -> AppResult<UpdateResult> {
    state
        .store
        .update_one(
            Collection::Users,
            &Filter::email(email),
            Update::set(payload.into_fields()).on_insert(new_user_defaults()),
            true,
        )
        .await
}

pub async fn set_role(state: &AppState, email: &str, role: Role) -> AppResult<UpdateResult> {
    let mut fields = Document::new();
    fields.insert(ROLE_FIELD.into(), Value::String(role.as_str().into()));

    let result = state
        .store
        .update_one(Collection::Users, &Filter::email(email), Update::set(fields), false)
        .await?;
    tracing::info!(email = %email, role = role.as_str(), matched = result.matched_count, "role updated");
    Ok(result)
}

fn new_user_defaults() -> Document {
    let mut defaults = Document::new();
    defaults.insert(ROLE_FIELD.into(), Value::String(Role::User.as_str().into()));
    defaults
}
