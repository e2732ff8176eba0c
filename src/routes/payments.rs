use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::{CreatePaymentRequest, CreatePaymentResponse},
    error::{AppResult, ErrorBody},
    middleware::policy::AccessPolicy,
    routes::params::JsonBody,
    services::payment_service,
    state::AppState,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/create-payment",
        AccessPolicy::Authenticated.protect(post(create_payment), state),
    )
}

#[utoipa::path(
    post,
    path = "/create-payment",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Payment intent created", body = CreatePaymentResponse),
        (status = 400, description = "Unusable price", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Payment processor failed", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePaymentRequest>,
) -> AppResult<Json<CreatePaymentResponse>> {
    let resp = payment_service::create_payment(&state, payload).await?;
    Ok(Json(resp))
}
