use crate::{
    dto::payments::{CreatePaymentRequest, CreatePaymentResponse},
    error::{AppError, AppResult},
    payments::{NewPaymentIntent, to_minor_units},
    state::AppState,
};

pub async fn create_payment(
    state: &AppState,
    payload: CreatePaymentRequest,
) -> AppResult<CreatePaymentResponse> {
    let amount = to_minor_units(payload.price)
        .ok_or_else(|| AppError::BadRequest("price must be a non-negative number".into()))?;

    let intent = state
        .payments
        .create_payment_intent(NewPaymentIntent::card(amount))
        .await?;

    Ok(CreatePaymentResponse {
        client_secret: intent.client_secret,
    })
}
