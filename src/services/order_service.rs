use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::orders::PaymentCompletion,
    error::AppResult,
    models::{Collection, Document},
    state::AppState,
    store::{Filter, Update, UpdateResult},
};

/// Marks the order paid, then stores the submitted payload as a payment record.
/// The writes are independent: if the second fails the order stays marked paid.
pub async fn complete_payment(
    state: &AppState,
    id: Uuid,
    payload: Document,
) -> AppResult<PaymentCompletion> {
    let mut paid = Document::new();
    paid.insert("isPaid".into(), Value::Bool(true));
    paid.insert(
        "transactionId".into(),
        payload.get("transactionId").cloned().unwrap_or(Value::Null),
    );

    let order = state
        .store
        .update_one(Collection::Orders, &Filter::Id(id), Update::set(paid), false)
        .await?;

    let payment = state
        .store
        .insert_one(Collection::Payments, payload)
        .await
        .inspect_err(|err| {
            tracing::error!(order_id = %id, error = %err, "order marked paid without a payment record");
        })?;

    Ok(PaymentCompletion { order, payment })
}

pub async fn update_status(state: &AppState, id: Uuid, status: String) -> AppResult<UpdateResult> {
    let mut fields = Document::new();
    fields.insert("status".into(), Value::String(status));

    state
        .store
        .update_one(Collection::Orders, &Filter::Id(id), Update::set(fields), false)
        .await
}
