//! Payment-intent creation against an external processor.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub const CURRENCY: &str = "usd";
pub const PAYMENT_METHOD: &str = "card";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment processor unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment processor rejected the request with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Amount in minor currency units plus the fixed currency and method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentIntent {
    pub amount: i64,
    pub currency: String,
    pub payment_method_types: Vec<String>,
}

impl NewPaymentIntent {
    pub fn card(amount: i64) -> Self {
        Self {
            amount,
            currency: CURRENCY.to_string(),
            payment_method_types: vec![PAYMENT_METHOD.to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentError>;
}

pub type PaymentState = Arc<dyn PaymentGateway>;

/// Converts a decimal price into minor units, e.g. `10.5` into `1050`.
pub fn to_minor_units(price: f64) -> Option<i64> {
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    let cents = (price * 100.0).round();
    if cents > i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut form = vec![
            ("amount", intent.amount.to_string()),
            ("currency", intent.currency),
        ];
        form.extend(
            intent
                .payment_method_types
                .into_iter()
                .map(|method| ("payment_method_types[]", method)),
        );

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected { status, body });
        }

        Ok(response.json::<PaymentIntent>().await?)
    }
}
