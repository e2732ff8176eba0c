use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{InsertOneResult, UpdateResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderStatusRequest {
    pub status: String,
}

/// Outcome of the two independent writes made when an order is paid.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentCompletion {
    pub order: UpdateResult,
    pub payment: InsertOneResult,
}
