use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{models::Document, store::into_document};

/// Stock change sent after an order is fulfilled.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolStockUpdateRequest {
    pub new_quantity: i64,
    pub new_sold: i64,
}

impl ToolStockUpdateRequest {
    /// Stored under `quantity` and `sold`.
    pub fn into_fields(self) -> Document {
        into_document(json!({
            "quantity": self.new_quantity,
            "sold": self.new_sold,
        }))
    }
}
