use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{models::Document, store::UpdateResult};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub result: UpdateResult,
    pub token: String,
}

/// The only fields the profile endpoint writes. Values are stored as sent, in any JSON type.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub education: Option<Value>,
    pub location: Option<Value>,
    pub mobile: Option<Value>,
    pub linkedin: Option<Value>,
}

impl ProfileUpdateRequest {
    pub fn into_fields(self) -> Document {
        [
            ("education", self.education),
            ("location", self.location),
            ("mobile", self.mobile),
            ("linkedin", self.linkedin),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
        .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRoleResponse {
    pub user: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminRoleResponse {
    pub admin: bool,
}
