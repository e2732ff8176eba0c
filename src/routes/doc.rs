use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        orders::{OrderStatusRequest, PaymentCompletion},
        payments::{CreatePaymentRequest, CreatePaymentResponse},
        tools::ToolStockUpdateRequest,
        users::{AdminRoleResponse, LoginResponse, ProfileUpdateRequest, UserRoleResponse},
    },
    error::ErrorBody,
    models::Role,
    routes::{health, orders, payments, reviews, tools, users},
    store::{DeleteResult, InsertOneResult, UpdateResult},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::home,
        users::login,
        users::list_users,
        users::get_user,
        users::update_profile,
        users::user_role,
        users::admin_role,
        users::make_admin,
        users::remove_admin,
        tools::list_tools,
        tools::get_tool,
        tools::add_tool,
        tools::update_stock,
        tools::delete_tool,
        orders::list_orders,
        orders::get_order,
        orders::orders_by_email,
        orders::add_order,
        orders::complete_payment,
        orders::update_status,
        orders::delete_order,
        reviews::list_reviews,
        reviews::add_review,
        payments::create_payment
    ),
    components(
        schemas(
            Role,
            ErrorBody,
            UpdateResult,
            InsertOneResult,
            DeleteResult,
            LoginResponse,
            ProfileUpdateRequest,
            UserRoleResponse,
            AdminRoleResponse,
            ToolStockUpdateRequest,
            OrderStatusRequest,
            PaymentCompletion,
            CreatePaymentRequest,
            CreatePaymentResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "Login, profiles and roles"),
        (name = "Tools", description = "Tool catalogue"),
        (name = "Orders", description = "Orders and payment completion"),
        (name = "Reviews", description = "Customer reviews"),
        (name = "Payments", description = "Payment intents"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
