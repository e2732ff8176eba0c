pub const LIVENESS: &str = "Tech Moto App Server Is Ready";

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is up", body = String),
    ),
    tag = "Health"
)]
pub async fn home() -> &'static str {
    LIVENESS
}
