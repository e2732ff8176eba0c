pub mod order_service;
pub mod payment_service;
pub mod user_service;
