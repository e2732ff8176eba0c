pub mod orders;
pub mod payments;
pub mod tools;
pub mod users;
