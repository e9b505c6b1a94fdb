pub mod authorize;
pub mod health;
pub mod models;
pub mod passthrough;
