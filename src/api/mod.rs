pub mod accounts;
pub mod admin;
pub mod auth;
pub mod forms;
pub mod health;
pub mod navigation;
pub mod reports;
pub mod routes;

pub use routes::{create_router, AppState};
