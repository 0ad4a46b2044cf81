// SIOPAMB: activity reporting portal for environmental police field units

pub mod api;
pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod reporting;

pub use config::Config;
pub use errors::{AppError, Result};
