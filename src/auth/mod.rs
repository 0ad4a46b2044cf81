pub mod jwt;
pub mod password;
pub mod service;

pub use jwt::{JwtManager, SessionClaims};
pub use service::{AuthService, LoginOutcome, Principal};
