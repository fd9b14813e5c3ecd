use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod errors;
pub mod handlers;
pub mod password;
pub mod service;

pub use errors::AuthError;
pub use password::{CredentialError, CredentialVerifier};
pub use service::AuthService;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::account_routes())
}
