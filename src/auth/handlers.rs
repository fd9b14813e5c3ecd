use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{post, put},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    accounts::Account,
    auth::{
        dto::{ChangePasswordRequest, LoginRequest},
        errors::AuthError,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/accounts/:id/password", put(change_password))
}

fn bad_body(rejection: JsonRejection) -> AuthError {
    warn!(error = %rejection.body_text(), "rejected request body");
    AuthError::Validation(rejection.body_text())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Account>, AuthError> {
    let Json(payload) = payload.map_err(bad_body)?;
    payload.validate()?;

    let account = state
        .auth
        .authenticate(&payload.email, &payload.password)
        .await?;

    // TODO: issue a session token once the session component exists.
    Ok(Json(account))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<()>, AuthError> {
    let id: i64 = id
        .parse()
        .map_err(|_| AuthError::Validation(format!("invalid account id {id:?}")))?;
    let Json(payload) = payload.map_err(bad_body)?;
    payload.validate()?;

    state
        .auth
        .change_password(id, &payload.old_password, &payload.new_password)
        .await?;

    Ok(Json(()))
}
