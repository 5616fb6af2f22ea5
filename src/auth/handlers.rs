use axum::{
    extract::{FromRef, State},
    routing::post,
    Form, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, Token},
        jwt::JwtKeys,
        password::verify_password,
    },
    error::AppError,
    state::AppState,
    users::repo::User,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, AppError> {
    let user = User::find_by_email(&state.db, &form.username).await?;

    // Unknown email and wrong password answer identically.
    let user = match user {
        Some(u) if verify_password(&form.password, &u.hashed_password) => u,
        _ => {
            warn!(email = %form.username, "login rejected");
            return Err(AppError::BadCredentials);
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.issue_default(&user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(Token::bearer(access_token, keys.default_ttl_seconds())))
}
