use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::{
    auth::extractor::CurrentUser,
    error::AppError,
    state::AppState,
    users::{
        dto::{CreateUser, UpdateUser, UserRead},
        repo::{NewUser, User},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        // trailing-slash alias kept for existing clients
        .route("/users/", post(create_user))
        .route("/users/me", get(read_me).put(update_me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<Json<UserRead>, AppError> {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    // Checked proactively; the unique index still backstops races.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::EmailRegistered);
    }

    let user = User::create(
        &state.db,
        &NewUser {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        },
    )
    .await?;

    Ok(Json(UserRead::from(user)))
}

#[instrument(skip(current))]
pub async fn read_me(current: CurrentUser) -> Json<UserRead> {
    Json(UserRead::from(current.0))
}

#[instrument(skip(state, current, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserRead>, AppError> {
    if let Some(email) = &payload.email {
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(AppError::Validation("Invalid email".into()));
        }
    }

    let user = current.0.update(&state.db, &payload).await?;
    Ok(Json(UserRead::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
    }
}
