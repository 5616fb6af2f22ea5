use authcore::app::{build_app, serve};
use authcore::state::AppState;
use authcore::users::repo::User;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "authcore=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    // Seed the first superuser when configured.
    if let (Some(email), Some(password)) = (
        state.config.first_superuser.clone(),
        state.config.first_superuser_password.clone(),
    ) {
        if let Err(e) = User::ensure_superuser(&state.db, &email, &password).await {
            tracing::warn!(error = %e, "superuser bootstrap failed; continuing");
        }
    }

    let app = build_app(state);
    serve(app).await
}
