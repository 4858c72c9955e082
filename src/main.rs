use std::sync::Arc;

use academia::logging::init_tracing;
use academia::modules::users::repository::PgUserRepository;
use academia::router::init_router;
use academia::state::AppState;
use academia::utils::email::{ConsoleEmailService, EmailDispatch, SmtpEmailService};
use academia_config::{AuthConfig, CorsConfig, EmailConfig, ServerConfig};
use academia_core::SystemClock;
use academia_db::{init_db_pool, run_migrations};
use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let auth_config = AuthConfig::from_env();
    let email_config = EmailConfig::from_env();
    let server_config = ServerConfig::from_env();

    if auth_config.secret == AuthConfig::DEFAULT_SECRET {
        warn!("SECRET_KEY is not set; using the development secret");
    }

    let mailer: Arc<dyn EmailDispatch> = if email_config.enabled {
        Arc::new(SmtpEmailService::new(email_config.clone()))
    } else {
        Arc::new(ConsoleEmailService::new())
    };

    let state = AppState::new(
        Arc::new(PgUserRepository::new(pool)),
        mailer,
        Arc::new(SystemClock),
        auth_config,
        email_config,
        CorsConfig::from_env(),
    );
    let app = init_router(state);

    let address = server_config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on http://{address}");
    info!("OpenAPI document at http://{address}/api-docs/openapi.json");

    axum::serve(listener, app).await?;
    Ok(())
}
