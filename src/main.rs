use std::sync::Arc;

use dotenvy::dotenv;
use nivesh::api::{AppState, init_router};
use nivesh::auth::JwtAuth;
use nivesh::config::{app::AppConfig, database, seed};
use nivesh::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = AppConfig::from_env();

    // 4. Initialize the database
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    // 5. Seed the plan catalog and bootstrap admin if necessary
    let seeded = seed::seed_initial_products(&db).await?;
    if seeded > 0 {
        info!("Seeded {seeded} plans into the catalog.");
    }
    if seed::seed_admin_user(&db).await? {
        info!("Created bootstrap admin account.");
    }

    // 6. Serve the API
    let state = AppState {
        db,
        jwt: Arc::new(JwtAuth::new(app_config.jwt_secret.as_bytes())),
    };
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", app_config.port)).await?;
    info!("Listening on 0.0.0.0:{}", app_config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
