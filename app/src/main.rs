mod config;
mod logging;
mod web;

use std::sync::Arc;

use color_eyre::Result;
use domain::Portal;
use domain::config::BackendConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    // Initialize logging
    logging::init()?;
    tracing::info!("Starting MDVTA member portal");

    let backend_config = BackendConfig::from_env();
    let portal = Portal::new(&backend_config, &config::get_data_dir())?;
    if portal.is_hosted() {
        tracing::info!("Running against the hosted backend");
    } else {
        tracing::info!("Running in demo mode against the local store");
    }

    let app_state = Arc::new(portal);
    let app = web::create_app(app_state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Server running on http://127.0.0.1:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
