mod config;
mod errors;
mod extract;
mod llm_client;
mod profile;
mod routes;
mod session;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extract::PdfTextExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionController;
use crate::state::AppState;
use crate::store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume retargeter v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        &config.openai_model,
    )?;
    if llm.has_credential() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("OPENAI_API_KEY is not configured; parse and retarget will fail until it is set");
    }
    info!(
        "Immutable field policy: {:?}",
        config.immutable_field_policy
    );

    let store = JsonFileStore::new(&config.resume_data_path);
    info!("Resume data file: {}", store.path().display());
    let generator = Arc::new(llm);
    let extractor = Arc::new(PdfTextExtractor);
    let controller = match SessionController::restore(
        store.clone(),
        generator.clone(),
        extractor.clone(),
        config.immutable_field_policy,
    ) {
        Ok(controller) => controller,
        Err(e) => {
            warn!("Could not restore saved resume, starting empty: {e}");
            SessionController::new(store, generator, extractor, config.immutable_field_policy)
        }
    };
    info!("Session starts {}", controller.state().phase());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let state = AppState::new(controller, config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
