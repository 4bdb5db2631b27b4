use anyhow::Context;
use extractor::{
    ImageExtractor, NormalizationConfig, OpenRouterClient, PromptSet, ResponseExtractor,
};
use std::sync::Arc;

mod config;
mod error;
mod features;
mod routes;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting OCR web service");

    let config = Config::from_env().context("Failed to load service configuration")?;
    tracing::info!("Configuration loaded successfully");

    let rules = NormalizationConfig::from_path(&config.rules_path)
        .context("Failed to load normalization rules")?;
    let prompts =
        PromptSet::from_dir_or_default(&config.prompts_dir).context("Failed to load prompts")?;

    let client = OpenRouterClient::new(
        config.openrouter_base_url.clone(),
        config.openrouter_api_key.clone(),
        config.openrouter_model.clone(),
    )
    .context("Failed to create model API client")?;
    tracing::info!("Using model: {}", client.model());

    let extractor = ImageExtractor::new(
        Arc::new(client),
        ResponseExtractor::new(Arc::new(rules)),
        prompts,
    );
    let state = AppState::new(extractor);

    let static_dir = config.static_dir.is_dir().then_some(config.static_dir.as_path());
    if static_dir.is_none() {
        tracing::warn!(
            "Static directory {} not found, index page disabled",
            config.static_dir.display()
        );
    }
    let app = routes::create_router(state, static_dir);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
