use anyhow::{Context, Result};
use api::config::LogFormat;
use api::{AppConfig, AppState};
use ingest::{DocumentExtractor, OcrEngine, TesseractCli};
use risk::{MacroDataSource, PgMacroStore};
use scoring::OpenAiClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(config.logging.format)?;

    if config.llm.api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; LLM calls will be rejected by the provider");
    }

    let llm = OpenAiClient::new(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        config.llm.model.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )
    .context("Failed to build LLM client")?;

    let macro_source: Option<Arc<dyn MacroDataSource>> = match &config.database.url {
        Some(url) => {
            let store = PgMacroStore::connect_lazy(
                url,
                config.database.macro_country.clone(),
                config.database.max_connections,
                Duration::from_secs(config.database.query_timeout_secs),
            )?;
            tracing::info!(country = store.country(), "Macro data store configured");
            Some(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, macro risk analysis is unavailable");
            None
        }
    };

    let ocr: Option<Arc<dyn OcrEngine>> = if config.extraction.ocr_enabled {
        Some(Arc::new(TesseractCli {
            pdftoppm_path: PathBuf::from(&config.extraction.pdftoppm_path),
            tesseract_path: PathBuf::from(&config.extraction.tesseract_path),
            dpi: config.extraction.ocr_dpi,
            lang: config.extraction.ocr_lang.clone(),
        }))
    } else {
        None
    };

    let state = AppState::new(Arc::new(llm), macro_source, DocumentExtractor::new(ocr));
    let app = api::build_router(state, &config.server)?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!(
        addr = %bind_addr,
        model = %config.llm.model,
        ocr = config.extraction.ocr_enabled,
        "Server listening"
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
