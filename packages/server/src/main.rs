use std::sync::Arc;
use std::time::Duration;

use tracing::{Level, info, warn};

use journal_server::analysis::{DisabledAnalyzer, GeminiAnalyzer, SentimentAnalyzer};
use journal_server::config::AppConfig;
use journal_server::database::init_db;
use journal_server::journal::{JournalLifecycle, SeaOrmJournalRepository};
use journal_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    info!("Database connected and schema synced");

    let blobs = common::storage::blob_store(&config.storage).await?;
    info!(
        backend = ?config.storage.backend,
        bucket = blobs.bucket(),
        "Blob store ready"
    );

    let analyzer: Arc<dyn SentimentAnalyzer> = match config.analysis.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            info!(model = %config.analysis.model, "Sentiment analysis enabled");
            Arc::new(GeminiAnalyzer::new(&config.analysis, key.to_string())?)
        }
        _ => {
            warn!("No analysis API key configured; journals will be saved without sentiment");
            Arc::new(DisabledAnalyzer)
        }
    };

    let lifecycle = JournalLifecycle::new(
        Arc::new(SeaOrmJournalRepository::new(db)),
        Arc::new(blobs),
        analyzer,
    )
    .with_analysis_limits(
        Duration::from_secs(config.analysis.timeout_secs),
        config.analysis.min_text_len,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = journal_server::build_router(AppState::new(config, lifecycle));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
