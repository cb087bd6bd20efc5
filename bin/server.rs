// Card Checker - Web Server

use anyhow::{Context, Result};
use card_checker::api::{router, AppState};
use card_checker::logging::init_tracing;
use card_checker::CheckerConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    println!("🌐 Card Checker - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = CheckerConfig::from_env()?;

    // Building the blocking HTTP client inside the runtime is not allowed
    let build_config = config.clone();
    let classifier = tokio::task::spawn_blocking(move || build_config.build_classifier())
        .await
        .context("Classifier setup task failed")??;

    let state = AppState {
        classifier: Arc::new(classifier),
        batch_limit: config.batch_limit,
    };
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "server listening");
    println!("\n🚀 Server running on http://localhost:{}", config.port);
    println!("   API: http://localhost:{}/api/check/4111111111111111", config.port);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
