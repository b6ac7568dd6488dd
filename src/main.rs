use std::sync::Arc;

use personal_ai::app::{AppState, build_router};
use personal_ai::config::AppConfig;
use personal_ai::llm::create_provider;
use personal_ai::store::{DocumentBackend, LibSqlBackend, UnavailableBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional .env next to the binary
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("🧭 {} v{}", config.app_name, env!("CARGO_PKG_VERSION"));
    eprintln!("   Env: {}", config.app_env);
    eprintln!("   Model: {} @ {}", config.ollama_model, config.ollama_base_url);

    // ── Database ─────────────────────────────────────────────────────────
    let primary: Option<Arc<dyn DocumentBackend>> = match &config.database_url {
        None => {
            eprintln!("   Database: none (in-process storage only)");
            None
        }
        Some(url) => match LibSqlBackend::open(url, config.database_auth_token.as_ref()).await {
            Ok(backend) => {
                eprintln!("   Database: {}", url);
                Some(Arc::new(backend))
            }
            Err(e) => {
                // Keep serving from the fallback; status endpoints report the reason.
                eprintln!("   Database: {} unavailable ({}), using in-process storage", url, e);
                tracing::warn!(error = %e, "Primary database unavailable at startup");
                Some(Arc::new(UnavailableBackend::new(e.to_string())))
            }
        },
    };

    if config.api_key.is_none() && config.admin_api_key.is_none() {
        eprintln!("   Auth: disabled (no API_KEY / ADMIN_API_KEY)");
    }

    let llm = create_provider(&config)?;
    let addr = format!("{}:{}", config.api_host, config.api_port);
    let state = AppState::new(config, primary, llm);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        eprintln!("Error: Failed to bind {}: {}", addr, e);
        e
    })?;
    eprintln!("   API: http://{}\n", addr);
    tracing::info!(addr = %addr, "HTTP server started");

    axum::serve(listener, app).await?;
    Ok(())
}
