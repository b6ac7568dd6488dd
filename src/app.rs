//! Application state and router assembly.

use std::sync::Arc;
use std::time::Instant;

use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tracing::warn;

use crate::agents::AgentRouter;
use crate::audit::AuditLog;
use crate::compression::Compressor;
use crate::config::AppConfig;
use crate::conversations::Conversation;
use crate::llm::LlmProvider;
use crate::profile::ProfileStore;
use crate::status::GraphProbe;
use crate::store::{DocumentBackend, ResilientStore};
use crate::tasks::Task;
use crate::{
    admin, agents, audit, auth, compression, conversations, profile, status, tasks, voice,
};

/// Everything handlers share. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub primary: Option<Arc<dyn DocumentBackend>>,
    pub tasks: Arc<ResilientStore<Task>>,
    pub conversations: Arc<ResilientStore<Conversation>>,
    pub audit: Arc<AuditLog>,
    pub profile: Arc<ProfileStore>,
    pub agents: Arc<AgentRouter>,
    pub llm: Arc<dyn LlmProvider>,
    pub compressor: Arc<Compressor>,
    pub graph: Arc<GraphProbe>,
    pub started_at: Instant,
}

impl AppState {
    /// Build every store over the same (optional) primary backend.
    pub fn new(
        config: AppConfig,
        primary: Option<Arc<dyn DocumentBackend>>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let timeout = config.backend_timeout;
        Self {
            tasks: Arc::new(ResilientStore::new(primary.clone(), timeout)),
            conversations: Arc::new(ResilientStore::new(primary.clone(), timeout)),
            audit: Arc::new(AuditLog::new(ResilientStore::new(primary.clone(), timeout))),
            profile: Arc::new(ProfileStore::new(ResilientStore::new(primary.clone(), timeout))),
            agents: Arc::new(AgentRouter::new(Arc::clone(&llm))),
            compressor: Arc::new(Compressor::from_config(&config)),
            graph: Arc::new(GraphProbe::from_config(&config)),
            config: Arc::new(config),
            primary,
            llm,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// The full HTTP surface with auth and CORS applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .merge(tasks::routes::routes())
        .merge(conversations::routes::routes())
        .merge(agents::routes::routes())
        .merge(profile::routes::routes())
        .merge(audit::routes::routes())
        .merge(compression::routes::routes())
        .merge(status::routes::routes())
        .merge(admin::routes())
        .merge(voice::routes::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth::api_key_middleware))
        .layer(cors)
        .with_state(state)
}
