use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::CompletionBackend;
use crate::rate_limit::CooldownTracker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable completion backend. Production wires the Mistral HTTP client;
    /// tests inject a scripted backend.
    pub backend: Arc<dyn CompletionBackend>,
    /// In-memory per-client cooldown between whole searches.
    pub cooldowns: CooldownTracker,
}
