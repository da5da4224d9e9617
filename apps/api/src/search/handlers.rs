use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use futures::stream;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::SearchSaver;
use crate::llm_client::models::{self, ModelInfo};
use crate::llm_client::LlmError;
use crate::rate_limit;
use crate::state::AppState;

use super::fields::{Field, FieldValue};
use super::orchestrator::{fetch_field, run_search, FieldSink};

/// Minimum length of a trimmed question.
const MIN_QUERY_CHARS: usize = 30;

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub field: Option<String>,
    pub user_id: Option<Uuid>,
    pub client_id: Option<String>,
    pub model: Option<String>,
    pub history_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub user_id: Option<Uuid>,
    pub client_id: Option<String>,
    pub model: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Request validation
// ────────────────────────────────────────────────────────────────────────────

fn validate_query(raw: Option<&str>) -> Result<String, AppError> {
    let trimmed = raw.unwrap_or("").trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("A question is required".to_string()));
    }
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "The question must be at least {MIN_QUERY_CHARS} characters long"
        )));
    }
    Ok(trimmed.to_string())
}

fn resolve_model(name: Option<&str>) -> Result<&'static ModelInfo, AppError> {
    match name {
        None => Ok(models::default_model()),
        Some(n) => {
            models::lookup(n).ok_or_else(|| AppError::Validation(format!("Unknown model '{n}'")))
        }
    }
}

/// Whole-query admission: authenticated users consume the daily quota,
/// anonymous clients go through the in-memory cooldown. A request with
/// neither identity is rejected before any upstream work.
async fn enforce_rate_limits(
    state: &AppState,
    user_id: Option<Uuid>,
    client_id: Option<&str>,
) -> Result<(), AppError> {
    if let Some(user_id) = user_id {
        rate_limit::check_and_consume_quota(&state.db, user_id).await
    } else if let Some(client_id) = client_id {
        state.cooldowns.check_and_record(client_id).await
    } else {
        Err(AppError::Validation(
            "Either user_id or client_id is required".to_string(),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sinks: one per transport
// ────────────────────────────────────────────────────────────────────────────

/// Streams field results to the SSE channel, persisting as it goes.
/// A failed send means the client hung up, which stops the run.
struct SseSink {
    tx: mpsc::Sender<Event>,
    saver: Option<SearchSaver>,
}

#[async_trait]
impl FieldSink for SseSink {
    async fn field_ready(&mut self, field: Field, value: FieldValue) -> bool {
        if let Some(saver) = self.saver.as_mut() {
            saver.save_field(field, &value).await;
        }
        let payload = json!({ field.name(): value });
        self.tx
            .send(Event::default().data(payload.to_string()))
            .await
            .is_ok()
    }

    async fn field_failed(&mut self, field: Field, error: LlmError) -> bool {
        let payload = json!({
            "error": { "field": field.name(), "message": error.to_string() }
        });
        self.tx
            .send(Event::default().data(payload.to_string()))
            .await
            .is_ok()
    }
}

/// Accumulates every outcome for the one-shot transport.
struct CollectSink {
    results: Map<String, Value>,
    field_errors: Map<String, Value>,
    saver: Option<SearchSaver>,
}

#[async_trait]
impl FieldSink for CollectSink {
    async fn field_ready(&mut self, field: Field, value: FieldValue) -> bool {
        if let Some(saver) = self.saver.as_mut() {
            saver.save_field(field, &value).await;
        }
        self.results.insert(field.name().to_string(), json!(value));
        true
    }

    async fn field_failed(&mut self, field: Field, error: LlmError) -> bool {
        self.field_errors
            .insert(field.name().to_string(), Value::String(error.to_string()));
        true
    }
}

/// Creates the history entry up front so a search shows up in history even
/// if every field later fails. Creation failure is only logged; the
/// per-field upserts can still bring the row into existence.
async fn prepare_saver(
    state: &AppState,
    user_id: Option<Uuid>,
    query: &str,
    model: &'static ModelInfo,
) -> Option<SearchSaver> {
    let user_id = user_id?;
    let saver = SearchSaver::new(state.db.clone(), user_id, query.to_string(), model);
    if let Err(e) = saver.create_entry().await {
        warn!("Failed to create history entry {}: {e}", saver.entry_id());
    }
    Some(saver)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/search
/// Two transports share this route. With `field` the caller orchestrates and
/// gets that one field back as JSON; without it the whole search runs here
/// and results stream out as SSE events, one per field, in dispatch order.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let query = validate_query(params.query.as_deref())?;
    let model = resolve_model(params.model.as_deref())?;

    if let Some(name) = params.field.as_deref() {
        let field = Field::from_name(name)
            .ok_or_else(|| AppError::Validation(format!("Unknown field '{name}'")))?;
        return single_field_response(
            &state,
            field,
            &query,
            model,
            params.user_id,
            params.history_id,
        )
        .await;
    }

    enforce_rate_limits(&state, params.user_id, params.client_id.as_deref()).await?;

    let saver = prepare_saver(&state, params.user_id, &query, model).await;

    let (tx, rx) = mpsc::channel::<Event>(Field::ALL.len() + 1);
    let backend = state.backend.clone();
    let mut sink = SseSink { tx, saver };
    tokio::spawn(async move {
        run_search(backend.as_ref(), &query, &mut sink).await;
    });

    let stream = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });

    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response())
}

/// One field, one answer: `{"<field>": <value>}`. No quota is consumed at
/// this granularity since the caller drives the pace. With `history_id` and
/// `user_id` the value is also upserted into that history entry.
async fn single_field_response(
    state: &AppState,
    field: Field,
    query: &str,
    model: &'static ModelInfo,
    user_id: Option<Uuid>,
    history_id: Option<Uuid>,
) -> Result<Response, AppError> {
    let value = fetch_field(state.backend.as_ref(), field, query).await?;

    if let (Some(user_id), Some(history_id)) = (user_id, history_id) {
        let mut saver = SearchSaver::with_entry_id(
            state.db.clone(),
            history_id,
            user_id,
            query.to_string(),
            model,
        );
        saver.save_field(field, &value).await;
    }

    Ok(Json(json!({ field.name(): value })).into_response())
}

/// POST /api/v1/search
/// Runs the whole search server-side and answers a single JSON object with
/// every successful field plus a `field_errors` map for the failed ones.
pub async fn handle_search_post(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Value>, AppError> {
    let query = validate_query(req.query.as_deref())?;
    let model = resolve_model(req.model.as_deref())?;

    enforce_rate_limits(&state, req.user_id, req.client_id.as_deref()).await?;

    let saver = prepare_saver(&state, req.user_id, &query, model).await;

    let mut sink = CollectSink {
        results: Map::new(),
        field_errors: Map::new(),
        saver,
    };
    run_search(state.backend.as_ref(), &query, &mut sink).await;

    let mut body = Map::new();
    body.insert("query".to_string(), Value::String(query));
    body.extend(sink.results);
    body.insert("field_errors".to_string(), Value::Object(sink.field_errors));

    Ok(Json(Value::Object(body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query_requires_a_question() {
        assert!(matches!(
            validate_query(None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_query(Some("   ")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_query_enforces_minimum_length() {
        assert!(matches!(
            validate_query(Some("trop court")),
            Err(AppError::Validation(_))
        ));
        let ok = validate_query(Some("  pourquoi l'empire romain s'est-il effondré ?  "));
        assert_eq!(
            ok.ok(),
            Some("pourquoi l'empire romain s'est-il effondré ?".to_string())
        );
    }

    #[test]
    fn test_resolve_model_defaults_and_validates() {
        assert_eq!(
            resolve_model(None).ok().map(|m| m.name),
            Some(crate::llm_client::MODEL)
        );
        assert!(resolve_model(Some("mistral-tiny")).is_ok());
        assert!(matches!(
            resolve_model(Some("gpt-4")),
            Err(AppError::Validation(_))
        ));
    }
}
