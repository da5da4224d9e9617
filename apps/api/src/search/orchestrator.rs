//! Field retrieval orchestrator: one upstream call in flight at a time.
//!
//! Fields are dispatched in `Field::ALL` order with a fixed pause between
//! them to stay under the model API's request rate. A rate-limited field is
//! retried a bounded number of times with linear backoff; any other failure
//! is final for that field. Failures are field-local: the run always moves
//! on to the next field, so one bad field never sinks the search.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::{CompletionBackend, LlmError};

use super::fields::{Field, FieldValue};
use super::language::detect_language;
use super::parsers::parse_field;
use super::prompts::build_prompt;

/// Pause between consecutive field dispatches.
const FIELD_SPACING: Duration = Duration::from_secs(1);
/// Retries after the initial attempt when the model rate limits.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Receives per-field results as a run progresses.
///
/// Both callbacks return whether the consumer is still listening; `false`
/// stops the run before the next dispatch. Values already delivered are
/// unaffected.
#[async_trait]
pub trait FieldSink: Send {
    async fn field_ready(&mut self, field: Field, value: FieldValue) -> bool;
    async fn field_failed(&mut self, field: Field, error: LlmError) -> bool;
}

/// What happened to one field during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOutcome {
    pub field: Field,
    pub succeeded: bool,
}

/// Retrieves and parses a single field: one upstream call, bounded retry on
/// rate limiting with backoff 2s / 4s / 6s, then the parsed value.
///
/// This is the only place the retry policy lives; the sequential run and the
/// per-field HTTP transport both go through here.
pub async fn fetch_field(
    backend: &dyn CompletionBackend,
    field: Field,
    query: &str,
) -> Result<FieldValue, LlmError> {
    let language = detect_language(query);
    let prompt = build_prompt(field, query, language);

    let mut attempt = 0u32;
    loop {
        match backend.complete(&prompt).await {
            Ok(raw) => return Ok(parse_field(field, &raw)),
            Err(LlmError::RateLimited) if attempt < MAX_RATE_LIMIT_RETRIES => {
                attempt += 1;
                let delay = Duration::from_secs(2 * u64::from(attempt));
                warn!(
                    "Rate limited on field '{field}', retry {attempt}/{MAX_RATE_LIMIT_RETRIES} in {}s",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Runs a whole search: every field in order, results handed to the sink as
/// they land. Returns the per-field outcome summary.
pub async fn run_search(
    backend: &dyn CompletionBackend,
    query: &str,
    sink: &mut dyn FieldSink,
) -> Vec<FieldOutcome> {
    let mut outcomes = Vec::with_capacity(Field::ALL.len());

    for (i, field) in Field::ALL.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(FIELD_SPACING).await;
        }

        info!("Dispatching field '{field}'");
        let listening = match fetch_field(backend, field, query).await {
            Ok(value) => {
                outcomes.push(FieldOutcome {
                    field,
                    succeeded: true,
                });
                sink.field_ready(field, value).await
            }
            Err(e) => {
                warn!("Field '{field}' failed: {e}");
                outcomes.push(FieldOutcome {
                    field,
                    succeeded: false,
                });
                sink.field_failed(field, e).await
            }
        };

        if !listening {
            info!("Consumer gone, stopping dispatch after '{field}'");
            break;
        }
    }

    let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
    info!(
        "Search run finished: {}/{} fields succeeded",
        succeeded,
        outcomes.len()
    );

    outcomes
}
