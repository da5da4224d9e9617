use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One saved search. Field columns stay NULL until their retrieval lands,
/// so a row read mid-search (or after a partial failure) simply has gaps.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub historical_context: Option<String>,
    pub anecdote: Option<String>,
    pub exposition: Option<Value>,
    pub sources: Option<Value>,
    pub images: Option<Value>,
    pub keywords: Option<Vec<String>>,
    pub model_info: Option<Value>,
    pub created_at: DateTime<Utc>,
}
