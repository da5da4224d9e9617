use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::SearchHistoryEntry;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize)]
pub struct HistoryListParams {
    pub user_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct HistoryDeleteParams {
    pub user_id: Option<Uuid>,
    pub id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

#[derive(Serialize)]
pub struct HistoryPage {
    pub history: Vec<SearchHistoryEntry>,
    pub pagination: Pagination,
}

const ENTRY_COLUMNS: &str = "id, user_id, query, title, summary, historical_context, anecdote, \
                             exposition, sources, images, keywords, model_info, created_at";

fn page_count(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

fn page_offset(page: i64, limit: i64) -> i64 {
    // saturate: a far-out page reads as an empty page, never as overflow
    (page - 1).saturating_mul(limit)
}

/// GET /api/v1/history
/// The caller's entries, newest first, paginated, optionally filtered by a
/// case-insensitive substring of the query text.
pub async fn handle_list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryListParams>,
) -> Result<Json<HistoryPage>, AppError> {
    let user_id = params.user_id.ok_or(AppError::Unauthorized)?;
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = page_offset(page, limit);

    let pattern = params.search.as_deref().map(|s| format!("%{s}%"));

    let (total, history) = match &pattern {
        Some(pattern) => {
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM search_history WHERE user_id = $1 AND query ILIKE $2",
            )
            .bind(user_id)
            .bind(pattern)
            .fetch_one(&state.db)
            .await?;

            let history: Vec<SearchHistoryEntry> = sqlx::query_as(&format!(
                "SELECT {ENTRY_COLUMNS} FROM search_history \
                 WHERE user_id = $1 AND query ILIKE $2 \
                 ORDER BY created_at DESC LIMIT $3 OFFSET $4"
            ))
            .bind(user_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;

            (total, history)
        }
        None => {
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM search_history WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(&state.db)
                    .await?;

            let history: Vec<SearchHistoryEntry> = sqlx::query_as(&format!(
                "SELECT {ENTRY_COLUMNS} FROM search_history \
                 WHERE user_id = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ))
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;

            (total, history)
        }
    };

    Ok(Json(HistoryPage {
        history,
        pagination: Pagination {
            total,
            page,
            limit,
            pages: page_count(total, limit),
        },
    }))
}

/// DELETE /api/v1/history
/// With `id` removes that entry when the caller owns it; without, wipes the
/// caller's whole history. Deleting something already gone still succeeds.
pub async fn handle_delete_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryDeleteParams>,
) -> Result<Json<Value>, AppError> {
    let user_id = params.user_id.ok_or(AppError::Unauthorized)?;

    match params.id {
        Some(id) => {
            sqlx::query("DELETE FROM search_history WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&state.db)
                .await?;
        }
        None => {
            sqlx::query("DELETE FROM search_history WHERE user_id = $1")
                .bind(user_id)
                .execute(&state.db)
                .await?;
        }
    }

    Ok(Json(json!({ "success": true })))
}
