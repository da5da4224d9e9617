use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

use super::{extract_keywords, split_paragraphs, ANALYSIS_SOURCES};

#[derive(Deserialize)]
pub struct KeywordAnalysisRequest {
    pub text: Option<String>,
}

/// POST /api/v1/keyword-analysis
/// Sends the text through the model once, then distills keywords and a
/// three-paragraph summary out of the response locally.
pub async fn handle_keyword_analysis(
    State(state): State<AppState>,
    Json(req): Json<KeywordAnalysisRequest>,
) -> Result<Json<Value>, AppError> {
    let text = req.text.as_deref().unwrap_or("").trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "A text to analyze is required".to_string(),
        ));
    }

    let content = state.backend.complete(text).await?;

    Ok(Json(json!({
        "keywords": extract_keywords(&content),
        "summary": split_paragraphs(&content, 3),
        "sources": ANALYSIS_SOURCES,
    })))
}
