//! Title/author autocomplete
//!
//! Matching runs over normalized text, so a query typed without tashkeel
//! or with a bare alif still hits the decorated catalog entry.

use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use maktaba_common::{db::repository::Suggestion, errors::Result};
use serde::{Deserialize, Serialize};

const SUGGEST_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
}

pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(SuggestResponse {
            suggestions: Vec::new(),
        }));
    }

    let suggestions = state.repo.suggest(q, SUGGEST_LIMIT).await?;

    Ok(Json(SuggestResponse { suggestions }))
}
