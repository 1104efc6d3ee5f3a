//! Word collection endpoints
//!
//! Read side for the presentation layer plus its three commands: toggle
//! favorite, delete one, delete all. The pipeline never goes through here.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use wordtrack_common::db::{WordEntry, WordId};
use wordtrack_common::events::WordEvent;

use crate::db::RECENT_LIMIT;
use crate::{ApiError, ApiResult, AppState};

/// Upper bound for `GET /words/recent?limit=`
pub const MAX_RECENT_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteAllResponse {
    pub removed: u64,
}

/// GET /words?q=
///
/// Without `q` (or with a blank one) returns every word.
pub async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<WordEntry>>> {
    let words = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => state.store.search(q).await?,
        _ => state.store.list_all().await?,
    };
    Ok(Json(words))
}

/// GET /words/recent?limit=
pub async fn recent_words(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<WordEntry>>> {
    let limit = query.limit.unwrap_or(RECENT_LIMIT);
    if limit == 0 || limit > MAX_RECENT_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_RECENT_LIMIT
        )));
    }
    Ok(Json(state.store.recent(limit).await?))
}

/// GET /words/favorites
pub async fn favorite_words(State(state): State<AppState>) -> ApiResult<Json<Vec<WordEntry>>> {
    Ok(Json(state.store.favorites().await?))
}

/// GET /words/count
pub async fn count_words(State(state): State<AppState>) -> ApiResult<Json<CountResponse>> {
    Ok(Json(CountResponse {
        count: state.store.count().await?,
    }))
}

/// GET /words/:id
pub async fn get_word(
    State(state): State<AppState>,
    Path(id): Path<WordId>,
) -> ApiResult<Json<WordEntry>> {
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("word {}", id)))
}

/// PUT /words/:id/favorite
pub async fn set_favorite(
    State(state): State<AppState>,
    Path(id): Path<WordId>,
    Json(request): Json<FavoriteRequest>,
) -> ApiResult<Json<WordEntry>> {
    state.store.set_favorite(id, request.favorite).await?;

    state.event_bus.emit_lossy(WordEvent::WordFavorited {
        id,
        favorite: request.favorite,
        timestamp: Utc::now(),
    });

    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("word {}", id)))
}

/// DELETE /words/:id
pub async fn delete_word(
    State(state): State<AppState>,
    Path(id): Path<WordId>,
) -> ApiResult<StatusCode> {
    state.store.delete(id).await?;
    info!(id, "Word deleted");

    state.event_bus.emit_lossy(WordEvent::WordDeleted {
        id,
        timestamp: Utc::now(),
    });

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /words
pub async fn delete_all_words(State(state): State<AppState>) -> ApiResult<Json<DeleteAllResponse>> {
    let removed = state.store.delete_all().await?;
    info!(removed, "All words deleted");

    state.event_bus.emit_lossy(WordEvent::AllWordsDeleted {
        removed,
        timestamp: Utc::now(),
    });

    Ok(Json(DeleteAllResponse { removed }))
}

pub fn word_routes() -> Router<AppState> {
    Router::new()
        .route("/words", get(list_words).delete(delete_all_words))
        .route("/words/recent", get(recent_words))
        .route("/words/favorites", get(favorite_words))
        .route("/words/count", get(count_words))
        .route("/words/:id", get(get_word).delete(delete_word))
        .route("/words/:id/favorite", put(set_favorite))
}
