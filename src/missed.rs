use crate::app::AppState;
use crate::error::{AppError, AppResult, LoggedJson, LoggedQuery, StoreResultExt};
use crate::query::{fetch_page, Filter, PageMeta, PageParams, Pagination};
use crate::storage;
use axum::extract::State;
use axum::Json;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_MISSED_LIMIT: i64 = 100;

/// A word the bot had no answer to, with how often it was asked.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MissedWord {
    pub word: String,
    pub count: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct MissedWordBody {
    #[serde(default)]
    pub word: String,
}

/// Insert `word` with count 1, or bump the existing row. Single statement, so
/// concurrent submissions of the same word cannot create duplicates.
pub fn record_word(conn: &Connection, word: &str) -> rusqlite::Result<MissedWord> {
    conn.query_row(
        "INSERT INTO missed_words (word, count) VALUES (?1, 1)
         ON CONFLICT(word) DO UPDATE SET count = count + 1
         RETURNING word, count",
        params![word],
        |row| {
            Ok(MissedWord {
                word: row.get(0)?,
                count: row.get(1)?,
            })
        },
    )
}

pub fn list_words_page(
    conn: &Connection,
    pagination: Pagination,
) -> rusqlite::Result<(Vec<MissedWord>, PageMeta)> {
    fetch_page(
        conn,
        "missed_words",
        "word, count",
        &Filter::new(),
        "count DESC, word",
        pagination,
        |row| {
            Ok(MissedWord {
                word: row.get(0)?,
                count: row.get(1)?,
            })
        },
    )
}

/// POST /missed
pub async fn post_word(
    State(state): State<Arc<AppState>>,
    LoggedJson(body): LoggedJson<MissedWordBody>,
) -> AppResult<Json<Value>> {
    let word = body.word.trim().to_string();
    if word.is_empty() {
        return Err(AppError::Validation(state.messages.common.bad_request));
    }

    let missed = storage::interact(&state.pool, move |conn| record_word(conn, &word))
        .await
        .or_status(state.messages.common.operation_unsuccessful)?;

    tracing::debug!(word = %missed.word, count = missed.count, "missed word recorded");

    Ok(Json(json!({
        "status": state.messages.missed_word.insert_success,
        "missed_word": missed,
    })))
}

/// GET /missed
pub async fn list_words(
    State(state): State<Arc<AppState>>,
    LoggedQuery(params): LoggedQuery<PageParams>,
) -> AppResult<Json<Value>> {
    let pagination = params.resolve(DEFAULT_MISSED_LIMIT);
    let (words, meta) = storage::interact(&state.pool, move |conn| {
        list_words_page(conn, pagination)
    })
    .await
    .or_status(state.messages.missed_word.fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.missed_word.fetch_success,
        "missed_words": words,
        "pagination": meta,
    })))
}
