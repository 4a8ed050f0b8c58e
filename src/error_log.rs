use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::error::{AppError, AppResult, LoggedJson, LoggedQuery, StoreResultExt};
use crate::query::page::lenient_int;
use crate::query::{fetch_page, Filter, PageMeta, Pagination};
use crate::storage;
use crate::validate::validate_email;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_LOG_LIMIT: i64 = 100;

/// Incoming error report. `date` defaults to the time of receipt.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorLogEntry {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorLogRow {
    pub id: i64,
    pub date: String,
    pub log: String,
    pub os: String,
    pub email: String,
}

impl ErrorLogRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            log: row.get(2)?,
            os: row.get(3)?,
            email: row.get(4)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogParams {
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailBody {
    #[serde(default)]
    pub email: String,
}

const COLUMNS: &str = "id, date, log, os, email";

pub fn insert_log(conn: &Connection, date: &str, entry: &ErrorLogEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO error_logs (date, log, os, email) VALUES (?1, ?2, ?3, ?4)",
        params![date, entry.log, entry.os, entry.email],
    )?;
    Ok(())
}

/// Newest first, optionally narrowed to emails containing `email`.
pub fn list_logs_page(
    conn: &Connection,
    email: Option<&str>,
    pagination: Pagination,
) -> rusqlite::Result<(Vec<ErrorLogRow>, PageMeta)> {
    let filter = Filter::new().like_any(&["email"], email);
    fetch_page(
        conn,
        "error_logs",
        COLUMNS,
        &filter,
        "date DESC, id DESC",
        pagination,
        ErrorLogRow::from_row,
    )
}

/// `pattern` is used as a LIKE pattern unchanged, so `%` wildcards pass through.
pub fn search_by_email(conn: &Connection, pattern: &str) -> rusqlite::Result<Vec<ErrorLogRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM error_logs WHERE email LIKE ?1 ORDER BY date DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map(params![pattern], ErrorLogRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// POST /logs/err
pub async fn post_log(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedJson(mut entry): LoggedJson<ErrorLogEntry>,
) -> AppResult<Json<Value>> {
    if entry.email.is_empty() || entry.log.is_empty() || entry.os.is_empty() {
        return Err(AppError::Validation(state.messages.common.bad_request));
    }
    if !validate_email(&entry.email) {
        return Err(AppError::Validation(state.messages.common.invalid_email));
    }

    let date = *entry.date.get_or_insert_with(Utc::now);
    let stamp = date.to_rfc3339_opts(SecondsFormat::Secs, true);

    let stored = entry.clone();
    storage::interact(&state.pool, move |conn| insert_log(conn, &stamp, &stored))
        .await
        .or_status(state.messages.common.operation_unsuccessful)?;

    tracing::info!(os = %entry.os, "error log recorded");

    Ok(Json(json!({
        "status": state.messages.error_log.log_insert_success,
        "error_info": entry,
    })))
}

/// GET /logs/err
pub async fn list_logs(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedQuery(params): LoggedQuery<LogParams>,
) -> AppResult<Json<Value>> {
    let pagination = Pagination::resolve(params.page, params.limit, DEFAULT_LOG_LIMIT);
    let email = params.email;

    let (logs, meta) = storage::interact(&state.pool, move |conn| {
        list_logs_page(conn, email.as_deref(), pagination)
    })
    .await
    .or_status(state.messages.error_log.fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.error_log.logs_fetch_success,
        "error_logs": logs,
        "pagination": meta,
    })))
}

/// POST /logs/err/email
pub async fn logs_by_email(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedJson(body): LoggedJson<EmailBody>,
) -> AppResult<Json<Value>> {
    if body.email.is_empty() {
        return Err(AppError::Validation(state.messages.common.bad_request));
    }

    let logs = storage::interact(&state.pool, move |conn| search_by_email(conn, &body.email))
        .await
        .or_status(state.messages.error_log.email_fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.error_log.logs_fetch_success,
        "searched_logs": logs,
    })))
}
