use super::{
    list_reports_page, parse_date, summary_for, upsert_daily, Platform, ReportFilter,
    DEFAULT_REPORT_LIMIT,
};
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::error::{AppError, AppResult, LoggedJson, LoggedQuery, StoreResultExt};
use crate::messages::Messages;
use crate::query::page::lenient_int;
use crate::query::Pagination;
use crate::storage;
use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct PostReportBody {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub platform: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
}

fn parse_platform(raw: &str, messages: &Messages) -> Result<Platform, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(messages.report.invalid_platform))
}

/// Empty strings count as absent; anything else must be `YYYY-MM-DD`.
fn parse_optional_date(
    raw: Option<&str>,
    messages: &Messages,
) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or(AppError::Validation(messages.report.invalid_date)),
    }
}

impl ReportParams {
    fn to_filter(&self, messages: &Messages) -> Result<ReportFilter, AppError> {
        let platform = match self.platform.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => Some(parse_platform(p, messages)?),
            None => None,
        };
        Ok(ReportFilter {
            platform,
            start_date: parse_optional_date(self.start_date.as_deref(), messages)?,
            end_date: parse_optional_date(self.end_date.as_deref(), messages)?,
        })
    }
}

/// POST /daily_report - count one API call for `platform` on `date` (today by default).
pub async fn post_report(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedJson(body): LoggedJson<PostReportBody>,
) -> AppResult<Json<Value>> {
    let messages = &state.messages;
    let platform = parse_platform(&body.platform, messages)?;
    let date = parse_optional_date(body.date.as_deref(), messages)?
        .unwrap_or_else(|| Utc::now().date_naive());

    let report = storage::interact(&state.pool, move |conn| upsert_daily(conn, date, platform))
        .await
        .or_status(messages.report.update_count_error)?;

    let status = if report.count == 1 {
        messages.report.new_log_success
    } else {
        messages.report.increment_success
    };

    tracing::debug!(%platform, date = %report.date, count = report.count, "daily report updated");

    Ok(Json(json!({
        "status": status,
        "data": report,
    })))
}

/// GET /daily_report
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    LoggedQuery(params): LoggedQuery<ReportParams>,
) -> AppResult<Json<Value>> {
    let filter = params.to_filter(&state.messages)?;
    let pagination = Pagination::resolve(params.page, params.limit, DEFAULT_REPORT_LIMIT);

    let (reports, meta) = storage::interact(&state.pool, move |conn| {
        list_reports_page(conn, &filter, pagination)
    })
    .await
    .or_status(state.messages.report.fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.report.fetch_success,
        "data": reports,
        "pagination": meta,
    })))
}

/// GET /daily_report/summary
pub async fn summary(
    State(state): State<Arc<AppState>>,
    LoggedQuery(params): LoggedQuery<ReportParams>,
) -> AppResult<Json<Value>> {
    let filter = ReportFilter {
        platform: None,
        start_date: parse_optional_date(params.start_date.as_deref(), &state.messages)?,
        end_date: parse_optional_date(params.end_date.as_deref(), &state.messages)?,
    };

    let summary = storage::interact(&state.pool, move |conn| summary_for(conn, &filter))
        .await
        .or_status(state.messages.report.summary_error)?;

    Ok(Json(json!({
        "status": state.messages.report.fetch_success,
        "summary": summary,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_platform_message() {
        let messages = Messages::catalog();
        match parse_platform("web", &messages) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, messages.report.invalid_platform),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_params_to_filter() {
        let messages = Messages::catalog();
        let params = ReportParams {
            platform: Some("bot".into()),
            start_date: Some("2024-01-01".into()),
            end_date: Some(String::new()),
            ..Default::default()
        };
        let filter = params.to_filter(&messages).unwrap();
        assert_eq!(filter.platform, Some(Platform::Bot));
        assert!(filter.start_date.is_some());
        assert!(filter.end_date.is_none());

        let bad = ReportParams {
            end_date: Some("2024-13-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad.to_filter(&messages),
            Err(AppError::Validation(msg)) if msg == messages.report.invalid_date
        ));
    }
}
