use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::error::{AppError, AppResult, LoggedJson, LoggedQuery, StoreResultExt};
use crate::query::{fetch_page, Filter, PageMeta, PageParams, Pagination};
use crate::storage;
use crate::validate::validate_email;
use axum::extract::State;
use axum::Json;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_USER_LIMIT: i64 = 500;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub uni_id: String,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub dept: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, alias = "imgUrl")]
    pub img_url: Option<String>,
}

impl NewUser {
    fn has_required_fields(&self) -> bool {
        [&self.email, &self.uni_id, &self.batch, &self.dept, &self.role]
            .iter()
            .all(|f| !f.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppUser {
    pub id: i64,
    pub email: String,
    pub uni_id: String,
    pub batch: String,
    pub dept: String,
    pub role: String,
    pub img_url: Option<String>,
    pub created_at: i64,
}

impl AppUser {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            uni_id: row.get(2)?,
            batch: row.get(3)?,
            dept: row.get(4)?,
            role: row.get(5)?,
            img_url: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailBody {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchDeptBody {
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub dept: String,
}

const COLUMNS: &str = "id, email, uni_id, batch, dept, role, img_url, created_at";

pub fn insert_user(conn: &Connection, user: &NewUser, created_at: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO app_users (email, uni_id, batch, dept, role, img_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.email,
            user.uni_id,
            user.batch,
            user.dept,
            user.role,
            user.img_url.as_deref().filter(|u| !u.is_empty()),
            created_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_users_page(
    conn: &Connection,
    pagination: Pagination,
) -> rusqlite::Result<(Vec<AppUser>, PageMeta)> {
    fetch_page(
        conn,
        "app_users",
        COLUMNS,
        &Filter::new(),
        "id",
        pagination,
        AppUser::from_row,
    )
}

pub fn count_users(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM app_users", [], |row| row.get(0))
}

pub fn find_by_email(conn: &Connection, pattern: &str) -> rusqlite::Result<Vec<AppUser>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM app_users WHERE email LIKE ?1 ORDER BY id"
    ))?;
    let rows = stmt
        .query_map(params![pattern], AppUser::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Exact batch, `dept` as a LIKE pattern.
pub fn find_by_batch_dept(
    conn: &Connection,
    batch: &str,
    dept: &str,
) -> rusqlite::Result<Vec<AppUser>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM app_users WHERE batch = ?1 AND dept LIKE ?2 ORDER BY batch DESC, id"
    ))?;
    let rows = stmt
        .query_map(params![batch, dept], AppUser::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// POST /user/new
pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedJson(user): LoggedJson<NewUser>,
) -> AppResult<Json<Value>> {
    if !user.has_required_fields() {
        return Err(AppError::Validation(state.messages.common.bad_request));
    }
    if !validate_email(&user.email) {
        return Err(AppError::Validation(state.messages.common.invalid_email));
    }

    let created_at = chrono::Utc::now().timestamp();
    let stored = user.clone();
    let id = storage::interact(&state.pool, move |conn| {
        insert_user(conn, &stored, created_at)
    })
    .await
    .or_status(state.messages.common.operation_unsuccessful)?;

    tracing::info!(user_id = id, batch = %user.batch, dept = %user.dept, "app user registered");

    Ok(Json(json!({
        "status": state.messages.user.insert_success,
        "user": user,
    })))
}

/// GET /users/app
pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedQuery(params): LoggedQuery<PageParams>,
) -> AppResult<Json<Value>> {
    let pagination = params.resolve(DEFAULT_USER_LIMIT);
    let (users, meta) = storage::interact(&state.pool, move |conn| {
        list_users_page(conn, pagination)
    })
    .await
    .or_status(state.messages.user.fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.user.fetch_success,
        "users": users,
        "pagination": meta,
    })))
}

/// GET /users/app/count
pub async fn user_count(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let count = storage::interact(&state.pool, |conn| count_users(conn))
        .await
        .or_status(state.messages.user.count_error)?;

    Ok(Json(json!({
        "status": state.messages.common.operation_successful,
        "app_users_count": count,
    })))
}

/// POST /users/app/email
pub async fn users_by_email(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedJson(body): LoggedJson<EmailBody>,
) -> AppResult<Json<Value>> {
    if body.email.is_empty() {
        return Err(AppError::Validation(state.messages.common.bad_request));
    }

    let users = storage::interact(&state.pool, move |conn| find_by_email(conn, &body.email))
        .await
        .or_status(state.messages.user.fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.user.fetch_success,
        "searched_users": users,
    })))
}

/// POST /users/app/batch_dept
pub async fn users_by_batch_dept(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    LoggedJson(body): LoggedJson<BatchDeptBody>,
) -> AppResult<Json<Value>> {
    if body.batch.is_empty() || body.dept.is_empty() {
        return Err(AppError::Validation(state.messages.common.bad_request));
    }

    let users = storage::interact(&state.pool, move |conn| {
        find_by_batch_dept(conn, &body.batch, &body.dept)
    })
    .await
    .or_status(state.messages.user.fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.user.fetch_success,
        "searched_users": users,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::storage::sqlite::init_connection(&conn).unwrap();
        conn
    }

    fn user(email: &str, batch: &str, dept: &str) -> NewUser {
        NewUser {
            email: email.into(),
            uni_id: "2019-1-60-001".into(),
            batch: batch.into(),
            dept: dept.into(),
            role: "student".into(),
            img_url: None,
        }
    }

    #[test]
    fn test_required_fields() {
        assert!(user("a@x.com", "46", "wp").has_required_fields());
        assert!(!user("a@x.com", "", "wp").has_required_fields());
        let mut no_role = user("a@x.com", "46", "wp");
        no_role.role.clear();
        assert!(!no_role.has_required_fields());
    }

    #[test]
    fn test_missing_or_empty_image_is_null() {
        let conn = setup();
        let mut blank = user("a@x.com", "46", "wp");
        blank.img_url = Some(String::new());
        insert_user(&conn, &blank, 0).unwrap();
        let mut with_image = user("b@x.com", "46", "wp");
        with_image.img_url = Some("https://img/b.png".into());
        insert_user(&conn, &with_image, 0).unwrap();

        let (users, _) = list_users_page(&conn, Pagination::resolve(None, None, 500)).unwrap();
        assert_eq!(users[0].img_url, None);
        assert_eq!(users[1].img_url.as_deref(), Some("https://img/b.png"));
    }

    #[test]
    fn test_img_url_accepts_camel_case() {
        let parsed: NewUser =
            serde_json::from_value(json!({ "email": "a@x.com", "imgUrl": "x.png" })).unwrap();
        assert_eq!(parsed.img_url.as_deref(), Some("x.png"));
    }

    #[test]
    fn test_count_and_pagination() {
        let conn = setup();
        for i in 0..5 {
            insert_user(&conn, &user(&format!("u{i}@x.com"), "46", "wp"), i).unwrap();
        }
        assert_eq!(count_users(&conn).unwrap(), 5);

        let (users, meta) =
            list_users_page(&conn, Pagination::resolve(Some(2), Some(2), 500)).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "u2@x.com");
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_find_by_batch_and_dept() {
        let conn = setup();
        insert_user(&conn, &user("a@x.com", "46", "wp"), 0).unwrap();
        insert_user(&conn, &user("b@x.com", "46", "ym"), 0).unwrap();
        insert_user(&conn, &user("c@x.com", "47", "wp"), 0).unwrap();

        let found = find_by_batch_dept(&conn, "46", "wp").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "a@x.com");

        let any_dept = find_by_batch_dept(&conn, "46", "%").unwrap();
        assert_eq!(any_dept.len(), 2);
    }

    #[test]
    fn test_find_by_email_pattern() {
        let conn = setup();
        insert_user(&conn, &user("rahim@uni.edu", "46", "wp"), 0).unwrap();
        assert_eq!(find_by_email(&conn, "rahim@uni.edu").unwrap().len(), 1);
        assert!(find_by_email(&conn, "rahim").unwrap().is_empty());
    }
}
