use crate::app::AppState;
use crate::error::{AppResult, StoreResultExt};
use crate::storage;
use axum::extract::State;
use axum::Json;
use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const TOP_LIMIT: i64 = 5;

/// `(path, code)`: `path` is the `/notes/{path}` segment, `code` the stored key.
/// Increment routes are generated from this table and [`LAB_SUBJECTS`].
pub const NOTE_SUBJECTS: &[(&str, &str)] = &[
    ("math1", "math1"),
    ("math2", "math2"),
    ("phy1", "phy1"),
    ("phy2", "phy2"),
    ("chem1", "chem1"),
    ("chem2", "chem2"),
    ("pse", "pse"),
    ("cp", "cp"),
    ("ntf", "ntf"),
    ("bce", "bce"),
    ("em", "em"),
    ("am1", "am1"),
    ("am2", "am2"),
    ("ym1", "ym1"),
    ("ym2", "ym2"),
    ("fm1", "fm1"),
    ("fm2", "fm2"),
    ("wp1", "wp1"),
    ("wp2", "wp2"),
    ("stat", "stat"),
    ("market", "marketing"),
    ("feee", "feee"),
    ("ttqc", "ttqc"),
    ("tp", "tp"),
    ("mp", "mp"),
    ("mmtf", "mmtf"),
    ("acm", "acm"),
    ("tqm", "tqm"),
    ("fsd", "fsd"),
    ("ace", "ace"),
    ("mic", "mic"),
    ("sss1", "sss1"),
    ("sss2", "sss2"),
    ("wpp", "wpp"),
    ("econo", "econo"),
];

pub const LAB_SUBJECTS: &[(&str, &str)] = &[
    ("phy1", "phy1"),
    ("phy2", "phy2"),
    ("chem1", "chem1"),
    ("chem2", "chem2"),
    ("cp", "cp"),
    ("bce", "bce"),
    ("msp", "msp"),
    ("am1", "am1"),
    ("am2", "am2"),
    ("ym1", "ym1"),
    ("ym2", "ym2"),
    ("wp1", "wp1"),
    ("wp2", "wp2"),
    ("fm1", "fm1"),
    ("fm2", "fm2"),
    ("feee", "feee"),
    ("fme", "fme"),
    ("ttqc", "ttqc"),
    ("ap1", "ap1"),
    ("ap2", "ap2"),
    ("mp", "mp"),
    ("fsd", "fsd"),
    ("lss", "lss"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Note,
    Lab,
}

impl CounterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Note => "note",
            CounterKind::Lab => "lab",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubjectCount {
    pub subject: String,
    pub count: i64,
}

/// Add one view to `code`. Returns the number of rows touched (0 for an unseeded code).
pub fn increment_counter(conn: &Connection, kind: CounterKind, code: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE subject_counters SET count = count + 1 WHERE kind = ?1 AND code = ?2",
        params![kind.as_str(), code],
    )
}

/// Counters of one kind ordered by count, highest first. `None` returns all.
pub fn list_counters(
    conn: &Connection,
    kind: CounterKind,
    limit: Option<i64>,
) -> rusqlite::Result<Vec<SubjectCount>> {
    let mut stmt = conn.prepare(
        "SELECT code, count FROM subject_counters
         WHERE kind = ?1
         ORDER BY count DESC, code
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![kind.as_str(), limit.unwrap_or(-1)], |row| {
            Ok(SubjectCount {
                subject: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// GET /notes/{subject}, GET /labs/{lab} - admin-gated view increment.
pub async fn increment(
    state: Arc<AppState>,
    kind: CounterKind,
    code: &'static str,
) -> AppResult<Json<Value>> {
    let status = match kind {
        CounterKind::Note => state.messages.academic.subject_update_error,
        CounterKind::Lab => state.messages.academic.lab_update_error,
    };

    let touched = storage::interact(&state.pool, move |conn| increment_counter(conn, kind, code))
        .await
        .or_status(status)?;

    if touched == 0 {
        tracing::warn!(kind = kind.as_str(), code, "increment hit no counter row");
    }

    Ok(Json(json!({ "status": state.messages.common.operation_successful })))
}

/// GET /notes, GET /notes/top - most viewed note subjects.
pub async fn top_note_subjects(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let subjects = storage::interact(&state.pool, |conn| {
        list_counters(conn, CounterKind::Note, Some(TOP_LIMIT))
    })
    .await
    .or_status(state.messages.academic.top_subjects_error)?;

    Ok(Json(json!({
        "status": state.messages.common.operation_successful,
        "top_note_subjects": subjects,
    })))
}

/// GET /labs - every lab subject.
pub async fn lab_subjects(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let labs = storage::interact(&state.pool, |conn| list_counters(conn, CounterKind::Lab, None))
        .await
        .or_status(state.messages.academic.lab_subjects_error)?;

    Ok(Json(json!({
        "status": state.messages.common.operation_successful,
        "lab_subjects": labs,
    })))
}

/// GET /labs/top - most viewed labs.
pub async fn top_lab_subjects(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let labs = storage::interact(&state.pool, |conn| {
        list_counters(conn, CounterKind::Lab, Some(TOP_LIMIT))
    })
    .await
    .or_status(state.messages.academic.top_labs_error)?;

    Ok(Json(json!({
        "status": state.messages.common.operation_successful,
        "top_lab_subjects": labs,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::storage::sqlite::init_connection(&conn).unwrap();
        conn
    }

    #[test]
    fn test_route_paths_are_unique() {
        for table in [NOTE_SUBJECTS, LAB_SUBJECTS] {
            let paths: HashSet<_> = table.iter().map(|(p, _)| *p).collect();
            assert_eq!(paths.len(), table.len());
            assert!(!paths.contains("top"), "`top` is a listing route");
        }
    }

    #[test]
    fn test_market_maps_to_marketing() {
        let code = NOTE_SUBJECTS
            .iter()
            .find(|(path, _)| *path == "market")
            .map(|(_, code)| *code);
        assert_eq!(code, Some("marketing"));
    }

    #[test]
    fn test_increment_is_scoped_by_kind() {
        let conn = setup();
        assert_eq!(increment_counter(&conn, CounterKind::Note, "phy1").unwrap(), 1);
        increment_counter(&conn, CounterKind::Note, "phy1").unwrap();
        increment_counter(&conn, CounterKind::Lab, "phy1").unwrap();

        let notes = list_counters(&conn, CounterKind::Note, Some(1)).unwrap();
        assert_eq!(
            notes,
            vec![SubjectCount {
                subject: "phy1".into(),
                count: 2
            }]
        );
        let labs = list_counters(&conn, CounterKind::Lab, Some(1)).unwrap();
        assert_eq!(labs[0].count, 1);
    }

    #[test]
    fn test_unknown_code_touches_nothing() {
        let conn = setup();
        assert_eq!(increment_counter(&conn, CounterKind::Note, "nope").unwrap(), 0);
    }

    #[test]
    fn test_list_all_labs() {
        let conn = setup();
        let labs = list_counters(&conn, CounterKind::Lab, None).unwrap();
        assert_eq!(labs.len(), LAB_SUBJECTS.len());
        let top = list_counters(&conn, CounterKind::Lab, Some(TOP_LIMIT)).unwrap();
        assert_eq!(top.len(), TOP_LIMIT as usize);
    }
}
