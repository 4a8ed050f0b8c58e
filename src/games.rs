use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::error::{AppError, AppResult, LoggedJson, LoggedQuery, StoreResultExt};
use crate::messages::Messages;
use crate::query::page::lenient_int;
use crate::query::{fetch_page, Filter, PageMeta, Pagination};
use crate::storage;
use crate::validate::validate_email;
use axum::extract::State;
use axum::Json;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_HOF_LIMIT: i64 = 100;

/// Games with a hall of fame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    NoteBird,
    NoteDino,
}

impl Game {
    pub const ALL: [Game; 2] = [Game::NoteBird, Game::NoteDino];

    /// URL segment and stored key.
    pub fn slug(&self) -> &'static str {
        match self {
            Game::NoteBird => "notebird",
            Game::NoteDino => "notedino",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GameScore {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_name: String,
}

impl GameScore {
    /// Required fields and a positive score, then the email format.
    pub fn validate(&self, messages: &Messages) -> Result<(), AppError> {
        if self.email.is_empty() || self.date.is_empty() || self.score <= 0 {
            return Err(AppError::Validation(messages.game.invalid_fields));
        }
        if !validate_email(&self.email) {
            return Err(AppError::Validation(messages.common.invalid_email));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HofParams {
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
    pub search: Option<String>,
}

pub fn insert_score(conn: &Connection, game: Game, score: &GameScore) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO game_scores (game, date, score, email, user_name) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            game.slug(),
            score.date,
            score.score,
            score.email,
            score.user_name
        ],
    )?;
    Ok(())
}

/// Scores for `game`, best first, optionally narrowed by an email/name substring.
pub fn hall_of_fame(
    conn: &Connection,
    game: Game,
    search: Option<&str>,
    pagination: Pagination,
) -> rusqlite::Result<(Vec<GameScore>, PageMeta)> {
    let filter = Filter::new()
        .eq("game", Some(game.slug()))
        .like_any(&["email", "user_name"], search);

    fetch_page(
        conn,
        "game_scores",
        "date, score, email, user_name",
        &filter,
        "score DESC, id",
        pagination,
        |row| {
            Ok(GameScore {
                date: row.get(0)?,
                score: row.get(1)?,
                email: row.get(2)?,
                user_name: row.get(3)?,
            })
        },
    )
}

/// POST /games/{game} - record a score.
pub async fn post_score(
    state: Arc<AppState>,
    game: Game,
    score: GameScore,
) -> AppResult<Json<Value>> {
    score.validate(&state.messages)?;

    let stored = score.clone();
    storage::interact(&state.pool, move |conn| insert_score(conn, game, &stored))
        .await
        .or_status(state.messages.common.operation_unsuccessful)?;

    tracing::info!(game = game.slug(), score = score.score, "game score recorded");

    Ok(Json(json!({
        "status": state.messages.game.score_insert_success,
        "game_score": score,
    })))
}

/// GET /games/{game} - paginated hall of fame with optional search.
pub async fn get_hof(state: Arc<AppState>, game: Game, params: HofParams) -> AppResult<Json<Value>> {
    let pagination = Pagination::resolve(params.page, params.limit, DEFAULT_HOF_LIMIT);
    let search = params.search.unwrap_or_default();

    let term = search.clone();
    let (hof, meta) = storage::interact(&state.pool, move |conn| {
        hall_of_fame(conn, game, Some(term.as_str()), pagination)
    })
    .await
    .or_status(state.messages.game.fetch_error)?;

    Ok(Json(json!({
        "status": state.messages.game.fetch_success,
        "hof": hof,
        "pagination": meta,
        "search": search,
    })))
}

/// Handler pair for one game's route.
pub fn routes(game: Game) -> axum::routing::MethodRouter<Arc<AppState>> {
    axum::routing::get(
        move |State(state): State<Arc<AppState>>,
              LoggedQuery(params): LoggedQuery<HofParams>| { get_hof(state, game, params) },
    )
    .post(
        move |_admin: RequireAdmin,
              State(state): State<Arc<AppState>>,
              LoggedJson(score): LoggedJson<GameScore>| { post_score(state, game, score) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::storage::sqlite::init_connection(&conn).unwrap();
        conn
    }

    fn score(email: &str, name: &str, points: i64) -> GameScore {
        GameScore {
            date: "2024-03-01".into(),
            score: points,
            email: email.into(),
            user_name: name.into(),
        }
    }

    #[test]
    fn test_validate_rejects_bad_scores() {
        let messages = Messages::catalog();
        let bad = [
            score("a@x.com", "Ana", 0),
            score("a@x.com", "Ana", -3),
            score("", "Ana", 10),
            GameScore {
                date: String::new(),
                ..score("a@x.com", "Ana", 10)
            },
        ];
        for s in bad {
            assert!(matches!(
                s.validate(&messages),
                Err(AppError::Validation(msg)) if msg == messages.game.invalid_fields
            ));
        }
        assert!(matches!(
            score("Ana@X.com", "Ana", 10).validate(&messages),
            Err(AppError::Validation(msg)) if msg == messages.common.invalid_email
        ));
        assert!(score("ana@x.com", "Ana", 10).validate(&messages).is_ok());
    }

    #[test]
    fn test_hof_sorted_by_score() {
        let conn = setup();
        insert_score(&conn, Game::NoteBird, &score("a@x.com", "Ana", 10)).unwrap();
        insert_score(&conn, Game::NoteBird, &score("b@x.com", "Bo", 30)).unwrap();
        insert_score(&conn, Game::NoteBird, &score("c@x.com", "Cy", 20)).unwrap();

        let (hof, meta) =
            hall_of_fame(&conn, Game::NoteBird, None, Pagination::resolve(None, None, 100))
                .unwrap();
        let scores: Vec<i64> = hof.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);
        assert_eq!(meta.total, 3);
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn test_games_are_separate() {
        let conn = setup();
        insert_score(&conn, Game::NoteBird, &score("a@x.com", "Ana", 10)).unwrap();
        insert_score(&conn, Game::NoteDino, &score("b@x.com", "Bo", 5)).unwrap();

        let (hof, meta) =
            hall_of_fame(&conn, Game::NoteDino, None, Pagination::resolve(None, None, 100))
                .unwrap();
        assert_eq!(meta.total, 1);
        assert_eq!(hof[0].email, "b@x.com");
    }

    #[test]
    fn test_search_matches_email_or_name() {
        let conn = setup();
        insert_score(&conn, Game::NoteBird, &score("rahim@uni.edu", "R", 10)).unwrap();
        insert_score(&conn, Game::NoteBird, &score("x@uni.edu", "Karim", 20)).unwrap();
        insert_score(&conn, Game::NoteBird, &score("y@uni.edu", "Sadia", 30)).unwrap();

        let (hof, meta) = hall_of_fame(
            &conn,
            Game::NoteBird,
            Some("rim"),
            Pagination::resolve(None, None, 100),
        )
        .unwrap();
        assert_eq!(meta.total, 1);
        assert_eq!(hof[0].user_name, "Karim");

        let (_, meta) = hall_of_fame(
            &conn,
            Game::NoteBird,
            Some("ahim"),
            Pagination::resolve(None, None, 100),
        )
        .unwrap();
        assert_eq!(meta.total, 1);
    }

    #[test]
    fn test_pagination_meta() {
        let conn = setup();
        for i in 1..=7 {
            insert_score(&conn, Game::NoteBird, &score("a@x.com", "Ana", i)).unwrap();
        }
        let (hof, meta) = hall_of_fame(
            &conn,
            Game::NoteBird,
            None,
            Pagination::resolve(Some(2), Some(3), 100),
        )
        .unwrap();
        assert_eq!(hof.iter().map(|s| s.score).collect::<Vec<_>>(), vec![4, 3, 2]);
        assert_eq!(meta.total, 7);
        assert_eq!(meta.total_pages, 3);
    }
}
