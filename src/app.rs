use crate::academic::{self, CounterKind, LAB_SUBJECTS, NOTE_SUBJECTS};
use crate::auth::RequireAdmin;
use crate::config::Environment;
use crate::games::{self, Game};
use crate::messages::Messages;
use crate::{error_log, missed, report, status, users};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
pub struct AppState {
    pub pool: deadpool_sqlite::Pool,
    pub admin_key: String,
    pub environment: Environment,
    pub messages: Messages,
}

impl AppState {
    pub fn new(
        pool: deadpool_sqlite::Pool,
        admin_key: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            pool,
            admin_key: admin_key.into(),
            environment,
            messages: Messages::catalog(),
        }
    }
}

/// Build the full route table. Rate limiting is left to the binary so tests
/// can hammer the router without a peer address.
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let mut app = Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        // Daily report
        .route(
            "/daily_report",
            get(report::handler::list_reports).post(report::handler::post_report),
        )
        .route("/daily_report/summary", get(report::handler::summary))
        // Error logs
        .route(
            "/logs/err",
            get(error_log::list_logs).post(error_log::post_log),
        )
        .route("/logs/err/email", axum::routing::post(error_log::logs_by_email))
        // Users
        .route("/user/new", axum::routing::post(users::create_user))
        .route("/users/app", get(users::list_users))
        .route("/users/app/count", get(users::user_count))
        .route("/users/app/email", axum::routing::post(users::users_by_email))
        .route(
            "/users/app/batch_dept",
            axum::routing::post(users::users_by_batch_dept),
        )
        // Missed words
        .route("/missed", get(missed::list_words).post(missed::post_word))
        // Academic listings
        .route("/notes", get(academic::top_note_subjects))
        .route("/notes/top", get(academic::top_note_subjects))
        .route("/labs", get(academic::lab_subjects))
        .route("/labs/top", get(academic::top_lab_subjects));

    for game in Game::ALL {
        app = app.route(&format!("/games/{}", game.slug()), games::routes(game));
    }

    for &(path, code) in NOTE_SUBJECTS {
        app = app.route(
            &format!("/notes/{path}"),
            get(
                move |_admin: RequireAdmin, State(state): State<Arc<AppState>>| {
                    academic::increment(state, CounterKind::Note, code)
                },
            ),
        );
    }

    for &(path, code) in LAB_SUBJECTS {
        app = app.route(
            &format!("/labs/{path}"),
            get(
                move |_admin: RequireAdmin, State(state): State<Arc<AppState>>| {
                    academic::increment(state, CounterKind::Lab, code)
                },
            ),
        );
    }

    // Mobile app and chat bot call from anywhere; no cookies are involved.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    app.fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}

async fn not_found(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": state.messages.common.not_found })),
    )
}

async fn method_not_allowed(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "status": state.messages.common.method_not_allowed })),
    )
}
