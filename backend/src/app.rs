use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use libsql::Connection;
use tokio::sync::Mutex;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers::auth::login;
use crate::handlers::user::{
    create_user, current_user, delete_user, get_user, list_users, update_user,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(db: Connection, jwt_secret: &str) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

/// API routes plus the built frontend, served from `static_dir`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let frontend =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/users", get(list_users).post(create_user))
        .route("/users/", get(list_users).post(create_user))
        .route("/users/register", post(create_user))
        .route("/users/me", get(current_user))
        .route("/auth/token", post(login))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .fallback_service(frontend)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
