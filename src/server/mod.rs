//! JSON API over the store, the importer and the session table

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::{TimeDelta, Utc};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::auth::{AuthContext, AuthService, SessionStore};
use crate::config::BotledgerConfig;
use crate::storage::SqliteStore;
use crate::ui::Icons;

pub mod error;
pub mod routes;

pub use error::ServerError;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "botledger_sid";

/// Server state
pub struct AppState {
    pub database_path: PathBuf,
    pub csv_path: PathBuf,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(database_path: PathBuf, csv_path: PathBuf, sessions: SessionStore) -> Self {
        Self { database_path, csv_path, sessions }
    }

    pub fn from_config(config: &BotledgerConfig) -> Self {
        Self::new(
            config.database_path(),
            config.csv_path(),
            SessionStore::new(TimeDelta::minutes(config.session_idle_minutes())),
        )
    }

    /// Each request gets its own connection
    pub fn open_store(&self) -> Result<SqliteStore, ServerError> {
        SqliteStore::open(&self.database_path).map_err(ServerError::from)
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/dashboard", get(routes::dashboard))
        .route("/companies", get(routes::companies))
        .route("/users", get(routes::users))
        .route("/users/{id}", get(routes::user_by_id))
        .route("/import", get(routes::import_overview).post(routes::run_import))
        .route("/import/clear", post(routes::clear_import))
        .route("/debug", get(routes::debug))
        .route("/database-info", get(routes::database_info))
        .route("/database-info/seed", post(routes::reseed_users))
        .route("/database-info/clear-users", post(routes::clear_users))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_caller))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, config: &BotledgerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}", Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve the session cookie into an [`AuthContext`] request extension.
/// Lookup failures leave the caller anonymous.
async fn resolve_caller(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let swept = state.sessions.purge_expired(Utc::now());
    if swept > 0 {
        debug!(swept, "dropped idle sessions");
    }

    let token = session_token(req.headers());
    let ctx = match token {
        None => AuthContext::anonymous(),
        Some(token) => match state.open_store() {
            Ok(store) => AuthService::new(&store, &state.sessions)
                .context(Some(token))
                .unwrap_or_else(|e| {
                    warn!(error = %e, "could not resolve session");
                    AuthContext::anonymous()
                }),
            Err(e) => {
                warn!(error = %e, "could not open store for session lookup");
                AuthContext::anonymous()
            }
        },
    };

    if ctx.is_authenticated() {
        debug!(email = ctx.caller(), "User authenticated via middleware");
    }
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Session id from the `Cookie` header, if present and well formed
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub(crate) fn session_cookie(token: &Uuid) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub(crate) fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
