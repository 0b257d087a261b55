use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use crate::auth::{AuthContext, AuthService, LoginRequest};
use crate::entity::{CompanyDetail, User};
use crate::import::{CsvImporter, ImportResult, PathSource};
use crate::server::{expired_session_cookie, session_cookie, session_token, AppState, ServerError};
use crate::storage::{DbStats, RecordStore};
use crate::users::UserService;

/// How many companies the import overview previews
const SAMPLE_COMPANIES: usize = 5;

type ApiResult<T> = Result<Json<T>, ServerError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub current_user: Option<User>,
    pub users: Vec<User>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOverview {
    pub stats: DbStats,
    pub sample_companies: Vec<CompanyDetail>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub result: ImportResult,
    pub stats: DbStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub is_authenticated: bool,
    pub current_user: String,
    pub session_user_id: String,
    pub database_connected: bool,
    pub companies_table_exists: bool,
    pub companies_count: usize,
    pub users_count: usize,
    pub database_tables: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub database_path: String,
    pub database_exists: bool,
    pub total_users: usize,
    pub active_users: usize,
    pub users: Vec<User>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    request.check_form()?;

    let store = state.open_store()?;
    let result = AuthService::new(&store, &state.sessions).login(request.email.trim(), &request.password);

    let response = match result.token {
        Some(token) => (
            StatusCode::OK,
            [(header::SET_COOKIE, session_cookie(&token))],
            Json(result),
        )
            .into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(result)).into_response(),
    };
    Ok(response)
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let store = state.open_store()?;
    let auth = AuthService::new(&store, &state.sessions);
    let ended = session_token(&headers).is_some_and(|token| auth.logout(&token));

    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(json!({ "success": true, "sessionEnded": ended })),
    )
        .into_response())
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<DashboardResponse> {
    let store = state.open_store()?;
    let users = UserService::new(&store).list_active_users()?;
    Ok(Json(DashboardResponse {
        current_user: ctx.user,
        users,
    }))
}

pub async fn companies(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Vec<CompanyDetail>> {
    if !ctx.is_authenticated() {
        return Err(ServerError::login_required());
    }

    let store = state.open_store()?;
    let companies = store.list_companies_with_children()?;
    info!(email = ctx.caller(), count = companies.len(), "User viewed companies");
    Ok(Json(companies))
}

pub async fn users(State(state): State<Arc<AppState>>) -> ApiResult<Vec<User>> {
    let store = state.open_store()?;
    let users = UserService::new(&store).list_active_users()?;
    Ok(Json(users))
}

pub async fn user_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ServerError> {
    let store = state.open_store()?;
    let response = match UserService::new(&store).get_by_id(id)? {
        Some(user) => Json(json!({ "success": true, "user": user })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "User not found" })),
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn import_overview(State(state): State<Arc<AppState>>) -> ApiResult<ImportOverview> {
    let store = state.open_store()?;
    Ok(Json(ImportOverview {
        stats: store.stats()?,
        sample_companies: store.sample_companies(SAMPLE_COMPANIES)?,
    }))
}

pub async fn run_import(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<ImportResponse> {
    if !ctx.is_authenticated() {
        return Err(ServerError::login_required());
    }

    let mut store = state.open_store()?;
    info!(email = ctx.caller(), source = %state.csv_path.display(), "Import requested");
    let result = CsvImporter::new(&mut store, PathSource::new(&state.csv_path)).import();
    Ok(Json(ImportResponse {
        result,
        stats: store.stats()?,
    }))
}

pub async fn clear_import(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<serde_json::Value> {
    if !ctx.is_authenticated() {
        return Err(ServerError::login_required());
    }

    let mut store = state.open_store()?;
    info!(email = ctx.caller(), "Clearing all data from database...");
    store.clear_all()?;
    info!("All data cleared successfully");
    Ok(Json(json!({
        "success": true,
        "message": "All data cleared successfully.",
        "stats": store.stats()?,
    })))
}

pub async fn debug(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<DebugInfo> {
    let mut info = DebugInfo {
        is_authenticated: ctx.is_authenticated(),
        current_user: ctx
            .user
            .as_ref()
            .map(|u| format!("{} ({})", u.full_name(), u.email))
            .unwrap_or_else(|| "Not logged in".to_string()),
        session_user_id: ctx
            .user
            .as_ref()
            .map(|u| u.id.to_string())
            .unwrap_or_else(|| "None".to_string()),
        database_connected: false,
        companies_table_exists: false,
        companies_count: 0,
        users_count: 0,
        database_tables: Vec::new(),
    };

    // A broken database is reported in the body, not as an error status
    let store = match state.open_store() {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Debug: database unavailable");
            return Ok(Json(info));
        }
    };

    info.database_connected = store.ping();
    if info.database_connected {
        info.companies_table_exists = store.table_exists("companies").unwrap_or(false);
        info.users_count = store.count_users().unwrap_or_else(|e| {
            error!(error = %e, "Error getting counts");
            0
        });
        if info.companies_table_exists {
            info.companies_count = store.count_companies().unwrap_or(0);
        }
        info.database_tables = store.table_names().unwrap_or_default();
    }
    Ok(Json(info))
}

pub async fn database_info(State(state): State<Arc<AppState>>) -> ApiResult<DatabaseInfo> {
    let database_exists = state.database_path.is_file();
    let store = state.open_store()?;
    let users = store.list_users()?;
    let active_users = users.iter().filter(|u| u.is_active).count();

    info!(
        path = %state.database_path.display(),
        exists = database_exists,
        total = users.len(),
        active = active_users,
        "Database info"
    );

    Ok(Json(DatabaseInfo {
        database_path: state.database_path.display().to_string(),
        database_exists,
        total_users: users.len(),
        active_users,
        users,
    }))
}

pub async fn reseed_users(State(state): State<Arc<AppState>>) -> ApiResult<serde_json::Value> {
    let store = state.open_store()?;
    let seeded = UserService::new(&store).reseed_default_users()?;
    Ok(Json(json!({ "success": true, "usersSeeded": seeded })))
}

pub async fn clear_users(State(state): State<Arc<AppState>>) -> ApiResult<serde_json::Value> {
    let store = state.open_store()?;
    info!("Clearing all users from database...");
    let removed = store.delete_all_users()?;
    info!(removed, "Database cleared successfully");
    Ok(Json(json!({ "success": true, "usersRemoved": removed })))
}
