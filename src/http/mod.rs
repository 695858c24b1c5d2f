use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Extension, FromRequest, Path, Query, Request, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    calendar::ExerciseDate,
    config::{Config, ErrorStatusMode},
    domain::{DomainError, NewExercise, User},
    log_filter::{LogFilter, LogQuery},
    state::MemoryStore,
};

mod web_assets;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<MemoryStore>>,
}

#[derive(Debug)]
pub struct ApiError {
    message: String,
    status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::UserNotFound { .. } => ApiError::not_found(value.to_string()),
            DomainError::MissingUsername | DomainError::MissingExerciseFields => {
                ApiError::invalid_request(value.to_string())
            }
        }
    }
}

/// Marks responses built from an [`ApiError`] so the status policy layer can
/// tell them apart from axum's own rejections.
#[derive(Clone, Copy)]
struct ApiErrorResponse;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        let mut res = (self.status, Json(body)).into_response();
        res.extensions_mut().insert(ApiErrorResponse);
        res
    }
}

/// Request body decoded from JSON or from an urlencoded form, picked by
/// `Content-Type`. A request with no body and no content type decodes as an
/// empty object so that missing fields surface as validation errors.
pub struct ApiBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("application/json") || ct.contains("+json") => {
                let Json(value) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::invalid_request(e.to_string()))?;
                Ok(Self(value))
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let axum::Form(value) = axum::Form::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::invalid_request(e.to_string()))?;
                Ok(Self(value))
            }
            other => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::invalid_request(e.to_string()))?;
                if !bytes.iter().all(u8::is_ascii_whitespace) {
                    return Err(ApiError::invalid_request(format!(
                        "unsupported content type: {}",
                        other.unwrap_or("none")
                    )));
                }
                let value = serde_json::from_value(json!({}))
                    .map_err(|e| ApiError::invalid_request(e.to_string()))?;
                Ok(Self(value))
            }
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct CreateUserRequest {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseResponse {
    username: String,
    description: String,
    duration_minutes: Option<i64>,
    date: ExerciseDate,
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogEntry {
    description: String,
    duration_minutes: Option<i64>,
    date: ExerciseDate,
}

#[derive(Debug, Serialize)]
struct LogResponse {
    username: String,
    count: usize,
    id: String,
    log: Vec<LogEntry>,
}

pub fn build_router(config: Config, store: Arc<Mutex<MemoryStore>>) -> Router {
    let error_status = config.error_status;
    let app_state = AppState { store };

    let api = Router::new()
        .route("/health", get(health))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id/exercises", axum::routing::post(add_exercise))
        .route("/users/:user_id/logs", get(get_logs))
        .fallback(fallback_not_found);

    Router::new()
        .nest("/api", api)
        .route("/", get(index))
        .layer(middleware::from_fn_with_state(error_status, apply_error_status))
        .layer(Extension(app_state))
}

async fn apply_error_status(
    State(mode): State<ErrorStatusMode>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut res = next.run(req).await;
    if mode == ErrorStatusMode::Compat && res.extensions().get::<ApiErrorResponse>().is_some() {
        *res.status_mut() = StatusCode::OK;
    }
    res
}

async fn health(Extension(state): Extension<AppState>) -> Json<serde_json::Value> {
    let store = state.store.lock().await;
    Json(json!({
        "status": "ok",
        "version": crate::version::VERSION,
        "users": store.user_count(),
        "exercises": store.exercise_count(),
    }))
}

async fn create_user(
    Extension(state): Extension<AppState>,
    ApiBody(req): ApiBody<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = {
        let mut store = state.store.lock().await;
        store.create_user(req.username)?
    };
    debug!(user_id = %user.id, "user created");
    Ok(Json(user))
}

async fn list_users(Extension(state): Extension<AppState>) -> Json<Vec<User>> {
    let store = state.store.lock().await;
    Json(store.list_users())
}

// The body is extracted as a `Result` so that an unknown owner is reported
// ahead of an undecodable body.
async fn add_exercise(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
    body: Result<ApiBody<NewExercise>, ApiError>,
) -> Result<Json<ExerciseResponse>, ApiError> {
    let (owner, exercise) = {
        let mut store = state.store.lock().await;
        if store.get_user(&user_id).is_none() {
            return Err(DomainError::UserNotFound { user_id }.into());
        }
        let ApiBody(req) = body?;
        store.add_exercise(&user_id, req, Utc::now().date_naive())?
    };
    debug!(
        user_id = %owner.id,
        valid_date = exercise.date.is_valid(),
        "exercise logged"
    );
    Ok(Json(ExerciseResponse {
        username: owner.username,
        description: exercise.description,
        duration_minutes: exercise.duration_minutes,
        date: exercise.date,
        id: owner.id,
    }))
}

async fn get_logs(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> Result<Json<LogResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::invalid_request(e.to_string()))?;
    let filter = LogFilter::from_query(&query);

    let store = state.store.lock().await;
    let log = store.exercise_log(&user_id, &filter)?;
    let entries: Vec<LogEntry> = log
        .entries
        .iter()
        .map(|e| LogEntry {
            description: e.description.clone(),
            duration_minutes: e.duration_minutes,
            date: e.date,
        })
        .collect();

    Ok(Json(LogResponse {
        username: log.user.username.clone(),
        count: entries.len(),
        id: log.user.id.clone(),
        log: entries,
    }))
}

async fn fallback_not_found() -> ApiError {
    ApiError::not_found("not found")
}

async fn index() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    (headers, web_assets::INDEX_HTML).into_response()
}
