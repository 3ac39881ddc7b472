use crate::config::{GenerationConfig, ServerConfig};
use crate::data::{GenerationInput, GenerationOutput, Issue, IssueKind};
use crate::error::GenerationError;
use crate::solver::{CancelToken, Generator};
use crate::store::{MemoryStore, ScheduleStore, StoredSchedules};
use crate::validation::{ValidationReport, validate};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub config: GenerationConfig,
    pub store: Arc<dyn ScheduleStore>,
    // One generation at a time. The guard lives as long as the engine work.
    run_lock: Arc<tokio::sync::Mutex<()>>,
    active: Arc<Mutex<Option<CancelToken>>>,
}

impl AppState {
    pub fn new(config: GenerationConfig, store: Arc<dyn ScheduleStore>) -> Self {
        Self {
            config,
            store,
            run_lock: Arc::new(tokio::sync::Mutex::new(())),
            active: Arc::new(Mutex::new(None)),
        }
    }

    fn set_active(&self, token: Option<CancelToken>) {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = token;
    }

    fn active(&self) -> Option<CancelToken> {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Marks a run as active until the blocking task that owns it finishes.
struct ActiveRun {
    state: AppState,
}

impl ActiveRun {
    fn start(state: &AppState, token: &CancelToken) -> Self {
        state.set_active(Some(token.clone()));
        Self {
            state: state.clone(),
        }
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.state.set_active(None);
    }
}

/// Cancels the run if the request is dropped before it completes.
struct CancelOnDrop(Option<CancelToken>);

impl CancelOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.0.take() {
            info!("Generation request dropped; cancelling run");
            token.cancel();
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn internal_failure() -> Response {
    let output = GenerationOutput::blocked(
        vec![Issue::new(
            IssueKind::Internal,
            "An unexpected error occurred while generating schedules.",
        )],
        Vec::new(),
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Json(output)).into_response()
}

async fn validate_handler(Json(input): Json<GenerationInput>) -> Json<ValidationReport> {
    Json(validate(
        &input.courses,
        &input.teachers,
        &input.subjects,
        &input.time_slots,
    ))
}

/// Runs one generation and stores its schedules when it succeeds.
fn run_and_store(
    input: &GenerationInput,
    config: GenerationConfig,
    token: CancelToken,
    store: &dyn ScheduleStore,
) -> Result<GenerationOutput, GenerationError> {
    let output = Generator::new(input, config)
        .with_cancel(token)
        .on_progress(|p| {
            info!(
                "Generation progress {}/{}: {}",
                p.completed, p.total, p.course_name
            )
        })
        .run()?;
    if output.success {
        store.save(StoredSchedules {
            course_schedules: output.course_schedules.clone(),
            teacher_schedules: output.teacher_schedules.clone(),
        });
    }
    Ok(output)
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(input): Json<GenerationInput>,
) -> Result<Response, AppError> {
    let permit = state.run_lock.clone().lock_owned().await;
    let token = CancelToken::new();
    let active = ActiveRun::start(&state, &token);
    let abandon = CancelOnDrop(Some(token.clone()));

    let config = state.config.clone();
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        // Dropped in reverse order: the run is marked inactive, then the lock is released.
        let _permit = permit;
        let _active = active;
        run_and_store(&input, config, token, store.as_ref())
    })
    .await;
    abandon.disarm();

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(GenerationError::Cancelled)) => {
            info!("Generation cancelled; nothing stored");
            return Err(AppError::new(StatusCode::CONFLICT, "generation cancelled"));
        }
        Ok(Err(e)) => {
            error!("Generation failed: {}", e);
            return Ok(internal_failure());
        }
        Err(e) => {
            error!("Generation task failed: {}", e);
            return Ok(internal_failure());
        }
    };

    if !output.success {
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(output)).into_response());
    }
    Ok(Json(output).into_response())
}

async fn cancel_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.active() {
        Some(token) => {
            token.cancel();
            Ok((StatusCode::ACCEPTED, Json(json!({ "status": "cancelling" }))).into_response())
        }
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            "no generation in progress",
        )),
    }
}

async fn latest_handler(State(state): State<AppState>) -> Result<Json<StoredSchedules>, AppError> {
    state
        .store
        .load()
        .map(Json)
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "no schedules generated yet"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/timetable", get(latest_handler))
        .route("/v1/timetable/validate", post(validate_handler))
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/cancel", post(cancel_handler))
        .with_state(state)
}

pub async fn run_server(config: ServerConfig, generation: GenerationConfig) -> std::io::Result<()> {
    let state = AppState::new(generation, Arc::new(MemoryStore::new()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
