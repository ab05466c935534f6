use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::task::{CreateTask, Task, UpdateTask};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    middleware::load_task_middleware,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub deleted: u64,
}

pub async fn get_tasks(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = Task::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTask>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Task>>), ApiError> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating task '{}'", payload.title);

    let task = Task::create(&state.db().pool, &payload, id).await?;

    tracing::info!(task_id = %task.id, status = %task.status, "Created task");
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(task))))
}

pub async fn update_task(
    Extension(existing_task): Extension<Task>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task_id = existing_task.id;
    let merged = payload.merge(existing_task)?;
    let task = Task::update(&state.db().pool, &merged).await?;

    tracing::debug!(%task_id, status = %task.status, "Updated task");
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// Deleting an id that does not exist still succeeds with `deleted: 0`.
pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> Result<ResponseJson<ApiResponse<DeleteTaskResponse>>, ApiError> {
    let deleted = Task::delete(&state.db().pool, task_id).await?;
    if deleted == 0 {
        tracing::debug!(%task_id, "Delete requested for missing task");
    } else {
        tracing::info!(%task_id, "Deleted task");
    }

    Ok(ResponseJson(ApiResponse::success_with_message(
        DeleteTaskResponse { deleted },
        "Task deleted",
    )))
}

pub fn router(state: &AppState) -> Router<AppState> {
    // Only reads and updates need the loaded task; delete stays idempotent.
    let task_id_routes = get(get_task)
        .put(update_task)
        .layer(from_fn_with_state(state.clone(), load_task_middleware::<AppState>))
        .delete(delete_task);

    let inner = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .route("/{task_id}", task_id_routes);

    Router::new().nest("/tasks", inner)
}
