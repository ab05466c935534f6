use std::{fmt::Display, future::Future};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use db::{DBService, models::task::Task};
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::ApiPath};

pub trait ModelLoaderDeps {
    fn db_service(&self) -> &DBService;
}

impl ModelLoaderDeps for AppState {
    fn db_service(&self) -> &DBService {
        self.db()
    }
}

async fn fetch_model_or_error<M, E, Fut>(
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<M, ApiError>
where
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(ApiError::NotFound(format!("{model_name} not found")))
        }
        Err(error) => {
            tracing::error!("Failed to fetch {model_name} {model_id}: {error}");
            Err(ApiError::Internal(format!("Failed to load {model_name}")))
        }
    }
}

/// Resolves `{task_id}` into a `Task` request extension, or answers 404.
pub async fn load_task_middleware<S>(
    State(state): State<S>,
    ApiPath(task_id): ApiPath<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    let task = fetch_model_or_error(
        "Task",
        task_id,
        Task::find_by_id(&state.db_service().pool, task_id),
    )
    .await?;
    request.extensions_mut().insert(task);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::fetch_model_or_error;

    #[tokio::test]
    async fn fetch_model_or_error_returns_not_found_on_missing_model() {
        let result = fetch_model_or_error::<String, &'static str, _>(
            "Task",
            uuid::Uuid::new_v4(),
            async { Ok(None) },
        )
        .await;

        assert_eq!(
            result.unwrap_err().into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn fetch_model_or_error_returns_internal_error_on_fetch_failure() {
        let result = fetch_model_or_error::<String, &'static str, _>(
            "Task",
            uuid::Uuid::new_v4(),
            async { Err("db unavailable") },
        )
        .await;

        assert_eq!(
            result.unwrap_err().into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
