//! Task CRUD handlers
//!
//! Each handler opens one span named after the operation, validates input,
//! calls the store, and maps the outcome to a response. Persistence errors are
//! recorded on the span and surfaced to the client only as a generic message.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opentelemetry::{
    global::BoxedTracer,
    trace::{Span, Status, Tracer},
    KeyValue,
};
use std::sync::Arc;

use crate::{
    error::AppError,
    metrics::RequestMetrics,
    models::TaskPayload,
    store::{StoreError, TaskStore},
};

/// Shared handler state
///
/// Store, tracer, and metrics are explicit dependencies constructed once at
/// startup; tests inject an in-memory store and the no-op global tracer/meter.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub tracer: Arc<BoxedTracer>,
    pub metrics: RequestMetrics,
}

fn record_store_error(span: &mut impl Span, err: &StoreError) {
    span.record_error(err);
    span.set_status(Status::error(err.to_string()));
}

/// GET /tasks
pub async fn list_tasks(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut span = state.tracer.start("list_tasks");

    let tasks = state.store.list_all().await.map_err(|e| {
        record_store_error(&mut span, &e);
        AppError::storage("Failed to fetch tasks", e)
    })?;

    Ok((StatusCode::OK, Json(tasks)).into_response())
}

/// GET /tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, AppError> {
    let mut span = state.tracer.start("get_task");

    let Path(id) = id.map_err(|_| AppError::InvalidId)?;
    span.set_attribute(KeyValue::new("task.id", id as i64));

    match state.store.get_by_id(id).await {
        Ok(Some(task)) => Ok((StatusCode::OK, Json(task)).into_response()),
        Ok(None) => Err(AppError::NotFound),
        Err(e) => {
            record_store_error(&mut span, &e);
            Err(AppError::storage("Failed to fetch task", e))
        }
    }
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let mut span = state.tracer.start("create_task");

    let Json(input) = payload.map_err(|_| AppError::InvalidPayload)?;
    if input.title.is_empty() {
        return Err(AppError::TitleRequired);
    }
    let input = input.with_default_status();

    match state.store.create(&input).await {
        Ok(task) => {
            span.set_attribute(KeyValue::new("task.id", task.id as i64));
            Ok((StatusCode::CREATED, Json(task)).into_response())
        }
        Err(e) => {
            record_store_error(&mut span, &e);
            Err(AppError::storage("Failed to create task", e))
        }
    }
}

/// PUT /tasks/:id
///
/// Unlike create, an empty status is forwarded as-is rather than defaulted to
/// "pending". The returned entity always carries the path id.
pub async fn update_task(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let mut span = state.tracer.start("update_task");

    let Path(id) = id.map_err(|_| AppError::InvalidId)?;
    span.set_attribute(KeyValue::new("task.id", id as i64));

    let Json(input) = payload.map_err(|_| AppError::InvalidPayload)?;
    if input.title.is_empty() {
        return Err(AppError::TitleRequired);
    }

    match state.store.update(id, &input).await {
        Ok(task) => Ok((StatusCode::OK, Json(task)).into_response()),
        Err(StoreError::NotFound) => Err(AppError::NotFound),
        Err(e) => {
            record_store_error(&mut span, &e);
            Err(AppError::storage("Failed to update task", e))
        }
    }
}

/// DELETE /tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, AppError> {
    let mut span = state.tracer.start("delete_task");

    let Path(id) = id.map_err(|_| AppError::InvalidId)?;
    span.set_attribute(KeyValue::new("task.id", id as i64));

    match state.store.delete_by_id(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(StoreError::NotFound) => Err(AppError::NotFound),
        Err(e) => {
            record_store_error(&mut span, &e);
            Err(AppError::storage("Failed to delete task", e))
        }
    }
}
