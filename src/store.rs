//! PostgreSQL persistence layer for tasks
//!
//! The `TaskStore` trait is the persistence gateway contract; `PgTaskStore` is
//! the production implementation. Row absence is a first-class outcome
//! (`Option` / `StoreError::NotFound`), distinct from query failures.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::{Task, TaskPayload};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted row does not exist. Not an I/O failure.
    #[error("task not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence gateway contract
///
/// Injected into handlers as a trait object so tests can substitute an
/// in-memory double.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks, newest first. An empty store yields an empty vec.
    async fn list_all(&self) -> Result<Vec<Task>, StoreError>;

    /// `None` when no row matches `id`.
    async fn get_by_id(&self, id: i32) -> Result<Option<Task>, StoreError>;

    /// Assigns `id` and both timestamps; caller-supplied values are ignored.
    /// Returns the persisted row with all server-assigned fields populated.
    async fn create(&self, input: &TaskPayload) -> Result<Task, StoreError>;

    /// Persists title/description/status and resets `updated_at`. `created_at`
    /// is never modified. `StoreError::NotFound` when no row matched.
    async fn update(&self, id: i32, input: &TaskPayload) -> Result<Task, StoreError>;

    /// `StoreError::NotFound` when no row matched, including repeat deletes.
    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError>;
}

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    /// Connect to PostgreSQL and verify reachability
    ///
    /// Failure here is a boot-time precondition violation; callers propagate it
    /// to `main` and abort rather than retry.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url())
            .await
            .context("Failed to connect to database")?;

        // Explicit reachability check, mirroring a ping
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .context("Failed to ping database")?;

        Ok(Self { pool })
    }

    /// Idempotent schema bootstrap
    ///
    /// Creating the table on every startup is the only schema-evolution
    /// mechanism; kept as an explicit step separate from `connect`.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id SERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status VARCHAR(50) NOT NULL DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create tasks table")?;

        tracing::info!("Tasks table ready");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, created_at, updated_at
             FROM tasks
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, created_at, updated_at
             FROM tasks
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn create(&self, input: &TaskPayload) -> Result<Task, StoreError> {
        // Single timestamp so created_at == updated_at on creation
        let now = Utc::now();

        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, description, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING id, title, description, status, created_at, updated_at",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update(&self, id: i32, input: &TaskPayload) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title = $1, description = $2, status = $3, updated_at = $4
             WHERE id = $5
             RETURNING id, title, description, status, created_at, updated_at",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        task.ok_or(StoreError::NotFound)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
