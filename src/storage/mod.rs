use anyhow::{Context as _, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub category: String,
    /// Calendar date `YYYY-MM-DD`; day granularity only.
    pub due_date: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Field values for a full-row task update. The service layer merges the
/// request onto the existing row; the write itself is a single atomic
/// UPDATE statement (last-write-wins).
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub category: String,
    pub due_date: Option<String>,
    pub completed: bool,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("taskd.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_user(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after insert"))
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    // ─── Tasks ──────────────────────────────────────────────────────────────

    pub async fn create_task(
        &self,
        user_id: &str,
        title: &str,
        description: Option<&str>,
        priority: &str,
        category: &str,
        due_date: Option<&str>,
    ) -> Result<TaskRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO tasks (id, user_id, title, description, priority, category, due_date, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(category)
        .bind(due_date)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_task(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<TaskRow>> {
        Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// All of one user's tasks, newest first (the store's default order;
    /// presentation ordering is the view engine's job).
    pub async fn list_tasks(&self, user_id: &str) -> Result<Vec<TaskRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Overwrite every mutable field of a task in one statement and refresh
    /// `updated_at`. Returns the row as persisted.
    pub async fn update_task(&self, id: &str, fields: &TaskUpdate) -> Result<TaskRow> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, priority = ?, category = ?, \
             due_date = ?, completed = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.priority)
        .bind(&fields.category)
        .bind(&fields.due_date)
        .bind(fields.completed)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get_task(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after update"))
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Settings ───────────────────────────────────────────────────────────

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
