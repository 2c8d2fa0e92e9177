//! Task CRUD scoped to the authenticated user.
//!
//! Every id-addressed operation re-reads the row and checks ownership before
//! touching it — a task is only ever visible or mutable through its owner's
//! session, regardless of what id the caller supplies.

pub mod model;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::storage::{Storage, TaskRow, TaskUpdate};
pub use model::{Priority, Task};

const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Partial update. A field deserialized to `Some` is applied — explicitly
/// including `Some(false)` for `completed` and `Some("")` for text fields;
/// absent (or JSON null) fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Clone)]
pub struct TaskService {
    storage: Arc<Storage>,
}

impl TaskService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// All of the caller's tasks, newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Task>, ServiceError> {
        let rows = self.storage.list_tasks(user_id).await?;
        rows.into_iter()
            .map(|row| Task::try_from(row).map_err(ServiceError::from))
            .collect()
    }

    pub async fn create(&self, user_id: &str, req: CreateTask) -> Result<Task, ServiceError> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation(
                "Please enter a task title".to_string(),
            ));
        }
        let priority = req.priority.unwrap_or_default();
        let category = req
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        let due_date = req.due_date.map(|d| d.to_string());

        let row = self
            .storage
            .create_task(
                user_id,
                title,
                req.description.as_deref(),
                priority.as_str(),
                category,
                due_date.as_deref(),
            )
            .await?;
        Ok(Task::try_from(row)?)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        req: UpdateTask,
    ) -> Result<Task, ServiceError> {
        let existing = self.owned_task(user_id, id).await?;

        if let Some(title) = &req.title {
            if title.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "Please enter a task title".to_string(),
                ));
            }
        }
        if let Some(category) = &req.category {
            if category.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "Category cannot be empty".to_string(),
                ));
            }
        }

        let fields = TaskUpdate {
            title: req.title.unwrap_or(existing.title),
            description: req.description.or(existing.description),
            priority: req
                .priority
                .map(|p| p.as_str().to_string())
                .unwrap_or(existing.priority),
            category: req.category.unwrap_or(existing.category),
            due_date: req.due_date.map(|d| d.to_string()).or(existing.due_date),
            completed: req.completed.unwrap_or(existing.completed),
        };

        let row = self.storage.update_task(id, &fields).await?;
        Ok(Task::try_from(row)?)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        self.owned_task(user_id, id).await?;
        self.storage.delete_task(id).await?;
        Ok(())
    }

    /// Fetch a task by id, enforcing the ownership contract: unknown id is
    /// `NotFound`, someone else's task is `Forbidden`.
    async fn owned_task(&self, user_id: &str, id: &str) -> Result<TaskRow, ServiceError> {
        let task = self
            .storage
            .get_task(id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if task.user_id != user_id {
            return Err(ServiceError::Forbidden);
        }
        Ok(task)
    }
}
