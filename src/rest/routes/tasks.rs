// rest/routes/tasks.rs — task CRUD endpoints.
//
// All handlers run behind the bearer-token middleware and receive the
// caller's identity as an `AuthUser` extension; the service layer enforces
// ownership on every id-addressed operation.
//
// GET /tasks with no query parameters returns the caller's tasks newest
// first. Any view parameter switches the response to the classification &
// view engine:
//   ?priority=high,low&show_completed=false&category=Work&sort=due-date
//   ?today=2026-06-15   (viewer's local date for overdue classification)

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ServiceError;
use crate::rest::auth::AuthUser;
use crate::tasks::{CreateTask, Priority, Task, UpdateTask};
use crate::view::{self, FilterConfig, SortKey};
use crate::AppContext;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Comma-separated priority selection, e.g. `priority=high,medium`.
    priority: Option<String>,
    show_completed: Option<bool>,
    show_active: Option<bool>,
    show_overdue: Option<bool>,
    category: Option<String>,
    sort: Option<SortKey>,
    /// Viewer's local calendar date; defaults to the server's local date.
    today: Option<NaiveDate>,
}

impl ListQuery {
    fn is_plain(&self) -> bool {
        self.priority.is_none()
            && self.show_completed.is_none()
            && self.show_active.is_none()
            && self.show_overdue.is_none()
            && self.category.is_none()
            && self.sort.is_none()
            && self.today.is_none()
    }

    fn filter(&self) -> Result<FilterConfig, ServiceError> {
        let mut priorities = HashSet::new();
        if let Some(raw) = &self.priority {
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let p = Priority::parse(part).ok_or_else(|| {
                    ServiceError::Validation(format!("Invalid priority filter: {part}"))
                })?;
                priorities.insert(p);
            }
        }
        Ok(FilterConfig {
            priorities,
            show_completed: self.show_completed.unwrap_or(true),
            show_active: self.show_active.unwrap_or(true),
            show_overdue: self.show_overdue.unwrap_or(true),
            category: self.category.clone(),
        })
    }
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ServiceError> {
    let tasks = ctx.tasks.list(&user.user_id).await?;
    if query.is_plain() {
        return Ok(Json(tasks));
    }

    let filter = query.filter()?;
    let sort = query.sort.unwrap_or_default();
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(view::build_view(&tasks, &filter, sort, today)))
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateTask>,
) -> Result<Json<Task>, ServiceError> {
    let task = ctx.tasks.create(&user.user_id, req).await?;
    Ok(Json(task))
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTask>,
) -> Result<Json<Task>, ServiceError> {
    let task = ctx.tasks.update(&user.user_id, &id, req).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    ctx.tasks.delete(&user.user_id, &id).await?;
    Ok(Json(json!({ "message": "Task removed" })))
}

pub async fn list_categories(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<String>>, ServiceError> {
    let tasks = ctx.tasks.list(&user.user_id).await?;
    Ok(Json(view::categories(&tasks)))
}
