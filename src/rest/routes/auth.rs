// rest/routes/auth.rs — register and login endpoints.

use axum::{extract::State, response::Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::AuthSession;
use crate::error::ServiceError;
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthSession>, ServiceError> {
    let session = ctx
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;
    Ok(Json(session))
}

pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthSession>, ServiceError> {
    let session = ctx
        .auth
        .login(&req.username_or_email, &req.password)
        .await?;
    Ok(Json(session))
}
