pub mod auth;
pub mod config;
pub mod error;
pub mod rest;
pub mod storage;
pub mod tasks;
pub mod view;

use std::sync::Arc;

use auth::tokens::TokenSigner;
use auth::AuthService;
use config::ServerConfig;
use storage::Storage;
use tasks::TaskService;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    /// Signs and verifies session bearer tokens.
    pub signer: Arc<TokenSigner>,
    pub auth: AuthService,
    pub tasks: TaskService,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: Arc<ServerConfig>, storage: Arc<Storage>, signer: Arc<TokenSigner>) -> Self {
        let auth = AuthService::new(storage.clone(), signer.clone());
        let tasks = TaskService::new(storage);
        Self {
            config,
            signer,
            auth,
            tasks,
            started_at: std::time::Instant::now(),
        }
    }
}
