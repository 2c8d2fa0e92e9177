//! Account registration and login.
//!
//! Credentials live in the `users` table (Argon2id hashes); successful
//! register/login both answer with a fresh signed session token. Login
//! accepts either a username or an email address — anything containing
//! `@` is looked up as an email.

pub mod password;
pub mod tokens;

use std::sync::Arc;

use serde::Serialize;

use crate::error::ServiceError;
use crate::storage::{Storage, UserRow};
use tokens::TokenSigner;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Issued to the client after register/login. `userId` casing matches the
/// frontend contract.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub username: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Clone)]
pub struct AuthService {
    storage: Arc<Storage>,
    signer: Arc<TokenSigner>,
}

impl AuthService {
    pub fn new(storage: Arc<Storage>, signer: Arc<TokenSigner>) -> Self {
        Self { storage, signer }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ServiceError> {
        let username = username.trim();
        let email = email.trim();
        validate_registration(username, email, password)?;

        if self.storage.find_user_by_email(email).await?.is_some() {
            return Err(ServiceError::Validation("User already exists".to_string()));
        }
        if self.storage.find_user_by_username(username).await?.is_some() {
            return Err(ServiceError::Validation(
                "Username already taken".to_string(),
            ));
        }

        let hash = password::hash_password(password)?;
        let user = self.storage.create_user(username, email, &hash).await?;
        self.session_for(&user)
    }

    pub async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<AuthSession, ServiceError> {
        let needle = username_or_email.trim();
        let user = if needle.contains('@') {
            self.storage.find_user_by_email(needle).await?
        } else {
            self.storage.find_user_by_username(needle).await?
        };

        // Same message for unknown user and wrong password.
        let invalid = || ServiceError::Validation("Invalid Credentials".to_string());
        let user = user.ok_or_else(invalid)?;
        if !password::verify_password(password, &user.password_hash) {
            return Err(invalid());
        }

        self.session_for(&user)
    }

    fn session_for(&self, user: &UserRow) -> Result<AuthSession, ServiceError> {
        let token = self.signer.issue(&user.id)?;
        Ok(AuthSession {
            token,
            username: user.username.clone(),
            user_id: user.id.clone(),
        })
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), ServiceError> {
    if username.len() < MIN_USERNAME_LEN {
        return Err(ServiceError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    if !is_plausible_email(email) {
        return Err(ServiceError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// local@domain.tld, no whitespace, exactly one `@`, a dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
