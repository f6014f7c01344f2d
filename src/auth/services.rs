use std::sync::Arc;

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{LoginRequest, PublicUser, SignupRequest};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{SessionStore, UserStore};
use crate::auth::repo_types::NewUser;
use crate::error::AuthError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Signup, login and session lookup over injected stores.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn signup(&self, req: SignupRequest) -> Result<(), AuthError> {
        require("name", &req.name)?;
        require("email", &req.email)?;
        require("password", &req.password)?;
        if !is_valid_email(&req.email) {
            warn!("invalid email");
            return Err(AuthError::Validation("invalid email".into()));
        }

        if self.users.find_by_email(&req.email).await?.is_some() {
            warn!("email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .context("join password hashing task")??;

        let created = self
            .users
            .create(NewUser {
                name: req.name,
                photo: req.photo,
                email: req.email,
                password_hash,
            })
            .await?;

        match created {
            Some(user) => {
                info!(user_id = %user.id, "user registered");
                Ok(())
            }
            None => {
                warn!("email registered concurrently");
                Err(AuthError::DuplicateEmail)
            }
        }
    }

    /// Returns the new session token.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<String, AuthError> {
        require("email", &req.email)?;
        require("password", &req.password)?;

        let Some(user) = self.users.find_by_email(&req.email).await? else {
            warn!("login unknown email");
            return Err(AuthError::UnknownEmail);
        };

        let password = req.password;
        let stored = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .context("join password verification task")??;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AuthError::InvalidPassword);
        }

        let token = self.sessions.create(user.id).await?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Resolves a bearer token to its owner, without the password hash.
    #[instrument(skip_all)]
    pub async fn who_am_i(&self, token: Option<&str>) -> Result<PublicUser, AuthError> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        let Some(session) = self.sessions.find_by_token(token).await? else {
            warn!("unknown session token");
            return Err(AuthError::InvalidToken);
        };

        let Some(user) = self.users.find_by_id(session.user_id).await? else {
            error!(user_id = %session.user_id, session_id = %session.id, "session references missing user");
            return Err(AuthError::OrphanedSession);
        };

        Ok(PublicUser::from(user))
    }
}
