// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Username/password accounts with an append-only consent log.

use crate::db::DocumentDb;
use crate::error::AppError;
use crate::models::{fold_events, Account, ConsentEvent, ConsentSnapshot};
use crate::services::password::{hash_password, verify_password};
use crate::services::session::SessionRegistry;
use crate::time_utils::now_rfc3339;
use validator::{Validate, ValidationError};

/// Signup form after trimming.
#[derive(Debug, Validate)]
pub struct NewAccount {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 64), custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
}

const USERNAME_CHARS_MESSAGE: &str =
    "Username may only contain letters, digits, '.', '-' and '_'";

/// Usernames become document IDs, so they are limited to characters that are
/// safe in a document path and must not look like a reserved `__x__` ID.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        && !username.starts_with("__")
        && username != "."
        && username != ".."
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() || is_valid_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars"))
    }
}

impl NewAccount {
    /// Validate, mapping failures to the messages the signup page shows.
    fn check(&self) -> Result<(), AppError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let fields = errors.field_errors();
        let failed = |field: &str, code: &str| {
            fields
                .get(field)
                .is_some_and(|errs| errs.iter().any(|e| e.code == code))
        };
        if failed("name", "length") || failed("username", "length") || failed("password", "length")
        {
            return Err(AppError::BadRequest(
                "Name, username and password are required".to_string(),
            ));
        }
        if failed("username", "username_chars") {
            return Err(AppError::BadRequest(USERNAME_CHARS_MESSAGE.to_string()));
        }
        Err(AppError::BadRequest("Passwords do not match".to_string()))
    }
}

/// Account operations over the document store plus the session registry.
#[derive(Clone)]
pub struct AccountService {
    db: DocumentDb,
    sessions: SessionRegistry,
}

impl AccountService {
    pub fn new(db: DocumentDb) -> Self {
        Self {
            db,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Create an account. Usernames are unique.
    pub async fn signup(&self, form: NewAccount) -> Result<Account, AppError> {
        form.check()?;

        let password_hash = hash_password(&form.password)?;
        let account = Account {
            name: form.name,
            username: form.username,
            password_hash,
            created_at: now_rfc3339(),
        };

        if !self.db.insert_account(&account).await? {
            tracing::info!(username = %account.username, "Signup rejected: username taken");
            return Err(AppError::BadRequest("Username already exists".to_string()));
        }

        tracing::info!(username = %account.username, "Account created");
        Ok(account)
    }

    /// Check credentials and start a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }

        if !is_valid_username(username) {
            tracing::info!(username, "Login failed: malformed username");
            return Err(AppError::InvalidCredentials);
        }

        let Some(account) = self.db.get_account(username).await? else {
            tracing::info!(username, "Login failed: unknown user");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_hash)? {
            tracing::info!(username, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        Ok(self.sessions.create(username))
    }

    pub async fn account(&self, username: &str) -> Result<Option<Account>, AppError> {
        self.db.get_account(username).await
    }

    /// Append an event for an existing account.
    pub async fn record(&self, event: ConsentEvent) -> Result<(), AppError> {
        if self.db.get_account(&event.username).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        self.db.append_event(&event).await
    }

    /// Fold the user's consent log.
    pub async fn snapshot(&self, username: &str) -> Result<ConsentSnapshot, AppError> {
        let events = self.db.events_for(username).await?;
        Ok(fold_events(username, &events))
    }

    pub async fn consent_events(&self, username: &str) -> Result<Vec<ConsentEvent>, AppError> {
        self.db.events_for(username).await
    }
}
