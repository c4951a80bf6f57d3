// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store for accounts and the consent log.
//!
//! Provides typed operations for:
//! - Users (accounts keyed by username)
//! - User data (append-only consent events)
//!
//! Backed by Firestore, or by in-process collections for local runs and
//! tests.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Account, ConsentEvent};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process stand-in for the two collections.
#[derive(Default)]
struct MemoryCollections {
    users: DashMap<String, Account>,
    user_data: RwLock<Vec<ConsentEvent>>,
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryCollections>),
}

/// Document database client.
#[derive(Clone)]
pub struct DocumentDb {
    backend: Backend,
}

impl DocumentDb {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-process database. Contents are lost on restart.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryCollections::default())),
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get an account by username.
    pub async fn get_account(&self, username: &str) -> Result<Option<Account>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(username)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(mem) => Ok(mem.users.get(username).map(|a| a.clone())),
        }
    }

    /// Store a new account. Returns `false` if the username is taken.
    pub async fn insert_account(&self, account: &Account) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                // Check-then-write: two signups racing for one name can both pass.
                if self.get_account(&account.username).await?.is_some() {
                    return Ok(false);
                }
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(&account.username)
                    .object(account)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(true)
            }
            Backend::Memory(mem) => match mem.users.entry(account.username.clone()) {
                Entry::Occupied(_) => Ok(false),
                Entry::Vacant(slot) => {
                    slot.insert(account.clone());
                    Ok(true)
                }
            },
        }
    }

    // ─── User Data Operations ────────────────────────────────────

    /// Append a consent event.
    pub async fn append_event(&self, event: &ConsentEvent) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USER_DATA)
                    .document_id(&event.id)
                    .object(event)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(mem) => mem.user_data.write().await.push(event.clone()),
        }
        Ok(())
    }

    /// All consent events recorded for a user, in no particular order.
    pub async fn events_for(&self, username: &str) -> Result<Vec<ConsentEvent>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .from(collections::USER_DATA)
                .filter(|q| q.for_all([q.field("username").eq(username.to_string())]))
                .obj::<ConsentEvent>()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(mem) => Ok(mem
                .user_data
                .read()
                .await
                .iter()
                .filter(|e| e.username == username)
                .cloned()
                .collect()),
        }
    }
}
