// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flat-file participant store.
//!
//! All records live in one pretty-printed JSON array. Mutations take an
//! in-process lock around the whole read-modify-write cycle and replace the
//! file atomically, so readers never observe a half-written array.

use crate::error::AppError;
use crate::models::ParticipantRecord;
use crate::time_utils::now_rfc3339;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of a participant login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session_id: String,
    /// Whether the record was created by this login
    pub created: bool,
}

/// JSON-file backed participant store.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record. A missing file is an empty store.
    pub async fn read_all(&self) -> Result<Vec<ParticipantRecord>, AppError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&data).map_err(|e| {
            AppError::Database(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn write_all(&self, records: &[ParticipantRecord]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| AppError::Database(format!("Failed to encode records: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| AppError::Database(format!("Failed to write {}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to replace {}: {}", self.path.display(), e))
            })?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "Wrote participant records");
        Ok(())
    }

    /// Find a participant by trimmed Prolific ID.
    pub async fn find(&self, prolific_id: &str) -> Result<Option<ParticipantRecord>, AppError> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .find(|r| r.prolific_id == prolific_id))
    }

    /// Find the participant currently holding a session token.
    pub async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ParticipantRecord>, AppError> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .find(|r| r.session_id.as_deref() == Some(session_id)))
    }

    /// Log a participant in, creating the record on first sight.
    ///
    /// Any previous session token for the participant is overwritten.
    pub async fn login(&self, prolific_id: &str) -> Result<LoginOutcome, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;

        let session_id = uuid::Uuid::new_v4().to_string();
        let created = match records.iter_mut().find(|r| r.prolific_id == prolific_id) {
            Some(record) => {
                record.session_id = Some(session_id.clone());
                false
            }
            None => {
                let mut record = ParticipantRecord::new(prolific_id, now_rfc3339());
                record.session_id = Some(session_id.clone());
                records.push(record);
                true
            }
        };

        self.write_all(&records).await?;
        Ok(LoginOutcome {
            session_id,
            created,
        })
    }

    /// Apply `update` to a participant and persist it with a fresh timestamp.
    ///
    /// Returns the updated record, or `None` if no such participant exists.
    pub async fn update<F>(
        &self,
        prolific_id: &str,
        update: F,
    ) -> Result<Option<ParticipantRecord>, AppError>
    where
        F: FnOnce(&mut ParticipantRecord),
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;

        let Some(record) = records.iter_mut().find(|r| r.prolific_id == prolific_id) else {
            return Ok(None);
        };
        update(record);
        record.timestamp = now_rfc3339();
        let updated = record.clone();

        self.write_all(&records).await?;
        Ok(Some(updated))
    }

    /// Clear a session token. Returns the participant it belonged to.
    pub async fn clear_session(&self, session_id: &str) -> Result<Option<String>, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;

        let Some(record) = records
            .iter_mut()
            .find(|r| r.session_id.as_deref() == Some(session_id))
        else {
            return Ok(None);
        };
        record.session_id = None;
        let prolific_id = record.prolific_id.clone();

        self.write_all(&records).await?;
        Ok(Some(prolific_id))
    }
}
