//! The question import console.

use serde::Serialize;
use serde_json::Value;

use crate::store::Store;

pub mod import;

pub use import::{BATCH_SIZE, ImportError, ImportReport, parse_questions, upload};

pub const DEFAULT_ADMIN_SECRET: &str = "10221022";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Idle,
    Parsing,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    pub status: ImportStatus,
    pub logs: Vec<String>,
    pub pending: usize,
}

/// State of one admin connection: the parsed preview and the running log.
#[derive(Debug)]
pub struct AdminSession {
    secret: String,
    status: ImportStatus,
    logs: Vec<String>,
    preview: Vec<Value>,
}

impl AdminSession {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            status: ImportStatus::Idle,
            logs: Vec::new(),
            preview: Vec::new(),
        }
    }

    pub fn status(&self) -> ImportStatus {
        self.status
    }

    pub fn pending(&self) -> usize {
        self.preview.len()
    }

    pub fn view(&self) -> AdminView {
        AdminView {
            status: self.status,
            logs: self.logs.clone(),
            pending: self.preview.len(),
        }
    }

    /// Replaces the preview with the rows in `text`. Clears the log.
    pub fn parse(&mut self, text: &str) -> Result<usize, ImportError> {
        self.status = ImportStatus::Parsing;
        self.logs.clear();

        match parse_questions(text) {
            Ok(rows) => {
                let count = rows.len();
                self.preview = rows;
                self.logs.push(format!(
                    "parsed {count} questions, review the preview before uploading"
                ));
                self.status = ImportStatus::Idle;
                Ok(count)
            }
            Err(e) => {
                self.status = ImportStatus::Error;
                self.logs.push(format!("parse failed: {e}"));
                tracing::warn!(error = %e, "question import rejected");
                Err(e)
            }
        }
    }

    /// Uploads the preview. The password is compared with the shared secret
    /// before anything is sent to the store.
    pub async fn upload<S: Store>(
        &mut self,
        store: &S,
        password: &str,
    ) -> Result<ImportReport, ImportError> {
        if password != self.secret {
            tracing::warn!("import attempted with wrong admin password");
            return Err(ImportError::WrongPassword);
        }
        if self.preview.is_empty() {
            return Err(ImportError::NothingToUpload);
        }

        self.status = ImportStatus::Uploading;
        let report = upload(store, &self.preview, &mut self.logs).await;
        self.status = ImportStatus::Success;

        if report.succeeded > 0 {
            self.preview.clear();
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{FlakyStore, sample_seed};

    const PAYLOAD: &str = r#"[
        {"type": "reading", "question": "The meeting was ___ to Friday.", "question_zh": "",
         "options": ["moved", "move"], "options_zh": [], "answer": 0, "explanation": ""}
    ]"#;

    #[tokio::test]
    async fn test_parse_then_upload() {
        let store = FlakyStore::new(sample_seed());
        let mut session = AdminSession::new("secret");

        assert_eq!(session.parse(PAYLOAD), Ok(1));
        assert_eq!(session.pending(), 1);

        let report = session.upload(&store, "secret").await.unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(session.status(), ImportStatus::Success);
        assert_eq!(session.pending(), 0);
        assert_eq!(store.batch_sizes(), vec![1]);
    }

    #[tokio::test]
    async fn test_wrong_password_sends_nothing() {
        let store = FlakyStore::new(sample_seed());
        let mut session = AdminSession::new("secret");
        session.parse(PAYLOAD).unwrap();

        let err = session.upload(&store, "guess").await.unwrap_err();

        assert_eq!(err, ImportError::WrongPassword);
        assert!(store.batch_sizes().is_empty());
        assert_eq!(session.pending(), 1);
    }

    #[tokio::test]
    async fn test_bad_payload_never_uploads() {
        let store = FlakyStore::new(sample_seed());
        let mut session = AdminSession::new("secret");

        for text in ["{}", "[]", "not json"] {
            assert!(session.parse(text).is_err());
            assert_eq!(session.status(), ImportStatus::Error);
            assert!(session.view().logs[0].starts_with("parse failed"));
        }

        let err = session.upload(&store, "secret").await.unwrap_err();
        assert_eq!(err, ImportError::NothingToUpload);
        assert!(store.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_preview_kept_when_everything_failed() {
        let store = FlakyStore::new(sample_seed());
        store.fail_batches.lock().unwrap().push(1);
        let mut session = AdminSession::new("secret");
        session.parse(PAYLOAD).unwrap();

        let report = session.upload(&store, "secret").await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(session.pending(), 1);
    }
}
