use serde_json::Value;
use thiserror::Error;

use crate::store::Store;

/// Rows sent to the store per insert.
pub const BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("the payload must be an array [...]")]
    NotArray,
    #[error("the array is empty")]
    Empty,
    #[error("missing fields: check that question, options and answer are present")]
    MissingFields,
    #[error("wrong admin password")]
    WrongPassword,
    #[error("nothing has been parsed yet")]
    NothingToUpload,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ImportReport {
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Parses pasted text into question rows. Only the first row is checked for
/// the required fields; the store rejects malformed rows at insert time.
pub fn parse_questions(text: &str) -> Result<Vec<Value>, ImportError> {
    let parsed: Value = serde_json::from_str(text).map_err(|e| ImportError::Json(e.to_string()))?;

    let Value::Array(rows) = parsed else {
        return Err(ImportError::NotArray);
    };
    let Some(first) = rows.first() else {
        return Err(ImportError::Empty);
    };

    if !truthy(first.get("question"))
        || !truthy(first.get("options"))
        || !first.get("answer").is_some_and(Value::is_number)
    {
        return Err(ImportError::MissingFields);
    }

    Ok(rows)
}

/// Inserts `rows` in batches of [`BATCH_SIZE`], one after another. A failed
/// batch is counted and logged and does not stop the rest.
pub async fn upload<S: Store>(store: &S, rows: &[Value], log: &mut Vec<String>) -> ImportReport {
    let mut report = ImportReport::default();

    for (index, batch) in rows.chunks(BATCH_SIZE).enumerate() {
        let start = index * BATCH_SIZE;
        report.batches += 1;
        log.push(format!(
            "uploading rows {} to {}",
            start + 1,
            start + batch.len()
        ));

        match store.insert_questions(batch).await {
            Ok(ids) => {
                tracing::debug!(batch = index, rows = ids.len(), "question batch stored");
                report.succeeded += batch.len();
            }
            Err(e) => {
                tracing::error!(batch = index, error = %e, "question batch failed");
                log.push(format!("upload failed: {e}"));
                report.failed += batch.len();
            }
        }
    }

    log.push(format!(
        "done: {} succeeded, {} failed",
        report.succeeded, report.failed
    ));
    tracing::info!(
        batches = report.batches,
        succeeded = report.succeeded,
        failed = report.failed,
        "question import finished"
    );
    report
}
