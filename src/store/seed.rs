use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blueprint::model::Blueprint;
use crate::island::model::{NewQuestion, Team};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("seed question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

/// Initial rows for the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub team: Team,
    pub blueprints: Vec<Blueprint>,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
}

impl Seed {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let text = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: shown.clone(),
            source,
        })?;
        let seed: Seed = serde_json::from_str(&text).map_err(|source| SeedError::Parse {
            path: shown.clone(),
            source,
        })?;
        seed.validate()?;

        tracing::info!(
            path = %shown,
            blueprints = seed.blueprints.len(),
            questions = seed.questions.len(),
            "loaded seed"
        );
        Ok(seed)
    }

    pub fn validate(&self) -> Result<(), SeedError> {
        for (index, question) in self.questions.iter().enumerate() {
            question
                .validate()
                .map_err(|reason| SeedError::InvalidQuestion { index, reason })?;
        }
        Ok(())
    }
}
