use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::admin::ImportError;
use crate::island::IslandError;
use crate::island::model::Category;

#[derive(Deserialize, Debug, Clone)]
pub struct ApiRequest {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl ApiRequest {
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.params.clone()).map_err(|e| ApiError::InvalidParams {
            method: self.method.clone(),
            reason: e.to_string(),
        })
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrainParams {
    pub category: Category,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SelectParams {
    pub option: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BuildParams {
    pub blueprint_id: i64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParseParams {
    pub json: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UploadParams {
    pub password: String,
}

/// Frames written to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Response { id: String, result: Value },
    Error { id: Option<String>, message: String },
    Event { name: EventName, data: Value },
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    View,
    Team,
    Speech,
    CancelSpeech,
    Reload,
    Admin,
}

impl ServerMessage {
    pub fn response(id: &str, result: impl Serialize) -> Self {
        ServerMessage::Response {
            id: id.to_string(),
            result: to_value(result),
        }
    }

    pub fn error(id: Option<&str>, error: impl std::fmt::Display) -> Self {
        ServerMessage::Error {
            id: id.map(str::to_string),
            message: error.to_string(),
        }
    }

    pub fn event(name: EventName, data: impl Serialize) -> Self {
        ServerMessage::Event {
            name,
            data: to_value(data),
        }
    }
}

fn to_value(data: impl Serialize) -> Value {
    serde_json::to_value(data).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize outgoing frame");
        Value::Null
    })
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("invalid params for {method}: {reason}")]
    InvalidParams { method: String, reason: String },
    #[error(transparent)]
    Island(#[from] IslandError),
    #[error(transparent)]
    Import(#[from] ImportError),
}
