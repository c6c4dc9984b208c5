use crate::admin::AdminSession;
use crate::api::model::{ApiError, ApiRequest, EventName, ParseParams, ServerMessage, UploadParams};
use crate::store::Store;

/// Routes requests from the import console.
pub struct AdminEndpoint<S> {
    session: AdminSession,
    store: S,
}

impl<S: Store> AdminEndpoint<S> {
    pub fn new(store: S, secret: impl Into<String>) -> Self {
        Self {
            session: AdminSession::new(secret),
            store,
        }
    }

    pub fn view_event(&self) -> ServerMessage {
        ServerMessage::event(EventName::Admin, self.session.view())
    }

    pub async fn dispatch(&mut self, request: ApiRequest) -> Vec<ServerMessage> {
        let result = self.handle(&request).await;
        let mut frames = match result {
            Ok(frame) => vec![frame],
            Err(e) => vec![ServerMessage::error(Some(&request.id), e)],
        };
        frames.push(self.view_event());
        frames
    }

    async fn handle(&mut self, request: &ApiRequest) -> Result<ServerMessage, ApiError> {
        let id = request.id.as_str();
        match request.method.as_str() {
            "status" => Ok(ServerMessage::response(id, ())),
            "parse" => {
                let params: ParseParams = request.params()?;
                let rows = self.session.parse(&params.json)?;
                Ok(ServerMessage::response(id, serde_json::json!({ "rows": rows })))
            }
            "upload" => {
                let params: UploadParams = request.params()?;
                let report = self.session.upload(&self.store, &params.password).await?;
                Ok(ServerMessage::response(id, report))
            }
            other => Err(ApiError::UnknownMethod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{FlakyStore, sample_seed};
    use serde_json::{Value, json};

    fn request(method: &str, params: Value) -> ApiRequest {
        ApiRequest {
            id: "a1".to_string(),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_parse_and_upload() {
        let store = FlakyStore::new(sample_seed());
        let mut endpoint = AdminEndpoint::new(store.clone(), "pw");
        let payload = json!([
            {"type": "listening", "question": "Where is the lobby?", "options": ["a", "b"], "answer": 1}
        ])
        .to_string();

        let frames = endpoint
            .dispatch(request("parse", json!({ "json": payload })))
            .await;
        assert_eq!(frames[0], ServerMessage::response("a1", json!({"rows": 1})));

        let frames = endpoint
            .dispatch(request("upload", json!({"password": "pw"})))
            .await;
        let ServerMessage::Response { result, .. } = &frames[0] else {
            panic!("expected response, got {frames:?}");
        };
        assert_eq!(result["succeeded"], 1);
        let ServerMessage::Event { name, data } = &frames[1] else {
            panic!("expected admin view");
        };
        assert_eq!(*name, EventName::Admin);
        assert_eq!(data["status"], "success");
        assert_eq!(data["pending"], 0);
    }

    #[tokio::test]
    async fn test_wrong_password_reports_error() {
        let store = FlakyStore::new(sample_seed());
        let mut endpoint = AdminEndpoint::new(store.clone(), "pw");

        let frames = endpoint
            .dispatch(request("upload", json!({"password": "nope"})))
            .await;

        assert_eq!(
            frames[0],
            ServerMessage::error(Some("a1"), "wrong admin password")
        );
        assert!(store.batch_sizes().is_empty());
    }
}
