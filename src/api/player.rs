use serde_json::json;

use crate::api::model::{
    ApiError, ApiRequest, BuildParams, EventName, SelectParams, ServerMessage, TrainParams,
};
use crate::island::model::Team;
use crate::island::speech::SpeechCue;
use crate::island::{BuildOutcome, Island, IslandError};
use crate::store::Store;

/// Routes player requests to an [`Island`] and turns the results into frames.
pub struct PlayerSession<S> {
    island: Island<S>,
}

impl<S: Store> PlayerSession<S> {
    pub fn new(island: Island<S>) -> Self {
        Self { island }
    }

    pub fn island(&self) -> &Island<S> {
        &self.island
    }

    pub fn view_event(&self) -> ServerMessage {
        ServerMessage::event(EventName::View, self.island.view())
    }

    pub async fn dispatch(&mut self, request: ApiRequest) -> Vec<ServerMessage> {
        match self.handle(&request).await {
            Ok(frames) => frames,
            Err(e) => {
                tracing::debug!(method = %request.method, error = %e, "request failed");
                vec![ServerMessage::error(Some(&request.id), e)]
            }
        }
    }

    async fn handle(&mut self, request: &ApiRequest) -> Result<Vec<ServerMessage>, ApiError> {
        let id = request.id.as_str();
        let mut frames = Vec::new();

        match request.method.as_str() {
            "state" => {
                frames.push(ServerMessage::response(id, ()));
            }
            "train" => {
                let params: TrainParams = request.params()?;
                let active = self.island.start_training(params.category).await?;
                let cue = SpeechCue::autoplay(&active.question);
                frames.push(ServerMessage::response(
                    id,
                    json!({ "category": params.category, "question_id": active.question.id }),
                ));
                if let Some(cue) = cue {
                    frames.push(ServerMessage::event(EventName::Speech, cue));
                }
            }
            "select" => {
                let params: SelectParams = request.params()?;
                self.island.select(params.option)?;
                frames.push(ServerMessage::response(id, json!({ "option": params.option })));
            }
            "answer" => {
                let outcome = self.island.submit_answer().await?;
                frames.push(ServerMessage::response(id, outcome));
            }
            "replay" => {
                let active = self.island.active().ok_or(IslandError::NoActiveQuestion)?;
                let cue = SpeechCue::replay(&active.question);
                frames.push(ServerMessage::response(id, &cue));
                frames.push(ServerMessage::event(EventName::Speech, cue));
                return Ok(frames);
            }
            "close" => {
                let closed = self.island.close_question();
                frames.push(ServerMessage::response(id, json!({ "closed": closed })));
                frames.push(ServerMessage::event(EventName::CancelSpeech, ()));
            }
            "build" => {
                let params: BuildParams = request.params()?;
                let outcome = self.island.build(params.blueprint_id).await?;
                let reloaded = matches!(outcome, BuildOutcome::Reloaded { .. });
                frames.push(ServerMessage::response(id, &outcome));
                if reloaded {
                    frames.push(ServerMessage::event(EventName::Reload, &outcome));
                }
            }
            other => return Err(ApiError::UnknownMethod(other.to_string())),
        }

        frames.push(self.view_event());
        Ok(frames)
    }

    /// Applies a row from the team feed. Returns the frames to push, which
    /// are empty when the row belongs to another team.
    pub fn on_team_change(&mut self, team: Team) -> Vec<ServerMessage> {
        let event = ServerMessage::event(EventName::Team, &team);
        if !self.island.apply_team_update(team) {
            return Vec::new();
        }
        vec![event, self.view_event()]
    }
}
