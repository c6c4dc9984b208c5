use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::blueprint::model::{Blueprint, Resource, Resources};
use crate::island::model::{
    BuildingId, BuiltBuilding, Category, Question, REWARD_AMOUNT, Team,
};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum IslandError {
    #[error("no {0} questions yet, import some from the admin page first")]
    NoQuestions(Category),
    #[error("failed to load questions: {0}")]
    QuestionFetch(#[source] StoreError),
    #[error("no question is open")]
    NoActiveQuestion,
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("option {0} does not exist")]
    InvalidOption(usize),
    #[error("blueprint {0} does not exist")]
    UnknownBlueprint(i64),
    #[error("not enough resources to build {name}, answer more questions")]
    InsufficientResources { name: String, missing: Vec<Resource> },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The question currently on screen.
#[derive(Debug, Clone)]
pub struct ActiveQuestion {
    pub question: Question,
    pub selected: Option<usize>,
    pub show_result: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reward {
    pub resource: Resource,
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub answer: usize,
    pub reward: Option<Reward>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
    Built { building: BuiltBuilding },
    /// A store write failed; the snapshot was reloaded from the store.
    Reloaded { cause: String },
}

/// One player's view of the island: the local snapshot and the flows that
/// mutate it before mirroring to the store.
#[derive(Debug)]
pub struct Island<S> {
    store: S,
    team: Team,
    blueprints: Vec<Blueprint>,
    buildings: Vec<BuiltBuilding>,
    active: Option<ActiveQuestion>,
    /// Set while a build is writing to the store. Requests on a session are
    /// handled one at a time, so pushed views only ever carry `false`.
    loading: bool,
}

impl<S: Store> Island<S> {
    pub async fn load(store: S) -> Result<Self, IslandError> {
        let team = store.fetch_team().await?;
        let blueprints = store.list_blueprints().await?;
        let buildings = store.list_buildings(team.id).await?;

        tracing::info!(
            team = %team.id,
            blueprints = blueprints.len(),
            buildings = buildings.len(),
            "island loaded"
        );

        Ok(Self {
            store,
            team,
            blueprints,
            buildings,
            active: None,
            loading: false,
        })
    }

    /// Throws away everything local and reads the snapshot again.
    pub async fn reload(&mut self) -> Result<(), IslandError> {
        let team = self.store.fetch_team().await?;
        let blueprints = self.store.list_blueprints().await?;
        let buildings = self.store.list_buildings(team.id).await?;

        self.team = team;
        self.blueprints = blueprints;
        self.buildings = buildings;
        self.active = None;
        self.loading = false;

        tracing::info!(team = %self.team.id, "island reloaded from store");
        Ok(())
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn blueprints(&self) -> &[Blueprint] {
        &self.blueprints
    }

    pub fn buildings(&self) -> &[BuiltBuilding] {
        &self.buildings
    }

    pub fn active(&self) -> Option<&ActiveQuestion> {
        self.active.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn level(&self) -> usize {
        self.buildings.len() + 1
    }

    pub fn can_afford(&self, blueprint: &Blueprint) -> bool {
        self.team.resources.covers(&blueprint.cost)
    }

    /// Replaces the local team with a row pushed by the store. Rows for other
    /// teams are ignored.
    pub fn apply_team_update(&mut self, team: Team) -> bool {
        if team.id != self.team.id {
            tracing::debug!(team = %team.id, "ignoring update for another team");
            return false;
        }
        self.team = team;
        true
    }

    pub async fn start_training(&mut self, category: Category) -> Result<&ActiveQuestion, IslandError> {
        let mut questions = self
            .store
            .questions_by_category(category)
            .await
            .map_err(IslandError::QuestionFetch)?;

        if questions.is_empty() {
            return Err(IslandError::NoQuestions(category));
        }

        let pick = rand::random_range(0..questions.len());
        let question = questions.swap_remove(pick);
        tracing::debug!(%category, question = question.id, "question drawn");

        Ok(&*self.active.insert(ActiveQuestion {
            question,
            selected: None,
            show_result: false,
        }))
    }

    pub fn select(&mut self, option: usize) -> Result<(), IslandError> {
        let active = self.active.as_mut().ok_or(IslandError::NoActiveQuestion)?;
        if active.show_result {
            return Err(IslandError::AlreadyAnswered);
        }
        if option >= active.question.options.len() {
            return Err(IslandError::InvalidOption(option));
        }
        active.selected = Some(option);
        Ok(())
    }

    /// Grades the selected option. Returns `None` when there is nothing to
    /// grade yet. A correct answer is credited locally first; a failed write
    /// to the store is only logged.
    pub async fn submit_answer(&mut self) -> Result<Option<AnswerOutcome>, IslandError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(None);
        };
        if active.show_result {
            return Err(IslandError::AlreadyAnswered);
        }
        let Some(selected) = active.selected else {
            return Ok(None);
        };

        active.show_result = true;
        let question = &active.question;
        let correct = question.is_correct(selected);
        let answer = question.answer;

        if !correct {
            return Ok(Some(AnswerOutcome {
                correct,
                answer,
                reward: None,
            }));
        }

        let resource = question.category.reward_resource();
        let resources = self.team.resources.credit(resource, REWARD_AMOUNT);
        self.team.resources = resources;

        if let Err(e) = self.store.update_team_resources(self.team.id, resources).await {
            tracing::warn!(team = %self.team.id, error = %e, "failed to persist reward");
        }

        Ok(Some(AnswerOutcome {
            correct,
            answer,
            reward: Some(Reward {
                resource,
                amount: REWARD_AMOUNT,
            }),
        }))
    }

    pub fn close_question(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Spends the blueprint's cost and places the building. The local
    /// snapshot changes before the store is written; if either write fails
    /// the snapshot is reloaded.
    pub async fn build(&mut self, blueprint_id: i64) -> Result<BuildOutcome, IslandError> {
        let blueprint = self
            .blueprints
            .iter()
            .find(|bp| bp.id == blueprint_id)
            .cloned()
            .ok_or(IslandError::UnknownBlueprint(blueprint_id))?;

        let insufficient = || IslandError::InsufficientResources {
            name: blueprint.name.clone(),
            missing: self.team.resources.shortfall(&blueprint.cost),
        };
        let remaining = self
            .team
            .resources
            .checked_sub(&blueprint.cost)
            .ok_or_else(insufficient)?;

        let before = self.team.resources;
        self.loading = true;
        self.team.resources = remaining;

        let built_at = Utc::now();
        let placeholder = BuildingId::temporary(built_at);
        self.buildings.push(BuiltBuilding {
            id: placeholder.clone(),
            blueprint_id: blueprint.id,
            built_at,
            blueprint: Some(blueprint.clone()),
            optimistic: true,
        });
        tracing::debug!(blueprint = %blueprint.name, building = %placeholder, "placed optimistic building");

        let outcome = match self.persist_build(remaining, blueprint.id).await {
            Ok(stored) => {
                if let Some(slot) = self.buildings.iter_mut().find(|b| b.id == placeholder) {
                    *slot = stored.clone();
                }
                tracing::info!(blueprint = %blueprint.name, building = %stored.id, "building constructed");
                BuildOutcome::Built { building: stored }
            }
            Err(e) => {
                tracing::error!(blueprint = %blueprint.name, error = %e, "build failed, reloading island");
                self.buildings.retain(|b| b.id != placeholder);
                self.team.resources = before;
                self.loading = false;
                self.reload().await?;
                BuildOutcome::Reloaded {
                    cause: e.to_string(),
                }
            }
        };

        self.loading = false;
        Ok(outcome)
    }

    async fn persist_build(
        &self,
        remaining: Resources,
        blueprint_id: i64,
    ) -> Result<BuiltBuilding, StoreError> {
        self.store
            .update_team_resources(self.team.id, remaining)
            .await?;
        self.store.insert_building(self.team.id, blueprint_id).await
    }
}
