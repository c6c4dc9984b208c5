use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::blueprint::model::{Blueprint, Resources};
use crate::island::model::{BuildingId, BuiltBuilding, Category, NewQuestion, Question, Team};
use crate::store::feed::Topic;
use crate::store::{Seed, Store, StoreError};

const TEAMS_TOPIC: &str = "teams";

#[derive(Debug, Clone)]
struct BuildingRow {
    id: Uuid,
    team_id: Uuid,
    blueprint_id: i64,
    built_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    teams: Vec<Team>,
    blueprints: Vec<Blueprint>,
    buildings: Vec<BuildingRow>,
    questions: Vec<Question>,
    next_question_id: i64,
}

impl Tables {
    fn join(&self, row: &BuildingRow) -> BuiltBuilding {
        BuiltBuilding {
            id: BuildingId::Stored(row.id),
            blueprint_id: row.blueprint_id,
            built_at: row.built_at,
            blueprint: self
                .blueprints
                .iter()
                .find(|bp| bp.id == row.blueprint_id)
                .cloned(),
            optimistic: false,
        }
    }

    fn push_question(&mut self, question: NewQuestion) -> i64 {
        self.next_question_id += 1;
        let id = self.next_question_id;
        self.questions.push(question.with_id(id));
        id
    }
}

/// Process-local store shared by every connection.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    teams: Topic<Team>,
}

impl MemoryStore {
    pub fn from_seed(seed: Seed) -> Self {
        let mut tables = Tables {
            teams: vec![seed.team],
            blueprints: seed.blueprints,
            ..Default::default()
        };
        for question in seed.questions {
            tables.push_question(question);
        }

        Self {
            tables: Arc::new(Mutex::new(tables)),
            teams: Topic::new(TEAMS_TOPIC),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn question_count(&self) -> usize {
        self.tables().questions.len()
    }
}

impl Store for MemoryStore {
    async fn fetch_team(&self) -> Result<Team, StoreError> {
        self.tables().teams.first().cloned().ok_or(StoreError::NoTeam)
    }

    async fn list_blueprints(&self) -> Result<Vec<Blueprint>, StoreError> {
        let mut blueprints = self.tables().blueprints.clone();
        blueprints.sort_by_key(|bp| bp.cost.bricks);
        Ok(blueprints)
    }

    async fn list_buildings(&self, team_id: Uuid) -> Result<Vec<BuiltBuilding>, StoreError> {
        let tables = self.tables();
        let mut rows: Vec<&BuildingRow> = tables
            .buildings
            .iter()
            .filter(|row| row.team_id == team_id)
            .collect();
        rows.sort_by_key(|row| row.built_at);
        Ok(rows.into_iter().map(|row| tables.join(row)).collect())
    }

    async fn questions_by_category(&self, category: Category) -> Result<Vec<Question>, StoreError> {
        Ok(self
            .tables()
            .questions
            .iter()
            .filter(|q| q.category == category)
            .cloned()
            .collect())
    }

    async fn update_team_resources(
        &self,
        team_id: Uuid,
        resources: Resources,
    ) -> Result<Team, StoreError> {
        let updated = {
            let mut tables = self.tables();
            let team = tables
                .teams
                .iter_mut()
                .find(|t| t.id == team_id)
                .ok_or(StoreError::TeamNotFound(team_id))?;
            team.resources = resources;
            team.clone()
        };

        let receivers = self.teams.publish(updated.clone());
        tracing::debug!(team = %team_id, receivers, "team resources updated");
        Ok(updated)
    }

    async fn insert_building(
        &self,
        team_id: Uuid,
        blueprint_id: i64,
    ) -> Result<BuiltBuilding, StoreError> {
        let mut tables = self.tables();
        if !tables.teams.iter().any(|t| t.id == team_id) {
            return Err(StoreError::TeamNotFound(team_id));
        }
        if !tables.blueprints.iter().any(|bp| bp.id == blueprint_id) {
            return Err(StoreError::BlueprintNotFound(blueprint_id));
        }

        let row = BuildingRow {
            id: Uuid::new_v4(),
            team_id,
            blueprint_id,
            built_at: Utc::now(),
        };
        let building = tables.join(&row);
        tables.buildings.push(row);

        tracing::debug!(team = %team_id, blueprint_id, building = %building.id, "building inserted");
        Ok(building)
    }

    async fn insert_questions(&self, rows: &[serde_json::Value]) -> Result<Vec<i64>, StoreError> {
        let mut decoded = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let question: NewQuestion =
                serde_json::from_value(row.clone()).map_err(|e| StoreError::RowRejected {
                    index,
                    reason: e.to_string(),
                })?;
            question
                .validate()
                .map_err(|reason| StoreError::RowRejected { index, reason })?;
            decoded.push(question);
        }

        let mut tables = self.tables();
        let ids = decoded
            .into_iter()
            .map(|question| tables.push_question(question))
            .collect();
        Ok(ids)
    }

    fn subscribe_teams(&self) -> broadcast::Receiver<Team> {
        self.teams.subscribe()
    }
}
