//! Fixtures and a store double that can be told to fail.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::blueprint::model::{Blueprint, Resources};
use crate::island::model::{BuiltBuilding, Category, NewQuestion, Question, Team};
use crate::store::{MemoryStore, Seed, Store, StoreError};

pub fn team_id() -> Uuid {
    Uuid::from_u128(0x7e57)
}

fn blueprint(id: i64, name: &str, cost: Resources) -> Blueprint {
    Blueprint {
        id,
        name: name.to_string(),
        description: format!("A {name}"),
        cost,
        icon: String::new(),
    }
}

pub fn question(category: Category, prompt: &str, answer: usize) -> NewQuestion {
    NewQuestion {
        category,
        prompt: prompt.to_string(),
        prompt_zh: format!("{prompt} (zh)"),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        options_zh: vec!["甲".into(), "乙".into(), "丙".into(), "丁".into()],
        answer,
        explanation: "because".to_string(),
    }
}

/// One team with 5 electricity, 40 bricks and 40 chips.
pub fn sample_seed() -> Seed {
    Seed {
        team: Team {
            id: team_id(),
            name: "Test Island".to_string(),
            resources: Resources::new(5, 40, 40),
        },
        blueprints: vec![
            blueprint(3, "Library", Resources::new(0, 60, 0)),
            blueprint(1, "Campfire", Resources::new(10, 0, 0)),
            blueprint(2, "Log Cabin", Resources::new(0, 20, 10)),
        ],
        questions: vec![
            question(Category::Listening, "Where is the meeting?", 2),
            question(Category::Reading, "The invoice was ___ yesterday.", 1),
            question(Category::Vocab, "Pick the synonym of 'postpone'.", 0),
        ],
    }
}

/// Wraps a [`MemoryStore`] and fails selected calls on demand. Records the
/// size of every question batch it is asked to insert.
#[derive(Clone, Debug)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_fetch: Arc<AtomicBool>,
    pub fail_questions: Arc<AtomicBool>,
    pub fail_team_update: Arc<AtomicBool>,
    pub fail_building_insert: Arc<AtomicBool>,
    pub fail_batches: Arc<Mutex<Vec<usize>>>,
    pub batches: Arc<Mutex<Vec<usize>>>,
    pub team_updates: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new(seed: Seed) -> Self {
        Self {
            inner: MemoryStore::from_seed(seed),
            fail_fetch: Arc::default(),
            fail_questions: Arc::default(),
            fail_team_update: Arc::default(),
            fail_building_insert: Arc::default(),
            fail_batches: Arc::default(),
            batches: Arc::default(),
            team_updates: Arc::default(),
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }

    fn check(flag: &AtomicBool, call: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{call} failed")))
        } else {
            Ok(())
        }
    }
}

impl Store for FlakyStore {
    async fn fetch_team(&self) -> Result<Team, StoreError> {
        Self::check(&self.fail_fetch, "fetch_team")?;
        self.inner.fetch_team().await
    }

    async fn list_blueprints(&self) -> Result<Vec<Blueprint>, StoreError> {
        Self::check(&self.fail_fetch, "list_blueprints")?;
        self.inner.list_blueprints().await
    }

    async fn list_buildings(&self, team_id: Uuid) -> Result<Vec<BuiltBuilding>, StoreError> {
        Self::check(&self.fail_fetch, "list_buildings")?;
        self.inner.list_buildings(team_id).await
    }

    async fn questions_by_category(&self, category: Category) -> Result<Vec<Question>, StoreError> {
        Self::check(&self.fail_questions, "questions_by_category")?;
        self.inner.questions_by_category(category).await
    }

    async fn update_team_resources(
        &self,
        team_id: Uuid,
        resources: Resources,
    ) -> Result<Team, StoreError> {
        self.team_updates.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_team_update, "update_team_resources")?;
        self.inner.update_team_resources(team_id, resources).await
    }

    async fn insert_building(
        &self,
        team_id: Uuid,
        blueprint_id: i64,
    ) -> Result<BuiltBuilding, StoreError> {
        Self::check(&self.fail_building_insert, "insert_building")?;
        self.inner.insert_building(team_id, blueprint_id).await
    }

    async fn insert_questions(&self, rows: &[serde_json::Value]) -> Result<Vec<i64>, StoreError> {
        let batch = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(rows.len());
            batches.len()
        };
        let failing = self.fail_batches.lock().unwrap().contains(&batch);
        if failing {
            return Err(StoreError::Unavailable(format!("batch {batch} failed")));
        }
        self.inner.insert_questions(rows).await
    }

    fn subscribe_teams(&self) -> broadcast::Receiver<Team> {
        self.inner.subscribe_teams()
    }
}
