//! The shared backing store: four tables and a change feed on `teams`.
//!
//! [`Store`] is the seam between island sessions and whatever holds the rows.
//! [`MemoryStore`] is the implementation the server runs with; it is seeded
//! from a JSON file at startup.

use std::future::Future;

use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::blueprint::model::{Blueprint, Resources};
use crate::island::model::{BuiltBuilding, Category, Question, Team};

pub mod feed;
pub mod memory;
pub mod seed;
#[cfg(test)]
pub mod testing;

pub use memory::MemoryStore;
pub use seed::Seed;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("no team row exists")]
    NoTeam,
    #[error("team {0} not found")]
    TeamNotFound(Uuid),
    #[error("blueprint {0} not found")]
    BlueprintNotFound(i64),
    #[error("row {index} rejected: {reason}")]
    RowRejected { index: usize, reason: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait Store: Clone + Send + Sync + 'static {
    /// The first team row.
    fn fetch_team(&self) -> impl Future<Output = Result<Team, StoreError>> + Send;

    /// All blueprints ordered by brick cost, cheapest first.
    fn list_blueprints(&self) -> impl Future<Output = Result<Vec<Blueprint>, StoreError>> + Send;

    /// Buildings of a team joined with their blueprint, oldest first.
    fn list_buildings(
        &self,
        team_id: Uuid,
    ) -> impl Future<Output = Result<Vec<BuiltBuilding>, StoreError>> + Send;

    fn questions_by_category(
        &self,
        category: Category,
    ) -> impl Future<Output = Result<Vec<Question>, StoreError>> + Send;

    /// Overwrites the three balances of a team and publishes the new row on
    /// the team feed.
    fn update_team_resources(
        &self,
        team_id: Uuid,
        resources: Resources,
    ) -> impl Future<Output = Result<Team, StoreError>> + Send;

    fn insert_building(
        &self,
        team_id: Uuid,
        blueprint_id: i64,
    ) -> impl Future<Output = Result<BuiltBuilding, StoreError>> + Send;

    /// Inserts raw question rows. Either every row is stored or none is.
    fn insert_questions(
        &self,
        rows: &[serde_json::Value],
    ) -> impl Future<Output = Result<Vec<i64>, StoreError>> + Send;

    /// Update events on the `teams` table.
    fn subscribe_teams(&self) -> broadcast::Receiver<Team>;
}
