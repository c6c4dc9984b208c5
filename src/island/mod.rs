pub mod model;
pub mod speech;
pub mod state;
pub mod view;

pub use state::{ActiveQuestion, AnswerOutcome, BuildOutcome, Island, IslandError, Reward};
pub use view::IslandView;
