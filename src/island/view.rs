//! Everything the client draws, derived from an [`Island`] snapshot.

use serde::Serialize;

use crate::blueprint::assets::{Asset, asset_for};
use crate::blueprint::model::{Resource, Resources};
use crate::island::model::Category;
use crate::island::state::{ActiveQuestion, Island};
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct IslandView {
    pub team_name: String,
    pub level: usize,
    pub resources: Resources,
    pub buildings: Vec<BuildingView>,
    pub shop: Vec<ShopEntry>,
    pub question: Option<QuestionView>,
    pub loading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingView {
    pub id: String,
    pub name: Option<String>,
    pub asset: Asset,
    /// Placed locally and not yet confirmed; the client animates these.
    pub fresh: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopEntry {
    pub blueprint_id: i64,
    pub name: String,
    pub description: String,
    pub asset: Asset,
    pub cost: Resources,
    pub affordable: bool,
    /// Channels the team cannot cover yet.
    pub short: Vec<Resource>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionState {
    Idle,
    Selected,
    Correct,
    Wrong,
    Dimmed,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub label: char,
    pub text: String,
    pub text_zh: Option<String>,
    pub state: OptionState,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub category: Category,
    /// Hidden for listening questions until the result is shown.
    pub prompt: Option<String>,
    pub prompt_zh: Option<String>,
    pub options: Vec<OptionView>,
    pub selected: Option<usize>,
    pub show_result: bool,
    pub correct: Option<bool>,
    pub explanation: Option<String>,
}

impl QuestionView {
    fn from_active(active: &ActiveQuestion) -> Self {
        let question = &active.question;
        let revealed = active.show_result;

        let options = question
            .options
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                let selected = active.selected == Some(idx);
                let state = match (revealed, selected) {
                    (true, _) if question.is_correct(idx) => OptionState::Correct,
                    (true, true) => OptionState::Wrong,
                    (true, false) => OptionState::Dimmed,
                    (false, true) => OptionState::Selected,
                    (false, false) => OptionState::Idle,
                };
                OptionView {
                    label: (b'A' + (idx % 26) as u8) as char,
                    text: text.clone(),
                    text_zh: revealed
                        .then(|| question.options_zh.get(idx).cloned())
                        .flatten(),
                    state,
                }
            })
            .collect();

        let prompt = (question.category != Category::Listening || revealed)
            .then(|| question.prompt.clone());

        QuestionView {
            id: question.id,
            category: question.category,
            prompt,
            prompt_zh: revealed.then(|| question.prompt_zh.clone()),
            options,
            selected: active.selected,
            show_result: revealed,
            correct: revealed.then(|| active.selected.is_some_and(|s| question.is_correct(s))),
            explanation: revealed.then(|| question.explanation.clone()),
        }
    }
}

impl<S: Store> Island<S> {
    pub fn view(&self) -> IslandView {
        let resources = self.team().resources;

        let buildings = self
            .buildings()
            .iter()
            .map(|b| {
                let name = b.blueprint.as_ref().map(|bp| bp.name.clone());
                BuildingView {
                    id: b.id.to_string(),
                    asset: asset_for(name.as_deref().unwrap_or_default()),
                    name,
                    fresh: b.optimistic,
                }
            })
            .collect();

        let shop = self
            .blueprints()
            .iter()
            .map(|bp| {
                let affordable = self.can_afford(bp);
                ShopEntry {
                    blueprint_id: bp.id,
                    name: bp.name.clone(),
                    description: bp.description.clone(),
                    asset: asset_for(&bp.name),
                    cost: bp.cost,
                    affordable,
                    short: resources.shortfall(&bp.cost),
                    enabled: affordable && !self.loading(),
                }
            })
            .collect();

        IslandView {
            team_name: self.team().name.clone(),
            level: self.level(),
            resources,
            buildings,
            shop,
            question: self.active().map(QuestionView::from_active),
            loading: self.loading(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{FlakyStore, sample_seed};

    async fn island() -> Island<FlakyStore> {
        Island::load(FlakyStore::new(sample_seed())).await.unwrap()
    }

    #[tokio::test]
    async fn test_unaffordable_blueprint_is_disabled() {
        let island = island().await;

        let view = island.view();
        let campfire = view.shop.iter().find(|e| e.name == "Campfire").unwrap();

        assert_eq!(campfire.cost, Resources::new(10, 0, 0));
        assert!(!campfire.affordable);
        assert!(!campfire.enabled);
        assert_eq!(campfire.short, vec![Resource::Electricity]);

        let cabin = view.shop.iter().find(|e| e.name == "Log Cabin").unwrap();
        assert!(cabin.enabled);
    }

    #[tokio::test]
    async fn test_listening_prompt_hidden_until_answered() {
        let mut island = island().await;
        island.start_training(Category::Listening).await.unwrap();

        let before = island.view().question.unwrap();
        assert!(before.prompt.is_none());
        assert!(before.explanation.is_none());
        assert!(before.options.iter().all(|o| o.text_zh.is_none()));

        island.select(0).unwrap();
        island.submit_answer().await.unwrap();

        let after = island.view().question.unwrap();
        assert_eq!(after.prompt.as_deref(), Some("Where is the meeting?"));
        assert_eq!(after.correct, Some(false));
        let states: Vec<OptionState> = after.options.iter().map(|o| o.state).collect();
        assert_eq!(
            states,
            vec![
                OptionState::Wrong,
                OptionState::Dimmed,
                OptionState::Correct,
                OptionState::Dimmed
            ]
        );
        assert_eq!(after.options[2].text_zh.as_deref(), Some("丙"));
    }

    #[tokio::test]
    async fn test_reading_prompt_visible_before_answer() {
        let mut island = island().await;
        island.start_training(Category::Reading).await.unwrap();
        island.select(3).unwrap();

        let view = island.view().question.unwrap();

        assert!(view.prompt.is_some());
        assert!(view.prompt_zh.is_none());
        assert_eq!(view.options[3].state, OptionState::Selected);
        assert_eq!(view.options[3].label, 'D');
    }

    #[tokio::test]
    async fn test_level_follows_buildings() {
        let mut island = island().await;
        island.build(2).await.unwrap();

        let view = island.view();

        assert_eq!(view.level, 2);
        assert_eq!(view.buildings.len(), 1);
        assert_eq!(view.buildings[0].name.as_deref(), Some("Log Cabin"));
        assert_eq!(view.buildings[0].asset.emoji, "🛖");
        assert!(!view.buildings[0].fresh);
    }
}
