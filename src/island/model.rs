use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blueprint::model::{Blueprint, Resource, Resources};

/// Credit granted for every correct answer.
pub const REWARD_AMOUNT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub resources: Resources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Listening,
    Reading,
    Vocab,
}

impl Category {
    /// The single resource channel a correct answer in this category pays into.
    pub fn reward_resource(&self) -> Resource {
        match self {
            Category::Listening => Resource::Electricity,
            Category::Reading => Resource::Bricks,
            Category::Vocab => Resource::Chips,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Listening => "listening",
            Category::Reading => "reading",
            Category::Vocab => "vocab",
        };
        write!(f, "{name}")
    }
}

/// A question row as it arrives from an import payload or the seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "question_zh", default)]
    pub prompt_zh: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub options_zh: Vec<String>,
    pub answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<(), String> {
        if self.options.is_empty() {
            return Err("question has no options".to_string());
        }
        if self.answer >= self.options.len() {
            return Err(format!(
                "answer {} is outside {} options",
                self.answer,
                self.options.len()
            ));
        }
        Ok(())
    }

    pub fn with_id(self, id: i64) -> Question {
        Question {
            id,
            category: self.category,
            prompt: self.prompt,
            prompt_zh: self.prompt_zh,
            options: self.options,
            options_zh: self.options_zh,
            answer: self.answer,
            explanation: self.explanation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "question_zh", default)]
    pub prompt_zh: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub options_zh: Vec<String>,
    pub answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer
    }
}

/// Either the id the store assigned or the placeholder id of a building that
/// has not been confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildingId {
    Stored(Uuid),
    Temporary(String),
}

impl BuildingId {
    pub fn temporary(at: DateTime<Utc>) -> Self {
        BuildingId::Temporary(format!("temp-{}", at.timestamp_millis()))
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildingId::Stored(id) => write!(f, "{id}"),
            BuildingId::Temporary(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltBuilding {
    pub id: BuildingId,
    pub blueprint_id: i64,
    pub built_at: DateTime<Utc>,
    pub blueprint: Option<Blueprint>,
    #[serde(default)]
    pub optimistic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_category_pays_one_resource() {
        assert_eq!(Category::Listening.reward_resource(), Resource::Electricity);
        assert_eq!(Category::Reading.reward_resource(), Resource::Bricks);
        assert_eq!(Category::Vocab.reward_resource(), Resource::Chips);
    }

    #[test]
    fn test_question_uses_import_field_names() {
        let row = serde_json::json!({
            "type": "vocab",
            "question": "Choose the synonym of 'purchase'.",
            "options": ["buy", "sell"],
            "answer": 0
        });

        let question: NewQuestion = serde_json::from_value(row).unwrap();

        assert_eq!(question.category, Category::Vocab);
        assert_eq!(question.prompt, "Choose the synonym of 'purchase'.");
        assert!(question.prompt_zh.is_empty());
        assert!(question.validate().is_ok());
    }

    #[test]
    fn test_answer_outside_options_is_invalid() {
        let question = NewQuestion {
            category: Category::Reading,
            prompt: "?".to_string(),
            prompt_zh: String::new(),
            options: vec!["a".to_string(), "b".to_string()],
            options_zh: vec![],
            answer: 2,
            explanation: String::new(),
        };

        assert!(question.validate().is_err());
    }

    #[test]
    fn test_team_row_is_flat() {
        let team = Team {
            id: Uuid::nil(),
            name: "Harbor".to_string(),
            resources: Resources::new(1, 2, 3),
        };

        let row = serde_json::to_value(&team).unwrap();

        assert_eq!(row["electricity"], 1);
        assert_eq!(row["chips"], 3);
    }
}
