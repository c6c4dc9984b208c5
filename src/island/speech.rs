use serde::Serialize;

use crate::island::model::{Category, Question};

pub const LANG: &str = "en-US";
pub const RATE: f32 = 0.9;
pub const AUTOPLAY_DELAY_MS: u64 = 500;

/// Instruction for the client's speech synthesiser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechCue {
    pub text: String,
    pub lang: &'static str,
    pub rate: f32,
    pub delay_ms: u64,
}

impl SpeechCue {
    pub fn new(text: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            text: text.into(),
            lang: LANG,
            rate: RATE,
            delay_ms,
        }
    }

    /// Listening questions are read out shortly after they are shown.
    pub fn autoplay(question: &Question) -> Option<Self> {
        (question.category == Category::Listening)
            .then(|| Self::new(question.prompt.clone(), AUTOPLAY_DELAY_MS))
    }

    pub fn replay(question: &Question) -> Self {
        Self::new(question.prompt.clone(), 0)
    }
}
