//! One-line text rendering of published states.

use mirror_core::{DetectionCycleResult, EmotionState, PersonState};

/// Prints a line whenever the (person, emotion) pair changes.
pub struct Presenter {
    json: bool,
    last: Option<(PersonState, EmotionState)>,
}

impl Presenter {
    pub fn new(json: bool) -> Self {
        Self { json, last: None }
    }

    /// Render `result` if it differs from the previous one.
    pub fn update(&mut self, result: &DetectionCycleResult) -> Option<String> {
        let pair = result.pair();
        if self.last == Some(pair) {
            return None;
        }
        self.last = Some(pair);

        if self.json {
            serde_json::to_string(result).ok()
        } else {
            Some(render(result))
        }
    }
}

pub fn render(result: &DetectionCycleResult) -> String {
    let mut line = format!("[{}] {}", result.person, result.person.caption());
    // Emotion only means something for the primary person.
    if result.person == PersonState::RecognizedPrimary {
        line.push_str(match result.emotion {
            EmotionState::Happy => " That smile commands the stars.",
            EmotionState::Sad => " Even the moon weeps with you tonight.",
            EmotionState::Neutral => " Serene, and still the fairest.",
        });
    }
    if result.fault.is_some() {
        line.push_str(" (fallback)");
    }
    line
}
