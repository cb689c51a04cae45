//! Safety scoring and verdict text.
//!
//! The scoring rules are fixed:
//! 1. Start at 100
//! 2. Subtract 30 per unsafe ingredient and 10 per moderate ingredient
//! 3. Subtract 20 per allergen match (see [`crate::overlay`])
//! 4. Clamp to `0..=100` after every adjustment

use serde::{Deserialize, Serialize};

use crate::types::{Ingredient, Status};

/// Starting score before any penalties.
pub const MAX_SCORE: u8 = 100;

/// Penalty per unsafe ingredient.
pub const UNSAFE_PENALTY: i64 = 30;

/// Penalty per moderate ingredient.
pub const MODERATE_PENALTY: i64 = 10;

/// Penalty per matching ingredient/allergy pair.
pub const ALLERGEN_PENALTY: i64 = 20;

/// Below this score the verdict is [`Verdict::Caution`].
pub const CAUTION_BELOW: u8 = 50;

/// Below this score (and at or above [`CAUTION_BELOW`]) the verdict is [`Verdict::Moderate`].
pub const MODERATE_BELOW: u8 = 80;

/// Clamp any raw score into `0..=100`.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, i64::from(MAX_SCORE)) as u8
}

/// Per-ingredient penalty from its status alone.
pub fn status_penalty(status: Status) -> i64 {
    match status {
        Status::Safe => 0,
        Status::Moderate => MODERATE_PENALTY,
        Status::Unsafe => UNSAFE_PENALTY,
    }
}

/// Score a list of ingredients by status counts.
pub fn base_score(ingredients: &[Ingredient]) -> u8 {
    let penalty: i64 = ingredients.iter().map(|i| status_penalty(i.status)).sum();
    clamp_score(i64::from(MAX_SCORE) - penalty)
}

/// Verdict bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// score < 50
    Caution,

    /// 50 <= score < 80
    Moderate,

    /// score >= 80
    Good,
}

impl Verdict {
    pub fn from_score(score: u8) -> Self {
        if score < CAUTION_BELOW {
            Verdict::Caution
        } else if score < MODERATE_BELOW {
            Verdict::Moderate
        } else {
            Verdict::Good
        }
    }

    /// The one-sentence summary shown to the user.
    pub fn summary(self) -> &'static str {
        match self {
            Verdict::Caution => "Caution advised. Several concerning ingredients found.",
            Verdict::Moderate => "Moderate safety. Consume/Use with awareness.",
            Verdict::Good => "Looking good! Mostly safe ingredients.",
        }
    }
}

/// Summary text for a score.
pub fn summary_for(score: u8) -> &'static str {
    Verdict::from_score(score).summary()
}
