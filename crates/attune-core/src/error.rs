use contracts::{ActivityType, ConfigError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("text pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
    #[error("a session needs at least two players, got {0}")]
    NotEnoughPlayers(usize),
    #[error("offer for step {step} has no {choice} card")]
    ChoiceUnavailable { step: u32, choice: ActivityType },
    #[error("offer for step {offered} is stale; session is at step {current}")]
    StaleOffer { offered: u32, current: u32 },
}
