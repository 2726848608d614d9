use thiserror::Error;

use crate::domain::card::{CardId, CardStatus};

pub type Result<T> = std::result::Result<T, ShiptivityError>;

#[derive(Debug, Error)]
pub enum ShiptivityError {
    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Invalid status '{0}'. Status can only be one of [backlog | in-progress | complete]")]
    InvalidStatus(String),

    #[error("Invalid priority {given}: must be between 0 and {max}")]
    InvalidPriority { given: i64, max: i64 },

    #[error(
        "Card {id} moved since the client last read it: \
         client says {client_status}/{client_priority}, storage has {actual_status}/{actual_priority}"
    )]
    StaleMove {
        id: CardId,
        client_status: CardStatus,
        client_priority: i64,
        actual_status: CardStatus,
        actual_priority: i64,
    },

    #[error("Priority ordering violated in lane {lane}: {detail}")]
    InvariantViolation { lane: CardStatus, detail: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<rusqlite::Error> for ShiptivityError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
