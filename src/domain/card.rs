use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique identifier for a card, assigned by storage at creation and never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(i64);

impl CardId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for CardId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Swimlane a card sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardStatus {
    Backlog,
    InProgress,
    Complete,
}

impl CardStatus {
    pub const ALL: [CardStatus; 3] = [Self::Backlog, Self::InProgress, Self::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
        }
    }

    /// Position of the lane on the board: backlog, then in-progress, then
    /// complete. Listing without a lane filter sorts by this rank.
    pub fn lane_rank(&self) -> u8 {
        match self {
            Self::Backlog => 0,
            Self::InProgress => 1,
            Self::Complete => 2,
        }
    }
}

impl FromStr for CardStatus {
    type Err = crate::error::ShiptivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(Self::Backlog),
            "in-progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            other => Err(crate::error::ShiptivityError::InvalidStatus(
                other.to_string(),
            )),
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A shipping request card on the board.
///
/// `priority` is a non-negative integer giving a strict total order within
/// the card's lane: every lane holds exactly the priorities `0..n` for its
/// `n` cards. The reordering engine owns that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub description: String,
    pub status: CardStatus,
    pub priority: i64,
}

impl Card {
    pub fn new(
        id: CardId,
        name: String,
        description: String,
        status: CardStatus,
        priority: i64,
    ) -> Self {
        Self {
            id,
            name,
            description,
            status,
            priority,
        }
    }
}

/// Orders cards the way the board lists them: lane rank first, then
/// priority within the lane.
pub fn sort_for_listing(cards: &mut [Card]) {
    cards.sort_by(|a, b| {
        a.status
            .lane_rank()
            .cmp(&b.status.lane_rank())
            .then(a.priority.cmp(&b.priority))
    });
}
