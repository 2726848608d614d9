use crate::{
    domain::{
        card::{Card, CardId, CardStatus},
        history::ChangeRecord,
        reorder::{MoveRequest, PriorityShift},
    },
    error::Result,
};
use async_trait::async_trait;

pub mod sqlite_storage;

/// Outcome of an accepted move: the card's new position plus every
/// priority adjustment that kept the affected lanes dense.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub card: Card,
    pub adjusted: Vec<PriorityShift>,
    /// Same-slot move: nothing was written, no history appended.
    pub noop: bool,
}

/// Result of a PIN lookup against the user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinVerification {
    /// Exactly one user carries the PIN.
    Valid { user_id: i64, name: String },
    /// No user carries the PIN.
    Invalid,
    /// More than one user carries the PIN; the user table is misconfigured.
    Ambiguous,
}

/// Card payload for seeding; ids are assigned by storage.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub name: String,
    pub description: String,
    pub status: CardStatus,
    pub priority: i64,
}

/// User payload for seeding.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub pin: String,
}

/// Storage trait for cards, users and the change history.
///
/// The HTTP layer consumes this seam and nothing below it; implementations
/// provide durable storage with transactional guarantees. Moves that touch
/// the same lane serialize on the implementation's transaction boundary.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Creates the schema if it does not exist yet.
    async fn initialize(&self) -> Result<()>;

    /// Lists cards, optionally filtered to one lane. Unfiltered listings
    /// order by lane rank then priority; filtered ones by priority alone.
    async fn list_cards(&self, status: Option<CardStatus>) -> Result<Vec<Card>>;

    /// Loads a single card by id.
    async fn get_card(&self, id: CardId) -> Result<Card>;

    /// Applies a move as one atomic unit: every priority shift, the card's
    /// own update and the history append commit together or not at all.
    async fn apply_move(&self, req: MoveRequest) -> Result<MoveOutcome>;

    /// Change log for one card, oldest first.
    async fn history(&self, id: CardId) -> Result<Vec<ChangeRecord>>;

    /// Looks a PIN up against the user table and records the login when it
    /// matches exactly one user.
    async fn verify_pin(&self, pin: &str) -> Result<PinVerification>;

    /// Seeds cards and users once; later calls are no-ops.
    async fn seed_if_empty(&self, cards: Vec<NewCard>, users: Vec<NewUser>) -> Result<()>;
}
