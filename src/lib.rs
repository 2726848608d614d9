//! # Shiptivity
//!
//! Shipping-request tracking board: a REST backend over an SQLite card
//! table plus an append-only change history.
//!
//! The core is the reordering engine in [`domain::reorder`]: every
//! swimlane's priorities stay dense (exactly `0..n`, no gaps, no
//! duplicates) across within-lane and cross-lane moves, and each move
//! commits atomically together with its history record.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod seed;
pub mod storage;

// Re-export commonly used types
pub use config::ServerConfig;
pub use domain::{
    card::{Card, CardId, CardStatus},
    history::ChangeRecord,
    reorder::{MovePlan, MoveRequest, PriorityShift},
};
pub use error::{Result, ShiptivityError};
pub use storage::Storage;
