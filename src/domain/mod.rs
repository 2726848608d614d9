pub mod card;
pub mod history;
pub mod reorder;

pub use card::{Card, CardId, CardStatus};
pub use history::ChangeRecord;
pub use reorder::{plan_move, verify_lanes, MovePlan, MoveRequest, PriorityShift};
