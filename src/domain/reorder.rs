//! Swimlane reordering engine.
//!
//! Planning is pure: [`plan_move`] takes a snapshot of the board and a move
//! request and returns the minimal set of priority adjustments that keeps
//! every affected lane dense (priorities exactly `0..n`, no gaps, no
//! duplicates). Storage executes the plan inside one transaction.

use serde::Deserialize;

use crate::domain::card::{Card, CardId, CardStatus};
use crate::error::{Result, ShiptivityError};

/// A request to move one card to a new lane position.
///
/// `old_status`/`old_priority` are where the client believes the card
/// currently sits. They are a hint only: the plan re-derives the
/// authoritative position from the snapshot and rejects the request with
/// [`ShiptivityError::StaleMove`] when the two disagree, so a stale client
/// can never desynchronize the lane ordering.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    pub card_id: CardId,
    pub old_status: CardStatus,
    pub old_priority: i64,
    pub new_status: CardStatus,
    pub new_priority: i64,
    pub actor: String,
}

/// Priority adjustment for a card that was not itself moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityShift {
    pub card_id: CardId,
    pub priority: i64,
}

/// The full set of writes one move requires.
#[derive(Debug, Clone)]
pub struct MovePlan {
    pub card_id: CardId,
    /// Authoritative position the card was moved from.
    pub old_status: CardStatus,
    pub old_priority: i64,
    pub new_status: CardStatus,
    pub new_priority: i64,
    /// One-slot adjustments to the other cards in the affected lanes.
    pub shifts: Vec<PriorityShift>,
}

impl MovePlan {
    /// A same-slot move: nothing is written and no history is recorded.
    pub fn is_noop(&self) -> bool {
        self.old_status == self.new_status && self.old_priority == self.new_priority
    }
}

/// Plans a move against a board snapshot.
///
/// Within a lane of `n` cards the card reinserts among its peers, so
/// `new_priority` must be in `0..n`. Into a foreign lane of `m` cards the
/// card may also append at the end, so `0..=m`. Out-of-range priorities are
/// rejected, never clamped.
pub fn plan_move(cards: &[Card], req: &MoveRequest) -> Result<MovePlan> {
    let current = cards
        .iter()
        .find(|c| c.id == req.card_id)
        .ok_or(ShiptivityError::CardNotFound(req.card_id))?;

    if current.status != req.old_status || current.priority != req.old_priority {
        return Err(ShiptivityError::StaleMove {
            id: req.card_id,
            client_status: req.old_status,
            client_priority: req.old_priority,
            actual_status: current.status,
            actual_priority: current.priority,
        });
    }

    let same_lane = current.status == req.new_status;
    let target_len = cards.iter().filter(|c| c.status == req.new_status).count() as i64;
    let max = if same_lane { target_len - 1 } else { target_len };
    if req.new_priority < 0 || req.new_priority > max {
        return Err(ShiptivityError::InvalidPriority {
            given: req.new_priority,
            max,
        });
    }

    let mut shifts = Vec::new();
    if same_lane {
        if req.new_priority < current.priority {
            // Everything between the insertion point and the vacated slot
            // steps one slot later.
            for c in cards.iter().filter(|c| c.status == current.status) {
                if c.id != current.id
                    && c.priority >= req.new_priority
                    && c.priority < current.priority
                {
                    shifts.push(PriorityShift {
                        card_id: c.id,
                        priority: c.priority + 1,
                    });
                }
            }
        } else if req.new_priority > current.priority {
            for c in cards.iter().filter(|c| c.status == current.status) {
                if c.id != current.id
                    && c.priority > current.priority
                    && c.priority <= req.new_priority
                {
                    shifts.push(PriorityShift {
                        card_id: c.id,
                        priority: c.priority - 1,
                    });
                }
            }
        }
    } else {
        for c in cards {
            if c.id == current.id {
                continue;
            }
            if c.status == current.status && c.priority > current.priority {
                // Old lane closes its gap.
                shifts.push(PriorityShift {
                    card_id: c.id,
                    priority: c.priority - 1,
                });
            } else if c.status == req.new_status && c.priority >= req.new_priority {
                // New lane opens a slot.
                shifts.push(PriorityShift {
                    card_id: c.id,
                    priority: c.priority + 1,
                });
            }
        }
    }

    Ok(MovePlan {
        card_id: current.id,
        old_status: current.status,
        old_priority: current.priority,
        new_status: req.new_status,
        new_priority: req.new_priority,
        shifts,
    })
}

/// Checks the lane-density invariant: for every lane the multiset of
/// priorities equals `{0, .., n-1}`. A failure means a defect upstream, not
/// a recoverable condition.
pub fn verify_lanes(cards: &[Card]) -> Result<()> {
    for status in CardStatus::ALL {
        let mut priorities: Vec<i64> = cards
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.priority)
            .collect();
        priorities.sort_unstable();
        for (expected, actual) in priorities.iter().enumerate() {
            if *actual != expected as i64 {
                return Err(ShiptivityError::InvariantViolation {
                    lane: status,
                    detail: format!("expected priority {expected}, found {actual}"),
                });
            }
        }
    }
    Ok(())
}

/// Maps a UI drop to the priority slot the dragged card should take.
///
/// `lane` is the target lane sorted by priority, without the dragged card;
/// `before` names the card the drop landed in front of. `None` (or an id
/// no longer in the lane) drops at the end.
pub fn drop_position(lane: &[Card], before: Option<CardId>) -> i64 {
    match before {
        Some(id) => lane
            .iter()
            .position(|c| c.id == id)
            .map(|i| i as i64)
            .unwrap_or(lane.len() as i64),
        None => lane.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: i64, status: CardStatus, priority: i64) -> Card {
        Card::new(
            CardId::new(id),
            format!("card-{id}"),
            String::new(),
            status,
            priority,
        )
    }

    /// Backlog of 4, in-progress of 2, complete of 1.
    fn board() -> Vec<Card> {
        vec![
            card(10, CardStatus::Backlog, 0),
            card(11, CardStatus::Backlog, 1),
            card(12, CardStatus::Backlog, 2),
            card(13, CardStatus::Backlog, 3),
            card(20, CardStatus::InProgress, 0),
            card(21, CardStatus::InProgress, 1),
            card(30, CardStatus::Complete, 0),
        ]
    }

    fn request(
        id: i64,
        old: (CardStatus, i64),
        new: (CardStatus, i64),
    ) -> MoveRequest {
        MoveRequest {
            card_id: CardId::new(id),
            old_status: old.0,
            old_priority: old.1,
            new_status: new.0,
            new_priority: new.1,
            actor: "user:1".to_string(),
        }
    }

    fn apply(cards: &mut [Card], plan: &MovePlan) {
        for shift in &plan.shifts {
            let c = cards.iter_mut().find(|c| c.id == shift.card_id).unwrap();
            c.priority = shift.priority;
        }
        let moved = cards.iter_mut().find(|c| c.id == plan.card_id).unwrap();
        moved.status = plan.new_status;
        moved.priority = plan.new_priority;
    }

    fn priority_of(cards: &[Card], id: i64) -> i64 {
        cards.iter().find(|c| c.id == CardId::new(id)).unwrap().priority
    }

    #[test]
    fn test_move_up_within_lane() {
        // Priorities [0,1,2,3]; move the priority-3 card to priority 1.
        let mut cards = board();
        let req = request(13, (CardStatus::Backlog, 3), (CardStatus::Backlog, 1));

        let plan = plan_move(&cards, &req).unwrap();
        apply(&mut cards, &plan);

        assert_eq!(priority_of(&cards, 10), 0);
        assert_eq!(priority_of(&cards, 13), 1);
        assert_eq!(priority_of(&cards, 11), 2);
        assert_eq!(priority_of(&cards, 12), 3);
        verify_lanes(&cards).unwrap();
    }

    #[test]
    fn test_move_down_within_lane() {
        let mut cards = board();
        let req = request(10, (CardStatus::Backlog, 0), (CardStatus::Backlog, 2));

        let plan = plan_move(&cards, &req).unwrap();
        assert_eq!(plan.shifts.len(), 2);
        apply(&mut cards, &plan);

        assert_eq!(priority_of(&cards, 11), 0);
        assert_eq!(priority_of(&cards, 12), 1);
        assert_eq!(priority_of(&cards, 10), 2);
        assert_eq!(priority_of(&cards, 13), 3);
        verify_lanes(&cards).unwrap();
    }

    #[test]
    fn test_cross_lane_move() {
        // Backlog card at priority 2 moves to the head of in-progress:
        // backlog closes its gap, in-progress opens a slot.
        let mut cards = board();
        let req = request(12, (CardStatus::Backlog, 2), (CardStatus::InProgress, 0));

        let plan = plan_move(&cards, &req).unwrap();
        apply(&mut cards, &plan);

        assert_eq!(priority_of(&cards, 13), 2);
        let moved = cards.iter().find(|c| c.id == CardId::new(12)).unwrap();
        assert_eq!(moved.status, CardStatus::InProgress);
        assert_eq!(moved.priority, 0);
        assert_eq!(priority_of(&cards, 20), 1);
        assert_eq!(priority_of(&cards, 21), 2);
        verify_lanes(&cards).unwrap();
    }

    #[test]
    fn test_cross_lane_append() {
        // new_priority == lane size appends without shifting anyone.
        let mut cards = board();
        let req = request(12, (CardStatus::Backlog, 2), (CardStatus::InProgress, 2));

        let plan = plan_move(&cards, &req).unwrap();
        assert_eq!(
            plan.shifts,
            vec![PriorityShift {
                card_id: CardId::new(13),
                priority: 2
            }]
        );
        apply(&mut cards, &plan);
        verify_lanes(&cards).unwrap();
    }

    #[test]
    fn test_move_into_empty_lane() {
        let mut cards = vec![
            card(1, CardStatus::Backlog, 0),
            card(2, CardStatus::Backlog, 1),
        ];
        let req = request(1, (CardStatus::Backlog, 0), (CardStatus::Complete, 0));

        let plan = plan_move(&cards, &req).unwrap();
        apply(&mut cards, &plan);

        assert_eq!(priority_of(&cards, 2), 0);
        verify_lanes(&cards).unwrap();
    }

    #[test]
    fn test_noop_move_plans_no_writes() {
        let cards = board();
        let req = request(11, (CardStatus::Backlog, 1), (CardStatus::Backlog, 1));

        let plan = plan_move(&cards, &req).unwrap();
        assert!(plan.is_noop());
        assert!(plan.shifts.is_empty());
    }

    #[test]
    fn test_round_trip_restores_all_priorities() {
        let mut cards = board();
        let original = cards.clone();

        let there = request(13, (CardStatus::Backlog, 3), (CardStatus::Backlog, 1));
        let plan = plan_move(&cards, &there).unwrap();
        apply(&mut cards, &plan);

        let back = request(13, (CardStatus::Backlog, 1), (CardStatus::Backlog, 3));
        let plan = plan_move(&cards, &back).unwrap();
        apply(&mut cards, &plan);

        for c in &original {
            let now = cards.iter().find(|n| n.id == c.id).unwrap();
            assert_eq!((now.status, now.priority), (c.status, c.priority));
        }
    }

    #[test]
    fn test_unknown_card_is_not_found() {
        let cards = board();
        let req = request(99, (CardStatus::Backlog, 0), (CardStatus::Backlog, 1));

        let err = plan_move(&cards, &req).unwrap_err();
        assert!(matches!(err, ShiptivityError::CardNotFound(id) if id == CardId::new(99)));
    }

    #[test]
    fn test_stale_client_position_is_rejected() {
        let cards = board();
        // Card 11 actually sits at backlog/1.
        let req = request(11, (CardStatus::Backlog, 2), (CardStatus::Backlog, 0));

        let err = plan_move(&cards, &req).unwrap_err();
        assert!(matches!(err, ShiptivityError::StaleMove { .. }));

        let req = request(11, (CardStatus::InProgress, 1), (CardStatus::Backlog, 0));
        let err = plan_move(&cards, &req).unwrap_err();
        assert!(matches!(err, ShiptivityError::StaleMove { .. }));
    }

    #[test]
    fn test_priority_out_of_range() {
        let cards = board();

        // Within-lane: 4 cards, so 4 is one past the last slot.
        let req = request(10, (CardStatus::Backlog, 0), (CardStatus::Backlog, 4));
        let err = plan_move(&cards, &req).unwrap_err();
        assert!(matches!(
            err,
            ShiptivityError::InvalidPriority { given: 4, max: 3 }
        ));

        // Cross-lane: appending at 2 is fine, 3 is not.
        let req = request(10, (CardStatus::Backlog, 0), (CardStatus::InProgress, 3));
        let err = plan_move(&cards, &req).unwrap_err();
        assert!(matches!(
            err,
            ShiptivityError::InvalidPriority { given: 3, max: 2 }
        ));

        let req = request(10, (CardStatus::Backlog, 0), (CardStatus::Backlog, -1));
        assert!(plan_move(&cards, &req).is_err());
    }

    #[test]
    fn test_random_walk_keeps_lanes_dense() {
        // A fixed pseudo-random sequence of valid moves; the invariant must
        // hold after every step.
        let mut cards = board();
        let mut seed: u64 = 0x5eed;

        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let pick = (seed >> 33) as usize % cards.len();
            let mover = cards[pick].clone();

            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let new_status = CardStatus::ALL[(seed >> 33) as usize % 3];

            let lane_len = cards.iter().filter(|c| c.status == new_status).count() as i64;
            let max = if new_status == mover.status {
                lane_len - 1
            } else {
                lane_len
            };
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let new_priority = ((seed >> 33) as i64) % (max + 1);

            let req = MoveRequest {
                card_id: mover.id,
                old_status: mover.status,
                old_priority: mover.priority,
                new_status,
                new_priority,
                actor: "walker".to_string(),
            };
            let plan = plan_move(&cards, &req).unwrap();
            apply(&mut cards, &plan);
            verify_lanes(&cards).unwrap();
        }
    }

    #[test]
    fn test_verify_lanes_detects_gap_and_duplicate() {
        let cards = vec![
            card(1, CardStatus::Backlog, 0),
            card(2, CardStatus::Backlog, 2),
        ];
        assert!(matches!(
            verify_lanes(&cards),
            Err(ShiptivityError::InvariantViolation { .. })
        ));

        let cards = vec![
            card(1, CardStatus::Backlog, 0),
            card(2, CardStatus::Backlog, 0),
        ];
        assert!(verify_lanes(&cards).is_err());
    }

    #[test]
    fn test_drop_position() {
        let lane = vec![
            card(1, CardStatus::Backlog, 0),
            card(2, CardStatus::Backlog, 1),
            card(3, CardStatus::Backlog, 2),
        ];

        assert_eq!(drop_position(&lane, Some(CardId::new(1))), 0);
        assert_eq!(drop_position(&lane, Some(CardId::new(3))), 2);
        assert_eq!(drop_position(&lane, None), 3);
        // A sibling that vanished between the drop and the request falls
        // back to the end of the lane.
        assert_eq!(drop_position(&lane, Some(CardId::new(9))), 3);
    }
}
