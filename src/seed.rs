//! Built-in seed data: a starter board of shipping requests plus the user
//! table backing PIN verification. Seeding is idempotent; storage keeps a
//! marker row and skips the insert on later startups.

use crate::domain::card::CardStatus;
use crate::storage::{NewCard, NewUser};

pub fn seed_cards() -> Vec<NewCard> {
    let rows: [(&str, &str, CardStatus, i64); 12] = [
        (
            "Stark, White and Abbott",
            "Cloned Optimal Architecture",
            CardStatus::Backlog,
            0,
        ),
        (
            "Wiza LLC",
            "Exclusive Bandwidth-Monitored Implementation",
            CardStatus::Backlog,
            1,
        ),
        (
            "Nolan LLC",
            "Vision-Oriented 4th-Generation Hardware",
            CardStatus::Backlog,
            2,
        ),
        (
            "Thompson PLC",
            "Streamlined Regional Knowledge-User",
            CardStatus::Backlog,
            3,
        ),
        (
            "Walter-Schmidt",
            "Team-Oriented 6th-Generation Matrix",
            CardStatus::Backlog,
            4,
        ),
        (
            "Boehm and Sons",
            "Automated Systematic Paradigm",
            CardStatus::InProgress,
            0,
        ),
        (
            "Runolfsson, Hegmann and Block",
            "Integrated Transitional Strategy",
            CardStatus::InProgress,
            1,
        ),
        (
            "Koepp-Schoen",
            "Customizable Cohesive Policies",
            CardStatus::InProgress,
            2,
        ),
        (
            "Little Group",
            "Multi-Tiered Bifurcated Synergy",
            CardStatus::InProgress,
            3,
        ),
        (
            "Walsh-Zulauf",
            "Self-Enabling Fresh-Thinking Process",
            CardStatus::Complete,
            0,
        ),
        (
            "Quigley-Kozey",
            "Cross-Group User-Facing Focus",
            CardStatus::Complete,
            1,
        ),
        (
            "Erdman-Bauch",
            "Devolved Needs-Based Capability",
            CardStatus::Complete,
            2,
        ),
    ];

    rows.into_iter()
        .map(|(name, description, status, priority)| NewCard {
            name: name.to_string(),
            description: description.to_string(),
            status,
            priority,
        })
        .collect()
}

pub fn seed_users() -> Vec<NewUser> {
    [("Harriet", "1213"), ("Dispatch", "4908"), ("Ops", "7653")]
        .into_iter()
        .map(|(name, pin)| NewUser {
            name: name.to_string(),
            pin: pin.to_string(),
        })
        .collect()
}
