use crate::{
    domain::{
        card::{Card, CardId, CardStatus},
        history::ChangeRecord,
        reorder::{self, MoveRequest},
    },
    error::{Result, ShiptivityError},
    storage::{MoveOutcome, NewCard, NewUser, PinVerification, Storage},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
};

/// SQLite-backed storage for cards, users and the change history.
///
/// All access runs on tokio's blocking pool so synchronous SQLite I/O never
/// ties up async worker threads. The connection mutex plus a transaction
/// around each move serialize concurrent writers: a lane's dense ordering is
/// never observable mid-update, and an aborted move rolls back wholesale.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Ok(Self::from_connection(conn))
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs a closure against the connection on a blocking thread. The
    /// guard is released on every exit path, including panics and errors.
    async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| ShiptivityError::Storage("connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| ShiptivityError::Storage(format!("storage task failed: {e}")))?
    }
}

fn column_status(idx: usize, raw: String) -> rusqlite::Result<CardStatus> {
    CardStatus::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn read_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: CardId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        status: column_status(3, row.get(3)?)?,
        priority: row.get(4)?,
    })
}

fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChangeRecord> {
    let raw_ts: String = row.get(7)?;
    let recorded_at = DateTime::parse_from_rfc3339(&raw_ts)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?
        .with_timezone(&Utc);

    Ok(ChangeRecord {
        id: row.get(0)?,
        card_id: CardId::new(row.get(1)?),
        old_status: column_status(2, row.get(2)?)?,
        new_status: column_status(3, row.get(3)?)?,
        old_priority: row.get(4)?,
        new_priority: row.get(5)?,
        actor: row.get(6)?,
        recorded_at,
    })
}

fn load_all_cards(conn: &Connection) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare("SELECT id, name, description, status, priority FROM card")?;
    let cards = stmt
        .query_map([], read_card)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cards)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        self.call(|conn| {
            conn.execute_batch(
                "
                PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS card (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    status TEXT NOT NULL DEFAULT 'backlog',
                    priority INTEGER NOT NULL DEFAULT 0
                );
                CREATE INDEX IF NOT EXISTS idx_card_lane ON card(status, priority);

                CREATE TABLE IF NOT EXISTS card_change_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    card_id INTEGER NOT NULL REFERENCES card(id),
                    old_status TEXT NOT NULL,
                    new_status TEXT NOT NULL,
                    old_priority INTEGER NOT NULL,
                    new_priority INTEGER NOT NULL,
                    actor TEXT NOT NULL,
                    recorded_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_history_card ON card_change_history(card_id);

                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    pin TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS login_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id),
                    logged_in_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS seed_metadata (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                ",
            )?;
            Ok(())
        })
        .await
    }

    async fn list_cards(&self, status: Option<CardStatus>) -> Result<Vec<Card>> {
        self.call(move |conn| match status {
            Some(lane) => {
                let mut stmt = conn.prepare(
                    "SELECT id, name, description, status, priority FROM card
                     WHERE status = ?1 ORDER BY priority",
                )?;
                let cards = stmt
                    .query_map(params![lane.as_str()], read_card)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(cards)
            }
            None => {
                let mut cards = load_all_cards(conn)?;
                crate::domain::card::sort_for_listing(&mut cards);
                Ok(cards)
            }
        })
        .await
    }

    async fn get_card(&self, id: CardId) -> Result<Card> {
        self.call(move |conn| {
            conn.query_row(
                "SELECT id, name, description, status, priority FROM card WHERE id = ?1",
                params![id.as_i64()],
                read_card,
            )
            .optional()?
            .ok_or(ShiptivityError::CardNotFound(id))
        })
        .await
    }

    async fn apply_move(&self, req: MoveRequest) -> Result<MoveOutcome> {
        self.call(move |conn| {
            let tx = conn.transaction()?;

            let cards = load_all_cards(&tx)?;
            let plan = reorder::plan_move(&cards, &req)?;

            if plan.is_noop() {
                let card = cards
                    .into_iter()
                    .find(|c| c.id == plan.card_id)
                    .ok_or(ShiptivityError::CardNotFound(plan.card_id))?;
                return Ok(MoveOutcome {
                    card,
                    adjusted: Vec::new(),
                    noop: true,
                });
            }

            for shift in &plan.shifts {
                tx.execute(
                    "UPDATE card SET priority = ?1 WHERE id = ?2",
                    params![shift.priority, shift.card_id.as_i64()],
                )?;
            }
            tx.execute(
                "UPDATE card SET status = ?1, priority = ?2 WHERE id = ?3",
                params![
                    plan.new_status.as_str(),
                    plan.new_priority,
                    plan.card_id.as_i64()
                ],
            )?;
            tx.execute(
                "INSERT INTO card_change_history
                 (card_id, old_status, new_status, old_priority, new_priority, actor, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    plan.card_id.as_i64(),
                    plan.old_status.as_str(),
                    plan.new_status.as_str(),
                    plan.old_priority,
                    plan.new_priority,
                    req.actor,
                    Utc::now().to_rfc3339()
                ],
            )?;

            // Re-read and check density before committing; a failure here
            // abandons the whole transaction.
            let after = load_all_cards(&tx)?;
            reorder::verify_lanes(&after)?;

            tx.commit()?;

            tracing::debug!(
                card = %plan.card_id,
                from = %plan.old_status,
                to = %plan.new_status,
                shifted = plan.shifts.len(),
                "move applied"
            );

            let card = after
                .into_iter()
                .find(|c| c.id == plan.card_id)
                .ok_or(ShiptivityError::CardNotFound(plan.card_id))?;
            Ok(MoveOutcome {
                card,
                adjusted: plan.shifts,
                noop: false,
            })
        })
        .await
    }

    async fn history(&self, id: CardId) -> Result<Vec<ChangeRecord>> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, card_id, old_status, new_status, old_priority, new_priority,
                        actor, recorded_at
                 FROM card_change_history WHERE card_id = ?1 ORDER BY id",
            )?;
            let records = stmt
                .query_map(params![id.as_i64()], read_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn verify_pin(&self, pin: &str) -> Result<PinVerification> {
        let pin = pin.trim().to_string();
        self.call(move |conn| {
            let matches = {
                let mut stmt = conn.prepare("SELECT id, name FROM users WHERE pin = ?1")?;
                let rows = stmt
                    .query_map(params![pin], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;
                rows
            };

            match matches.as_slice() {
                [] => Ok(PinVerification::Invalid),
                [(user_id, name)] => {
                    conn.execute(
                        "INSERT INTO login_history (user_id, logged_in_at) VALUES (?1, ?2)",
                        params![user_id, Utc::now().to_rfc3339()],
                    )?;
                    Ok(PinVerification::Valid {
                        user_id: *user_id,
                        name: name.clone(),
                    })
                }
                _ => {
                    tracing::warn!("multiple users share one PIN");
                    Ok(PinVerification::Ambiguous)
                }
            }
        })
        .await
    }

    async fn seed_if_empty(&self, cards: Vec<NewCard>, users: Vec<NewUser>) -> Result<()> {
        self.call(move |conn| {
            let tx = conn.transaction()?;

            let seeded: Option<String> = tx
                .query_row(
                    "SELECT value FROM seed_metadata WHERE key = 'db_seeded'",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            if seeded.as_deref() == Some("true") {
                return Ok(());
            }

            for card in &cards {
                tx.execute(
                    "INSERT INTO card (name, description, status, priority)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![card.name, card.description, card.status.as_str(), card.priority],
                )?;
            }
            for user in &users {
                tx.execute(
                    "INSERT INTO users (name, pin) VALUES (?1, ?2)",
                    params![user.name, user.pin],
                )?;
            }
            tx.execute(
                "INSERT INTO seed_metadata (key, value) VALUES ('db_seeded', 'true')",
                [],
            )?;
            tx.commit()?;

            tracing::info!(cards = cards.len(), users = users.len(), "database seeded");
            Ok(())
        })
        .await
    }
}
