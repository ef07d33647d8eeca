//! SQLite-backed persistence for the multi-table harness (§4.6/§6).
//!
//! Three tables, matching the abstract schema verbatim: `tables`,
//! `table_players`, and `active_hands` — one row per table, unique on
//! `table_id`, carrying the serialized [`GameState`] plus its optimistic
//! `version`. A single [`rusqlite::Connection`] behind a mutex is the
//! entire storage engine; [`crate::table::TableManager`] only ever locks it
//! for one read or one write at a time so that a competing writer can slip
//! in between a caller's read and its conditional write — that race is the
//! point, it's what makes the version check in [`Store::try_update_active_hand`]
//! observable instead of decorative.
use std::path::Path;
use std::sync::Mutex;

use holdem_engine::game::GameState;
use holdem_engine::player::SeatedPlayer;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("table {0} not found")]
    TableNotFound(u64),
    #[error("no active hand for table {0}")]
    NoActiveHand(u64),
    #[error("seat {seat} at table {table_id} is already occupied")]
    SeatTaken { table_id: u64, seat: usize },
    #[error("store lock poisoned")]
    Poisoned,
}

/// One row of `tables`: the static configuration of a table, independent of
/// any hand in progress. Table creation/CRUD itself lives outside the core
/// (§1); this struct is what the harness reads to run a hand.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: u64,
    pub name: String,
    pub small_blind: u32,
    pub big_blind: u32,
    pub max_players: usize,
    pub min_buy_in: u32,
    pub max_buy_in: u32,
    pub turn_timeout_ms: u64,
    pub is_private: bool,
    pub invite_code: Option<String>,
}

pub struct NewTable {
    pub name: String,
    pub small_blind: u32,
    pub big_blind: u32,
    pub max_players: usize,
    pub min_buy_in: u32,
    pub max_buy_in: u32,
    pub turn_timeout_ms: u64,
    pub is_private: bool,
    pub invite_code: Option<String>,
}

/// Cached outcome of an idempotent action request, keyed by `(table_id,
/// action_id)`: a re-delivery with the same id returns this instead of
/// re-applying the action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub error: Option<CachedError>,
}

/// Enough of a failed action's [`crate::errors::IntoErrorResponse`] to
/// reproduce the original wire response on replay, rather than guessing a
/// generic one from the error message alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tables (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                blinds_sb INTEGER NOT NULL,
                blinds_bb INTEGER NOT NULL,
                max_players INTEGER NOT NULL,
                min_buy_in INTEGER NOT NULL,
                max_buy_in INTEGER NOT NULL,
                turn_timeout_ms INTEGER NOT NULL,
                is_private INTEGER NOT NULL DEFAULT 0,
                invite_code TEXT
            );
            CREATE TABLE IF NOT EXISTS table_players (
                table_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                seat INTEGER NOT NULL,
                stack INTEGER NOT NULL,
                is_sitting_out INTEGER NOT NULL DEFAULT 0,
                UNIQUE(table_id, seat),
                UNIQUE(table_id, user_id)
            );
            CREATE TABLE IF NOT EXISTS active_hands (
                table_id INTEGER PRIMARY KEY,
                state_json TEXT NOT NULL,
                version INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS action_idempotency (
                table_id INTEGER NOT NULL,
                action_id TEXT NOT NULL,
                result_json TEXT NOT NULL,
                PRIMARY KEY (table_id, action_id)
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Table creation/CRUD is an external collaborator concern (§1); this
    /// exists so tests and the CLI can bootstrap a table row to exercise the
    /// harness against.
    pub fn create_table(&self, row: NewTable) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tables (name, blinds_sb, blinds_bb, max_players, min_buy_in, max_buy_in, turn_timeout_ms, is_private, invite_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.name,
                row.small_blind,
                row.big_blind,
                row.max_players as i64,
                row.min_buy_in,
                row.max_buy_in,
                row.turn_timeout_ms as i64,
                row.is_private as i64,
                row.invite_code,
            ],
        )?;
        Ok(conn.last_insert_rowid() as u64)
    }

    pub fn get_table(&self, table_id: u64) -> Result<TableRow, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, blinds_sb, blinds_bb, max_players, min_buy_in, max_buy_in, turn_timeout_ms, is_private, invite_code
             FROM tables WHERE id = ?1",
            params![table_id as i64],
            |row| {
                Ok(TableRow {
                    id: row.get::<_, i64>(0)? as u64,
                    name: row.get(1)?,
                    small_blind: row.get::<_, i64>(2)? as u32,
                    big_blind: row.get::<_, i64>(3)? as u32,
                    max_players: row.get::<_, i64>(4)? as usize,
                    min_buy_in: row.get::<_, i64>(5)? as u32,
                    max_buy_in: row.get::<_, i64>(6)? as u32,
                    turn_timeout_ms: row.get::<_, i64>(7)? as u64,
                    is_private: row.get::<_, i64>(8)? != 0,
                    invite_code: row.get(9)?,
                })
            },
        )
        .optional()?
        .ok_or(StoreError::TableNotFound(table_id))
    }

    /// `joinTable`: relies on the `UNIQUE(table_id, seat)` /
    /// `UNIQUE(table_id, user_id)` constraints to reject a double-seat or a
    /// double-join without a prior existence check racing the insert.
    pub fn join_table(
        &self,
        table_id: u64,
        user_id: u64,
        seat: usize,
        buy_in: u32,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO table_players (table_id, user_id, seat, stack, is_sitting_out) VALUES (?1, ?2, ?3, ?4, 0)",
            params![table_id as i64, user_id as i64, seat as i64, buy_in],
        )
        .map_err(|err| match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::SeatTaken { table_id, seat }
            }
            _ => StoreError::Sqlite(err),
        })?;
        Ok(())
    }

    /// `leaveTable`: touches the seats table only, same as `joinTable`.
    pub fn leave_table(&self, table_id: u64, user_id: u64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM table_players WHERE table_id = ?1 AND user_id = ?2",
            params![table_id as i64, user_id as i64],
        )?;
        Ok(())
    }

    pub fn seats(&self, table_id: u64) -> Result<Vec<SeatedPlayer>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, seat, stack, is_sitting_out FROM table_players WHERE table_id = ?1 ORDER BY seat",
        )?;
        let rows = stmt.query_map(params![table_id as i64], |row| {
            let mut seated = SeatedPlayer::new(
                row.get::<_, i64>(0)? as u64,
                row.get::<_, i64>(1)? as usize,
                row.get::<_, i64>(2)? as u32,
            );
            seated.sitting_out = row.get::<_, i64>(3)? != 0;
            Ok(seated)
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// `deal`'s upsert: replaces any stale row for this table wholesale. The
    /// `table_id` primary key plus this connection's single-writer lock is
    /// what serializes two concurrent deals against the same table.
    pub fn put_active_hand(&self, state: &GameState) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let json = serde_json::to_string(state)?;
        conn.execute(
            "INSERT INTO active_hands (table_id, state_json, version) VALUES (?1, ?2, ?3)
             ON CONFLICT(table_id) DO UPDATE SET state_json = excluded.state_json, version = excluded.version",
            params![state.table_id as i64, json, state.version as i64],
        )?;
        Ok(())
    }

    pub fn get_active_hand(&self, table_id: u64) -> Result<(GameState, u64), StoreError> {
        let conn = self.lock()?;
        let (json, version): (String, i64) = conn
            .query_row(
                "SELECT state_json, version FROM active_hands WHERE table_id = ?1",
                params![table_id as i64],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(StoreError::NoActiveHand(table_id))?;
        let state: GameState = serde_json::from_str(&json)?;
        Ok((state, version as u64))
    }

    /// The optimistic-concurrency primitive: `UPDATE ... WHERE table_id = ?
    /// AND version = ?`. Returns `true` iff exactly one row matched; `false`
    /// means a concurrent writer already bumped the version and the caller
    /// must re-read and retry.
    pub fn try_update_active_hand(
        &self,
        state: &GameState,
        expected_version: u64,
    ) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let json = serde_json::to_string(state)?;
        let affected = conn.execute(
            "UPDATE active_hands SET state_json = ?1, version = ?2 WHERE table_id = ?3 AND version = ?4",
            params![json, state.version as i64, state.table_id as i64, expected_version as i64],
        )?;
        Ok(affected == 1)
    }

    pub fn delete_active_hand(&self, table_id: u64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM active_hands WHERE table_id = ?1",
            params![table_id as i64],
        )?;
        Ok(())
    }

    /// Writes each player's final stack back onto `table_players`. Called
    /// once per player per completed hand, off the per-action hot path.
    pub fn write_back_stacks(&self, table_id: u64, stacks: &[(u64, u32)]) -> Result<(), StoreError> {
        let conn = self.lock()?;
        for (user_id, stack) in stacks {
            conn.execute(
                "UPDATE table_players SET stack = ?1 WHERE table_id = ?2 AND user_id = ?3",
                params![stack, table_id as i64, *user_id as i64],
            )?;
        }
        Ok(())
    }

    pub fn idempotent_result(
        &self,
        table_id: u64,
        action_id: &str,
    ) -> Result<Option<ActionOutcome>, StoreError> {
        let conn = self.lock()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT result_json FROM action_idempotency WHERE table_id = ?1 AND action_id = ?2",
                params![table_id as i64, action_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
    }

    pub fn record_idempotent_result(
        &self,
        table_id: u64,
        action_id: &str,
        outcome: &ActionOutcome,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let json = serde_json::to_string(outcome)?;
        conn.execute(
            "INSERT OR REPLACE INTO action_idempotency (table_id, action_id, result_json) VALUES (?1, ?2, ?3)",
            params![table_id as i64, action_id, json],
        )?;
        Ok(())
    }
}
