//! Multi-table, multi-seat harness: the persistent counterpart to
//! [`crate::session::SessionManager`]'s in-memory heads-up practice tables.
//!
//! Every mutation follows the same shape: read the `active_hands` row and
//! its version, run a pure transform from `holdem_engine::engine`/`rules`,
//! then write back with a conditional `UPDATE ... WHERE version = ?`
//! (`Store::try_update_active_hand`). A lost race means someone else's
//! write landed first; we re-read and retry, bounded by `MAX_RETRIES`,
//! rather than holding a lock across the whole read-transform-write cycle.
//! Table creation/CRUD is intentionally not exposed here as an RPC — §1
//! scopes it to an external collaborator; [`Store::create_table`] exists
//! only for bootstrapping tables in tests and the CLI.

use std::sync::Arc;

use holdem_engine::deck::Deck;
use holdem_engine::engine;
use holdem_engine::errors::GameError;
use holdem_engine::game::{GameState, Phase};
use holdem_engine::player::{PlayerAction, PlayerId};
use holdem_engine::rules::{self, ValidActions};
use serde::Serialize;
use thiserror::Error;

use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::store::{ActionOutcome, CachedError, Store, StoreError};
use crate::table_events::{TableEvent, TableEventBus};

const MAX_RETRIES: usize = 3;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table {0} not found")]
    TableNotFound(u64),
    #[error("no hand in progress at table {0}")]
    NoActiveHand(u64),
    #[error("a hand is already in progress at table {0}")]
    HandAlreadyInProgress(u64),
    #[error("seat {seat} at table {table_id} is taken")]
    SeatTaken { table_id: u64, seat: usize },
    #[error("buy-in {amount} is outside the allowed range {min}-{max}")]
    BuyInOutOfRange { amount: u32, min: u32, max: u32 },
    #[error("player {0} is not seated at this table")]
    NotSeated(PlayerId),
    #[error("too early to claim a timeout")]
    TooEarlyToClaimTimeout,
    #[error("engine rejected the action: {0}")]
    Engine(#[from] GameError),
    #[error("could not reach a consistent write after {0} attempts")]
    Conflict(usize),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("{0.message}")]
    Replayed(CachedError),
}

/// Maps a previously-cached `error_code()` string back to the `&'static str`
/// it came from, so a replayed failure can report the exact code of the
/// original one instead of being downgraded to a generic one.
fn static_error_code(code: &str) -> &'static str {
    match code {
        "NotFound" => "NotFound",
        "Conflict" => "Conflict",
        "InvalidRequest" => "InvalidRequest",
        "TooEarlyToClaimTimeout" => "TooEarlyToClaimTimeout",
        "NotEnoughPlayers" => "NotEnoughPlayers",
        "IllegalAction" => "IllegalAction",
        _ => "Internal",
    }
}

impl IntoErrorResponse for TableError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            TableError::TableNotFound(_) | TableError::NoActiveHand(_) => StatusCode::NOT_FOUND,
            TableError::HandAlreadyInProgress(_)
            | TableError::SeatTaken { .. }
            | TableError::Conflict(_) => StatusCode::CONFLICT,
            TableError::BuyInOutOfRange { .. } | TableError::NotSeated(_) => {
                StatusCode::BAD_REQUEST
            }
            TableError::TooEarlyToClaimTimeout => StatusCode::BAD_REQUEST,
            TableError::Engine(err) => match err.wire_code() {
                "NotEnoughPlayers" | "InvalidRequest" => StatusCode::BAD_REQUEST,
                "Internal" => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::CONFLICT,
            },
            TableError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TableError::Replayed(cached) => StatusCode::from_u16(cached.status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            TableError::TableNotFound(_) | TableError::NoActiveHand(_) => "NotFound",
            TableError::HandAlreadyInProgress(_) | TableError::SeatTaken { .. } => "Conflict",
            TableError::BuyInOutOfRange { .. } | TableError::NotSeated(_) => "InvalidRequest",
            TableError::TooEarlyToClaimTimeout => "TooEarlyToClaimTimeout",
            TableError::Engine(err) => err.wire_code(),
            TableError::Conflict(_) => "Conflict",
            TableError::Store(_) => "Internal",
            TableError::Replayed(cached) => static_error_code(&cached.code),
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            TableError::Store(_) | TableError::Conflict(_) => ErrorSeverity::Server,
            TableError::Engine(GameError::Internal(_)) => ErrorSeverity::Critical,
            TableError::Replayed(cached) if cached.status >= 500 => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}

/// Sanitized per-player view: hole cards are visible only to the seat they
/// belong to, unless the hand has reached showdown and that seat didn't
/// fold, matching the reveal rule clients rely on to never see an
/// opponent's cards early.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub seat: usize,
    pub stack: u32,
    pub current_bet: u32,
    pub folded: bool,
    pub all_in: bool,
    pub hole: Option<[holdem_engine::cards::Card; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStateView {
    pub table_id: u64,
    pub hand_number: u64,
    pub phase: Phase,
    pub community_cards: Vec<holdem_engine::cards::Card>,
    pub pot_total: u32,
    pub current_player: Option<PlayerId>,
    pub players: Vec<PlayerView>,
    pub is_hand_complete: bool,
}

fn sanitize(state: &GameState, viewer: Option<PlayerId>) -> TableStateView {
    let players = state
        .players
        .iter()
        .map(|p| {
            let reveal = viewer == Some(p.id)
                || (state.phase == Phase::Showdown && !p.folded);
            PlayerView {
                player_id: p.id,
                seat: p.seat,
                stack: p.stack,
                current_bet: p.current_bet,
                folded: p.folded,
                all_in: p.all_in,
                hole: if reveal {
                    match (p.hole[0], p.hole[1]) {
                        (Some(a), Some(b)) => Some([a, b]),
                        _ => None,
                    }
                } else {
                    None
                },
            }
        })
        .collect();
    TableStateView {
        table_id: state.table_id,
        hand_number: state.hand_number,
        phase: state.phase,
        community_cards: state.community_cards.clone(),
        pot_total: state.pot_total(),
        current_player: state.current_player_index.map(|i| state.players[i].id),
        players,
        is_hand_complete: state.is_hand_complete,
    }
}

pub struct TableManager {
    store: Arc<Store>,
    events: TableEventBus,
}

impl TableManager {
    pub fn new(store: Arc<Store>, events: TableEventBus) -> Self {
        Self { store, events }
    }

    pub fn events(&self) -> &TableEventBus {
        &self.events
    }

    pub fn join_table(
        &self,
        table_id: u64,
        player_id: PlayerId,
        seat: usize,
        buy_in: u32,
    ) -> Result<(), TableError> {
        let table = self
            .store
            .get_table(table_id)
            .map_err(|e| map_store_not_found(e, table_id))?;
        if buy_in < table.min_buy_in || buy_in > table.max_buy_in {
            return Err(TableError::BuyInOutOfRange {
                amount: buy_in,
                min: table.min_buy_in,
                max: table.max_buy_in,
            });
        }
        self.store
            .join_table(table_id, player_id, seat, buy_in)
            .map_err(|err| match err {
                StoreError::SeatTaken { table_id, seat } => {
                    TableError::SeatTaken { table_id, seat }
                }
                other => TableError::Store(other),
            })?;
        self.events.broadcast(
            table_id,
            TableEvent::PlayerJoined { table_id, player_id, seat },
        );
        Ok(())
    }

    pub fn leave_table(&self, table_id: u64, player_id: PlayerId) -> Result<(), TableError> {
        let seats = self.store.seats(table_id)?;
        let seat = seats
            .iter()
            .find(|p| p.player_id == player_id)
            .map(|p| p.seat)
            .ok_or(TableError::NotSeated(player_id))?;
        self.store.leave_table(table_id, player_id)?;
        self.events.broadcast(
            table_id,
            TableEvent::PlayerLeft { table_id, player_id, seat },
        );
        Ok(())
    }

    /// `dealHand`: starts a new hand if the previous one (if any) has
    /// finished and been cleaned up; rejects the request if one is still in
    /// progress rather than silently clobbering it.
    pub fn deal(&self, table_id: u64, now_ms: i64) -> Result<TableStateView, TableError> {
        if let Ok((existing, _)) = self.store.get_active_hand(table_id) {
            if !existing.is_hand_complete {
                return Err(TableError::HandAlreadyInProgress(table_id));
            }
            self.store.delete_active_hand(table_id)?;
        }

        let table = self
            .store
            .get_table(table_id)
            .map_err(|e| map_store_not_found(e, table_id))?;
        let seats = self.store.seats(table_id)?;
        let hand_number = self.next_hand_number(table_id)?;
        let mut state = GameState::create(
            table_id,
            hand_number,
            &seats,
            None,
            table.small_blind,
            table.big_blind,
            table.turn_timeout_ms,
            table.max_players,
        )?;
        engine::start_hand(&mut state, Deck::new_seeded_from_os_rng(), now_ms)?;
        state.version = 1;
        self.store.put_active_hand(&state)?;

        let hand_id = format!("{table_id}-{hand_number}");
        self.events.broadcast(
            table_id,
            TableEvent::HandStarted {
                table_id,
                hand_id,
                dealer_seat: state.dealer_seat().unwrap_or(0),
            },
        );
        for player in &state.players {
            if let (Some(a), Some(b)) = (player.hole[0], player.hole[1]) {
                self.events.broadcast(
                    table_id,
                    TableEvent::CardsDealt {
                        table_id,
                        player_id: player.id,
                        cards: Some([a, b]),
                    },
                );
            }
        }
        Ok(sanitize(&state, None))
    }

    fn next_hand_number(&self, table_id: u64) -> Result<u64, TableError> {
        match self.store.get_active_hand(table_id) {
            Ok((state, _)) => Ok(state.hand_number + 1),
            Err(StoreError::NoActiveHand(_)) => Ok(1),
            Err(err) => Err(TableError::Store(err)),
        }
    }

    /// `playerAction`: idempotent by `action_id` — a re-delivered request
    /// with the same id replays the cached outcome instead of re-applying
    /// the action against a hand that has since moved on.
    pub fn action(
        &self,
        table_id: u64,
        player_id: PlayerId,
        action: PlayerAction,
        action_id: &str,
        now_ms: i64,
    ) -> Result<TableStateView, TableError> {
        if let Some(cached) = self.store.idempotent_result(table_id, action_id)? {
            if !cached.success {
                return Err(TableError::Replayed(cached.error.unwrap_or(CachedError {
                    status: 409,
                    code: "Conflict".to_string(),
                    message: "action previously failed".to_string(),
                })));
            }
            let (state, _) = self.store.get_active_hand(table_id)?;
            return Ok(sanitize(&state, Some(player_id)));
        }

        let result = self.mutate(table_id, |state| {
            engine::process_action(state, player_id, action, now_ms)
        });

        let outcome = ActionOutcome {
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| CachedError {
                status: e.status_code().as_u16(),
                code: e.error_code().to_string(),
                message: e.error_message(),
            }),
        };
        self.store
            .record_idempotent_result(table_id, action_id, &outcome)?;

        let state = result?;
        self.events.broadcast(
            table_id,
            TableEvent::PlayerAction {
                table_id,
                player_id,
                street: street_of(state.phase),
                action,
                is_timeout: false,
            },
        );
        self.broadcast_phase_and_completion(table_id, &state);
        Ok(sanitize(&state, Some(player_id)))
    }

    /// `playerTimeout`: the engine itself enforces the grace period via
    /// [`engine::apply_timeout`]; a too-early claim surfaces as a typed
    /// [`TableError::TooEarlyToClaimTimeout`] rather than a generic engine
    /// error so clients can tell the difference from an illegal action.
    pub fn claim_timeout(&self, table_id: u64, now_ms: i64) -> Result<TableStateView, TableError> {
        let (player_id, state) = {
            let mut player_id = None;
            let state = self.mutate(table_id, |state| {
                player_id = state.current_player_index.map(|i| state.players[i].id);
                engine::apply_timeout(state, now_ms).map_err(|err| match err {
                    GameError::IllegalAction(ref msg) if msg.contains("too early") => {
                        GameError::IllegalAction("too early to claim timeout".into())
                    }
                    other => other,
                })
            });
            match state {
                Ok(state) => (player_id, state),
                Err(TableError::Engine(GameError::IllegalAction(msg)))
                    if msg.contains("too early") =>
                {
                    return Err(TableError::TooEarlyToClaimTimeout);
                }
                Err(other) => return Err(other),
            }
        };

        if let Some(player_id) = player_id {
            self.events.broadcast(
                table_id,
                TableEvent::PlayerAction {
                    table_id,
                    player_id,
                    street: street_of(state.phase),
                    action: state
                        .action_log
                        .last()
                        .map(|r| r.action)
                        .unwrap_or(PlayerAction::Fold),
                    is_timeout: true,
                },
            );
        }
        self.broadcast_phase_and_completion(table_id, &state);
        Ok(sanitize(&state, None))
    }

    pub fn get_state(
        &self,
        table_id: u64,
        viewer: Option<PlayerId>,
    ) -> Result<TableStateView, TableError> {
        let (state, _) = self
            .store
            .get_active_hand(table_id)
            .map_err(|e| map_store_no_hand(e, table_id))?;
        Ok(sanitize(&state, viewer))
    }

    pub fn valid_actions(&self, table_id: u64) -> Result<ValidActions, TableError> {
        let (state, _) = self
            .store
            .get_active_hand(table_id)
            .map_err(|e| map_store_no_hand(e, table_id))?;
        Ok(rules::valid_actions(&state)?)
    }

    pub fn reset(&self, table_id: u64) -> Result<(), TableError> {
        self.store.delete_active_hand(table_id)?;
        self.events.broadcast(table_id, TableEvent::TableReset { table_id });
        Ok(())
    }

    fn broadcast_phase_and_completion(&self, table_id: u64, state: &GameState) {
        self.events.broadcast(
            table_id,
            TableEvent::PhaseChanged {
                table_id,
                phase: state.phase,
                board: state.community_cards.clone(),
            },
        );
        if state.is_hand_complete {
            self.events.broadcast(
                table_id,
                TableEvent::HandComplete {
                    table_id,
                    hand_id: format!("{table_id}-{}", state.hand_number),
                    winners: state.winners.iter().map(|w| w.player_id).collect(),
                },
            );
        }
    }

    /// Bounded-retry optimistic-concurrency primitive: read the current
    /// `active_hands` row, run `transform` against it, then try a
    /// conditional write. A failed conditional write means someone else's
    /// write landed between our read and our write; we re-read and retry up
    /// to `MAX_RETRIES` times rather than serializing the whole cycle behind
    /// a lock, so two genuinely concurrent callers can both make progress.
    fn mutate<F>(&self, table_id: u64, mut transform: F) -> Result<GameState, TableError>
    where
        F: FnMut(&mut GameState) -> Result<(), GameError>,
    {
        for _ in 0..MAX_RETRIES {
            let (mut state, version) = self
                .store
                .get_active_hand(table_id)
                .map_err(|e| map_store_no_hand(e, table_id))?;
            transform(&mut state)?;
            state.version = version + 1;
            if self.store.try_update_active_hand(&state, version)? {
                if state.is_hand_complete {
                    self.persist_stacks_and_cleanup(table_id, &state)?;
                }
                return Ok(state);
            }
        }
        Err(TableError::Conflict(MAX_RETRIES))
    }

    fn persist_stacks_and_cleanup(
        &self,
        table_id: u64,
        state: &GameState,
    ) -> Result<(), TableError> {
        let stacks: Vec<(PlayerId, u32)> =
            state.players.iter().map(|p| (p.id, p.stack)).collect();
        self.store.write_back_stacks(table_id, &stacks)?;
        self.store.delete_active_hand(table_id)?;
        Ok(())
    }
}

fn street_of(phase: Phase) -> holdem_engine::logger::Street {
    use holdem_engine::logger::Street;
    match phase {
        Phase::Flop => Street::Flop,
        Phase::Turn => Street::Turn,
        Phase::River | Phase::Showdown => Street::River,
        _ => Street::Preflop,
    }
}

fn map_store_not_found(err: StoreError, table_id: u64) -> TableError {
    match err {
        StoreError::TableNotFound(_) => TableError::TableNotFound(table_id),
        other => TableError::Store(other),
    }
}

fn map_store_no_hand(err: StoreError, table_id: u64) -> TableError {
    match err {
        StoreError::NoActiveHand(_) => TableError::NoActiveHand(table_id),
        other => TableError::Store(other),
    }
}
