//! In-memory practice-table sessions.
//!
//! A [`GameSession`] wraps one heads-up [`GameState`] and drives it with the
//! real engine (`holdem_engine::engine`) instead of re-implementing any
//! betting logic here. Seat 0 is always the human; seat 1 is either a second
//! human or an [`AIOpponent`], selected by [`OpponentType`]. Stacks and the
//! dealer button persist across hands within a session; a session ends when
//! one seat's stack hits zero.
use crate::ai::{create_ai, AIOpponent};
use crate::events::{EventBus, GameEvent, HandResult, PlayerInfo};
use crate::history::HistoryStore;
use holdem_engine::cards::Card;
use holdem_engine::deck::Deck;
use holdem_engine::engine;
use holdem_engine::errors::GameError;
use holdem_engine::game::{GameState, Phase};
use holdem_engine::logger::{HandRecord, ShowdownInfo, Street};
use holdem_engine::player::{PlayerAction, SeatedPlayer, STARTING_STACK};
use holdem_engine::rules::{self, ValidActions};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub type SessionId = String;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
const MAX_SEATS: usize = 2;
const TURN_TIMEOUT_MS: u64 = 30_000;
const SMALL_BLIND_UNIT: u32 = 5;
const BIG_BLIND_UNIT: u32 = 10;
const HUMAN_SEAT: usize = 0;
const AI_SEAT: usize = 1;

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn blinds_for_level(level: u8) -> (u32, u32) {
    let level = level.max(1) as u32;
    (SMALL_BLIND_UNIT * level, BIG_BLIND_UNIT * level)
}

fn phase_to_street(phase: Phase) -> Option<Street> {
    match phase {
        Phase::Preflop => Some(Street::Preflop),
        Phase::Flop => Some(Street::Flop),
        Phase::Turn => Some(Street::Turn),
        Phase::River => Some(Street::River),
        Phase::Waiting | Phase::Showdown => None,
    }
}

fn map_game_error(err: GameError) -> SessionError {
    match err {
        GameError::DeckExhausted | GameError::Internal(_) => SessionError::EngineError(err.to_string()),
        other => SessionError::InvalidAction(other.to_string()),
    }
}

fn available_actions_from(valid: &ValidActions) -> Vec<AvailableAction> {
    let mut actions = Vec::new();
    if valid.can_fold {
        actions.push(AvailableAction {
            action_type: "fold".to_string(),
            min_amount: None,
            max_amount: None,
        });
    }
    if valid.can_check {
        actions.push(AvailableAction {
            action_type: "check".to_string(),
            min_amount: None,
            max_amount: None,
        });
    }
    if let Some(amount) = valid.can_call {
        actions.push(AvailableAction {
            action_type: "call".to_string(),
            min_amount: Some(amount),
            max_amount: Some(amount),
        });
    }
    if let Some((min, max)) = valid.can_bet {
        actions.push(AvailableAction {
            action_type: "bet".to_string(),
            min_amount: Some(min),
            max_amount: Some(max),
        });
    }
    if let Some((min, max)) = valid.can_raise {
        actions.push(AvailableAction {
            action_type: "raise".to_string(),
            min_amount: Some(min),
            max_amount: Some(max),
        });
    }
    if valid.can_all_in {
        actions.push(AvailableAction {
            action_type: "all_in".to_string(),
            min_amount: None,
            max_amount: None,
        });
    }
    actions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatPosition {
    Button,
    BigBlind,
}

impl SeatPosition {
    fn for_seat(state: &GameState, seat_index: usize) -> Self {
        if state.dealer_index == Some(seat_index) {
            SeatPosition::Button
        } else {
            SeatPosition::BigBlind
        }
    }
}

/// Metadata about a hand just started, enough for the manager to broadcast
/// the usual `HandStarted`/`CardsDealt` events without reaching back into
/// the session's locks.
struct HandMetadata {
    hand_id: String,
    button_player: usize,
    player_cards: Vec<(usize, Option<Vec<Card>>)>,
}

/// Manages the lifecycle of all active practice-table sessions: creation,
/// lookup, action dispatch, AI turn progression, expiry and deletion.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<GameSession>>>,
    event_bus: Arc<EventBus>,
    history_store: Option<Arc<HistoryStore>>,
    session_ttl: Duration,
}

impl SessionManager {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            history_store: None,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_history(event_bus: Arc<EventBus>, history_store: Arc<HistoryStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            history_store: Some(history_store),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_ttl(event_bus: Arc<EventBus>, session_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            history_store: None,
            session_ttl,
        }
    }

    pub fn with_ttl_and_history(
        event_bus: Arc<EventBus>,
        session_ttl: Duration,
        history_store: Arc<HistoryStore>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            history_store: Some(history_store),
            session_ttl,
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn create_session(&self, config: GameConfig) -> Result<SessionId, SessionError> {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(GameSession::new(id.clone(), config));
        let hand = session.start_new_hand()?;

        {
            let mut guard = self
                .sessions
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.insert(id.clone(), Arc::clone(&session));
        }

        let players = session.snapshot_player_infos()?;
        self.event_bus.broadcast(
            &id,
            GameEvent::GameStarted {
                session_id: id.clone(),
                players,
            },
        );
        self.broadcast_hand_started(&id, &hand);

        tracing::info!(session_id = %id, hand_id = %hand.hand_id, "session created");
        Ok(id)
    }

    pub fn get_session(&self, id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let guard = self.sessions.read().map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    pub fn state(&self, session_id: &SessionId) -> Result<GameStateResponse, SessionError> {
        let session = self.get_session(session_id)?;
        if session.is_expired(self.session_ttl) {
            self.expire_session(session_id, &session)?;
            return Err(SessionError::Expired(session_id.clone()));
        }
        session.touch();
        session.state_snapshot()
    }

    pub fn config(&self, session_id: &SessionId) -> Result<GameConfig, SessionError> {
        let session = self.get_session(session_id)?;
        Ok(session.config())
    }

    pub fn process_action(
        &self,
        session_id: &SessionId,
        action: PlayerAction,
    ) -> Result<GameEvent, SessionError> {
        let session = self.get_session(session_id)?;
        if session.is_expired(self.session_ttl) {
            self.expire_session(session_id, &session)?;
            return Err(SessionError::Expired(session_id.clone()));
        }
        session.touch();

        if session.is_over() {
            return Err(SessionError::InvalidAction("session has ended".to_string()));
        }

        let actor = session
            .current_seat()
            .ok_or_else(|| SessionError::InvalidAction("no current player".to_string()))?;

        session.apply_action(action)?;

        let event = GameEvent::PlayerAction {
            session_id: session_id.clone(),
            player_id: actor,
            action,
        };
        self.event_bus.broadcast(session_id, event.clone());

        self.progress_session(session_id, &session)?;

        Ok(event)
    }

    /// Lets the AI act if it's currently on the clock. No-op otherwise.
    pub fn process_ai_turn_if_needed(&self, session_id: &SessionId) -> Result<(), SessionError> {
        let session = self.get_session(session_id)?;
        self.progress_session(session_id, &session)
    }

    /// Claims the turn-timeout auto-action (check if free, fold otherwise)
    /// for whoever is overdue on the clock.
    pub fn claim_timeout(&self, session_id: &SessionId) -> Result<GameEvent, SessionError> {
        let session = self.get_session(session_id)?;
        let actor = session
            .current_seat()
            .ok_or_else(|| SessionError::InvalidAction("no current player".to_string()))?;
        let action = session.claim_timeout()?;

        let event = GameEvent::PlayerAction {
            session_id: session_id.clone(),
            player_id: actor,
            action,
        };
        self.event_bus.broadcast(session_id, event.clone());
        self.progress_session(session_id, &session)?;
        Ok(event)
    }

    pub fn delete_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        self.remove_session(session_id)
    }

    /// Removes every session whose activity TTL has elapsed.
    pub fn cleanup_expired_sessions(&self) -> Result<usize, SessionError> {
        let stale: Vec<SessionId> = {
            let guard = self.sessions.read().map_err(|_| SessionError::StoragePoisoned)?;
            guard
                .iter()
                .filter(|(_, session)| session.is_expired(self.session_ttl))
                .map(|(id, _)| id.clone())
                .collect()
        };

        for id in &stale {
            self.remove_session(id)?;
        }
        Ok(stale.len())
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.sessions
            .read()
            .map(|guard| guard.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Drives the session forward: plays out AI turns and hand-to-hand
    /// transitions until a human decision point is reached or the session
    /// has ended.
    fn progress_session(&self, session_id: &SessionId, session: &Arc<GameSession>) -> Result<(), SessionError> {
        loop {
            if session.hand_is_complete() {
                self.finalize_hand(session_id, session)?;
                if session.is_over() {
                    return Ok(());
                }
                continue;
            }

            let Some(seat) = session.current_seat() else {
                return Ok(());
            };
            if !session.is_ai_seat(seat) {
                return Ok(());
            }

            let action = session
                .ai_action(seat)
                .ok_or_else(|| SessionError::EngineError("AI failed to produce an action".to_string()))?;
            session.apply_action(action)?;

            self.event_bus.broadcast(
                session_id,
                GameEvent::PlayerAction {
                    session_id: session_id.clone(),
                    player_id: seat,
                    action,
                },
            );
        }
    }

    fn finalize_hand(&self, session_id: &SessionId, session: &Arc<GameSession>) -> Result<(), SessionError> {
        let (result, record) = session.conclude_hand()?;

        self.event_bus.broadcast(
            session_id,
            GameEvent::HandCompleted {
                session_id: session_id.clone(),
                result,
            },
        );

        if let Some(history) = &self.history_store {
            history
                .add_hand(record)
                .map_err(|e| SessionError::EngineError(e.to_string()))?;
        }

        match session.match_winner()? {
            Some(winner) => {
                session.mark_completed(Some(winner))?;
                self.event_bus.broadcast(
                    session_id,
                    GameEvent::GameEnded {
                        session_id: session_id.clone(),
                        winner: Some(winner),
                        reason: "stack_depleted".to_string(),
                    },
                );
            }
            None => {
                let hand = session.start_new_hand()?;
                self.broadcast_hand_started(session_id, &hand);
            }
        }

        Ok(())
    }

    fn broadcast_hand_started(&self, session_id: &SessionId, hand: &HandMetadata) {
        self.event_bus.broadcast(
            session_id,
            GameEvent::HandStarted {
                session_id: session_id.clone(),
                hand_id: hand.hand_id.clone(),
                button_player: hand.button_player,
            },
        );
        for (player_id, cards) in &hand.player_cards {
            self.event_bus.broadcast(
                session_id,
                GameEvent::CardsDealt {
                    session_id: session_id.clone(),
                    player_id: *player_id,
                    cards: cards.clone(),
                },
            );
        }
    }

    fn expire_session(&self, session_id: &SessionId, session: &Arc<GameSession>) -> Result<(), SessionError> {
        self.event_bus.broadcast(
            session_id,
            GameEvent::Error {
                session_id: session_id.clone(),
                message: "session expired due to inactivity".to_string(),
            },
        );
        let _ = session;
        self.remove_session(session_id)
    }

    fn remove_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        let removed = {
            let mut guard = self.sessions.write().map_err(|_| SessionError::StoragePoisoned)?;
            guard.remove(session_id)
        };
        if removed.is_none() {
            return Err(SessionError::NotFound(session_id.clone()));
        }
        self.event_bus.drop_session(session_id);
        Ok(())
    }
}

/// A single practice-table game: a persistent two-seat table whose
/// [`GameState`] is replaced hand-over-hand while stacks and the button
/// carry forward.
pub struct GameSession {
    id: SessionId,
    config: GameConfig,
    seats: Mutex<Vec<SeatedPlayer>>,
    state: Mutex<Option<GameState>>,
    prev_dealer_seat: Mutex<Option<usize>>,
    hand_number: Mutex<u64>,
    hand_id: Mutex<String>,
    session_state: Mutex<GameSessionState>,
    created_at: Instant,
    last_active: Mutex<Instant>,
    ai: Option<Box<dyn AIOpponent>>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("has_ai", &self.ai.is_some())
            .finish()
    }
}

impl GameSession {
    fn new(id: SessionId, config: GameConfig) -> Self {
        let seed = config.seed.unwrap_or(0);
        let ai = match &config.opponent_type {
            OpponentType::AI(name) => Some(create_ai(name, seed)),
            OpponentType::Human => None,
        };
        let seats = vec![
            SeatedPlayer::new(1, HUMAN_SEAT, STARTING_STACK),
            SeatedPlayer::new(2, AI_SEAT, STARTING_STACK),
        ];

        let now = Instant::now();
        Self {
            id,
            config,
            seats: Mutex::new(seats),
            state: Mutex::new(None),
            prev_dealer_seat: Mutex::new(None),
            hand_number: Mutex::new(0),
            hand_id: Mutex::new(String::new()),
            session_state: Mutex::new(GameSessionState::WaitingForPlayers),
            created_at: now,
            last_active: Mutex::new(now),
            ai,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config.clone()
    }

    pub fn touch(&self) {
        if let Ok(mut last_active) = self.last_active.lock() {
            *last_active = Instant::now();
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        let last_active = self
            .last_active
            .lock()
            .map(|g| *g)
            .unwrap_or(self.created_at);
        last_active.elapsed() > ttl
    }

    fn is_ai_seat(&self, seat: usize) -> bool {
        seat == AI_SEAT && self.ai.is_some()
    }

    fn is_over(&self) -> bool {
        self.session_state
            .lock()
            .map(|s| matches!(*s, GameSessionState::Completed { .. }))
            .unwrap_or(false)
    }

    fn mark_completed(&self, winner: Option<usize>) -> Result<(), SessionError> {
        *self
            .session_state
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)? = GameSessionState::Completed { winner };
        Ok(())
    }

    fn hand_is_complete(&self) -> bool {
        self.state
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.is_hand_complete))
            .unwrap_or(false)
    }

    fn current_seat(&self) -> Option<usize> {
        self.state.lock().ok()?.as_ref()?.current_player_index
    }

    fn current_hand_id(&self) -> String {
        self.hand_id.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn ai_action(&self, seat: usize) -> Option<PlayerAction> {
        let ai = self.ai.as_ref()?;
        let guard = self.state.lock().ok()?;
        let state = guard.as_ref()?;
        Some(ai.decide(state, seat))
    }

    fn apply_action(&self, action: PlayerAction) -> Result<(), SessionError> {
        let mut guard = self.state.lock().map_err(|_| SessionError::StoragePoisoned)?;
        let state = guard
            .as_mut()
            .ok_or_else(|| SessionError::InvalidAction("no hand in progress".to_string()))?;
        let idx = state
            .current_player_index
            .ok_or_else(|| SessionError::InvalidAction("no current player".to_string()))?;
        let player_id = state.players[idx].id;
        engine::process_action(state, player_id, action, now_ms()).map_err(map_game_error)
    }

    fn claim_timeout(&self) -> Result<PlayerAction, SessionError> {
        let mut guard = self.state.lock().map_err(|_| SessionError::StoragePoisoned)?;
        let state = guard
            .as_mut()
            .ok_or_else(|| SessionError::InvalidAction("no hand in progress".to_string()))?;
        let idx = state
            .current_player_index
            .ok_or_else(|| SessionError::InvalidAction("no current player".to_string()))?;
        let to_call = state.current_bet.saturating_sub(state.players[idx].current_bet);
        let action = if to_call == 0 { PlayerAction::Check } else { PlayerAction::Fold };
        engine::apply_timeout(state, now_ms()).map_err(map_game_error)?;
        Ok(action)
    }

    /// Starts the next hand: rotates the button, deals fresh hole cards,
    /// posts blinds, and returns what the manager needs to broadcast it.
    fn start_new_hand(&self) -> Result<HandMetadata, SessionError> {
        let seats = self
            .seats
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?
            .clone();
        let mut hand_number = self.hand_number.lock().map_err(|_| SessionError::StoragePoisoned)?;
        *hand_number += 1;
        let prev_dealer = *self
            .prev_dealer_seat
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        let (small_blind, big_blind) = blinds_for_level(self.config.level);

        let mut new_state = GameState::create(
            1,
            *hand_number,
            &seats,
            prev_dealer,
            small_blind,
            big_blind,
            TURN_TIMEOUT_MS,
            MAX_SEATS,
        )
        .map_err(map_game_error)?;

        let deck = match self.config.seed {
            Some(seed) => Deck::new_with_seed(seed.wrapping_add(*hand_number)),
            None => Deck::new_seeded_from_os_rng(),
        };
        engine::start_hand(&mut new_state, deck, now_ms()).map_err(map_game_error)?;

        *self
            .prev_dealer_seat
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)? = new_state.dealer_seat();

        let hand_id = format!("{}-{}", self.id, *hand_number);
        *self.hand_id.lock().map_err(|_| SessionError::StoragePoisoned)? = hand_id.clone();

        let button_player = new_state.dealer_index.unwrap_or(HUMAN_SEAT);
        let player_cards: Vec<(usize, Option<Vec<Card>>)> = new_state
            .players
            .iter()
            .enumerate()
            .map(|(idx, player)| {
                let cards: Vec<Card> = player.hole.into_iter().flatten().collect();
                let cards = if idx == HUMAN_SEAT && !cards.is_empty() { Some(cards) } else { None };
                (idx, cards)
            })
            .collect();

        *self.state.lock().map_err(|_| SessionError::StoragePoisoned)? = Some(new_state);
        *self
            .session_state
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)? = GameSessionState::InProgress;

        self.touch();

        Ok(HandMetadata {
            hand_id,
            button_player,
            player_cards,
        })
    }

    /// Called once a hand has reached `is_hand_complete`: persists the
    /// resulting stacks back onto the table and builds the loggable record.
    fn conclude_hand(&self) -> Result<(HandResult, HandRecord), SessionError> {
        let guard = self.state.lock().map_err(|_| SessionError::StoragePoisoned)?;
        let state = guard
            .as_ref()
            .ok_or_else(|| SessionError::InvalidAction("no hand in progress".to_string()))?;

        let pot: u32 = state.pots.iter().map(|p| p.amount).sum();
        let mut winner_seats: Vec<usize> = state
            .winners
            .iter()
            .filter_map(|w| state.index_of(w.player_id))
            .collect();
        winner_seats.sort_unstable();
        winner_seats.dedup();

        let showdown = if state.unfolded_count() > 1 {
            Some(ShowdownInfo {
                winners: state.winners.iter().map(|w| w.player_id).collect(),
                notes: None,
            })
        } else {
            None
        };

        let record = HandRecord {
            hand_id: self.current_hand_id(),
            seed: state.deck_seed,
            actions: state.action_log.clone(),
            board: state.community_cards.clone(),
            result: Some(format!("seats {:?} won {} chips", winner_seats, pot)),
            ts: Some(chrono::Utc::now().to_rfc3339()),
            meta: None,
            showdown,
        };

        let mut seats = self.seats.lock().map_err(|_| SessionError::StoragePoisoned)?;
        for seated in seats.iter_mut() {
            if let Some(hand_player) = state.player_by_id(seated.player_id) {
                seated.stack = hand_player.stack;
            }
        }

        Ok((
            HandResult {
                winner_ids: winner_seats,
                pot,
            },
            record,
        ))
    }

    /// `Some(winner_seat)` once a seat has busted, ending the match.
    fn match_winner(&self) -> Result<Option<usize>, SessionError> {
        let seats = self.seats.lock().map_err(|_| SessionError::StoragePoisoned)?;
        Ok(seats
            .iter()
            .find(|s| s.stack == 0)
            .and(seats.iter().find(|s| s.stack > 0))
            .map(|s| s.seat))
    }

    fn snapshot_player_infos(&self) -> Result<Vec<PlayerInfo>, SessionError> {
        let guard = self.state.lock().map_err(|_| SessionError::StoragePoisoned)?;
        let state = guard
            .as_ref()
            .ok_or_else(|| SessionError::InvalidAction("no hand in progress".to_string()))?;
        Ok(state
            .players
            .iter()
            .enumerate()
            .map(|(idx, player)| PlayerInfo {
                id: idx,
                stack: player.stack,
                position: SeatPosition::for_seat(state, idx),
                is_human: idx == HUMAN_SEAT,
            })
            .collect())
    }

    fn state_snapshot(&self) -> Result<GameStateResponse, SessionError> {
        let guard = self.state.lock().map_err(|_| SessionError::StoragePoisoned)?;
        let is_completed = self.is_over();

        let Some(state) = guard.as_ref() else {
            return Ok(GameStateResponse {
                session_id: self.id.clone(),
                players: Vec::new(),
                board: Vec::new(),
                pot: 0,
                current_player: None,
                available_actions: Vec::new(),
                hand_id: None,
                street: None,
            });
        };

        let players = state
            .players
            .iter()
            .enumerate()
            .map(|(idx, player)| {
                let hole_cards = if idx == HUMAN_SEAT {
                    let cards: Vec<Card> = player.hole.into_iter().flatten().collect();
                    if cards.is_empty() { None } else { Some(cards) }
                } else {
                    None
                };
                let last_action = state
                    .action_log
                    .iter()
                    .rev()
                    .find(|a| a.player_id == player.id)
                    .map(|a| a.action);
                PlayerStateResponse {
                    id: idx,
                    stack: player.stack,
                    position: SeatPosition::for_seat(state, idx),
                    hole_cards,
                    is_active: state.current_player_index == Some(idx),
                    last_action,
                }
            })
            .collect();

        let available_actions = if state.current_player_index.is_some() && !state.is_hand_complete {
            rules::valid_actions(state)
                .map(|va| available_actions_from(&va))
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(GameStateResponse {
            session_id: self.id.clone(),
            players,
            board: state.community_cards.clone(),
            pot: state.pot_total(),
            current_player: state.current_player_index,
            available_actions,
            hand_id: if is_completed { None } else { Some(self.current_hand_id()) },
            street: phase_to_street(state.phase),
        })
    }

    #[cfg(test)]
    fn force_last_active(&self, when: Instant) {
        if let Ok(mut last_active) = self.last_active.lock() {
            *last_active = when;
        }
    }
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub level: u8,
    pub opponent_type: OpponentType,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            level: 1,
            opponent_type: OpponentType::AI("baseline".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentType {
    Human,
    AI(String),
}

impl OpponentType {
    fn as_str(&self) -> Cow<'_, str> {
        match self {
            OpponentType::Human => Cow::Borrowed("human"),
            OpponentType::AI(name) => {
                let mut value = String::with_capacity(3 + name.len());
                value.push_str("ai:");
                value.push_str(name);
                Cow::Owned(value)
            }
        }
    }
}

impl Serialize for OpponentType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for OpponentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.eq_ignore_ascii_case("human") {
            return Ok(OpponentType::Human);
        }

        if let Some(rest) = raw.strip_prefix("ai:") {
            if rest.is_empty() {
                return Ok(OpponentType::AI("baseline".into()));
            }
            return Ok(OpponentType::AI(rest.to_string()));
        }

        Err(serde::de::Error::custom(format!(
            "invalid opponent type: {raw}"
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStateResponse {
    pub id: usize,
    pub stack: u32,
    pub position: SeatPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_cards: Option<Vec<Card>>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<PlayerAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateResponse {
    pub session_id: SessionId,
    pub players: Vec<PlayerStateResponse>,
    pub board: Vec<Card>,
    pub pot: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<usize>,
    pub available_actions: Vec<AvailableAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<Street>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameSessionState {
    WaitingForPlayers,
    InProgress,
    HandInProgress {
        hand_id: String,
        current_player: usize,
        street: Street,
    },
    Completed {
        winner: Option<usize>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Game engine error: {0}")]
    EngineError(String),
    #[error("Session expired: {0}")]
    Expired(SessionId),
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

impl crate::errors::IntoErrorResponse for SessionError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            SessionError::EngineError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::InvalidAction(_) => "invalid_action",
            SessionError::EngineError(_) => "engine_error",
            SessionError::StoragePoisoned => "session_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::NotFound(id) => Some(serde_json::json!({
                "session_id": id
            })),
            SessionError::Expired(id) => Some(serde_json::json!({
                "session_id": id,
                "reason": "Session expired due to inactivity"
            })),
            _ => None,
        }
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            SessionError::StoragePoisoned => ErrorSeverity::Critical,
            SessionError::EngineError(_) => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}
