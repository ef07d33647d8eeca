pub mod game;
pub mod health;
pub mod history;
pub mod settings;
pub mod sse;
pub mod table;

pub use game::{
    CreateSessionRequest, PlayerActionRequest, SessionResponse, create_session, delete_session,
    get_session, get_session_state, lobby, render_game_state, submit_action,
};
pub use health::health;
pub use history::{filter_hands, get_hand_by_id, get_recent_hands, get_statistics};
pub use settings::{
    UpdateFieldRequest, UpdateSettingsRequest, get_settings, reset_settings, update_field,
    update_settings,
};
pub use sse::stream_events;
