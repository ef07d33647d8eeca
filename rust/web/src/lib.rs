pub mod ai;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod session;
pub mod settings;
pub mod static_handler;
pub mod store;
pub mod table;
pub mod table_events;

pub use ai::{AIOpponent, SuggesterAI, create_ai};
pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use events::{EventBus, GameEvent, PlayerInfo};
pub use history::{HandFilter, HandStatistics, HistoryError, HistoryStore};
pub use logging::{LogEntry, TestLogSubscriber, init_logging, init_test_logging};
pub use metrics::{MetricsCollector, MetricsSnapshot, RequestTimer};
pub use middleware::{RequestMetrics, log_response, with_request_logging};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use session::{
    AvailableAction, GameConfig, GameSessionState, GameStateResponse, OpponentType,
    PlayerStateResponse, SeatPosition, SessionError, SessionId, SessionManager,
};
pub use settings::{AppSettings, SettingsError, SettingsStore};
pub use static_handler::{StaticError, StaticHandler};
pub use store::{ActionOutcome, NewTable, Store, StoreError, TableRow};
pub use table::{PlayerView, TableError, TableManager, TableStateView};
pub use table_events::{TableEvent, TableEventBus};
