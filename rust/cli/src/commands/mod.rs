//! Command handler modules for Holdem CLI.
//!
//! This module contains individual handler functions for each CLI subcommand.
//! Each command is implemented in its own module file with a consistent pattern:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Module-private helpers: Helper functions specific to that command
//! - Dependency injection: Output streams (`&mut dyn Write`) passed as parameters
//! - Error propagation: All errors propagated via `CliError` enum
//!
//! # Organization
//!
//! Commands are organized by complexity:
//! - **Simple commands**: cfg, doctor, rng, deal, bench
//! - **Moderate commands**: play, stats, eval, export
//! - **Complex commands**: replay, verify, sim, dataset

mod bench;
mod cfg;
mod dataset;
mod deal;
mod doctor;
mod eval;
mod export;
mod play;
mod replay;
mod rng;
mod sim;
mod stats;
mod verify;

pub use bench::handle_bench_command;
pub use cfg::handle_cfg_command;
pub use dataset::handle_dataset_command;
pub use deal::handle_deal_command;
pub use doctor::handle_doctor_command;
pub use eval::handle_eval_command;
pub use export::handle_export_command;
pub use play::handle_play_command;
pub use replay::handle_replay_command;
pub use rng::handle_rng_command;
pub use sim::handle_sim_command;
pub use stats::handle_stats_command;
pub use verify::handle_verify_command;
