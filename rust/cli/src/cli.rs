//! CLI argument definitions.
//!
//! `HoldemCli` is the top-level `clap` parser; `Commands` enumerates every
//! subcommand the binary dispatches in `lib.rs::execute_command`.

use clap::{Parser, Subcommand, ValueEnum};

/// Holdem poker CLI.
#[derive(Debug, Parser)]
#[command(name = "holdem", about = "Holdem Poker CLI", version)]
pub struct HoldemCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Opponent type for the `play` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Vs {
    Ai,
    Human,
}

impl Vs {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vs::Ai => "ai",
            Vs::Human => "human",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the resolved configuration and where each value came from.
    Cfg,

    /// Play interactively against an AI or a second human player.
    Play {
        #[arg(long, value_enum, default_value = "ai")]
        vs: Vs,
        #[arg(long)]
        hands: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=20))]
        level: Option<u8>,
    },

    /// Step through a recorded hand history file.
    Replay {
        #[arg(long)]
        input: String,
        #[arg(long)]
        speed: Option<f64>,
    },

    /// Aggregate statistics from a hand history file.
    Stats {
        #[arg(long)]
        input: String,
    },

    /// Validate a hand history file's integrity.
    Verify {
        #[arg(long)]
        input: Option<String>,
    },

    /// Run environment and dependency diagnostics.
    Doctor,

    /// Evaluate two AI policies against each other.
    Eval {
        #[arg(long)]
        ai_a: String,
        #[arg(long)]
        ai_b: String,
        #[arg(long)]
        hands: u32,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Benchmark raw hand throughput.
    Bench,

    /// Deal and print a single shuffled deck.
    Deal {
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print raw RNG output for a seed.
    Rng {
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run large-scale hand simulations.
    Sim {
        #[arg(long)]
        hands: u64,
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=20))]
        level: Option<u8>,
        #[arg(long)]
        resume: Option<String>,
    },

    /// Convert hand histories to another format (csv, json, sqlite).
    Export {
        #[arg(long)]
        input: String,
        #[arg(long)]
        format: String,
        #[arg(long)]
        output: String,
    },

    /// Split a hand history file into train/val/test sets.
    Dataset {
        #[arg(long)]
        input: String,
        #[arg(long)]
        outdir: String,
        #[arg(long)]
        train: Option<f64>,
        #[arg(long)]
        val: Option<f64>,
        #[arg(long)]
        test: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
}
