//! Bench command handler for hand evaluation performance benchmarking.
//!
//! This module provides the `bench` command which performs a quick benchmark
//! of the hand evaluation system by evaluating 200 unique 7-card hands from
//! a shuffled deck and reporting the execution time.

use crate::error::CliError;
use holdem_engine::cards::Card;
use holdem_engine::deck::Deck;
use std::io::Write;

/// Handle the bench command.
///
/// Performs a quick benchmark by evaluating 200 unique 7-card hands from
/// a shuffled deck using deterministic seed 1 for reproducibility. Reports
/// the number of iterations and total execution time.
///
/// # Arguments
///
/// * `out` - Output stream for benchmark results
///
/// # Returns
///
/// Returns `Ok(())` on success, or `CliError` on I/O errors.
///
/// # Examples
///
/// ```ignore
/// // Internal command handler - not part of public API
/// use holdem_cli::commands::bench::handle_bench_command;
/// let mut out = Vec::new();
/// handle_bench_command(&mut out).unwrap();
/// ```
pub fn handle_bench_command(out: &mut dyn Write) -> Result<(), CliError> {
    // quick bench: evaluate 200 unique 7-card draws from shuffled deck
    let start = std::time::Instant::now();
    let mut cnt = 0u64;
    let mut deck = Deck::new_with_seed(1);
    deck.shuffle();
    for _ in 0..200 {
        if deck.remaining() < 7 {
            deck.shuffle();
        }
        let mut arr: [Card; 7] = [deck.deal_card().unwrap(); 7];
        for item in arr.iter_mut().skip(1) {
            *item = deck.deal_card().unwrap();
        }
        // Result intentionally unused - benchmark only measures performance
        let _ = holdem_engine::hand::evaluate_hand(&arr);
        cnt += 1;
    }
    let dur = start.elapsed();
    writeln!(out, "Benchmark: {} iters in {:?}", cnt, dur)?;
    Ok(())
}
