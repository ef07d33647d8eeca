use holdem_engine::logger::HandRecord;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Hand history storage and retrieval system
#[derive(Debug)]
pub struct HistoryStore {
    hands: RwLock<Vec<HandRecord>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            hands: RwLock::new(Vec::new()),
        }
    }

    /// Add a hand record to the history
    pub fn add_hand(&self, record: HandRecord) -> Result<(), HistoryError> {
        let mut hands = self
            .hands
            .write()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        hands.push(record);
        Ok(())
    }

    /// Get recent hands with optional limit
    pub fn get_recent_hands(&self, limit: Option<usize>) -> Result<Vec<HandRecord>, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        let limit = limit.unwrap_or(100);
        Ok(hands.iter().rev().take(limit).cloned().collect())
    }

    /// Get a specific hand by ID
    pub fn get_hand(&self, hand_id: &str) -> Result<Option<HandRecord>, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(hands.iter().find(|h| h.hand_id == hand_id).cloned())
    }

    /// Filter hands by criteria
    pub fn filter_hands(&self, filter: HandFilter) -> Result<Vec<HandRecord>, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        let filtered: Vec<HandRecord> = hands
            .iter()
            .filter(|h| filter.matches(h))
            .cloned()
            .collect();
        Ok(filtered)
    }

    /// Calculate statistics from stored hands
    pub fn calculate_stats(&self) -> Result<HandStatistics, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;

        if hands.is_empty() {
            return Ok(HandStatistics::default());
        }

        let total_hands = hands.len();
        let mut wins = 0;
        let mut total_pot = 0;

        for hand in hands.iter() {
            // Count wins (simplified - check if result indicates player 0 wins)
            if let Some(result) = &hand.result {
                if result.contains("player 0 wins") {
                    wins += 1;
                }
            }

            // Estimate pot size from actions (simplified)
            total_pot += estimate_pot_size(hand);
        }

        let win_rate = (wins as f64 / total_hands as f64) * 100.0;
        let avg_pot = total_pot as f64 / total_hands as f64;

        Ok(HandStatistics {
            total_hands,
            wins,
            win_rate,
            avg_pot_size: avg_pot,
        })
    }

    /// Get the total number of hands
    pub fn total_hands(&self) -> Result<usize, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(hands.len())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter criteria for hand history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>, // "win", "loss", "tie"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl HandFilter {
    fn matches(&self, hand: &HandRecord) -> bool {
        // Filter by result type
        if let Some(result_type) = &self.result_type {
            if let Some(result) = &hand.result {
                if !result.to_lowercase().contains(&result_type.to_lowercase()) {
                    return false;
                }
            } else {
                return false;
            }
        }

        // Filter by date range
        if let (Some(ts), Some(date_from)) = (&hand.ts, &self.date_from) {
            if ts < date_from {
                return false;
            }
        }

        if let (Some(ts), Some(date_to)) = (&hand.ts, &self.date_to) {
            if ts > date_to {
                return false;
            }
        }

        true
    }
}

/// Statistics calculated from hand history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandStatistics {
    pub total_hands: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_pot_size: f64,
}

impl Default for HandStatistics {
    fn default() -> Self {
        Self {
            total_hands: 0,
            wins: 0,
            win_rate: 0.0,
            avg_pot_size: 0.0,
        }
    }
}

/// Estimate pot size from hand record actions (simplified implementation)
fn estimate_pot_size(hand: &HandRecord) -> u32 {
    // For now, return a simple estimate based on number of actions
    // In real implementation, this would parse bet/raise amounts from actions
    (hand.actions.len() as u32) * 50 // Simplified estimation
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History storage poisoned")]
    StoragePoisoned,
    #[error("Hand not found: {0}")]
    NotFound(String),
}

impl crate::errors::IntoErrorResponse for HistoryError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            HistoryError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            HistoryError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            HistoryError::StoragePoisoned => "history_storage_error",
            HistoryError::NotFound(_) => "hand_not_found",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            HistoryError::StoragePoisoned => ErrorSeverity::Critical,
            HistoryError::NotFound(_) => ErrorSeverity::Client,
        }
    }
}
