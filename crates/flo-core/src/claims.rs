// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - DAILY CLAIM BOOK
//
// Tracks which user has taken the daily reward on which calendar date.
// Keyed by (username, date). The midnight payout wipes the whole book,
// including entries for dates other than today.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// Display format for claim timestamps
pub const CLAIM_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker that a user already received the daily reward for a date.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    pub claimed_at: NaiveDateTime,
}

impl ClaimRecord {
    pub fn formatted(&self) -> String {
        self.claimed_at.format(CLAIM_TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaimBook {
    records: HashMap<(String, NaiveDate), ClaimRecord>,
}

impl ClaimBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, username: &str, date: NaiveDate) -> Option<&ClaimRecord> {
        self.records.get(&(username.to_string(), date))
    }

    /// Record a claim. Returns false if one already existed (left untouched).
    pub fn record(&mut self, username: &str, date: NaiveDate, claimed_at: NaiveDateTime) -> bool {
        let key = (username.to_string(), date);
        if self.records.contains_key(&key) {
            return false;
        }
        self.records.insert(key, ClaimRecord { claimed_at });
        true
    }

    /// Remove every record regardless of date. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.records.len();
        self.records.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
