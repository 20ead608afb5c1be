// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - CORE MODULE
//
// In-memory ledger: per-user balances, login credentials and the daily
// reward claim book. One Ledger value sits behind one Mutex for the whole
// process; every operation here assumes the caller already holds that lock.
// Amounts are f64 FLO. Sign and existence of accounts are NOT validated.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub mod claims;
pub mod error;
pub mod genesis;

pub use claims::{ClaimBook, ClaimRecord, CLAIM_TIMESTAMP_FORMAT};
pub use error::LedgerError;

/// Balance given to every freshly registered user
pub const INITIAL_BALANCE_FLO: f64 = 1000.0;
/// Credited by a successful daily claim
pub const DAILY_REWARD_FLO: f64 = 100.0;
/// Credited to every registered user by the midnight payout
pub const DAILY_PAYOUT_FLO: f64 = 100.0;

/// Process-wide ledger handle. The single coarse lock: every read and
/// write of every collection goes through it.
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// Safe mutex lock that recovers from poisoned state instead of panicking.
/// A handler that panicked mid-operation must not take down every later request.
pub fn safe_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("⚠️ Ledger mutex was poisoned, recovering...");
            poisoned.into_inner()
        }
    }
}

/// Wrap a ledger in the shared handle.
pub fn shared(ledger: Ledger) -> SharedLedger {
    Arc::new(Mutex::new(ledger))
}

/// One row of the asset listing.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub user_id: String,
    pub balance: f64,
}

/// What a successful login returns. The password is never echoed back.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub balance: f64,
}

/// Outcome of the midnight payout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutSummary {
    pub users_credited: usize,
    pub claims_cleared: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// userId → balance. BTreeMap for a stable listing order.
    balances: BTreeMap<String, f64>,
    /// username → plaintext password
    credentials: BTreeMap<String, String>,
    daily_claims: ClaimBook,
}

impl Ledger {
    /// Empty ledger. See [`Ledger::with_demo_genesis`] for the startup state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known account with its balance.
    pub fn list_assets(&self) -> Vec<Asset> {
        self.balances
            .iter()
            .map(|(user_id, balance)| Asset {
                user_id: user_id.clone(),
                balance: *balance,
            })
            .collect()
    }

    /// Exact match on username and password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserProfile, LedgerError> {
        match self.credentials.get(username) {
            Some(stored) if stored == password => Ok(UserProfile {
                username: username.to_string(),
                balance: self.balance_of(username),
            }),
            _ => Err(LedgerError::InvalidCredentials),
        }
    }

    /// Create a credential and (re)set the account to the starting balance.
    ///
    /// Only the credential map decides whether a name is taken: a seeded demo
    /// account without a credential can be registered, and its balance is
    /// reset to [`INITIAL_BALANCE_FLO`].
    pub fn register(&mut self, username: &str, password: &str) -> Result<(), LedgerError> {
        if self.credentials.contains_key(username) {
            return Err(LedgerError::UsernameTaken {
                username: username.to_string(),
            });
        }
        self.credentials
            .insert(username.to_string(), password.to_string());
        self.balances
            .insert(username.to_string(), INITIAL_BALANCE_FLO);
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Known edge behavior, kept on purpose:
    /// - negative amounts pass the funds check and credit the sender
    /// - `from == to` succeeds with no net change
    /// - unknown accounts read as 0.0 and are created on success
    pub fn transfer(&mut self, from: &str, to: &str, amount: f64) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                available,
                requested: amount,
            });
        }
        *self.balances.entry(from.to_string()).or_insert(0.0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0.0) += amount;
        Ok(())
    }

    /// Credit [`DAILY_REWARD_FLO`] once per (username, today). Returns the new balance.
    /// The account is created if it does not exist yet.
    pub fn claim_daily_reward(&mut self, username: &str, today: NaiveDate) -> Result<f64, LedgerError> {
        if !self
            .daily_claims
            .record(username, today, Local::now().naive_local())
        {
            return Err(LedgerError::AlreadyClaimed {
                username: username.to_string(),
                date: today,
            });
        }
        let balance = self.balances.entry(username.to_string()).or_insert(0.0);
        *balance += DAILY_REWARD_FLO;
        Ok(*balance)
    }

    /// Credit every user that has a credential, then wipe the claim book.
    ///
    /// Seeded demo accounts have no credential and are skipped.
    pub fn credit_all_and_reset_claims(&mut self, amount: f64) -> PayoutSummary {
        let mut users_credited = 0;
        for username in self.credentials.keys() {
            *self.balances.entry(username.clone()).or_insert(0.0) += amount;
            users_credited += 1;
        }
        let claims_cleared = self.daily_claims.clear();
        PayoutSummary {
            users_credited,
            claims_cleared,
        }
    }

    /// Balance of an account, 0.0 if it was never written.
    pub fn balance_of(&self, user_id: &str) -> f64 {
        self.balances.get(user_id).copied().unwrap_or(0.0)
    }

    /// True once any operation has written a balance for `user_id`.
    pub fn has_account(&self, user_id: &str) -> bool {
        self.balances.contains_key(user_id)
    }

    pub fn has_credential(&self, username: &str) -> bool {
        self.credentials.contains_key(username)
    }

    pub fn claim_record(&self, username: &str, date: NaiveDate) -> Option<&ClaimRecord> {
        self.daily_claims.get(username, date)
    }

    pub fn claim_count(&self) -> usize {
        self.daily_claims.len()
    }

    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// Sum of all balances (FLO in circulation)
    pub fn total_balance(&self) -> f64 {
        self.balances.values().sum()
    }
}
