// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - ERROR TAXONOMY
//
// Failures a ledger operation can report. Malformed request bodies are an
// HTTP concern and live in the node crate; everything here is a business rule.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by [`crate::Ledger`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// No credential with this exact username/password pair
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration attempted for a username that already has a credential
    #[error("username '{username}' is already taken")]
    UsernameTaken { username: String },

    /// Sender balance is below the requested amount
    #[error("insufficient funds: available {available} FLO, requested {requested} FLO")]
    InsufficientFunds { available: f64, requested: f64 },

    /// A claim record already exists for (username, date)
    #[error("daily reward already claimed by '{username}' on {date}")]
    AlreadyClaimed { username: String, date: NaiveDate },
}

impl LedgerError {
    /// Short message shown to API clients.
    /// The `Display` text carries details for logs; clients get a stable string.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid credentials",
            Self::UsernameTaken { .. } => "username taken",
            Self::InsufficientFunds { .. } => "insufficient funds",
            Self::AlreadyClaimed { .. } => "already claimed",
        }
    }
}
