// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - DEMO GENESIS
//
// State every process starts from: ten demo balances (no credentials)
// and a single admin credential (no balance).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::Ledger;

/// Pre-seeded demo balances in FLO
pub const DEMO_BALANCES: [(&str, f64); 10] = [
    ("user1", 1250.0),
    ("user2", 980.0),
    ("user3", 2100.0),
    ("user4", 550.0),
    ("user5", 1800.0),
    ("user6", 320.0),
    ("user7", 2500.0),
    ("user8", 780.0),
    ("user9", 1450.0),
    ("user10", 420.0),
];

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "123456";

impl Ledger {
    /// Ledger seeded with the demo accounts and the admin credential.
    pub fn with_demo_genesis() -> Self {
        let mut ledger = Ledger::new();
        for (user, balance) in DEMO_BALANCES {
            ledger.balances.insert(user.to_string(), balance);
        }
        ledger
            .credentials
            .insert(ADMIN_USERNAME.to_string(), ADMIN_PASSWORD.to_string());
        log::debug!(
            "Demo genesis: {} accounts, {} credential(s)",
            ledger.account_count(),
            ledger.credential_count()
        );
        ledger
    }
}
