// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - NODE LIBRARY
//
// HTTP front door, request handlers, daily payout scheduler, metrics and
// configuration for the flo-node binary.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod api;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod reward_scheduler;

pub use api::routes;
pub use config::NodeConfig;
pub use metrics::FloMetrics;
pub use reward_scheduler::DailyPayoutScheduler;
