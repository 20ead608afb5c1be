// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - METRICS MODULE
//
// Prometheus-compatible metrics for the ledger node.
// Exposes counters and gauges via the /metrics endpoint.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use flo_core::Ledger;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics registry for one node process
pub struct FloMetrics {
    registry: Registry,

    // Ledger state (refreshed from the ledger before export)
    pub accounts_total: IntGauge,
    pub registered_users: IntGauge,
    pub pending_claims: IntGauge,
    pub circulating_flo: Gauge,

    // API metrics
    pub api_requests_total: IntCounter,
    pub api_bad_requests_total: IntCounter,

    // Per-operation outcomes
    pub logins_total: IntCounter,
    pub login_failures_total: IntCounter,
    pub registrations_total: IntCounter,
    pub registration_conflicts_total: IntCounter,
    pub transfers_total: IntCounter,
    pub transfers_rejected_total: IntCounter,
    pub daily_claims_total: IntCounter,
    pub daily_claims_repeated_total: IntCounter,

    // Scheduler
    pub scheduled_payouts_total: IntCounter,
    pub scheduled_payout_credits_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let c = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

fn int_gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, prometheus::Error> {
    let g = IntGauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

impl FloMetrics {
    /// Create a fresh registry with all FLO node metrics
    pub fn new() -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let accounts_total = int_gauge(&registry, "flo_accounts_total", "Accounts with a balance entry")?;
        let registered_users = int_gauge(&registry, "flo_registered_users", "Usernames with a login credential")?;
        let pending_claims = int_gauge(
            &registry,
            "flo_pending_claim_records",
            "Daily claim records not yet cleared by the midnight payout",
        )?;
        let circulating_flo = Gauge::with_opts(Opts::new(
            "flo_circulating_balance",
            "Sum of all account balances in FLO",
        ))?;
        registry.register(Box::new(circulating_flo.clone()))?;

        let api_requests_total = counter(&registry, "flo_api_requests_total", "Total API requests handled")?;
        let api_bad_requests_total = counter(
            &registry,
            "flo_api_bad_requests_total",
            "Requests rejected for a malformed JSON body",
        )?;

        let logins_total = counter(&registry, "flo_logins_total", "Successful logins")?;
        let login_failures_total = counter(&registry, "flo_login_failures_total", "Rejected logins")?;
        let registrations_total = counter(&registry, "flo_registrations_total", "New registrations")?;
        let registration_conflicts_total = counter(
            &registry,
            "flo_registration_conflicts_total",
            "Registrations refused because the username was taken",
        )?;
        let transfers_total = counter(&registry, "flo_transfers_total", "Completed transfers")?;
        let transfers_rejected_total = counter(
            &registry,
            "flo_transfers_rejected_total",
            "Transfers refused for insufficient funds",
        )?;
        let daily_claims_total = counter(&registry, "flo_daily_claims_total", "Daily rewards paid out")?;
        let daily_claims_repeated_total = counter(
            &registry,
            "flo_daily_claims_repeated_total",
            "Daily reward requests for an already-claimed day",
        )?;

        let scheduled_payouts_total = counter(
            &registry,
            "flo_scheduled_payouts_total",
            "Midnight payouts executed",
        )?;
        let scheduled_payout_credits_total = counter(
            &registry,
            "flo_scheduled_payout_credits_total",
            "Individual account credits made by midnight payouts",
        )?;

        Ok(Arc::new(FloMetrics {
            registry,
            accounts_total,
            registered_users,
            pending_claims,
            circulating_flo,
            api_requests_total,
            api_bad_requests_total,
            logins_total,
            login_failures_total,
            registrations_total,
            registration_conflicts_total,
            transfers_total,
            transfers_rejected_total,
            daily_claims_total,
            daily_claims_repeated_total,
            scheduled_payouts_total,
            scheduled_payout_credits_total,
        }))
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Refresh gauges from ledger state. Caller holds the ledger lock.
    pub fn update_ledger_metrics(&self, ledger: &Ledger) {
        self.accounts_total.set(ledger.account_count() as i64);
        self.registered_users.set(ledger.credential_count() as i64);
        self.pending_claims.set(ledger.claim_count() as i64);
        self.circulating_flo.set(ledger.total_balance());
    }
}
