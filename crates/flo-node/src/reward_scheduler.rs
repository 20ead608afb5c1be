// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - DAILY PAYOUT SCHEDULER
//
// Background task: sleep until the next local midnight, credit every
// registered user and wipe the claim book under the ledger lock, repeat.
// No "last run" is remembered, so a midnight missed while the process was
// down is never made up. Stops when the shutdown watch flips to true.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::metrics::FloMetrics;
use chrono::{DateTime, Local, TimeZone};
use flo_core::{safe_lock, PayoutSummary, SharedLedger};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Next local 00:00 strictly after `now`.
///
/// If midnight does not exist on that day (DST gap), the first valid local
/// instant within the following two hours is used instead.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    if let Some(midnight) = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
    {
        for offset_minutes in (0..=120).step_by(15) {
            let candidate = midnight + chrono::Duration::minutes(offset_minutes);
            if let Some(t) = tz.from_local_datetime(&candidate).earliest() {
                return t;
            }
        }
    }
    warn!("⚠️ Could not resolve next local midnight, falling back to +24h");
    now.clone() + chrono::Duration::days(1)
}

/// Next payout target. Never at or before the last midnight already paid,
/// even if the wall clock has been stepped back since.
pub fn next_payout_after<Tz: TimeZone>(
    now: &DateTime<Tz>,
    last_fired: Option<&DateTime<Tz>>,
) -> DateTime<Tz> {
    match last_fired {
        Some(last) if last > now => next_midnight(last),
        _ => next_midnight(now),
    }
}

/// Decides how long the scheduler sleeps before each payout.
pub trait PayoutClock {
    fn next_delay(&mut self) -> Duration;

    /// Called once after every payout.
    fn fired(&mut self) {}
}

impl<F: FnMut() -> Duration> PayoutClock for F {
    fn next_delay(&mut self) -> Duration {
        self()
    }
}

/// Sleeps until local midnight, remembering the last midnight paid.
#[derive(Debug, Default)]
pub struct LocalMidnight {
    pending: Option<DateTime<Local>>,
    last_fired: Option<DateTime<Local>>,
}

impl LocalMidnight {
    pub fn last_fired(&self) -> Option<&DateTime<Local>> {
        self.last_fired.as_ref()
    }

    fn delay_from(&mut self, now: DateTime<Local>) -> Duration {
        let next = next_payout_after(&now, self.last_fired.as_ref());
        info!(
            "⏰ Next daily payout at {}",
            next.format("%Y-%m-%d %H:%M:%S")
        );
        let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
        self.pending = Some(next);
        delay
    }
}

impl PayoutClock for LocalMidnight {
    fn next_delay(&mut self) -> Duration {
        self.delay_from(Local::now())
    }

    fn fired(&mut self) {
        if let Some(target) = self.pending.take() {
            self.last_fired = Some(target);
        }
    }
}

enum Wake {
    Due,
    Signal,
    Closed,
}

/// Credits `amount` FLO to every registered user once per day.
#[derive(Clone)]
pub struct DailyPayoutScheduler {
    ledger: SharedLedger,
    metrics: Arc<FloMetrics>,
    amount: f64,
}

impl DailyPayoutScheduler {
    pub fn new(ledger: SharedLedger, metrics: Arc<FloMetrics>, amount: f64) -> Self {
        Self {
            ledger,
            metrics,
            amount,
        }
    }

    /// One payout, under the ledger lock.
    pub fn fire(&self) -> PayoutSummary {
        let summary = safe_lock(&self.ledger).credit_all_and_reset_claims(self.amount);
        self.metrics.scheduled_payouts_total.inc();
        self.metrics
            .scheduled_payout_credits_total
            .inc_by(summary.users_credited as u64);
        info!(
            "🎉 Daily payout: +{} FLO to {} registered user(s), {} claim record(s) cleared",
            self.amount, summary.users_credited, summary.claims_cleared
        );
        summary
    }

    /// Run until shutdown, firing at every local midnight.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        self.run_with(shutdown, LocalMidnight::default()).await
    }

    /// Run until shutdown, asking `clock` how long to sleep before each payout.
    pub async fn run_with<C: PayoutClock>(self, mut shutdown: watch::Receiver<bool>, mut clock: C) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            let delay = clock.next_delay();

            let wake = tokio::select! {
                _ = tokio::time::sleep(delay) => Wake::Due,
                changed = shutdown.changed() => {
                    if changed.is_err() { Wake::Closed } else { Wake::Signal }
                }
            };

            match wake {
                Wake::Due => {
                    self.fire();
                    clock.fired();
                }
                // Re-checked at the top of the loop; a false value just reschedules
                Wake::Signal => {}
                Wake::Closed => break,
            }
        }
        info!("🛑 Daily payout scheduler stopped");
    }
}
