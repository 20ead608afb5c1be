// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - NODE
//
// Main entry point for the flo-node binary.
// Seeds the demo ledger, starts the midnight payout task and serves the
// REST API plus static front-end files until Ctrl+C / SIGTERM.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use flo_core::{shared, Ledger};
use flo_node::{routes, DailyPayoutScheduler, FloMetrics, NodeConfig};
use log::{error, info};
use tokio::sync::watch;

/// Resolves on the first SIGTERM / SIGINT (Ctrl+C elsewhere).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("❌ Cannot install SIGTERM handler: {e}. Falling back to Ctrl+C only.");
                let _ = tokio::signal::ctrl_c().await;
                info!("🛑 Ctrl+C received, shutting down gracefully...");
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => info!("🛑 SIGTERM received, shutting down gracefully..."),
            _ = tokio::signal::ctrl_c() => info!("🛑 SIGINT received, shutting down gracefully..."),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("🛑 Ctrl+C received, shutting down gracefully...");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = NodeConfig::parse();

    let ledger = shared(Ledger::with_demo_genesis());
    let metrics = FloMetrics::new()?;

    // Scheduler shares the ledger lock with every request handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = DailyPayoutScheduler::new(ledger.clone(), metrics.clone(), config.daily_payout);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    let api = routes(ledger, metrics, config.static_dir.clone());
    let (addr, server) =
        warp::serve(api).try_bind_with_graceful_shutdown(config.listen_addr(), shutdown_signal())?;

    info!("🚀 FLO node listening on http://{}", addr);
    info!("📂 Serving static files from {}", config.static_dir.display());
    info!("🎁 Midnight payout: {} FLO per registered user", config.daily_payout);

    server.await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        error!("❌ Payout scheduler task failed: {}", e);
    }
    info!("✅ Clean shutdown complete");
    Ok(())
}
