// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - NODE CONFIGURATION
//
// Command line flags, each with an environment variable fallback. Both are
// optional: a bare `flo-node` with nothing set runs the classic setup of
// port 8080, static files from the working directory and a 100 FLO
// midnight payout.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use flo_core::DAILY_PAYOUT_FLO;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_API_PORT: u16 = 8080;

#[derive(Parser, Debug, Clone)]
#[command(name = "flo-node")]
#[command(about = "Floran ledger node - balances, transfers and daily FLO rewards", long_about = None)]
#[command(version)]
pub struct NodeConfig {
    /// HTTP port for the REST API and static files
    #[arg(short, long, env = "FLO_API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub port: u16,

    /// Address to bind (0.0.0.0 = all interfaces)
    #[arg(long = "bind", env = "FLO_BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Directory served for any path that is not an API route
    #[arg(long, env = "FLO_STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,

    /// FLO credited to every registered user at local midnight
    #[arg(long, env = "FLO_DAILY_PAYOUT", default_value_t = DAILY_PAYOUT_FLO)]
    pub daily_payout: f64,
}

impl NodeConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_API_PORT,
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            static_dir: PathBuf::from("."),
            daily_payout: DAILY_PAYOUT_FLO,
        }
    }
}
