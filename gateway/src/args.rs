use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the gateway binary.
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Multi-provider LLM gateway")]
pub struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, short = 'c', env = "GATEWAY_CONFIG", default_value = "gateway.toml")]
    pub config: PathBuf,

    /// Log filter string, e.g. `"info"` or `"server=debug,chat=debug"`.
    #[arg(long, env = "GATEWAY_LOG", default_value = "info")]
    pub log_filter: String,

    /// Socket address to listen on. Overrides `server.listen_address` from
    /// the config file when set.
    #[arg(long, env = "GATEWAY_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
}
