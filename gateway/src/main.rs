mod args;

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use server::ServeConfig;
use tokio_util::sync::CancellationToken;

use args::Args;

/// Fallback bind address when neither `--listen-address` nor
/// `server.listen_address` in the config file is set.
const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    server::init_logger(&args.log_filter);

    if let Err(err) = run(args).await {
        log::error!(err:?; "gateway exited with a fatal error");
        fastrace::flush();
        return Err(err);
    }

    fastrace::flush();
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = config::Config::load(&args.config).with_context(|| format!("failed to load config from {}", args.config.display()))?;

    let listen_address = args
        .listen_address
        .or(config.server.listen_address)
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.parse::<SocketAddr>().expect("default listen address is valid"));

    let shutdown_signal = CancellationToken::new();
    let shutdown_task = {
        let shutdown_signal = shutdown_signal.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown_signal.cancel();
            }
        })
    };

    let version = env!("CARGO_PKG_VERSION").to_string();

    let result = server::serve(ServeConfig { listen_address, config, shutdown_signal, log_filter: args.log_filter, version, bound_addr_sender: None }).await;

    shutdown_task.abort();

    result
}
