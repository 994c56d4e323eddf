use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::time::Duration;

use remix_guard::engine::GuardConfig;
use remix_guard::server::RemixGuardServer;

/// remix-guard: guarded browser test actions over MCP
#[derive(Parser)]
#[command(name = "remix-guard", version, about)]
struct Cli {
    /// Run Chrome with a visible window (default: headless)
    #[arg(long)]
    headed: bool,

    /// Seconds each implicit wait may take before an action fails
    #[arg(long, default_value_t = 5.0)]
    timeout_secs: f64,

    /// Milliseconds between two samples of a condition (0 = busy polling)
    #[arg(long, default_value_t = 100)]
    poll_interval_ms: u64,
}

impl Cli {
    fn guard_config(&self) -> anyhow::Result<GuardConfig> {
        let default_timeout = Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|_| anyhow::anyhow!("--timeout-secs must be a non-negative number"))?;
        Ok(GuardConfig {
            default_timeout,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr only; stdout is the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let headless = !cli.headed;
    let config = cli.guard_config()?;

    tracing::info!(
        "Starting remix-guard MCP server (headless: {}, timeout: {:?}, poll interval: {:?})",
        headless,
        config.default_timeout,
        config.poll_interval
    );

    let server = RemixGuardServer::new(headless, config);
    let service = server.clone().serve(stdio()).await?;

    tokio::select! {
        result = service.waiting() => { result?; }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal, shutting down");
        }
    }

    server.shutdown().await;

    let failures = server.outcomes().failures().await;
    tracing::info!("remix-guard MCP server shut down ({} failed actions)", failures);
    Ok(())
}
