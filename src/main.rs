use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use credit_risk_api::common::config::AppCfg;
use credit_risk_api::{router, AppState, ModelState};

#[derive(Parser)]
#[command(name = "credit-risk-api")]
#[command(about = "Credit risk category prediction over HTTP")]
struct Cli {
    /// Address to bind (overrides CREDIT_RISK_HOST)
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (overrides CREDIT_RISK_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppCfg::load().with_bind_overrides(cli.host, cli.port);
    credit_risk_api::common::log::init(&cfg);

    // Loaded exactly once; a failure leaves the service up with /predict answering 500.
    let model = ModelState::load(&cfg.model_path);
    let app = router(AppState::new(model));

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, model_path = %cfg.model_path.display(), "credit-risk-api started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("credit-risk-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
