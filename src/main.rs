use tracing_subscriber::EnvFilter;

use delivery_eta::config::AppConfig;
use delivery_eta::server::run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env()?;

    // No model, no session: `run` returns before anything is served
    if let Err(e) = run(cfg).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
