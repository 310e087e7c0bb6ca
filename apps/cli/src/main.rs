//! Capstan deployer entry point.

mod config;
mod remote;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting capstan deploy"
    );

    // Load configuration. A missing variable is fatal here, before
    // anything touches the network.
    let config = config::Config::from_env()?;
    tracing::info!(
        host = %config.target.host,
        remote_dir = %config.remote_dir,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))?;

    Ok(())
}

async fn run(config: config::Config) -> anyhow::Result<()> {
    let deployer = capstan_deploy::Deployer::new();

    // Ctrl-C aborts between pipeline steps.
    let cancel = deployer.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling deploy");
            cancel.cancel();
        }
    });

    let connector = remote::SshConnector::new(config.target.clone());
    let plan = config.deploy_plan();
    let report = deployer.run(&plan, &connector).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
