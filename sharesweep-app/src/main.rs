use anyhow::{Context, Result};
use clap::Parser;
use sharesweep_app::{init_logging, summary, Cli};
use sharesweep_core::{BatchDriver, CancellationToken};
use sharesweep_google::{GoogleClientFactory, ServiceAccountKey};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Exit status when at least one user failed or the run was interrupted.
const PARTIAL_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose)?;

    let config = cli.to_config();
    config.validate()?;

    let key = ServiceAccountKey::load(&config.credentials_path)
        .await
        .context("Error getting client config")?;
    info!(
        service_account = %key.client_email,
        admin = %config.admin,
        skip_rules = config.skip_rules.len(),
        "Loaded service account"
    );

    let factory = Arc::new(
        GoogleClientFactory::new(key, config.admin.clone(), config.request_timeout)
            .context("Unable to create HTTP client")?,
    );
    let directory = Arc::new(factory.directory());
    let driver = BatchDriver::new(directory, factory, &config)
        .on_outcome(|outcome| println!("{}", summary::outcome_line(outcome)));

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let report = match driver.run(&cancel).await {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "Batch aborted");
            return Err(err.into());
        }
    };

    println!("{}", summary::totals(&report));

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(PARTIAL_FAILURE))
    }
}

/// First Ctrl-C stops the batch at the next file or user boundary.
fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current file");
            cancel.cancel();
        }
    });
}
