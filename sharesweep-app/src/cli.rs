//! Command-line surface.

use crate::logging::LogFormat;
use clap::Parser;
use sharesweep_core::config::{DEFAULT_IDENTITY_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use sharesweep_core::directory::DEFAULT_CUSTOMER;
use sharesweep_core::{RunConfig, SkipRules};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "sharesweep",
    version,
    about = "Copy the files shared with every Workspace user into a folder in their own Drive"
)]
pub struct Cli {
    #[arg(
        long,
        env = "SHARESWEEP_CREDENTIALS",
        help = "Path to the Google service account credentials JSON file"
    )]
    pub credentials: PathBuf,

    #[arg(long, env = "SHARESWEEP_ADMIN", help = "Admin email for impersonation")]
    pub admin: String,

    #[arg(
        long = "skip-user-substr",
        env = "SHARESWEEP_SKIP_USER_SUBSTR",
        default_value = "",
        help = "Comma-separated list of substrings of file owners' email addresses to skip"
    )]
    pub skip_user_substr: String,

    #[arg(
        long,
        default_value = ".",
        help = "Directory for the per-user shared file listings"
    )]
    pub output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_CUSTOMER, help = "Directory customer ID")]
    pub customer: String,

    #[arg(
        long,
        default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(),
        help = "Timeout for each API request, in seconds"
    )]
    pub request_timeout_secs: u64,

    #[arg(
        long,
        default_value_t = DEFAULT_IDENTITY_TIMEOUT.as_secs(),
        help = "Time allowed to process one user, in seconds"
    )]
    pub identity_timeout_secs: u64,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Build the run configuration. Validation is left to
    /// [`RunConfig::validate`].
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            credentials_path: self.credentials.clone(),
            admin: self.admin.trim().to_string(),
            skip_rules: SkipRules::parse(&self.skip_user_substr),
            output_dir: self.output_dir.clone(),
            customer: self.customer.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            identity_timeout: Duration::from_secs(self.identity_timeout_secs),
        }
    }
}
