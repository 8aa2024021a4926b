//! Run configuration, built once at startup and passed to the driver.

use crate::directory::DEFAULT_CUSTOMER;
use crate::filter::SkipRules;
use crate::interfaces::ConsolidationError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(900);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Service-account key file.
    pub credentials_path: PathBuf,
    /// Administrator the service account acts as for directory access.
    pub admin: String,
    pub skip_rules: SkipRules,
    /// Where consolidation records are written.
    pub output_dir: PathBuf,
    pub customer: String,
    pub request_timeout: Duration,
    pub identity_timeout: Duration,
}

impl RunConfig {
    pub fn new(credentials_path: impl Into<PathBuf>, admin: impl Into<String>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            admin: admin.into(),
            skip_rules: SkipRules::default(),
            output_dir: PathBuf::from("."),
            customer: DEFAULT_CUSTOMER.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    pub fn with_skip_rules(mut self, skip_rules: SkipRules) -> Self {
        self.skip_rules = skip_rules;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Check everything that can be checked before any network call.
    pub fn validate(&self) -> Result<(), ConsolidationError> {
        if self.credentials_path.as_os_str().is_empty() {
            return Err(ConsolidationError::Config(
                "credentials file path is required".to_string(),
            ));
        }
        if !self.credentials_path.is_file() {
            return Err(ConsolidationError::Config(format!(
                "credentials file not found: {}",
                self.credentials_path.display()
            )));
        }

        let admin = self.admin.trim();
        if admin.is_empty() {
            return Err(ConsolidationError::Config(
                "admin email for impersonation is required".to_string(),
            ));
        }
        if !admin.contains('@') {
            return Err(ConsolidationError::Config(format!(
                "admin must be an email address: {}",
                admin
            )));
        }

        if self.customer.trim().is_empty() {
            return Err(ConsolidationError::Config(
                "customer cannot be empty".to_string(),
            ));
        }
        if !self.output_dir.is_dir() {
            return Err(ConsolidationError::Config(format!(
                "output directory not found: {}",
                self.output_dir.display()
            )));
        }
        if self.request_timeout.is_zero() || self.identity_timeout.is_zero() {
            return Err(ConsolidationError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config(dir: &TempDir) -> RunConfig {
        let key = dir.path().join("key.json");
        std::fs::write(&key, "{}").unwrap();
        RunConfig::new(key, "admin@co").with_output_dir(dir.path())
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("key.json", "admin@co");
        assert_eq!(config.customer, "my_customer");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.skip_rules.is_empty());
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_valid_config_passes() {
        let dir = TempDir::new().unwrap();
        valid_config(&dir).validate().unwrap();
    }

    #[test]
    fn test_missing_credentials_file() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_config(&dir);
        config.credentials_path = dir.path().join("absent.json");
        assert!(matches!(
            config.validate(),
            Err(ConsolidationError::Config(msg)) if msg.contains("not found")
        ));
    }

    #[test]
    fn test_blank_admin_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_config(&dir);
        config.admin = "   ".to_string();
        assert!(matches!(config.validate(), Err(ConsolidationError::Config(_))));

        config.admin = "admin".to_string();
        assert!(matches!(config.validate(), Err(ConsolidationError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_config(&dir);
        config.identity_timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConsolidationError::Config(_))));
    }

    #[test]
    fn test_missing_output_dir_rejected() {
        let dir = TempDir::new().unwrap();
        let config = valid_config(&dir).with_output_dir(dir.path().join("nope"));
        assert!(matches!(config.validate(), Err(ConsolidationError::Config(_))));
    }
}
