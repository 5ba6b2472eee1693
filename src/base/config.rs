//! Load configuration via `config` crate with env-override support.

use std::{collections::HashMap, ops::Deref, path::PathBuf, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Upper bound of the dedup window (one day).
const MAX_RECORD_WINDOW_SECS: u64 = 86_400;

/// Default location of the dedup record file.
fn default_record_file() -> PathBuf {
    PathBuf::from("/tmp/notify_record.json")
}

/// Default dedup freshness window, in seconds.
fn default_record_window_secs() -> u64 {
    60
}

/// Default address for the inbound webhook listener.
fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Default color of the Slack attachment block.
fn default_attachment_color() -> String {
    "#36a64f".to_string()
}

/// Configuration for the review-bell application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack incoming webhook URL (`NOTIFIER_SLACK_WEBHOOK_URL`).
    pub slack_webhook_url: String,
    /// GitHub handle to Slack handle mapping (`github_to_slack` table in the config file).
    ///
    /// Keys are GitHub logins with or without the leading `@`, values are Slack
    /// mention targets such as `@U024BE7LH`.
    #[serde(default)]
    pub github_to_slack: HashMap<String, String>,
    /// Path of the dedup record file (`NOTIFIER_RECORD_FILE`).
    #[serde(default = "default_record_file")]
    pub record_file: PathBuf,
    /// Seconds a review request record stays fresh (`NOTIFIER_RECORD_WINDOW_SECS`).
    #[serde(default = "default_record_window_secs")]
    pub record_window_secs: u64,
    /// Address the webhook listener binds to (`NOTIFIER_BIND_ADDRESS`).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Color of the attachment block (`NOTIFIER_ATTACHMENT_COLOR`).
    #[serde(default = "default_attachment_color")]
    pub attachment_color: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("NOTIFIER"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the loaded values for consistency.
    pub fn validate(&self) -> Res<()> {
        if self.slack_webhook_url.is_empty() {
            return Err(anyhow::anyhow!("Slack webhook URL must be set."));
        }

        if self.record_window_secs < 1 || self.record_window_secs > MAX_RECORD_WINDOW_SECS {
            return Err(anyhow::anyhow!("Record window must be between 1 and {} seconds.", MAX_RECORD_WINDOW_SECS));
        }

        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(anyhow::anyhow!("Bind address `{}` is not a valid socket address.", self.bind_address));
        }

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn config(inner: ConfigInner) -> Config {
        Config { inner: Arc::new(inner) }
    }

    fn valid() -> ConfigInner {
        ConfigInner {
            slack_webhook_url: "https://hooks.slack.com/services/T000/B000/XXXX".to_string(),
            record_file: default_record_file(),
            record_window_secs: default_record_window_secs(),
            bind_address: default_bind_address(),
            attachment_color: default_attachment_color(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config(valid()).validate().is_ok());
    }

    #[test]
    fn test_missing_webhook_url() {
        let inner = ConfigInner {
            slack_webhook_url: String::new(),
            ..valid()
        };

        assert!(config(inner).validate().is_err());
    }

    #[test]
    fn test_zero_window() {
        let inner = ConfigInner { record_window_secs: 0, ..valid() };

        assert!(config(inner).validate().is_err());
    }

    #[test]
    fn test_bad_bind_address() {
        let inner = ConfigInner {
            bind_address: "localhost".to_string(),
            ..valid()
        };

        assert!(config(inner).validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
slack_webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"
record_window_secs = 120

[github_to_slack]
"@alice" = "@U0ALICE"
bob = "@U0BOB"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.record_window_secs, 120);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.github_to_slack.len(), 2);
    }
}
