//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::{Res, Void};

/// Default port for the events listener.
fn default_port() -> u16 {
    3000
}

/// Default bind address for the events listener.
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

/// Default translation endpoint (Google Cloud Translation v2).
fn default_translate_endpoint() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

/// Configuration for the poll-translate-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared, immutable settings.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The settings themselves, as read from the environment and config file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret used to verify inbound requests (`SLACK_SIGNING_SECRET`).
    pub slack_signing_secret: String,
    /// Port the events listener binds to (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address the events listener binds to (`BIND_ADDRESS`).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// API key for the translation service (`TRANSLATE_API_KEY`).
    pub translate_api_key: String,
    /// Translation service endpoint (`TRANSLATE_ENDPOINT`).
    #[serde(default = "default_translate_endpoint")]
    pub translate_endpoint: String,
}

impl Config {
    /// Loads settings from the environment, then the config file (if any), and validates them.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        // The Slack conventional names (`SLACK_BOT_TOKEN`, `PORT`, ...) are read as-is.
        let mut cfg = config::Config::builder().add_source(config::Environment::default());

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

    /// Checks the values `serde` cannot check on its own.
    pub fn validate(&self) -> Void {
        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must not be empty."));
        }

        if self.slack_signing_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack signing secret must not be empty."));
        }

        if self.translate_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("Translation API key must not be empty."));
        }

        if self.port == 0 {
            return Err(anyhow::anyhow!("Port must be between 1 and 65535."));
        }

        if !self.translate_endpoint.starts_with("http://") && !self.translate_endpoint.starts_with("https://") {
            return Err(anyhow::anyhow!("Translation endpoint must be an http(s) URL."));
        }

        Ok(())
    }

    /// The `address:port` pair the events listener binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConfigInner {
        ConfigInner {
            slack_bot_token: "xoxb-test".to_string(),
            slack_signing_secret: "secret".to_string(),
            port: default_port(),
            bind_address: default_bind_address(),
            translate_api_key: "key".to_string(),
            translate_endpoint: default_translate_endpoint(),
        }
    }

    #[test]
    fn accepts_a_complete_configuration() {
        let config = Config::from(valid());

        assert!(config.validate().is_ok());
        assert_eq!(config.listen_address(), "0.0.0.0:3000");
    }

    #[test]
    fn rejects_missing_credentials() {
        let config = Config::from(ConfigInner {
            slack_bot_token: " ".to_string(),
            ..valid()
        });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner {
            slack_signing_secret: String::new(),
            ..valid()
        });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner {
            translate_api_key: String::new(),
            ..valid()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_port_zero_and_non_http_endpoints() {
        let config = Config::from(ConfigInner { port: 0, ..valid() });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner {
            translate_endpoint: "translation.googleapis.com".to_string(),
            ..valid()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_an_explicit_file() {
        let path = std::env::temp_dir().join(format!("poll-translate-bot-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
slack_bot_token = "xoxb-file"
slack_signing_secret = "file-secret"
translate_api_key = "file-key"
port = 8080
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path));
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.slack_bot_token, "xoxb-file");
        assert_eq!(config.port, 8080);
        assert_eq!(config.translate_endpoint, default_translate_endpoint());
    }
}
