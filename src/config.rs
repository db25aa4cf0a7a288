use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub telegram: TelegramConfig,
    pub state: StateConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Rendered as `filter[key]=value` query parameters.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    pub chat_ids: Vec<String>,
    /// When false the channel never attempts sendPhoto, even if a
    /// listing carries a banner url.
    #[serde(default = "default_true")]
    pub send_media: bool,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub seen_policy: SeenPolicy,
    pub notify_on_empty: bool,
    pub notify_on_no_new: bool,
    pub notify_on_error: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seen_policy: SeenPolicy::AnyRecipient,
            notify_on_empty: true,
            notify_on_no_new: true,
            notify_on_error: true,
        }
    }
}

/// When a delivered listing is marked seen (and so never re-sent).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SeenPolicy {
    /// Success to at least one configured recipient marks it seen globally.
    AnyRecipient,
    /// Only success to every configured recipient marks it seen; a partial
    /// failure leaves the listing eligible for re-send next run.
    AllRecipients,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        if config.telegram.chat_ids.is_empty() {
            anyhow::bail!("telegram.chat_ids must list at least one recipient");
        }
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// Bot token comes from the environment (or .env); this is a scheduled
    /// job, so there is no interactive fallback.
    pub fn bot_token() -> Result<String> {
        match std::env::var("BOT_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Ok(sanitize(&token)),
            _ => anyhow::bail!("BOT_TOKEN environment variable is not set"),
        }
    }
}

/// Strip carriage returns, BOM, and other invisible chars from a token value.
fn sanitize(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.source.base_url, "https://sakani.sa");
        assert_eq!(
            config
                .source
                .filters
                .get("marketplace_purpose")
                .map(String::as_str),
            Some("buy")
        );
        assert!(!config.telegram.chat_ids.is_empty());
        assert_eq!(config.pipeline.seen_policy, SeenPolicy::AnyRecipient);
    }

    #[test]
    fn test_pipeline_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            base_url = "https://sakani.sa"

            [telegram]
            chat_ids = ["1990112196"]

            [state]
            path = "state.json"
            "#,
        )
        .unwrap();
        assert!(config.pipeline.notify_on_empty);
        assert!(config.pipeline.notify_on_error);
        assert!(config.telegram.send_media);
        assert_eq!(config.source.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_seen_policy_parses() {
        let config: Config = toml::from_str(
            r#"
            [source]
            base_url = "https://sakani.sa"

            [telegram]
            chat_ids = ["1", "2"]

            [state]
            path = "state.json"

            [pipeline]
            seen_policy = "all-recipients"
            notify_on_no_new = false
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.seen_policy, SeenPolicy::AllRecipients);
        assert!(!config.pipeline.notify_on_no_new);
        assert!(config.pipeline.notify_on_empty);
    }
}
