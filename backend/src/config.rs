//! Runtime configuration.
//!
//! Everything is read from environment variables; `main` loads a `.env` file
//! first when one is present. `Config::from_lookup` takes the lookup as a
//! closure so tests never touch the process environment.

use crate::pipeline::matching::PhoneMatch;
use common::model::ChatId;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_STORE_URL: &str = "http://localhost:3000";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// The two deployment configurations of the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotVariant {
    /// `/start` registers into process memory, every registered chat gets the
    /// full upload, `/send` is available.
    Simple,
    /// Contact-share registration into the record store, rows are routed by
    /// phone number.
    Directory,
}

/// How updates reach the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    Polling,
    Webhook,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub telegram_api_url: String,
    pub admins: Vec<ChatId>,
    pub superadmins: Vec<ChatId>,
    pub store_url: String,
    pub store_timeout: Duration,
    pub variant: BotVariant,
    pub update_mode: UpdateMode,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub poll_timeout_secs: u64,
    pub http_host: String,
    pub http_port: u16,
    pub work_dir: PathBuf,
    pub phone_match: PhoneMatch,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let variant = match get("BOT_VARIANT").as_deref().map(str::trim) {
            None | Some("directory") => BotVariant::Directory,
            Some("simple") => BotVariant::Simple,
            Some(other) => return Err(invalid("BOT_VARIANT", other)),
        };

        let update_mode = match get("UPDATE_MODE").as_deref().map(str::trim) {
            None | Some("polling") => UpdateMode::Polling,
            Some("webhook") => UpdateMode::Webhook,
            Some(other) => return Err(invalid("UPDATE_MODE", other)),
        };

        let webhook_url = get("WEBHOOK_URL");
        if update_mode == UpdateMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::Missing("WEBHOOK_URL"));
        }

        let phone_match = match get("PHONE_MATCH").as_deref().map(str::trim) {
            None | Some("substring") => PhoneMatch::Substring,
            Some("normalized") => PhoneMatch::Normalized,
            Some(other) => return Err(invalid("PHONE_MATCH", other)),
        };

        Ok(Config {
            bot_token,
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            admins: parse_id_list("ADMINS", get("ADMINS"))?,
            superadmins: parse_id_list("SUPERADMINS", get("SUPERADMINS"))?,
            store_url: get("STORE_URL")
                .unwrap_or_else(|| DEFAULT_STORE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            store_timeout: Duration::from_secs(parse_or(
                "STORE_TIMEOUT_SECS",
                get("STORE_TIMEOUT_SECS"),
                DEFAULT_STORE_TIMEOUT_SECS,
            )?),
            variant,
            update_mode,
            webhook_url,
            webhook_secret: get("WEBHOOK_SECRET"),
            poll_timeout_secs: parse_or(
                "POLL_TIMEOUT_SECS",
                get("POLL_TIMEOUT_SECS"),
                DEFAULT_POLL_TIMEOUT_SECS,
            )?,
            http_host: get("HTTP_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string()),
            http_port: parse_or("HTTP_PORT", get("HTTP_PORT"), DEFAULT_HTTP_PORT)?,
            work_dir: get("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            phone_match,
        })
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| invalid(key, &value)),
    }
}

/// Parses a comma separated list of chat ids, e.g. `ADMINS=111,222`.
fn parse_id_list(key: &'static str, raw: Option<String>) -> Result<Vec<ChatId>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<ChatId>().map_err(|_| invalid(key, part)))
        .collect()
}
