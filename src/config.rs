use crate::error::ConfigError;
use chrono::FixedOffset;
use poise::serenity_prelude::ChannelId;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Sqlite { url: String },
    File { path: PathBuf },
}

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub power_channel: ChannelId,
    pub notify_hour: u32,
    pub notify_offset: FixedOffset,
    pub storage: StorageConfig,
    pub command_prefix: String,
    pub delivery_timeout: Duration,
    /// Only mark a record warned once its DM actually went through.
    pub retry_failed_warnings: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discord_token = var("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let channel = var("POWER_CHANNEL_ID").ok_or(ConfigError::Missing("POWER_CHANNEL_ID"))?;
        let power_channel = match channel.trim().parse::<u64>() {
            Ok(id) if id != 0 => ChannelId::new(id),
            _ => return Err(invalid("POWER_CHANNEL_ID", channel)),
        };

        let notify_hour = match var("NOTIFY_HOUR") {
            Some(hour) => match hour.trim().parse::<u32>() {
                Ok(h) if h < 24 => h,
                _ => return Err(invalid("NOTIFY_HOUR", hour)),
            },
            None => 13,
        };
        let offset = var("NOTIFY_UTC_OFFSET").unwrap_or_else(|| "+01:00".into());
        let notify_offset =
            parse_utc_offset(&offset).ok_or_else(|| invalid("NOTIFY_UTC_OFFSET", offset))?;

        let storage = match var("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => StorageConfig::Sqlite { url },
            _ => StorageConfig::File {
                path: var("POWER_DATA_FILE")
                    .unwrap_or_else(|| "power_data.json".into())
                    .into(),
            },
        };

        let delivery_timeout = match var("DELIVERY_TIMEOUT_SECS") {
            Some(secs) => match secs.trim().parse::<u64>() {
                Ok(s) if s > 0 => Duration::from_secs(s),
                _ => return Err(invalid("DELIVERY_TIMEOUT_SECS", secs)),
            },
            None => Duration::from_secs(10),
        };
        let retry_failed_warnings = match var("RETRY_FAILED_WARNINGS") {
            Some(flag) => match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => return Err(invalid("RETRY_FAILED_WARNINGS", flag)),
            },
            None => false,
        };

        Ok(Config {
            discord_token,
            power_channel,
            notify_hour,
            notify_offset,
            storage,
            command_prefix: var("COMMAND_PREFIX").unwrap_or_else(|| "!".into()),
            delivery_timeout,
            retry_failed_warnings,
        })
    }
}

fn invalid(name: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { name, value }
}

/// Parses `+01:00`, `-0530`, `+2` style offsets.
pub fn parse_utc_offset(offset: &str) -> Option<FixedOffset> {
    let re = Regex::new(r"^(?:UTC)?([+-])([0-9]{1,2})(?::?([0-9]{2}))?$").ok()?;
    let captures = re.captures(offset.trim())?;
    let hours: i32 = captures[2].parse().ok()?;
    let minutes: i32 = captures.get(3).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    let seconds = (hours * 60 + minutes) * 60;
    match &captures[1] {
        "-" => FixedOffset::west_opt(seconds),
        _ => FixedOffset::east_opt(seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_use_file_backend_at_13_plus_one() {
        let config = config_from(&[("DISCORD_TOKEN", "t"), ("POWER_CHANNEL_ID", "682623773442179072")])
            .unwrap();
        assert_eq!(config.power_channel.get(), 682623773442179072);
        assert_eq!(config.notify_hour, 13);
        assert_eq!(config.notify_offset.local_minus_utc(), 3600);
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.delivery_timeout, Duration::from_secs(10));
        assert!(!config.retry_failed_warnings);
        assert!(matches!(config.storage, StorageConfig::File { ref path } if path == &PathBuf::from("power_data.json")));
    }

    #[test]
    fn database_url_selects_sqlite() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "t"),
            ("POWER_CHANNEL_ID", "1"),
            ("DATABASE_URL", "sqlite://power.db"),
            ("NOTIFY_UTC_OFFSET", "+00:00"),
            ("NOTIFY_HOUR", "7"),
        ])
        .unwrap();
        assert!(matches!(config.storage, StorageConfig::Sqlite { .. }));
        assert_eq!(config.notify_offset.local_minus_utc(), 0);
        assert_eq!(config.notify_hour, 7);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config_from(&[("POWER_CHANNEL_ID", "1")]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        ));
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("POWER_CHANNEL_ID", "abc")]).is_err());
        assert!(config_from(&[
            ("DISCORD_TOKEN", "t"),
            ("POWER_CHANNEL_ID", "1"),
            ("NOTIFY_HOUR", "24")
        ])
        .is_err());
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("+01:00").unwrap().local_minus_utc(), 3600);
        assert_eq!(parse_utc_offset("-0530").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset("UTC+2").unwrap().local_minus_utc(), 7200);
        assert!(parse_utc_offset("CET").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
    }
}
