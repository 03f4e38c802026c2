use chrono_tz::Tz;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SCHEDULE_URL: &str = "https://www.livechart.me/schedule";
const DEFAULT_TITLE_LANGUAGE: &str = "english";
const DEFAULT_USER_AGENT: &str = "anime-schedule-service/0.1";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_MAX_HTML_BYTES: usize = 4 * 1024 * 1024;
const DEFAULT_LISTS_PATH: &str = "data/lists.json";
const DEFAULT_CALENDARS_PATH: &str = "data/calendars.json";
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct Config {
    pub port: u16,
    pub schedule: ScheduleSourceConfig,
    pub lists_path: PathBuf,
    pub calendars_path: PathBuf,
    #[serde(serialize_with = "serialize_tz")]
    pub calendar_timezone: Tz,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScheduleSourceConfig {
    pub url: String,
    pub title_language: String,
    pub user_agent: String,
    #[serde(rename = "timeoutMs", serialize_with = "serialize_duration_ms")]
    pub timeout: Duration,
    pub max_html_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let port = env_u16("PORT", DEFAULT_PORT)?;
        let schedule = ScheduleSourceConfig::from_env()?;
        let lists_path = env_path("ANIME_LISTS_PATH", DEFAULT_LISTS_PATH);
        let calendars_path = env_path("CALENDARS_PATH", DEFAULT_CALENDARS_PATH);
        let calendar_timezone = parse_timezone(
            env::var("CALENDAR_TIMEZONE")
                .ok()
                .as_deref()
                .unwrap_or(DEFAULT_TIMEZONE),
        )?;

        Ok(Self {
            port,
            schedule,
            lists_path,
            calendars_path,
            calendar_timezone,
        })
    }
}

impl ScheduleSourceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("SCHEDULE_URL").unwrap_or_else(|_| DEFAULT_SCHEDULE_URL.to_string());
        validate_schedule_url(&url)?;

        let title_language = env::var("SCHEDULE_TITLE_LANGUAGE")
            .map(|value| value.trim().to_string())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE_LANGUAGE.to_string());
        let user_agent = env::var("SCHEDULE_USER_AGENT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let timeout_seconds = parse_positive_usize(
            env::var("FETCH_TIMEOUT_SECONDS").ok(),
            DEFAULT_TIMEOUT_SECONDS as usize,
        )
        .clamp(1, 60) as u64;
        let max_html_bytes =
            parse_positive_usize(env::var("FETCH_MAX_HTML_BYTES").ok(), DEFAULT_MAX_HTML_BYTES)
                .clamp(64 * 1024, 16 * 1024 * 1024);

        Ok(Self {
            url,
            title_language,
            user_agent,
            timeout: Duration::from_secs(timeout_seconds),
            max_html_bytes,
        })
    }
}

fn validate_schedule_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw)
        .map_err(|err| ConfigError::Message(format!("Invalid SCHEDULE_URL: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::Message(
            "SCHEDULE_URL must use http or https".into(),
        )),
    }
}

pub fn parse_timezone(raw: &str) -> Result<Tz, ConfigError> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::Message(format!("Unknown CALENDAR_TIMEZONE: {raw}")))
}

fn env_u16(key: &str, default: u16) -> Result<u16, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Message(format!("{key} must be a valid u16"))),
        Err(_) => Ok(default),
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn parse_positive_usize(value: Option<String>, default_value: usize) -> usize {
    value
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|parsed| *parsed > 0)
        .unwrap_or(default_value)
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

fn serialize_duration_ms<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positive_usize_ignores_zero_and_garbage() {
        assert_eq!(parse_positive_usize(Some("0".into()), 7), 7);
        assert_eq!(parse_positive_usize(Some("abc".into()), 7), 7);
        assert_eq!(parse_positive_usize(Some(" 12 ".into()), 7), 12);
        assert_eq!(parse_positive_usize(None, 7), 7);
    }

    #[test]
    fn schedule_url_must_be_http() {
        assert!(validate_schedule_url("https://www.livechart.me/schedule").is_ok());
        assert!(validate_schedule_url("ftp://example.com/schedule").is_err());
        assert!(validate_schedule_url("not a url").is_err());
    }

    #[test]
    fn timezone_parses_iana_names() {
        assert_eq!(parse_timezone("Europe/Berlin").unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(parse_timezone(DEFAULT_TIMEZONE).unwrap(), chrono_tz::Etc::UTC);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
