use anyhow::Result;
use async_trait::async_trait;
use futures_util::StreamExt;
use http::{HeaderValue, StatusCode};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::ScheduleSourceConfig;

/// Layout blob for `preferences.schedule`: timetable view starting today,
/// release-date ascending, every mark except paused/dropped/skipping.
const SCHEDULE_LAYOUT_PREFERENCES: &str = r#"{"layout":"timetable","start":"today","sort":"release_date","sort_dir":"asc","included_marks":{"completed":true,"rewatching":true,"watching":true,"planning":true,"considering":true,"paused":false,"dropped":false,"skipping":false,"unmarked":true}}"#;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Preference cookie is not a valid header value")]
    Preferences,
    #[error("Upstream request failed")]
    Request(#[source] reqwest::Error),
    #[error("Upstream returned {0}")]
    Status(StatusCode),
    #[error("Fetched HTML too large")]
    TooLarge,
}

/// Display preferences sent to the schedule site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchedulePreferences {
    /// IANA zone name, forwarded as given.
    pub time_zone: String,
    pub titles: String,
}

impl SchedulePreferences {
    pub fn new(time_zone: impl Into<String>, titles: impl Into<String>) -> Self {
        Self {
            time_zone: time_zone.into(),
            titles: titles.into(),
        }
    }

    pub fn cookie_header(&self) -> Result<HeaderValue, FetchError> {
        let preferences = serde_json::to_string(self).map_err(|_| FetchError::Preferences)?;
        let cookie =
            format!("preferences={preferences}; preferences.schedule={SCHEDULE_LAYOUT_PREFERENCES}");
        HeaderValue::from_str(&cookie).map_err(|_| FetchError::Preferences)
    }
}

#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Raw markup of the schedule page rendered with `preferences`.
    async fn fetch_schedule(&self, preferences: &SchedulePreferences) -> Result<String, FetchError>;
}

/// Fetches the live page over one shared connection pool.
pub struct LivechartSource {
    client: Client,
    url: String,
    max_html_bytes: usize,
}

impl LivechartSource {
    pub fn new(config: &ScheduleSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            max_html_bytes: config.max_html_bytes,
        })
    }
}

#[async_trait]
impl ScheduleSource for LivechartSource {
    async fn fetch_schedule(&self, preferences: &SchedulePreferences) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::COOKIE, preferences.cookie_header()?)
            .send()
            .await
            .map_err(FetchError::Request)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let bytes = read_limited_body(response, self.max_html_bytes).await?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}

async fn read_limited_body(
    response: reqwest::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length()
        && len as usize > max_bytes
    {
        return Err(FetchError::TooLarge);
    }

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    while let Some(next) = stream.next().await {
        let chunk = next.map_err(FetchError::Request)?;
        if buffer.len() + chunk.len() > max_bytes {
            return Err(FetchError::TooLarge);
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cookie_carries_both_preference_blobs() {
        let header = SchedulePreferences::new("Europe/Berlin", "english")
            .cookie_header()
            .unwrap();
        let value = header.to_str().unwrap();
        assert!(value.starts_with(
            r#"preferences={"time_zone":"Europe/Berlin","titles":"english"}; preferences.schedule={"layout":"timetable""#
        ));
        assert!(value.contains(r#""paused":false"#));
        assert!(value.ends_with(r#""unmarked":true}}"#));
    }

    #[test]
    fn time_zone_is_passed_through_unvalidated() {
        let header = SchedulePreferences::new("Not/A_Zone", "romaji")
            .cookie_header()
            .unwrap();
        assert!(
            header
                .to_str()
                .unwrap()
                .contains(r#"{"time_zone":"Not/A_Zone","titles":"romaji"}"#)
        );
    }

    #[test]
    fn control_characters_are_rejected() {
        let error = SchedulePreferences::new("Etc/UTC\u{7f}", "english")
            .cookie_header()
            .unwrap_err();
        assert_eq!(error.to_string(), "Preference cookie is not a valid header value");
    }
}
