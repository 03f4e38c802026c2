//! JSON-line logging for the schedule service.
//!
//! Every line is one object: a fixed head (`timestamp`, `service`, `env`,
//! `host`, `level`, `event`) followed by the event's own fields.

use chrono::{SecondsFormat, Utc};
use hostname::get;
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Level::Error,
            "warn" | "warning" => Level::Warn,
            "debug" | "trace" => Level::Debug,
            _ => Level::Info,
        }
    }
}

/// Everything the service writes to its log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    ServerStarting,
    ServerStopped,
    CatalogLoaded,
    ConfigCheckPassed,
    RequestReceived,
    RequestCompleted,
    ScheduleFetchFailed,
    ScheduleExtractFailed,
    ScheduleExtracted,
    CalendarNotFound,
    RenderFailed,
}

impl Event {
    pub fn name(self) -> &'static str {
        match self {
            Event::ServerStarting => "server.starting",
            Event::ServerStopped => "server.stopped",
            Event::CatalogLoaded => "catalog.loaded",
            Event::ConfigCheckPassed => "config.check_passed",
            Event::RequestReceived => "request.received",
            Event::RequestCompleted => "request.completed",
            Event::ScheduleFetchFailed => "schedule.fetch_failed",
            Event::ScheduleExtractFailed => "schedule.extract_failed",
            Event::ScheduleExtracted => "schedule.extracted",
            Event::CalendarNotFound => "calendar.not_found",
            Event::RenderFailed => "render.failed",
        }
    }

    pub fn level(self) -> Level {
        match self {
            Event::ScheduleFetchFailed | Event::ScheduleExtractFailed | Event::RenderFailed => {
                Level::Error
            }
            Event::CalendarNotFound => Level::Warn,
            Event::ScheduleExtracted => Level::Debug,
            _ => Level::Info,
        }
    }
}

#[derive(Serialize)]
struct LineHead<'a> {
    timestamp: String,
    service: &'a str,
    env: &'a str,
    host: &'a str,
    level: Level,
    event: &'static str,
}

/// Cheap to clone; errors and warnings go to stderr, the rest to stdout.
#[derive(Clone)]
pub struct Logger {
    service: Arc<str>,
    environment: Arc<str>,
    host: Arc<str>,
    threshold: Level,
}

impl Logger {
    pub fn new(service: &'static str) -> Self {
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let host = get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .or_else(|| env::var("HOSTNAME").ok())
            .unwrap_or_else(|| "unknown".to_string());
        let threshold = env::var("LOG_LEVEL")
            .map(|value| Level::parse(&value))
            .unwrap_or(Level::Info);

        Self {
            service: Arc::from(service),
            environment: Arc::from(environment),
            host: Arc::from(host),
            threshold,
        }
    }

    pub fn enabled(&self, event: Event) -> bool {
        event.level() <= self.threshold
    }

    pub fn log<T: Serialize>(&self, event: Event, fields: T) {
        if !self.enabled(event) {
            return;
        }
        let line = self.render_line(event, fields);
        match event.level() {
            Level::Error | Level::Warn => eprintln!("{line}"),
            Level::Info | Level::Debug => println!("{line}"),
        }
    }

    fn render_line<T: Serialize>(&self, event: Event, fields: T) -> String {
        let head = LineHead {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            service: &self.service,
            env: &self.environment,
            host: &self.host,
            level: event.level(),
            event: event.name(),
        };
        let mut line = match serde_json::to_value(head) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        match serde_json::to_value(fields).unwrap_or(Value::Null) {
            Value::Object(extra) => {
                for (key, value) in extra {
                    // The head wins over event fields with the same name.
                    line.entry(key).or_insert(value);
                }
            }
            Value::Null => {}
            other => {
                line.insert("detail".into(), other);
            }
        }

        Value::Object(line).to_string()
    }
}
