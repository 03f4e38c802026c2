use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeEvent {
    pub title: String,
    #[serde(rename = "episode")]
    pub episode_label: String,
    #[serde(rename = "time")]
    pub time_label: String,
    pub timestamp: i64,
    #[serde(rename = "image")]
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    /// Heading text as shown on the page; never parsed into a date.
    #[serde(rename = "day")]
    pub label: String,
    #[serde(rename = "anime")]
    pub events: Vec<AnimeEvent>,
}

pub type Schedule = Vec<ScheduleDay>;

/// Named allow-list of titles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterList {
    pub name: String,
    pub titles: HashSet<String>,
}

impl FilterList {
    pub fn new<I, S>(name: impl Into<String>, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, title: &str) -> bool {
        self.titles.contains(title)
    }
}

/// How many days a request wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    FirstDay,
    Full,
}

impl Window {
    pub fn from_full_flag(full: bool) -> Self {
        if full { Window::Full } else { Window::FirstDay }
    }

    pub fn day_limit(&self) -> Option<usize> {
        match self {
            Window::FirstDay => Some(1),
            Window::Full => None,
        }
    }
}
