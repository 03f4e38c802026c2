//! Walks the livechart timetable markup into [`ScheduleDay`] records.
//!
//! The layout is day → timeslot → anime block. Every required field is
//! checked, and a single missing one fails the whole extraction.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::document::{Document, Found, Query, TreeNode};
use crate::schedule::model::{AnimeEvent, Schedule, ScheduleDay, Window};

const DAY: Query<'static> = Query::class("div", "lc-timetable-day");
const DAY_HEADING: Query<'static> = Query::class("div", "lc-timetable-day__heading flex");
const TIMESLOT: Query<'static> = Query::class("div", "lc-timetable-timeslot");
const TIME_LABEL: Query<'static> = Query::class("span", "lc-time");
const TIMESTAMP: Query<'static> = Query::tag("time");
const ANIME_BLOCK: Query<'static> = Query::class("div", "lc-timetable-anime-block");
const IMAGE: Query<'static> = Query::tag("img");
const TITLE: Query<'static> = Query::class("a", "lc-tt-anime-title");
const EPISODE: Query<'static> = Query::class("a", "lc-tt-release-label");

const HIDDEN_CLASS: &str = "hidden";
const TIMESTAMP_ATTR: &str = "data-timestamp";
const SRCSET_ATTR: &str = "srcset";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StructuralErrorKind {
    MissingTimeInfo,
    MissingTimestampInfo,
    MissingImageInfo,
    MissingTitleInfo,
    MissingEpisodeInfo,
}

impl fmt::Display for StructuralErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            StructuralErrorKind::MissingTimeInfo => "Anime missing time information",
            StructuralErrorKind::MissingTimestampInfo => "Anime missing timestamp information",
            StructuralErrorKind::MissingImageInfo => "Anime missing image information",
            StructuralErrorKind::MissingTitleInfo => "Anime missing title information",
            StructuralErrorKind::MissingEpisodeInfo => "Anime missing episode information",
        };
        f.write_str(message)
    }
}

/// A required field was absent where the page layout promises one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} (day {day:?}, timeslot {timeslot})")]
pub struct StructuralError {
    pub kind: StructuralErrorKind,
    pub day: String,
    /// Position of the timeslot within its day, hidden ones included.
    pub timeslot: usize,
}

/// Why the day loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionEnd {
    /// Every day node was read.
    Exhausted,
    /// A day without a heading was reached; later days are discarded.
    Placeholder,
    /// The requested window already holds enough days.
    WindowFilled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    pub schedule: Schedule,
    pub end: ExtractionEnd,
}

enum DayStep {
    Day(ScheduleDay),
    Placeholder,
}

/// Parses `markup` and extracts its schedule.
pub fn extract_from_markup(markup: &str, window: Window) -> Result<Extraction, StructuralError> {
    let document = Document::parse(markup);
    extract_schedule(&document.root(), window)
}

pub fn extract_schedule<N: TreeNode>(
    root: &N,
    window: Window,
) -> Result<Extraction, StructuralError> {
    let mut schedule = Vec::new();

    for candidate in root.find_all(&DAY) {
        let Some(day_node) = candidate.element() else {
            continue;
        };

        match read_day(&day_node)? {
            DayStep::Placeholder => {
                return Ok(Extraction {
                    schedule,
                    end: ExtractionEnd::Placeholder,
                });
            }
            DayStep::Day(day) => schedule.push(day),
        }

        if window
            .day_limit()
            .is_some_and(|limit| schedule.len() >= limit)
        {
            return Ok(Extraction {
                schedule,
                end: ExtractionEnd::WindowFilled,
            });
        }
    }

    Ok(Extraction {
        schedule,
        end: ExtractionEnd::Exhausted,
    })
}

fn read_day<N: TreeNode>(node: &N) -> Result<DayStep, StructuralError> {
    let label = node
        .find_first(&DAY_HEADING)
        .and_then(Found::element)
        .map(|heading| heading.collapsed_text())
        .filter(|label| !label.is_empty());
    let Some(label) = label else {
        return Ok(DayStep::Placeholder);
    };

    let mut events = Vec::new();
    for (index, candidate) in node.find_all(&TIMESLOT).into_iter().enumerate() {
        let Some(slot) = candidate.element() else {
            continue;
        };
        if slot.has_class(HIDDEN_CLASS) {
            continue;
        }
        read_timeslot(&slot, &mut events).map_err(|kind| StructuralError {
            kind,
            day: label.clone(),
            timeslot: index,
        })?;
    }

    Ok(DayStep::Day(ScheduleDay { label, events }))
}

fn read_timeslot<N: TreeNode>(
    slot: &N,
    events: &mut Vec<AnimeEvent>,
) -> Result<(), StructuralErrorKind> {
    let time_label = slot
        .find_first(&TIME_LABEL)
        .and_then(Found::element)
        .map(|node| node.text())
        .ok_or(StructuralErrorKind::MissingTimeInfo)?;
    let timestamp = slot
        .find_first(&TIMESTAMP)
        .and_then(Found::element)
        .and_then(|node| {
            node.attr(TIMESTAMP_ATTR)
                .and_then(|raw| raw.trim().parse::<i64>().ok())
        })
        .ok_or(StructuralErrorKind::MissingTimestampInfo)?;

    // A slot can carry several simultaneous broadcasts.
    for candidate in slot.find_all(&ANIME_BLOCK) {
        let Some(block) = candidate.element() else {
            continue;
        };
        events.push(read_anime(&block, &time_label, timestamp)?);
    }
    Ok(())
}

fn read_anime<N: TreeNode>(
    block: &N,
    time_label: &str,
    timestamp: i64,
) -> Result<AnimeEvent, StructuralErrorKind> {
    let image_url = block
        .find_first(&IMAGE)
        .and_then(Found::element)
        .and_then(|node| node.attr(SRCSET_ATTR).and_then(select_image_candidate))
        .ok_or(StructuralErrorKind::MissingImageInfo)?;
    let title = block
        .find_first(&TITLE)
        .and_then(Found::element)
        .map(|node| node.text())
        .ok_or(StructuralErrorKind::MissingTitleInfo)?;
    let episode_label = block
        .find_first(&EPISODE)
        .and_then(Found::element)
        .map(|node| node.text())
        .ok_or(StructuralErrorKind::MissingEpisodeInfo)?;

    Ok(AnimeEvent {
        title,
        episode_label,
        time_label: time_label.to_string(),
        timestamp,
        image_url,
    })
}

/// Second-to-last space separated token of a `srcset` value.
///
/// For `"small.jpg 1x, large.jpg 2x"` that is `large.jpg`.
fn select_image_candidate(srcset: &str) -> Option<String> {
    let tokens: Vec<&str> = srcset.split(' ').collect();
    if tokens.len() < 2 {
        return None;
    }
    Some(tokens[tokens.len() - 2].to_string())
}
