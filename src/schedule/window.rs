use crate::schedule::model::{Schedule, Window};

/// Truncates the schedule to what `window` allows.
pub fn apply_window(mut schedule: Schedule, window: Window) -> Schedule {
    if let Some(limit) = window.day_limit() {
        schedule.truncate(limit);
    }
    schedule
}

/// Empties the whole schedule when its first day has no events.
///
/// Only the first day is inspected, even when later days still have events.
/// The widget path uses this to avoid rendering a header with nothing under it.
pub fn suppress_if_first_day_empty(schedule: Schedule) -> Schedule {
    match schedule.first() {
        Some(first) if first.events.is_empty() => Vec::new(),
        _ => schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::model::{AnimeEvent, ScheduleDay};
    use pretty_assertions::assert_eq;

    fn day(label: &str, titles: &[&str]) -> ScheduleDay {
        ScheduleDay {
            label: label.into(),
            events: titles
                .iter()
                .map(|title| AnimeEvent {
                    title: title.to_string(),
                    episode_label: "EP2".into(),
                    time_label: "9:30 PM".into(),
                    timestamp: 1_760_000_000,
                    image_url: "https://img.test/x.jpg".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn first_day_window_keeps_one_day() {
        let schedule = vec![day("Mon", &["A"]), day("Tue", &["B"])];
        let windowed = apply_window(schedule, Window::from_full_flag(false));
        assert_eq!(windowed, vec![day("Mon", &["A"])]);
    }

    #[test]
    fn full_window_keeps_everything() {
        let schedule = vec![day("Mon", &["A"]), day("Tue", &["B"])];
        assert_eq!(apply_window(schedule.clone(), Window::Full), schedule);
        assert!(apply_window(Vec::new(), Window::FirstDay).is_empty());
    }

    #[test]
    fn empty_first_day_discards_later_days() {
        let schedule = vec![day("Mon", &[]), day("Tue", &["X"])];
        assert!(suppress_if_first_day_empty(schedule).is_empty());
    }

    #[test]
    fn non_empty_first_day_is_untouched() {
        let schedule = vec![day("Mon", &["A"]), day("Tue", &[])];
        assert_eq!(suppress_if_first_day_empty(schedule.clone()), schedule);
        assert!(suppress_if_first_day_empty(Vec::new()).is_empty());
    }
}
