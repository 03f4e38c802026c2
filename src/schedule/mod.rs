pub mod extract;
pub mod filter;
pub mod model;
pub mod window;

pub use extract::{
    Extraction, ExtractionEnd, StructuralError, StructuralErrorKind, extract_from_markup,
    extract_schedule,
};
pub use filter::apply_filter;
pub use model::{AnimeEvent, FilterList, Schedule, ScheduleDay, Window};
pub use window::{apply_window, suppress_if_first_day_empty};

/// Every available day, unfiltered. Backs the JSON endpoint.
pub fn full_schedule(markup: &str) -> Result<Extraction, StructuralError> {
    extract_from_markup(markup, Window::Full)
}

/// Extract, filter, window, then drop everything if the first day is empty.
pub fn widget_schedule(
    markup: &str,
    list: Option<&FilterList>,
    window: Window,
) -> Result<Extraction, StructuralError> {
    let extraction = extract_from_markup(markup, window)?;
    let schedule = apply_filter(extraction.schedule, list);
    let schedule = apply_window(schedule, window);
    Ok(Extraction {
        schedule: suppress_if_first_day_empty(schedule),
        end: extraction.end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = include_str!("../../tests/fixtures/schedule.html");

    #[test]
    fn widget_defaults_to_the_first_day() {
        let extraction = widget_schedule(FIXTURE, None, Window::FirstDay).unwrap();
        assert_eq!(extraction.schedule.len(), 1);
        assert_eq!(extraction.schedule[0].events.len(), 3);
    }

    #[test]
    fn widget_full_keeps_days_up_to_the_placeholder() {
        let list = FilterList::new("watching", ["Dandadan", "Spy x Family"]);
        let extraction = widget_schedule(FIXTURE, Some(&list), Window::Full).unwrap();
        let titles: Vec<Vec<&str>> = extraction
            .schedule
            .iter()
            .map(|day| day.events.iter().map(|e| e.title.as_str()).collect())
            .collect();
        assert_eq!(titles, vec![vec!["Dandadan"], vec!["Spy x Family"]]);
    }

    #[test]
    fn widget_is_empty_when_first_day_filters_to_nothing() {
        let list = FilterList::new("monday-only", ["Spy x Family"]);
        let extraction = widget_schedule(FIXTURE, Some(&list), Window::Full).unwrap();
        assert!(extraction.schedule.is_empty());
    }

    #[test]
    fn full_schedule_is_not_suppressed() {
        let list = FilterList::new("monday-only", ["Spy x Family"]);
        let filtered = apply_filter(full_schedule(FIXTURE).unwrap().schedule, Some(&list));
        assert_eq!(filtered.len(), 2);
        assert!(filtered[0].events.is_empty());
    }
}
