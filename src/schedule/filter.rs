use crate::schedule::model::{FilterList, Schedule};

/// Keeps only events whose title is on `list`, day by day.
///
/// Titles are compared exactly. Days stay in place even when nothing is left.
pub fn apply_filter(schedule: Schedule, list: Option<&FilterList>) -> Schedule {
    let Some(list) = list else {
        return schedule;
    };

    schedule
        .into_iter()
        .map(|mut day| {
            day.events.retain(|event| list.allows(&event.title));
            day
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::model::{AnimeEvent, ScheduleDay};
    use pretty_assertions::assert_eq;

    fn event(title: &str, timestamp: i64) -> AnimeEvent {
        AnimeEvent {
            title: title.into(),
            episode_label: "EP1".into(),
            time_label: "12:00 PM".into(),
            timestamp,
            image_url: format!("https://img.test/{timestamp}.jpg"),
        }
    }

    fn schedule() -> Schedule {
        vec![
            ScheduleDay {
                label: "Sun".into(),
                events: vec![event("Dandadan", 1), event("Frieren", 2), event("Bleach", 3)],
            },
            ScheduleDay {
                label: "Mon".into(),
                events: vec![event("One Piece", 4)],
            },
        ]
    }

    fn is_subsequence(small: &[AnimeEvent], large: &[AnimeEvent]) -> bool {
        let mut rest = large.iter();
        small.iter().all(|item| rest.any(|candidate| candidate == item))
    }

    #[test]
    fn no_list_is_identity() {
        assert_eq!(apply_filter(schedule(), None), schedule());
    }

    #[test]
    fn keeps_listed_titles_in_order_and_keeps_empty_days() {
        let list = FilterList::new("mine", ["Bleach", "Dandadan"]);
        let filtered = apply_filter(schedule(), Some(&list));

        assert_eq!(filtered.len(), 2);
        let titles: Vec<&str> = filtered[0]
            .events
            .iter()
            .map(|event| event.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Dandadan", "Bleach"]);
        assert_eq!(filtered[1].label, "Mon");
        assert!(filtered[1].events.is_empty());

        for (after, before) in filtered.iter().zip(schedule().iter()) {
            assert!(is_subsequence(&after.events, &before.events));
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        let list = FilterList::new("mine", ["dandadan", "Frieren "]);
        let filtered = apply_filter(schedule(), Some(&list));
        assert!(filtered.iter().all(|day| day.events.is_empty()));
    }
}
