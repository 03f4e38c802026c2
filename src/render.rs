use askama::Template;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};

use crate::calendar::{CalendarMonth, CalendarView, PresentDate};
use crate::schedule::ScheduleDay;

pub const WIDGET_TITLE: HeaderName = HeaderName::from_static("widget-title");
pub const WIDGET_CONTENT_TYPE: HeaderName = HeaderName::from_static("widget-content-type");

pub const ANIME_SCHEDULE_TITLE: &str = "Anime Schedule";
pub const CALENDAR_TITLE: &str = "Calendar";

#[derive(Template)]
#[template(path = "anime_schedule.html")]
struct AnimeScheduleTemplate<'a> {
    days: &'a [ScheduleDay],
}

#[derive(Template)]
#[template(path = "calendar.html")]
struct CalendarTemplate<'a> {
    name: &'a str,
    month: Option<&'a CalendarMonth>,
    today: &'a PresentDate,
    no_calendar: bool,
}

#[derive(Template)]
#[template(path = "calendar_not_found.html")]
struct CalendarNotFoundTemplate<'a> {
    name: &'a str,
}

pub fn render_anime_schedule(days: &[ScheduleDay]) -> askama::Result<String> {
    AnimeScheduleTemplate { days }.render()
}

pub fn render_calendar(view: &CalendarView<'_>) -> askama::Result<String> {
    CalendarTemplate {
        name: view.name,
        month: view.month,
        today: &view.today,
        no_calendar: view.no_calendar,
    }
    .render()
}

pub fn render_calendar_not_found(name: &str) -> askama::Result<String> {
    CalendarNotFoundTemplate { name }.render()
}

/// HTML fragment with the headers dashboard widgets read.
pub fn widget_response(title: &'static str, html: String) -> Response<Body> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(WIDGET_TITLE, HeaderValue::from_static(title));
    headers.insert(WIDGET_CONTENT_TYPE, HeaderValue::from_static("html"));
    (StatusCode::OK, headers, html).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::AnimeEvent;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sunday() -> Vec<ScheduleDay> {
        vec![ScheduleDay {
            label: "Sunday Oct 18".into(),
            events: vec![AnimeEvent {
                title: "Tom & Jerry <Reboot>".into(),
                episode_label: "EP5".into(),
                time_label: "1:00 AM".into(),
                timestamp: 1792285200,
                image_url: "https://img.test/tj.jpg".into(),
            }],
        }]
    }

    #[test]
    fn schedule_html_escapes_titles() {
        let html = render_anime_schedule(&sunday()).unwrap();
        assert!(html.contains("Sunday Oct 18"));
        assert!(html.contains("Tom &#38; Jerry &#60;Reboot&#62;"));
        assert!(html.contains(r#"data-dynamic-relative-time="1792285200""#));
        assert!(!html.contains("<Reboot>"));
    }

    #[test]
    fn empty_schedule_renders_placeholder_text() {
        let html = render_anime_schedule(&[]).unwrap();
        assert!(html.contains("No anime airing"));
    }

    #[test]
    fn calendar_marks_today_and_no_calendar() {
        let month = CalendarMonth {
            month: "October".into(),
            days: vec![],
        };
        let today = PresentDate::from_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let view = CalendarView {
            name: "conventions",
            month: None,
            months: std::slice::from_ref(&month),
            today,
            no_calendar: true,
        };
        let html = render_calendar(&view).unwrap();
        assert!(html.contains("Sunday, October 18, 2026"));
        assert!(html.contains("No calendar for October"));
    }

    #[test]
    fn not_found_escapes_only_the_name() {
        let html = render_calendar_not_found("a<b").unwrap();
        assert_eq!(
            html.trim(),
            r#"<p class="color-negative">Calendar "a&#60;b" not found</p>"#
        );
    }

    #[test]
    fn widget_headers_are_set() {
        let response = widget_response(CALENDAR_TITLE, "<p>hi</p>".into());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[&WIDGET_TITLE], "Calendar");
        assert_eq!(response.headers()[&WIDGET_CONTENT_TYPE], "html");
    }
}
