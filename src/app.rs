use crate::calendar::{self, PresentDate};
use crate::catalog::Catalog;
use crate::config::{Config, DEFAULT_TIMEZONE};
use crate::fetch::{FetchError, LivechartSource, SchedulePreferences, ScheduleSource};
use crate::logger::{Event, Logger};
use crate::render::{
    ANIME_SCHEDULE_TITLE, CALENDAR_TITLE, render_anime_schedule, render_calendar,
    render_calendar_not_found, widget_response,
};
use crate::schedule::{self, Extraction, StructuralError, Window};
use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub source: Arc<dyn ScheduleSource>,
    pub logger: Logger,
}

pub fn build_router(config: Arc<Config>, catalog: Arc<Catalog>, logger: Logger) -> Result<Router> {
    let source = Arc::new(LivechartSource::new(&config.schedule)?) as Arc<dyn ScheduleSource>;
    Ok(build_router_with_source(config, catalog, logger, source))
}

pub fn build_router_with_source(
    config: Arc<Config>,
    catalog: Arc<Catalog>,
    logger: Logger,
    source: Arc<dyn ScheduleSource>,
) -> Router {
    let state = Arc::new(AppState {
        config,
        catalog,
        source,
        logger,
    });

    Router::new()
        .route("/healthz", get(handle_healthz))
        .route("/anime", get(handle_anime))
        .route("/anime-schedule", get(handle_anime_schedule))
        .route("/calendar", get(handle_calendar))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

#[derive(Debug)]
enum ApiError {
    NotFound(&'static str),
    Upstream(FetchError),
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message })).into_response()
            }
            ApiError::Upstream(error) => {
                let message = error.to_string();
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse {
                        error: message.as_str(),
                    }),
                )
                    .into_response()
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal Server Error",
                }),
            )
                .into_response(),
        }
    }
}

type ApiResponse = Result<Response, ApiError>;

async fn handle_healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

#[derive(Deserialize)]
struct AnimeQuery {
    timezone: Option<String>,
}

async fn handle_anime(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnimeQuery>,
) -> ApiResponse {
    let markup = fetch_markup(&state, query.timezone).await?;
    let extraction = schedule::full_schedule(&markup).map_err(|error| {
        log_structural_error(&state.logger, &error);
        ApiError::Internal
    })?;
    log_extraction(&state.logger, "/anime", &extraction);

    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok((StatusCode::OK, headers, Json(extraction.schedule)).into_response())
}

#[derive(Deserialize)]
struct AnimeScheduleQuery {
    timezone: Option<String>,
    list: Option<String>,
    full: Option<String>,
}

async fn handle_anime_schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnimeScheduleQuery>,
) -> ApiResponse {
    let list = match query.list.as_deref() {
        Some(name) => Some(
            state
                .catalog
                .list(name)
                .ok_or(ApiError::NotFound("Unknown list"))?,
        ),
        None => None,
    };
    let window = Window::from_full_flag(query.full.as_deref() == Some("true"));

    let markup = fetch_markup(&state, query.timezone).await?;
    let extraction = schedule::widget_schedule(&markup, list, window).map_err(|error| {
        log_structural_error(&state.logger, &error);
        ApiError::Internal
    })?;
    log_extraction(&state.logger, "/anime-schedule", &extraction);

    let html = render_anime_schedule(&extraction.schedule).map_err(|error| {
        log_render_error(&state.logger, "anime_schedule", &error);
        ApiError::Internal
    })?;
    Ok(widget_response(ANIME_SCHEDULE_TITLE, html))
}

#[derive(Deserialize)]
struct CalendarQuery {
    calendar: Option<String>,
}

async fn handle_calendar(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> ApiResponse {
    let name = query.calendar.unwrap_or_default();
    let today = PresentDate::now_in(state.config.calendar_timezone);

    let rendered = match calendar::lookup(state.catalog.calendars(), &name, today) {
        Ok(view) => render_calendar(&view),
        Err(not_found) => {
            state
                .logger
                .log(Event::CalendarNotFound, json!({ "calendar": not_found.0 }));
            render_calendar_not_found(&name)
        }
    };
    let html = rendered.map_err(|error| {
        log_render_error(&state.logger, "calendar", &error);
        ApiError::Internal
    })?;
    Ok(widget_response(CALENDAR_TITLE, html))
}

async fn fetch_markup(state: &AppState, timezone: Option<String>) -> Result<String, ApiError> {
    let time_zone = timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    let preferences =
        SchedulePreferences::new(time_zone, state.config.schedule.title_language.as_str());

    state
        .source
        .fetch_schedule(&preferences)
        .await
        .map_err(|error| {
            state.logger.log(
                Event::ScheduleFetchFailed,
                json!({
                    "timeZone": preferences.time_zone,
                    "error": error.to_string(),
                    "debug": format!("{error:?}"),
                }),
            );
            ApiError::Upstream(error)
        })
}

fn log_structural_error(logger: &Logger, error: &StructuralError) {
    logger.log(
        Event::ScheduleExtractFailed,
        json!({
            "kind": error.kind,
            "day": error.day,
            "timeslot": error.timeslot,
            "error": error.to_string(),
        }),
    );
}

fn log_render_error(logger: &Logger, template: &str, error: &askama::Error) {
    logger.log(
        Event::RenderFailed,
        json!({ "template": template, "error": error.to_string() }),
    );
}

fn log_extraction(logger: &Logger, route: &str, extraction: &Extraction) {
    if !logger.enabled(Event::ScheduleExtracted) {
        return;
    }
    let events: usize = extraction
        .schedule
        .iter()
        .map(|day| day.events.len())
        .sum();
    logger.log(
        Event::ScheduleExtracted,
        json!({
            "route": route,
            "days": extraction.schedule.len(),
            "events": events,
            "end": extraction.end,
        }),
    );
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

async fn log_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response<Body> {
    let request_id = resolve_request_id(request.headers());
    let method = request.method().clone();
    let raw_url = request.uri().to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string());
    let started_at = Instant::now();

    state.logger.log(
        Event::RequestReceived,
        json!({
            "requestId": request_id,
            "method": method.as_str(),
            "rawUrl": raw_url,
            "clientIp": client_ip,
        }),
    );

    let mut response = next.run(request).await;
    let duration_ms = started_at.elapsed().as_secs_f64() * 1000.0;

    state.logger.log(
        Event::RequestCompleted,
        json!({
            "requestId": request_id,
            "method": method.as_str(),
            "rawUrl": raw_url,
            "statusCode": response.status().as_u16(),
            "durationMs": duration_ms,
        }),
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
