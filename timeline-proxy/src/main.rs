use std::{env, io, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{net::TcpListener, signal};

use timeline_parser::{
    parse_timeline, place, Group, Point, Popup, Size, Timeline, TimelineItem, TimelineWindow,
    DEFAULT_PADDING,
};

mod cache;
mod cli;

type Cache = Arc<cache::Cache<String, Timeline>>;

const LOG_ENV: &str = "TIMELINE_LOG";
const TIMELINE_PATH: &str = "/timeline";
const POPUP_PATH: &str = "/timeline/popup";
const CALENDAR_NAME: &str = "Timeline";

#[derive(Clone)]
struct AppState {
    sheet_url: Arc<String>,
    cache: Cache,
    client: reqwest::Client,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = cli::parse(env::args().skip(1));
    setup_logging();

    let state = AppState {
        sheet_url: Arc::new(args.sheet_url),
        cache: cache::Cache::new(args.cache),
        client: reqwest::Client::new(),
    };

    let listener = TcpListener::bind(args.address).await?;
    info!("Listening at http://{}", args.address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn setup_logging() {
    if env::var(LOG_ENV).is_err() {
        env::set_var(LOG_ENV, "timeline_proxy=info,timeline_parser=info");
    }

    pretty_env_logger::init_custom_env(LOG_ENV);
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(TIMELINE_PATH, get(handle_timeline))
        .route(POPUP_PATH, get(handle_popup))
        .fallback(|| async { (StatusCode::NOT_FOUND, "try GET /timeline") })
        .with_state(state)
}

#[derive(Debug, Error)]
enum FetchError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error! Status: {0}")]
    Status(StatusCode),
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_GATEWAY,
            format!("Failed to load timeline data. Error: {self}"),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
struct TimelineQuery {
    #[serde(default)]
    filter: String,
    #[serde(default)]
    ics: bool,
}

#[derive(Serialize)]
struct TimelinePayload<'a> {
    items: Vec<&'a TimelineItem>,
    groups: Vec<&'a Group>,
    window: TimelineWindow,
}

async fn handle_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Response, FetchError> {
    let timeline = fetch_timeline(&state).await?;

    if query.ics {
        return Ok((
            [("content-type", "text/calendar")],
            timeline.to_ics(CALENDAR_NAME).to_string(),
        )
            .into_response());
    }

    Ok(Json(TimelinePayload {
        items: timeline.filter(&query.filter),
        groups: timeline.ordered_groups(),
        window: TimelineWindow::default_for(Utc::now().date_naive()),
    })
    .into_response())
}

#[derive(Deserialize)]
struct PopupQuery {
    id: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    viewport_width: f64,
    viewport_height: f64,
    padding: Option<f64>,
}

#[derive(Serialize)]
struct PopupPayload {
    content: Popup,
    origin: Point,
}

async fn handle_popup(
    State(state): State<AppState>,
    Query(query): Query<PopupQuery>,
) -> Result<Response, FetchError> {
    let timeline = fetch_timeline(&state).await?;

    let Some(item) = timeline.item(&query.id) else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Item not found: {}", query.id),
        )
            .into_response());
    };

    let origin = place(
        Point::new(query.x, query.y),
        Size::new(query.width, query.height),
        Size::new(query.viewport_width, query.viewport_height),
        query.padding.unwrap_or(DEFAULT_PADDING),
    );

    Ok(Json(PopupPayload {
        content: Popup::for_item(item),
        origin,
    })
    .into_response())
}

async fn fetch_timeline(state: &AppState) -> Result<Arc<Timeline>, FetchError> {
    let url: &String = &state.sheet_url;

    if let Some(timeline) = state.cache.get(url).await {
        debug!("Serving cached timeline");
        return Ok(timeline);
    }

    info!("Fetching data from {url}");
    let response = state.client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let csv = response.text().await?;
    let timeline = parse_timeline(&csv);

    Ok(Arc::clone(&state.cache).insert(url.clone(), timeline).await)
}
