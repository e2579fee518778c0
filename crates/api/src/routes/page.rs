//! The human-readable page at `/`.
//!
//! Rendered from the latest reading on every request. The page refreshes
//! itself so a browser left open keeps tracking the device.

use std::fmt::Write as _;

use axum::extract::State;
use axum::response::Html;
use axum::{routing::get, Router};
use chrono::Utc;

use sensorlink_core::reading::{Freshness, Reading};

use crate::state::AppState;

/// Seconds between automatic browser reloads.
const REFRESH_SECS: u32 = 5;

const WAITING_TEXT: &str = "Waiting for data...";

/// GET /
async fn index(State(state): State<AppState>) -> Html<String> {
    let reading = state.store.latest();
    let freshness = reading.freshness(Utc::now(), state.config.stale_after());
    Html(render_page(&reading, freshness))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// Render the full HTML document for one reading.
pub fn render_page(reading: &Reading, freshness: Freshness) -> String {
    let received_at = if reading.is_placeholder() {
        WAITING_TEXT.to_string()
    } else {
        reading
            .received_at()
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
    };

    let banner = match freshness {
        Freshness::Waiting => Some("No data received from the device yet."),
        Freshness::Stale => Some("The device has stopped reporting; values may be out of date."),
        Freshness::Fresh => None,
    };

    let mut html = String::with_capacity(1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"{REFRESH_SECS}\">");
    html.push_str("<title>Sensor station</title>\n</head>\n<body>\n");
    html.push_str("<h1>Environment readings</h1>\n");

    if let Some(text) = banner {
        let _ = writeln!(
            html,
            "<p class=\"status {}\">{}</p>",
            freshness.as_str(),
            escape_html(text)
        );
    }

    html.push_str("<table>\n");
    row(&mut html, "Temperature", &format!("{:.1} &deg;C", reading.temperature()));
    row(&mut html, "Humidity", &format!("{:.1} %", reading.humidity()));
    row(&mut html, "Pressure", &format!("{:.1} hPa", reading.pressure()));
    row(&mut html, "Device time", &escape_html(reading.device_time()));
    row(&mut html, "Received at", &escape_html(&received_at));
    html.push_str("</table>\n</body>\n</html>\n");

    html
}

/// `value` must already be escaped.
fn row(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(html, "<tr><th>{label}</th><td>{value}</td></tr>");
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
