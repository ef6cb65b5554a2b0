// src/api.rs
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::events::{resolve, Aggregator, Event, EventDetail, Resolution};
use crate::schedule::{calendar_entries, pending_notifications, CalendarEntry, PendingNotification};
use crate::sources::{Picture, PictureSource};
use crate::store::{FileStore, KeyValueStore, Reminder, ReminderStore, Settings, SettingsStore};

#[derive(Clone)]
pub struct AppState {
    aggregator: Aggregator,
    pictures: Arc<dyn PictureSource>,
    reminders: ReminderStore,
    settings: SettingsStore,
}

impl AppState {
    pub fn new(aggregator: Aggregator, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            pictures: aggregator.pictures(),
            aggregator,
            reminders: ReminderStore::new(Arc::clone(&kv)),
            settings: SettingsStore::new(kv),
        }
    }

    /// Live NASA clients plus a file-backed store under `cfg.data_dir`.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let aggregator = Aggregator::from_config(cfg)?;
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&cfg.data_dir)?);
        Ok(Self::new(aggregator, kv))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/reminder", post(toggle_event_reminder))
        .route("/calendar", get(calendar))
        .route("/apod", get(apod))
        .route("/reminders", get(list_reminders).post(add_reminder))
        .route("/reminders/custom", post(add_custom_reminder))
        .route("/reminders/notifications", get(reminder_notifications))
        .route("/reminders/{id}", delete(remove_reminder))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/settings/reset", post(reset_settings))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!(target: "store", error = ?e, "store operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
}

async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.aggregator.upcoming_events().await)
}

async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> Json<EventDetail> {
    Json(resolve(&state.aggregator, &id).await.into_detail())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReminderState {
    id: String,
    reminder_set: bool,
}

async fn toggle_event_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReminderState>, ApiError> {
    let Resolution::Found(detail) = resolve(&state.aggregator, &id).await else {
        return Err((StatusCode::NOT_FOUND, format!("no event '{id}' in the current feed")));
    };
    let reminder_set = state.reminders.toggle(&detail.event).map_err(internal)?;
    tracing::info!(target: "store", id = detail.event.id, reminder_set, "reminder toggled");
    Ok(Json(ReminderState {
        id: detail.event.id.to_string(),
        reminder_set,
    }))
}

async fn calendar(State(state): State<AppState>) -> Json<Vec<CalendarEntry>> {
    let feed = state.aggregator.upcoming_events().await;
    let reminders = state.reminders.list();
    Json(calendar_entries(&feed, &reminders))
}

/// `?date=YYYY-MM-DD`, defaulting to today. Always answers with a picture.
async fn apod(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Picture> {
    let date = q
        .get("date")
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());
    let pic = match state.pictures.picture(date).await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(target: "sources", error = ?e, %date, "apod lookup failed");
            Picture::fallback(date)
        }
    };
    Json(pic)
}

async fn list_reminders(State(state): State<AppState>) -> Json<Vec<Reminder>> {
    Json(state.reminders.list())
}

async fn add_reminder(
    State(state): State<AppState>,
    Json(body): Json<Reminder>,
) -> Result<(StatusCode, Json<Vec<Reminder>>), ApiError> {
    if body.id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "reminder id is required".to_string()));
    }
    let added = state.reminders.add(body).map_err(internal)?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(state.reminders.list())))
}

async fn add_custom_reminder(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let r = state.reminders.add_custom(Utc::now()).map_err(internal)?;
    Ok((StatusCode::CREATED, Json(r)))
}

async fn remove_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.reminders.remove(&id).map_err(internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("no reminder '{id}'")))
    }
}

/// Upcoming notification times, using the configured lead time.
/// Empty while notifications are switched off.
async fn reminder_notifications(State(state): State<AppState>) -> Json<Vec<PendingNotification>> {
    let settings = state.settings.load();
    if !settings.notifications {
        return Json(Vec::new());
    }
    let reminders = state.reminders.list();
    Json(pending_notifications(
        &reminders,
        settings.notification_time,
        Utc::now(),
    ))
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.load())
}

async fn put_settings(
    State(state): State<AppState>,
    Json(body): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    state.settings.save(&body).map_err(internal)?;
    Ok(Json(body))
}

async fn reset_settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.settings.reset().map_err(internal)?))
}
