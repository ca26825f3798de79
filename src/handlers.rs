use crate::errors::AppError;
use crate::models::{
    NotifyRequest, NotifyResponse, PeriodOption, PeriodQuery, RangeResponse, SeriesOutcome,
};
use crate::notifications::{self, Level, Notification};
use crate::period::{PeriodToken, resolve};
use crate::source::load_series;
use crate::state::AppState;
use crate::storage::persist_preferences;
use crate::ui::render_index;
use crate::ui_state::{UiAction, UiState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let ui = state.ui.lock().await.clone();
    Html(render_index(&ui, &PeriodToken::ALL))
}

pub async fn list_periods() -> Json<Vec<PeriodOption>> {
    let options = PeriodToken::ALL
        .iter()
        .map(|token| PeriodOption {
            token: *token,
            label: token.label(),
        })
        .collect();
    Json(options)
}

pub async fn get_range(Query(query): Query<PeriodQuery>) -> Result<Json<RangeResponse>, AppError> {
    let (token, now) = period_and_now(&query)?;
    let range = resolve(token, now);
    Ok(Json(RangeResponse {
        period: token,
        day_count: range.day_count(),
        range,
    }))
}

pub async fn get_series(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<SeriesOutcome>, AppError> {
    let (token, now) = period_and_now(&query)?;
    let outcome = load_series(&state.source, token, now).await;

    if outcome.degraded {
        state.notifications.lock().await.enqueue(
            Level::Warning,
            "Client data is unavailable, showing an empty chart.",
            state.toast_ttl,
            Utc::now(),
        );
    } else {
        info!(%token, total = outcome.series.total(), "series built");
    }

    Ok(Json(outcome))
}

pub async fn get_ui(State(state): State<AppState>) -> Json<UiState> {
    Json(state.ui.lock().await.clone())
}

pub async fn apply_ui_action(
    State(state): State<AppState>,
    Json(action): Json<UiAction>,
) -> Result<Json<UiState>, AppError> {
    let mut ui = state.ui.lock().await;
    let previous = ui.clone();
    state.pipeline.apply(&mut ui, &action);

    let after = ui.preferences();
    if after != previous.preferences() {
        if let Err(err) = persist_preferences(&state.data_path, &after).await {
            *ui = previous;
            return Err(err);
        }
    }

    Ok(Json(ui.clone()))
}

pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.lock().await.visible(Utc::now()))
}

pub async fn notify(
    State(state): State<AppState>,
    Json(payload): Json<NotifyRequest>,
) -> Result<(StatusCode, Json<NotifyResponse>), AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let ttl = payload
        .ttl_secs
        .map(notifications::ttl)
        .unwrap_or(state.toast_ttl);
    let id = state
        .notifications
        .lock()
        .await
        .enqueue(payload.level, message, ttl, Utc::now());

    Ok((StatusCode::CREATED, Json(NotifyResponse { id })))
}

pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if state.notifications.lock().await.dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no notification with id {id}")))
    }
}

fn period_and_now(query: &PeriodQuery) -> Result<(PeriodToken, NaiveDateTime), AppError> {
    let token = query
        .period
        .as_deref()
        .map(PeriodToken::parse)
        .unwrap_or_default();

    let now = match query.at.as_deref() {
        Some(raw) => parse_at(raw)
            .ok_or_else(|| AppError::bad_request("at must be YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"))?,
        None => Local::now().naive_local(),
    };

    Ok((token, now))
}

fn parse_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
