use crate::dashboard::{AiPanel, Modal, REQUEST_FAILED_NOTICE, Snapshot, today};
use crate::errors::AppError;
use crate::models::{
    Activity, ActivityForm, ActivityId, AiRequest, CategoryId, CategoryRequest, Goals,
    SelectRequest, StreakResponse, TabRequest,
};
use crate::state::AppState;
use crate::ui::{render_dashboard, render_welcome};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let form = state.dashboard.form_defaults().await;
    let snapshot = state.dashboard.snapshot().await;
    // Notices are shown once, like an alert.
    state.dashboard.take_notice().await;
    Html(render_dashboard(&snapshot, &form))
}

pub async fn welcome() -> Html<String> {
    Html(render_welcome())
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.dashboard.snapshot().await)
}

pub async fn refresh(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    state.dashboard.refresh().await?;
    Ok(Json(state.dashboard.snapshot().await))
}

pub async fn select(
    State(state): State<AppState>,
    Form(payload): Form<SelectRequest>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&payload.date)?.unwrap_or_else(today);
    let category = parse_category(&payload.category)?;

    if let Err(err) = state.dashboard.select(date, category).await {
        warn!("refresh after selection failed: {err}");
        state.dashboard.set_notice(REQUEST_FAILED_NOTICE).await;
    }
    Ok(Redirect::to("/"))
}

pub async fn tab(State(state): State<AppState>, Form(payload): Form<TabRequest>) -> Redirect {
    state.dashboard.set_tab(payload.tab).await;
    Redirect::to("/")
}

pub async fn add_category(
    State(state): State<AppState>,
    Form(payload): Form<CategoryRequest>,
) -> Redirect {
    state.dashboard.quick_add_category(&payload.name).await;
    Redirect::to("/")
}

pub async fn goals(
    State(state): State<AppState>,
    Form(fields): Form<BTreeMap<String, String>>,
) -> Redirect {
    state.dashboard.save_goals(Goals::from_form(&fields)).await;
    state.dashboard.close_modal().await;
    Redirect::to("/")
}

pub async fn open_add(State(state): State<AppState>) -> Redirect {
    state.dashboard.open_modal(Modal::AddActivity).await;
    Redirect::to("/")
}

pub async fn open_goals(State(state): State<AppState>) -> Redirect {
    state.dashboard.open_modal(Modal::Goals).await;
    Redirect::to("/")
}

pub async fn close_modal(State(state): State<AppState>) -> Redirect {
    state.dashboard.close_modal().await;
    Redirect::to("/")
}

pub async fn submit_activity(
    State(state): State<AppState>,
    Form(form): Form<ActivityForm>,
) -> Redirect {
    if let Err(err) = state.dashboard.submit_activity(form).await {
        warn!("saving activity failed: {err}");
        state.dashboard.set_notice(REQUEST_FAILED_NOTICE).await;
    }
    Redirect::to("/")
}

pub async fn update_activity(
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
    Form(form): Form<ActivityForm>,
) -> Redirect {
    match state.dashboard.update_activity(id, form).await {
        Ok(_) => state.dashboard.close_modal().await,
        Err(err) => {
            warn!("updating activity {id} failed: {err}");
            state.dashboard.set_notice(REQUEST_FAILED_NOTICE).await;
        }
    }
    Redirect::to("/")
}

pub async fn edit_activity(
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
) -> Result<Redirect, AppError> {
    if !state.dashboard.begin_edit(id).await {
        return Err(AppError::not_found(format!("activity {id} is not on the dashboard")));
    }
    Ok(Redirect::to("/"))
}

pub async fn delete_activity(State(state): State<AppState>, Path(id): Path<ActivityId>) -> Redirect {
    if let Err(err) = state.dashboard.delete_activity(id).await {
        warn!("deleting activity {id} failed: {err}");
        state.dashboard.set_notice(REQUEST_FAILED_NOTICE).await;
    }
    Redirect::to("/")
}

pub async fn toggle_activity(State(state): State<AppState>, Path(id): Path<ActivityId>) -> Redirect {
    if let Err(err) = state.dashboard.toggle_complete(id).await {
        warn!("toggling activity {id} failed: {err}");
        state.dashboard.set_notice(REQUEST_FAILED_NOTICE).await;
    }
    Redirect::to("/")
}

pub async fn open_ai(
    State(state): State<AppState>,
    Form(payload): Form<AiRequest>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&payload.date)?.unwrap_or_else(today);
    let generation = state.dashboard.begin_ai(date).await;
    let dashboard = Arc::clone(&state.dashboard);
    tokio::spawn(async move {
        dashboard.load_ai(date, generation).await;
    });
    Ok(Redirect::to("/"))
}

pub async fn close_ai(State(state): State<AppState>) -> Redirect {
    state.dashboard.close_ai().await;
    Redirect::to("/")
}

pub async fn get_ai(
    State(state): State<AppState>,
    Query(payload): Query<AiRequest>,
) -> Result<Json<AiPanel>, AppError> {
    let date = parse_date(&payload.date)?.unwrap_or_else(today);
    Ok(Json(state.dashboard.open_ai(date).await))
}

pub async fn create_activity_json(
    State(state): State<AppState>,
    Json(form): Json<ActivityForm>,
) -> Result<Json<Activity>, AppError> {
    Ok(Json(state.dashboard.create_activity(form).await?))
}

pub async fn toggle_json(
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
) -> Result<Json<StreakResponse>, AppError> {
    let streak = state.dashboard.toggle_complete(id).await?;
    Ok(Json(StreakResponse { streak }))
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))
}

fn parse_category(value: &str) -> Result<Option<CategoryId>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::bad_request("category must be a category id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_optional_but_strict() {
        assert_eq!(parse_date("  ").unwrap(), None);
        assert_eq!(
            parse_date("2026-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
        assert!(parse_date("28/02/2026").is_err());
    }

    #[test]
    fn empty_category_means_all() {
        assert_eq!(parse_category("").unwrap(), None);
        assert_eq!(parse_category("4").unwrap(), Some(4));
        assert!(parse_category("four").is_err());
    }
}
