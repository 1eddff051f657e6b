//! An in-process stand-in for the tracker backend, speaking the same REST
//! surface under `/api`.
#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use solo_tracker::models::{Activity, ActivityPayload, Category, StatsRow};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub struct Backend {
    pub categories: Vec<Category>,
    pub activities: Vec<Activity>,
    pub stats: Vec<StatsRow>,
    pub ai: Option<Result<String, String>>,
    /// When set, AI suggestion requests wait for a notification before
    /// answering.
    pub ai_gate: Option<Arc<Notify>>,
    pub fail_by_date: bool,
    pub log: Vec<String>,
    next_id: i64,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Backend>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Backend) -> R) -> R {
        let mut backend = self.inner.lock().unwrap();
        f(&mut backend)
    }

    pub fn add_category(&self, name: &str) -> Category {
        self.with(|backend| {
            let category = Category {
                id: backend.next_id(),
                name: name.to_string(),
            };
            backend.categories.push(category.clone());
            category
        })
    }

    pub fn add_activity(&self, title: &str, category: i64, at: DateTime<Utc>) -> Activity {
        self.with(|backend| {
            let activity = Activity {
                id: backend.next_id(),
                title: title.to_string(),
                description: Some(String::new()),
                category,
                category_name: None,
                start_time: Some(at),
                end_time: None,
                duration_minutes: None,
                reminder_time: None,
                completed: false,
                created_at: Some(at),
                updated_at: Some(at),
            };
            backend.activities.push(activity.clone());
            activity
        })
    }

    pub fn log(&self) -> Vec<String> {
        self.with(|backend| backend.log.clone())
    }

    pub fn clear_log(&self) {
        self.with(|backend| backend.log.clear());
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/categories/", get(list_categories).post(create_category))
            .route("/api/activities/", get(list_activities).post(create_activity))
            .route("/api/activities/by-date/", get(by_date))
            .route("/api/activities/stats-today/", get(stats_today))
            .route("/api/activities/ai_suggestions/", get(ai_suggestions))
            .route("/api/activities/:id/", put(update_activity).delete(delete_activity))
            .route("/api/activities/:id/toggle-complete/", post(toggle_complete))
            .with_state(self.clone())
    }

    /// Serves on the current runtime; returns the `/api` base URL.
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    /// Serves on a dedicated thread so the backend outlives any single test
    /// runtime.
    pub fn serve_detached(&self) -> String {
        let backend = self.clone();
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let url = backend.serve().await;
                tx.send(url).unwrap();
                std::future::pending::<()>().await;
            });
        });
        rx.recv().unwrap()
    }
}

async fn list_categories(State(fake): State<FakeBackend>) -> Json<Vec<Category>> {
    fake.with(|backend| {
        backend.log.push("GET /categories/".into());
        Json(backend.categories.clone())
    })
}

#[derive(Deserialize)]
struct NewCategory {
    name: String,
}

async fn create_category(
    State(fake): State<FakeBackend>,
    Json(body): Json<NewCategory>,
) -> Response {
    fake.with(|backend| {
        backend.log.push(format!("POST /categories/ {}", body.name));
        if backend.categories.iter().any(|c| c.name == body.name) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "name": ["activity category with this name already exists."] })),
            )
                .into_response();
        }
        let category = Category {
            id: backend.next_id(),
            name: body.name,
        };
        backend.categories.push(category.clone());
        (StatusCode::CREATED, Json(category)).into_response()
    })
}

async fn list_activities(State(fake): State<FakeBackend>) -> Json<Vec<Activity>> {
    fake.with(|backend| Json(backend.activities.clone()))
}

fn from_payload(id: i64, payload: ActivityPayload) -> Activity {
    Activity {
        id,
        title: payload.title,
        description: Some(payload.description),
        category: payload.category.unwrap_or_default(),
        category_name: None,
        start_time: payload.start_time,
        end_time: payload.end_time,
        duration_minutes: payload.duration_minutes,
        reminder_time: payload.reminder_time,
        completed: payload.completed,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

async fn create_activity(
    State(fake): State<FakeBackend>,
    Json(payload): Json<ActivityPayload>,
) -> Response {
    fake.with(|backend| {
        backend.log.push(format!("POST /activities/ {}", payload.title));
        if payload.category.is_none() {
            return (StatusCode::BAD_REQUEST, Json(json!({ "category": ["required"] })))
                .into_response();
        }
        let activity = from_payload(backend.next_id(), payload);
        backend.activities.push(activity.clone());
        (StatusCode::CREATED, Json(activity)).into_response()
    })
}

async fn update_activity(
    State(fake): State<FakeBackend>,
    Path(id): Path<i64>,
    Json(payload): Json<ActivityPayload>,
) -> Response {
    fake.with(|backend| {
        backend.log.push(format!("PUT /activities/{id}/"));
        let Some(slot) = backend.activities.iter_mut().find(|a| a.id == id) else {
            return StatusCode::NOT_FOUND.into_response();
        };
        let created_at = slot.created_at;
        *slot = from_payload(id, payload);
        slot.created_at = created_at;
        Json(slot.clone()).into_response()
    })
}

async fn delete_activity(State(fake): State<FakeBackend>, Path(id): Path<i64>) -> StatusCode {
    fake.with(|backend| {
        backend.log.push(format!("DELETE /activities/{id}/"));
        let before = backend.activities.len();
        backend.activities.retain(|a| a.id != id);
        if backend.activities.len() == before {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::NO_CONTENT
        }
    })
}

async fn toggle_complete(State(fake): State<FakeBackend>, Path(id): Path<i64>) -> Response {
    fake.with(|backend| {
        backend.log.push(format!("POST /activities/{id}/toggle-complete/"));
        let Some(activity) = backend.activities.iter_mut().find(|a| a.id == id) else {
            return StatusCode::NOT_FOUND.into_response();
        };
        activity.completed = !activity.completed;
        Json(json!({ "id": activity.id, "completed": activity.completed })).into_response()
    })
}

#[derive(Deserialize)]
struct ByDate {
    date: Option<String>,
    category: Option<i64>,
}

fn day_of(activity: &Activity) -> Option<NaiveDate> {
    activity
        .start_time
        .or(activity.end_time)
        .or(activity.created_at)
        .map(|at| at.date_naive())
}

async fn by_date(State(fake): State<FakeBackend>, Query(query): Query<ByDate>) -> Response {
    fake.with(|backend| {
        backend.log.push(format!(
            "GET /activities/by-date/ date={} category={}",
            query.date.as_deref().unwrap_or(""),
            query.category.map(|id| id.to_string()).unwrap_or_default()
        ));
        if backend.fail_by_date {
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
        let Some(date) = query.date.as_deref().and_then(|d| d.parse::<NaiveDate>().ok()) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Missing 'date' query param YYYY-MM-DD." })),
            )
                .into_response();
        };
        let items: Vec<Activity> = backend
            .activities
            .iter()
            .filter(|a| day_of(a) == Some(date))
            .filter(|a| query.category.is_none_or(|id| a.category == id))
            .cloned()
            .collect();
        Json(items).into_response()
    })
}

async fn stats_today(State(fake): State<FakeBackend>) -> Json<Vec<StatsRow>> {
    fake.with(|backend| {
        backend.log.push("GET /activities/stats-today/".into());
        Json(backend.stats.clone())
    })
}

#[derive(Deserialize)]
struct AiQuery {
    date: Option<String>,
}

async fn ai_suggestions(State(fake): State<FakeBackend>, Query(query): Query<AiQuery>) -> Response {
    let date = query.date.unwrap_or_default();
    let gate = fake.with(|backend| {
        backend.log.push(format!("GET /activities/ai_suggestions/ date={date}"));
        backend.ai_gate.clone()
    });
    if let Some(gate) = gate {
        gate.notified().await;
    }
    fake.with(|backend| {
        match backend.ai.clone() {
            Some(Ok(text)) => {
                Json(json!({ "date": date, "count": 0, "suggestions": text })).into_response()
            }
            Some(Err(message)) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": message })),
            )
                .into_response(),
            None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    })
}
