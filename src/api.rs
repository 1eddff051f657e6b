use crate::models::{
    Activity, ActivityId, ActivityPayload, AiSuggestions, Category, CategoryId, NewCategory,
    StatsRow, ToggleResult,
};
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Categories every tracker starts with, in creation order.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Reading", "Workout", "Meals", "Habits", "Custom"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status code {}", .status.as_u16())]
    Status { status: StatusCode, body: String },
}

impl ApiError {
    /// The `error` field of a JSON error body, when the backend sent one.
    pub fn backend_message(&self) -> Option<String> {
        let ApiError::Status { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("error")
            .and_then(|error| error.as_str())
            .map(str::to_string)
    }

    pub fn user_message(&self) -> String {
        self.backend_message().unwrap_or_else(|| self.to_string())
    }
}

/// Thin client for the tracker backend. Every call maps one request to one
/// response; failures are handed back untouched.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch(self.http.get(self.url("/categories/"))).await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        let body = NewCategory {
            name: name.to_string(),
        };
        self.fetch(self.http.post(self.url("/categories/")).json(&body))
            .await
    }

    /// Creates whichever default categories are missing (names compared
    /// case-insensitively) and returns the existing categories followed by
    /// the ones just created.
    pub async fn ensure_default_categories(&self) -> Result<Vec<Category>, ApiError> {
        let mut categories = self.list_categories().await?;
        let missing = missing_defaults(&categories);
        for name in missing {
            info!("creating default category {name}");
            categories.push(self.create_category(name).await?);
        }
        Ok(categories)
    }

    pub async fn list_activities(&self) -> Result<Vec<Activity>, ApiError> {
        self.fetch(self.http.get(self.url("/activities/"))).await
    }

    pub async fn list_activities_by_date(
        &self,
        date: NaiveDate,
        category: Option<CategoryId>,
    ) -> Result<Vec<Activity>, ApiError> {
        let mut query = vec![("date", date.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        self.fetch(self.http.get(self.url("/activities/by-date/")).query(&query))
            .await
    }

    pub async fn stats_today(&self) -> Result<Vec<StatsRow>, ApiError> {
        self.fetch(self.http.get(self.url("/activities/stats-today/")))
            .await
    }

    pub async fn create_activity(&self, payload: &ActivityPayload) -> Result<Activity, ApiError> {
        self.fetch(self.http.post(self.url("/activities/")).json(payload))
            .await
    }

    pub async fn update_activity(
        &self,
        id: ActivityId,
        payload: &ActivityPayload,
    ) -> Result<Activity, ApiError> {
        self.fetch(
            self.http
                .put(self.url(&format!("/activities/{id}/")))
                .json(payload),
        )
        .await
    }

    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url(&format!("/activities/{id}/"))))
            .await?;
        Ok(())
    }

    pub async fn toggle_complete(&self, id: ActivityId) -> Result<ToggleResult, ApiError> {
        self.fetch(
            self.http
                .post(self.url(&format!("/activities/{id}/toggle-complete/"))),
        )
        .await
    }

    pub async fn ai_suggestions(&self, date: Option<NaiveDate>) -> Result<AiSuggestions, ApiError> {
        let mut request = self.http.get(self.url("/activities/ai_suggestions/"));
        if let Some(date) = date {
            request = request.query(&[("date", date.to_string())]);
        }
        self.fetch(request).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }
}

fn missing_defaults(existing: &[Category]) -> Vec<&'static str> {
    let names: HashSet<String> = existing
        .iter()
        .map(|category| category.name.to_lowercase())
        .collect();
    DEFAULT_CATEGORIES
        .into_iter()
        .filter(|name| !names.contains(&name.to_lowercase()))
        .collect()
}
