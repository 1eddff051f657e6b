use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type CategoryId = i64;
pub type ActivityId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: CategoryId,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub reminder_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// How an activity's timing is presented: a start/end pair wins over a
/// duration, and an activity with neither is unscheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Span {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Duration(u32),
    Unscheduled,
}

impl Activity {
    pub fn schedule(&self) -> Schedule {
        match (self.start_time, self.end_time, self.duration_minutes) {
            (Some(start), Some(end), _) => Schedule::Span { start, end },
            (_, _, Some(minutes)) if minutes > 0 => Schedule::Duration(minutes),
            _ => Schedule::Unscheduled,
        }
    }
}

/// Body sent when creating or updating an activity. Absent values go out as
/// explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPayload {
    pub title: String,
    pub description: String,
    pub category: Option<CategoryId>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub reminder_time: Option<DateTime<Utc>>,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    pub category: Category,
    pub seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResult {
    pub id: ActivityId,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSuggestions {
    pub suggestions: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Goal {
    pub minutes: f64,
}

impl Goal {
    pub fn new(minutes: f64) -> Self {
        Self {
            minutes: clamp_minutes(minutes),
        }
    }

    pub fn minutes(&self) -> f64 {
        clamp_minutes(self.minutes)
    }
}

fn clamp_minutes(minutes: f64) -> f64 {
    if minutes.is_finite() { minutes.max(0.0) } else { 0.0 }
}

/// Per-category minute goals, keyed by the category id rendered as a string
/// so the JSON form matches what is stored under `goals_v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Goals(pub BTreeMap<String, Goal>);

impl Goals {
    pub fn minutes_for(&self, category: CategoryId) -> f64 {
        self.0
            .get(&category.to_string())
            .map(Goal::minutes)
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, category: CategoryId, minutes: f64) {
        self.0.insert(category.to_string(), Goal::new(minutes));
    }

    /// Goals form input: anything that isn't a number counts as zero.
    pub fn from_form(fields: &BTreeMap<String, String>) -> Self {
        let mut goals = Goals::default();
        for (key, value) in fields {
            let Some(id) = key.strip_prefix("goal_") else {
                continue;
            };
            let Ok(id) = id.parse::<CategoryId>() else {
                continue;
            };
            goals.set(id, value.trim().parse::<f64>().unwrap_or(0.0));
        }
        goals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Todo,
    Done,
}

impl Tab {
    pub fn shows(&self, activity: &Activity) -> bool {
        match self {
            Tab::Todo => !activity.completed,
            Tab::Done => activity.completed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: Tab,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AiRequest {
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreakResponse {
    pub streak: u64,
}

const FORM_DATETIME: &str = "%Y-%m-%dT%H:%M";

/// The add/edit activity form as submitted by the browser: every field is
/// a string and `datetime-local` inputs carry local wall-clock time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub duration_minutes: String,
    #[serde(default)]
    pub reminder_time: String,
    #[serde(default)]
    pub completed: Option<String>,
}

impl ActivityForm {
    pub fn empty(default_category: Option<CategoryId>) -> Self {
        Self {
            category: default_category.map(|id| id.to_string()).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            title: activity.title.clone(),
            description: activity.description.clone().unwrap_or_default(),
            category: activity.category.to_string(),
            start_time: to_form_datetime(activity.start_time),
            end_time: to_form_datetime(activity.end_time),
            duration_minutes: activity
                .duration_minutes
                .map(|minutes| minutes.to_string())
                .unwrap_or_default(),
            reminder_time: to_form_datetime(activity.reminder_time),
            completed: activity.completed.then(|| "on".to_string()),
        }
    }

    pub fn into_payload(self) -> ActivityPayload {
        ActivityPayload {
            category: self.category.trim().parse().ok().filter(|id| *id != 0),
            duration_minutes: self
                .duration_minutes
                .trim()
                .parse()
                .ok()
                .filter(|minutes| *minutes > 0),
            start_time: from_form_datetime(&self.start_time),
            end_time: from_form_datetime(&self.end_time),
            reminder_time: from_form_datetime(&self.reminder_time),
            completed: self.completed.is_some_and(|value| !value.is_empty()),
            title: self.title,
            description: self.description,
        }
    }
}

fn to_form_datetime(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|at| at.with_timezone(&Local).format(FORM_DATETIME).to_string())
        .unwrap_or_default()
}

fn from_form_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(value, FORM_DATETIME).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
