//! Dashboard state and the refresh protocol that keeps it in sync with the
//! backend.
//!
//! Server-derived data (categories, activities, stats) is never patched
//! locally: every mutation is followed by a full refresh. Refreshes carry a
//! generation number and only the newest one is allowed to land.

use crate::api::{ApiClient, ApiError};
use crate::models::{
    Activity, ActivityForm, ActivityId, Category, CategoryId, Goals, StatsRow, Tab,
};
use crate::reminders::ReminderScheduler;
use crate::stats::{DashboardView, build_view};
use crate::storage::{KeyValueStore, load_goals, load_streak, save_goals, save_streak};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const CATEGORY_EXISTS_NOTICE: &str = "Could not create category. It may already exist.";
pub const REQUEST_FAILED_NOTICE: &str = "Something went wrong talking to the tracker backend.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub date: NaiveDate,
    pub category: Option<CategoryId>,
}

impl Selection {
    pub fn today() -> Self {
        Self {
            date: today(),
            category: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    #[default]
    None,
    AddActivity,
    EditActivity { activity: Activity },
    Goals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AiPanel {
    Loading { date: NaiveDate },
    Ready { date: NaiveDate, text: String },
    Failed { date: NaiveDate, error: String },
}

impl AiPanel {
    pub fn date(&self) -> NaiveDate {
        match self {
            AiPanel::Loading { date } | AiPanel::Ready { date, .. } | AiPanel::Failed { date, .. } => {
                *date
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    pub selection: Selection,
    pub tab: Tab,
    pub modal: Modal,
    pub categories: Vec<Category>,
    pub activities: Vec<Activity>,
    pub stats: Vec<StatsRow>,
    pub goals: Goals,
    pub streak: u64,
    pub notice: Option<String>,
    pub ai: Option<AiPanel>,
}

impl DashboardState {
    pub fn view(&self) -> DashboardView {
        build_view(
            &self.categories,
            &self.activities,
            &self.stats,
            &self.goals,
            self.tab,
            self.selection.category,
        )
    }

    /// The activity being edited, if the edit form is open.
    pub fn editing(&self) -> Option<&Activity> {
        match &self.modal {
            Modal::EditActivity { activity } => Some(activity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub state: DashboardState,
    pub view: DashboardView,
}

pub struct Dashboard {
    client: ApiClient,
    store: Arc<dyn KeyValueStore>,
    reminders: ReminderScheduler,
    state: Mutex<DashboardState>,
    generation: AtomicU64,
    ai_generation: AtomicU64,
}

impl Dashboard {
    pub fn new(client: ApiClient, store: Arc<dyn KeyValueStore>, reminders: ReminderScheduler) -> Self {
        let state = DashboardState {
            selection: Selection::today(),
            tab: Tab::default(),
            modal: Modal::default(),
            categories: Vec::new(),
            activities: Vec::new(),
            stats: Vec::new(),
            goals: load_goals(store.as_ref()),
            streak: load_streak(store.as_ref()),
            notice: None,
            ai: None,
        };

        Self {
            client,
            store,
            reminders,
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
            ai_generation: AtomicU64::new(0),
        }
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    pub async fn state(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await.clone();
        let view = state.view();
        Snapshot { state, view }
    }

    /// Runs the refresh protocol for the current selection. Returns `false`
    /// when a newer refresh started while this one was in flight and the
    /// results were dropped. A failed refresh that is still the newest one
    /// clears the activity list, so the list never belongs to an earlier
    /// selection.
    pub async fn refresh(&self) -> Result<bool, ApiError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let selection = self.state.lock().await.selection.clone();

        let fetched = self.fetch(&selection).await;

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding stale refresh #{generation}");
            return fetched.map(|_| false);
        }
        let (categories, activities, stats) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                state.activities.clear();
                return Err(err);
            }
        };

        self.reminders.rearm(&activities);
        debug!(
            "refresh #{generation}: {} categories, {} activities on {}",
            categories.len(),
            activities.len(),
            selection.date
        );
        state.categories = categories;
        state.activities = activities;
        state.stats = stats;
        Ok(true)
    }

    async fn fetch(
        &self,
        selection: &Selection,
    ) -> Result<(Vec<Category>, Vec<Activity>, Vec<StatsRow>), ApiError> {
        let mut categories = self.client.list_categories().await?;
        if categories.is_empty() {
            info!("no categories yet, bootstrapping defaults");
            categories = self.client.ensure_default_categories().await?;
        }
        let activities = self
            .client
            .list_activities_by_date(selection.date, selection.category)
            .await?;
        let stats = self.client.stats_today().await?;
        Ok((categories, activities, stats))
    }

    /// Like `refresh`, but a failure is logged and surfaced as a notice.
    pub async fn refresh_or_notice(&self) {
        if let Err(err) = self.refresh().await {
            warn!("refresh failed: {err}");
            self.set_notice(REQUEST_FAILED_NOTICE).await;
        }
    }

    pub async fn select(
        &self,
        date: NaiveDate,
        category: Option<CategoryId>,
    ) -> Result<bool, ApiError> {
        {
            let mut state = self.state.lock().await;
            state.selection = Selection { date, category };
        }
        self.refresh().await
    }

    pub async fn set_tab(&self, tab: Tab) {
        self.state.lock().await.tab = tab;
    }

    pub async fn open_modal(&self, modal: Modal) {
        self.state.lock().await.modal = modal;
    }

    pub async fn close_modal(&self) {
        self.state.lock().await.modal = Modal::None;
    }

    /// Opens the edit form for an activity from the current list. Returns
    /// `false` if the activity isn't loaded.
    pub async fn begin_edit(&self, id: ActivityId) -> bool {
        let mut state = self.state.lock().await;
        let Some(activity) = state.activities.iter().find(|a| a.id == id).cloned() else {
            return false;
        };
        state.modal = Modal::EditActivity { activity };
        true
    }

    /// Form prefill for the open modal: the editing target's values, or an
    /// empty form defaulting to the first category.
    pub async fn form_defaults(&self) -> ActivityForm {
        let state = self.state.lock().await;
        match state.editing() {
            Some(activity) => ActivityForm::from_activity(activity),
            None => ActivityForm::empty(state.categories.first().map(|c| c.id)),
        }
    }

    /// Submits the activity form: updates the editing target when there is
    /// one, otherwise creates a new activity. The modal closes either way.
    pub async fn submit_activity(&self, form: ActivityForm) -> Result<(), ApiError> {
        let editing = {
            let state = self.state.lock().await;
            state.editing().map(|activity| activity.id)
        };
        let payload = form.into_payload();

        match editing {
            Some(id) => {
                self.client.update_activity(id, &payload).await?;
                info!("updated activity {id}");
            }
            None => {
                let created = self.client.create_activity(&payload).await?;
                info!("created activity {}", created.id);
            }
        }

        self.close_modal().await;
        self.refresh().await?;
        Ok(())
    }

    pub async fn create_activity(&self, form: ActivityForm) -> Result<Activity, ApiError> {
        let created = self.client.create_activity(&form.into_payload()).await?;
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_activity(
        &self,
        id: ActivityId,
        form: ActivityForm,
    ) -> Result<Activity, ApiError> {
        let updated = self.client.update_activity(id, &form.into_payload()).await?;
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), ApiError> {
        self.client.delete_activity(id).await?;
        info!("deleted activity {id}");
        self.refresh().await?;
        Ok(())
    }

    /// Flips an activity's completion, refreshes, then looks at the same
    /// slice again: when it is non-empty and fully completed the streak goes
    /// up by one. This counts completions of a whole slice, not calendar
    /// days, so undoing and redoing the last item counts again.
    pub async fn toggle_complete(&self, id: ActivityId) -> Result<u64, ApiError> {
        let toggled = self.client.toggle_complete(id).await?;
        debug!("activity {} completed={}", toggled.id, toggled.completed);
        self.refresh().await?;

        let selection = self.state.lock().await.selection.clone();
        let latest = self
            .client
            .list_activities_by_date(selection.date, selection.category)
            .await?;

        let mut state = self.state.lock().await;
        if !latest.is_empty() && latest.iter().all(|activity| activity.completed) {
            state.streak += 1;
            info!("everything done for {}, streak now {}", selection.date, state.streak);
            if let Err(err) = save_streak(self.store.as_ref(), state.streak) {
                warn!("failed to persist streak: {err}");
            }
        }
        Ok(state.streak)
    }

    /// Adds a category from the quick-add prompt. Blank names are ignored;
    /// a rejected name leaves a notice instead of an error.
    pub async fn quick_add_category(&self, name: &str) -> Option<Category> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        match self.client.create_category(name).await {
            Ok(category) => {
                info!("created category {}", category.name);
                self.refresh_or_notice().await;
                Some(category)
            }
            Err(err) => {
                warn!("failed to create category {name}: {err}");
                self.set_notice(CATEGORY_EXISTS_NOTICE).await;
                None
            }
        }
    }

    pub async fn save_goals(&self, goals: Goals) {
        if let Err(err) = save_goals(self.store.as_ref(), &goals) {
            warn!("failed to persist goals: {err}");
        }
        self.state.lock().await.goals = goals;
    }

    /// Opens the AI panel for `date` and fetches fresh suggestion text.
    /// Nothing is cached, so reopening always asks the backend again.
    pub async fn open_ai(&self, date: NaiveDate) -> AiPanel {
        let generation = self.begin_ai(date).await;
        self.load_ai(date, generation).await
    }

    /// Shows the panel in its loading state. The returned generation is
    /// handed to `load_ai`.
    pub async fn begin_ai(&self, date: NaiveDate) -> u64 {
        let generation = self.ai_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().await.ai = Some(AiPanel::Loading { date });
        generation
    }

    /// Fetches suggestions for a panel opened by `begin_ai`. The result is
    /// only shown if that panel is still the open one.
    pub async fn load_ai(&self, date: NaiveDate, generation: u64) -> AiPanel {
        let panel = match self.client.ai_suggestions(Some(date)).await {
            Ok(response) => AiPanel::Ready {
                date,
                text: response.suggestions,
            },
            Err(err) => {
                warn!("ai suggestions for {date} failed: {err}");
                AiPanel::Failed {
                    date,
                    error: err.user_message(),
                }
            }
        };

        let mut state = self.state.lock().await;
        if self.ai_generation.load(Ordering::SeqCst) == generation {
            state.ai = Some(panel.clone());
        } else {
            debug!("dropping suggestions for a closed panel ({date})");
        }
        panel
    }

    pub async fn close_ai(&self) {
        self.ai_generation.fetch_add(1, Ordering::SeqCst);
        self.state.lock().await.ai = None;
    }

    pub async fn set_notice(&self, notice: impl Into<String>) {
        self.state.lock().await.notice = Some(notice.into());
    }

    pub async fn take_notice(&self) -> Option<String> {
        self.state.lock().await.notice.take()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
