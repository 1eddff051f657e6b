use crate::models::{Activity, ActivityId};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const APP_NAME: &str = "Solo Tracker";

/// Reminders further out than this are left for a later refresh.
const HORIZON: Duration = Duration::from_secs(24 * 3600);

pub trait Notifier: Send + Sync {
    fn permitted(&self) -> bool;
    fn notify(&self, title: &str, body: &str);
}

/// Writes notifications to the log instead of a desktop notification
/// daemon.
#[derive(Debug, Clone, Copy)]
pub struct LogNotifier {
    granted: bool,
}

impl LogNotifier {
    pub fn new(granted: bool) -> Self {
        Self { granted }
    }
}

impl Notifier for LogNotifier {
    fn permitted(&self) -> bool {
        self.granted
    }

    fn notify(&self, title: &str, body: &str) {
        info!(target: "notification", "{title}: {body}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReminder {
    pub activity: ActivityId,
    pub title: String,
    pub delay: Duration,
}

/// Reminders due strictly between `now` and 24 hours from `now`.
pub fn plan_reminders(activities: &[Activity], now: DateTime<Utc>) -> Vec<PlannedReminder> {
    activities
        .iter()
        .filter_map(|activity| {
            let at = activity.reminder_time?;
            let delay = (at - now).to_std().ok()?;
            (!delay.is_zero() && delay < HORIZON).then(|| PlannedReminder {
                activity: activity.id,
                title: activity.title.clone(),
                delay,
            })
        })
        .collect()
}

pub fn reminder_body(title: &str) -> String {
    format!("{title} — reminder")
}

/// One-shot reminder timers keyed by activity id. Re-arming replaces the
/// whole set under a single lock, so timers never pile up across refreshes.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    timers: Mutex<HashMap<ActivityId, JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn rearm(&self, activities: &[Activity]) {
        self.rearm_at(activities, Utc::now());
    }

    pub fn rearm_at(&self, activities: &[Activity], now: DateTime<Utc>) {
        let planned = plan_reminders(activities, now);
        let mut timers = self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        for (_, handle) in timers.drain() {
            handle.abort();
        }

        for reminder in planned {
            debug!(
                "arming reminder for activity {} in {}s",
                reminder.activity,
                reminder.delay.as_secs()
            );
            let notifier = Arc::clone(&self.notifier);
            let id = reminder.activity;
            let handle = tokio::spawn(async move {
                tokio::time::sleep(reminder.delay).await;
                if notifier.permitted() {
                    notifier.notify(APP_NAME, &reminder_body(&reminder.title));
                } else {
                    debug!("notifications not permitted, dropping reminder for {id}");
                }
            });
            if let Some(previous) = timers.insert(id, handle) {
                previous.abort();
            }
        }
    }

    pub fn clear(&self) {
        let mut timers = self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    /// Activity ids with a timer that hasn't fired yet.
    pub fn armed(&self) -> Vec<ActivityId> {
        let timers = self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut ids: Vec<ActivityId> = timers
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.clear();
    }
}
