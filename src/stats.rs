use crate::models::{Activity, Category, CategoryId, Goals, StatsRow, Tab};
use serde::Serialize;

/// Scale used for the progress bar when a category has no goal.
const FALLBACK_SECONDS: f64 = 4.0 * 3600.0;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category_id: CategoryId,
    pub activities: Vec<Activity>,
}

/// Partitions activities by category, following the order of `categories`.
/// Every category gets a group even when empty; activities pointing at a
/// category that isn't in the list are grouped after the known ones.
pub fn group_by_category(categories: &[Category], activities: &[Activity]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = categories
        .iter()
        .map(|category| CategoryGroup {
            category_id: category.id,
            activities: Vec::new(),
        })
        .collect();

    for activity in activities {
        match groups
            .iter_mut()
            .find(|group| group.category_id == activity.category)
        {
            Some(group) => group.activities.push(activity.clone()),
            None => groups.push(CategoryGroup {
                category_id: activity.category,
                activities: vec![activity.clone()],
            }),
        }
    }

    groups
}

pub fn seconds_for(stats: &[StatsRow], category: CategoryId) -> f64 {
    stats
        .iter()
        .find(|row| row.category.id == category)
        .map(|row| row.seconds)
        .unwrap_or(0.0)
}

/// Progress towards the category's goal, or towards four hours when no goal
/// is set. Always within 0..=100.
pub fn percent_for(seconds: f64, goal_minutes: f64) -> u8 {
    let goal_seconds = goal_minutes * 60.0;
    let scale = if goal_seconds > 0.0 {
        goal_seconds
    } else {
        FALLBACK_SECONDS
    };
    let percent = (seconds / scale * 100.0).round();
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0) as u8
}

/// Hours rounded to one decimal place.
pub fn hours_for(seconds: f64) -> f64 {
    (seconds / 3600.0 * 10.0).round() / 10.0
}

pub fn section_label(seconds: f64, goal_minutes: f64) -> String {
    let hours = hours_for(seconds);
    if goal_minutes > 0.0 {
        format!(
            "{hours:.1}h / {:.1}h • {}%",
            goal_minutes / 60.0,
            percent_for(seconds, goal_minutes)
        )
    } else {
        format!("{hours:.1}h")
    }
}

pub fn filter_by_tab(activities: &[Activity], tab: Tab) -> Vec<&Activity> {
    activities.iter().filter(|activity| tab.shows(activity)).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub category: Category,
    pub seconds: f64,
    pub hours: f64,
    pub goal_minutes: f64,
    pub percent: u8,
    pub label: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub tab: Tab,
    pub todo_count: usize,
    pub done_count: usize,
    pub sections: Vec<Section>,
}

/// Builds the per-category sections shown for the active tab. With a
/// category filter, only that category's section is produced.
pub fn build_view(
    categories: &[Category],
    activities: &[Activity],
    stats: &[StatsRow],
    goals: &Goals,
    tab: Tab,
    selected: Option<CategoryId>,
) -> DashboardView {
    let groups = group_by_category(categories, activities);

    let sections = categories
        .iter()
        .filter(|category| selected.is_none_or(|id| id == category.id))
        .map(|category| {
            let seconds = seconds_for(stats, category.id);
            let goal_minutes = goals.minutes_for(category.id);
            let activities: Vec<Activity> = groups
                .iter()
                .find(|group| group.category_id == category.id)
                .map(|group| {
                    filter_by_tab(&group.activities, tab)
                        .into_iter()
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Section {
                category: category.clone(),
                seconds,
                hours: hours_for(seconds),
                goal_minutes,
                percent: percent_for(seconds, goal_minutes),
                label: section_label(seconds, goal_minutes),
                activities,
            }
        })
        .collect();

    DashboardView {
        tab,
        todo_count: filter_by_tab(activities, Tab::Todo).len(),
        done_count: filter_by_tab(activities, Tab::Done).len(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: CategoryId, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
        }
    }

    fn activity(id: i64, category: CategoryId, completed: bool) -> Activity {
        Activity {
            id,
            title: format!("item {id}"),
            description: None,
            category,
            category_name: None,
            start_time: None,
            end_time: None,
            duration_minutes: None,
            reminder_time: None,
            completed,
            created_at: None,
            updated_at: None,
        }
    }

    fn row(id: CategoryId, seconds: f64) -> StatsRow {
        StatsRow {
            category: category(id, "x"),
            seconds,
        }
    }

    #[test]
    fn hours_round_to_one_decimal() {
        assert_eq!(hours_for(3661.0), 1.0);
        assert_eq!(hours_for(7200.0), 2.0);
        assert_eq!(hours_for(5400.0), 1.5);
        assert_eq!(hours_for(0.0), 0.0);
    }

    #[test]
    fn percent_uses_goal_or_four_hour_scale() {
        assert_eq!(percent_for(7200.0, 0.0), 50);
        assert_eq!(percent_for(1800.0, 60.0), 50);
        assert_eq!(percent_for(0.0, 60.0), 0);
        assert_eq!(percent_for(36000.0, 60.0), 100);
        assert_eq!(percent_for(36000.0, 0.0), 100);
    }

    #[test]
    fn percent_stays_in_range() {
        let seconds = [0.0, 1.0, 59.0, 1800.0, 14400.0, 1e9, -50.0];
        let goals = [-120.0, -1.0, 0.0, 0.5, 30.0, 240.0, f64::NAN];
        for secs in seconds {
            for goal in goals {
                let pct = percent_for(secs, goal);
                assert!(pct <= 100, "{secs}s / {goal}m gave {pct}");
            }
        }
        // A negative goal behaves like no goal at all.
        assert_eq!(percent_for(7200.0, -30.0), 50);
    }

    #[test]
    fn grouping_keeps_empty_and_unknown_categories() {
        let categories = vec![category(1, "Reading"), category(2, "Workout")];
        let activities = vec![activity(10, 2, false), activity(11, 9, false), activity(12, 2, true)];

        let groups = group_by_category(&categories, &activities);
        let ids: Vec<CategoryId> = groups.iter().map(|group| group.category_id).collect();
        assert_eq!(ids, vec![1, 2, 9]);
        assert!(groups[0].activities.is_empty());
        assert_eq!(groups[1].activities.len(), 2);
        assert_eq!(groups[2].activities[0].id, 11);
    }

    #[test]
    fn tabs_partition_activities() {
        let activities: Vec<Activity> = (0..7).map(|id| activity(id, 1, id % 3 == 0)).collect();
        let todo = filter_by_tab(&activities, Tab::Todo);
        let done = filter_by_tab(&activities, Tab::Done);
        assert_eq!(todo.len() + done.len(), activities.len());
        assert!(todo.iter().all(|item| !item.completed));
        assert!(done.iter().all(|item| item.completed));
    }

    #[test]
    fn seconds_default_to_zero() {
        let stats = vec![row(1, 900.0)];
        assert_eq!(seconds_for(&stats, 1), 900.0);
        assert_eq!(seconds_for(&stats, 2), 0.0);
    }

    #[test]
    fn label_mentions_goal_only_when_set() {
        assert_eq!(section_label(5400.0, 0.0), "1.5h");
        assert_eq!(section_label(1800.0, 60.0), "0.5h / 1.0h • 50%");
    }

    #[test]
    fn view_respects_tab_and_category_filter() {
        let categories = vec![category(1, "Reading"), category(2, "Workout")];
        let activities = vec![activity(10, 1, false), activity(11, 1, true), activity(12, 2, false)];
        let stats = vec![row(1, 1800.0)];
        let mut goals = Goals::default();
        goals.set(1, 60.0);

        let view = build_view(&categories, &activities, &stats, &goals, Tab::Todo, None);
        assert_eq!(view.todo_count, 2);
        assert_eq!(view.done_count, 1);
        assert_eq!(view.sections.len(), 2);
        assert_eq!(view.sections[0].percent, 50);
        assert_eq!(view.sections[0].activities.len(), 1);
        assert_eq!(view.sections[1].percent, 0);

        let view = build_view(&categories, &activities, &stats, &goals, Tab::Done, Some(1));
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].activities[0].id, 11);
    }
}
