use crate::dashboard::{AiPanel, Modal, Snapshot};
use crate::models::{Activity, ActivityForm, Category, Goals, Schedule, Tab};
use crate::reminders::APP_NAME;
use crate::stats::Section;
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

pub fn render_dashboard(snapshot: &Snapshot, form: &ActivityForm) -> String {
    let state = &snapshot.state;
    let view = &snapshot.view;

    let notice = state
        .notice
        .as_deref()
        .map(|text| format!(r#"<div class="notice">{}</div>"#, escape(text)))
        .unwrap_or_default();

    let mut sections = String::new();
    for section in &view.sections {
        sections.push_str(&render_section(section, view.tab));
    }

    let modal = match &state.modal {
        Modal::None => String::new(),
        Modal::AddActivity => render_activity_modal(None, form, &state.categories),
        Modal::EditActivity { activity } => {
            render_activity_modal(Some(activity), form, &state.categories)
        }
        Modal::Goals => render_goals_modal(&state.categories, &state.goals),
    };

    let ai = state.ai.as_ref().map(render_ai_panel).unwrap_or_default();

    DASHBOARD_HTML
        .replace("{{APP}}", APP_NAME)
        .replace("{{STREAK}}", &state.streak.to_string())
        .replace("{{DATE}}", &state.selection.date.to_string())
        .replace(
            "{{CATEGORY_OPTIONS}}",
            &category_options(&state.categories, state.selection.category, true),
        )
        .replace("{{TODO_ACTIVE}}", tab_class(view.tab, Tab::Todo))
        .replace("{{DONE_ACTIVE}}", tab_class(view.tab, Tab::Done))
        .replace("{{TODO_COUNT}}", &view.todo_count.to_string())
        .replace("{{DONE_COUNT}}", &view.done_count.to_string())
        .replace("{{NOTICE}}", &notice)
        .replace("{{SECTIONS}}", &sections)
        .replace("{{MODAL}}", &modal)
        .replace("{{AI}}", &ai)
}

pub fn render_welcome() -> String {
    WELCOME_HTML.replace("{{APP}}", APP_NAME)
}

fn tab_class(active: Tab, tab: Tab) -> &'static str {
    if active == tab { "tab active" } else { "tab" }
}

fn render_section(section: &Section, tab: Tab) -> String {
    let mut cards = String::new();
    for activity in &section.activities {
        cards.push_str(&render_activity_card(activity));
    }
    if section.activities.is_empty() {
        let empty = match tab {
            Tab::Todo => "No tasks here.",
            Tab::Done => "No completed items here.",
        };
        let _ = write!(cards, r#"<div class="card empty">{empty}</div>"#);
    }

    format!(
        r#"<section class="category">
  <div class="category-head">
    <h3>{name}<span class="meta">{label}</span></h3>
    <div class="progress"><div style="width: {pct}%"></div></div>
  </div>
  <div class="cards">{cards}</div>
</section>
"#,
        name = escape(&section.category.name),
        label = escape(&section.label),
        pct = section.percent,
    )
}

fn render_activity_card(activity: &Activity) -> String {
    let badge = if activity.completed {
        r#"<span class="badge">Completed</span>"#
    } else {
        ""
    };
    let description = activity
        .description
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(|text| format!(r#"<p class="description">{}</p>"#, escape(text)))
        .unwrap_or_default();
    let reminder = activity
        .reminder_time
        .map(|at| format!(r#"<span class="reminder">🔔 {}</span>"#, clock(at)))
        .unwrap_or_default();
    let toggle = if activity.completed { "Undo" } else { "Complete" };

    format!(
        r#"<div class="card activity">
  <div>
    <h4>{title}{badge}</h4>
    {description}
    <div class="schedule"><span>{schedule}</span>{reminder}</div>
  </div>
  <div class="actions">
    <form method="post" action="/activities/{id}/toggle"><button>{toggle}</button></form>
    <form method="post" action="/activities/{id}/edit"><button>Edit</button></form>
    <form method="post" action="/activities/{id}/delete"><button>Delete</button></form>
  </div>
</div>
"#,
        title = escape(&activity.title),
        schedule = schedule_text(activity),
        id = activity.id,
    )
}

pub fn schedule_text(activity: &Activity) -> String {
    match activity.schedule() {
        Schedule::Span { start, end } => format!("{} → {}", clock(start), clock(end)),
        Schedule::Duration(minutes) => format!("Duration: {minutes}m"),
        Schedule::Unscheduled => "Unscheduled".to_string(),
    }
}

fn clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

fn category_options(categories: &[Category], selected: Option<i64>, with_all: bool) -> String {
    let mut options = String::new();
    if with_all {
        options.push_str(r#"<option value="">All Categories</option>"#);
    }
    for category in categories {
        let marker = if selected == Some(category.id) { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{}"{marker}>{}</option>"#,
            category.id,
            escape(&category.name)
        );
    }
    options
}

fn render_activity_modal(
    editing: Option<&Activity>,
    form: &ActivityForm,
    categories: &[Category],
) -> String {
    let (heading, submit) = match editing {
        Some(_) => ("Edit Activity", "Save"),
        None => ("Add Activity", "Add"),
    };
    let selected = form.category.trim().parse().ok();
    let checked = if form.completed.is_some() { " checked" } else { "" };

    format!(
        r#"<div class="overlay"><div class="card modal">
  <h3>{heading}</h3>
  <form method="post" action="/activities" class="grid">
    <label>Title<input name="title" value="{title}"></label>
    <label>Category<select name="category">{options}</select></label>
    <label class="wide">Notes<textarea name="description" rows="2">{description}</textarea></label>
    <label>Start<input type="datetime-local" name="start_time" value="{start}"></label>
    <label>End<input type="datetime-local" name="end_time" value="{end}"></label>
    <label>Duration (min), optional<input type="number" min="1" name="duration_minutes" value="{duration}"></label>
    <label>Reminder<input type="datetime-local" name="reminder_time" value="{reminder}"></label>
    <label class="wide"><input type="checkbox" name="completed"{checked}> Mark as completed</label>
    <button>{submit}</button>
  </form>
  <form method="post" action="/modal/close"><button>Cancel</button></form>
</div></div>
"#,
        title = escape(&form.title),
        options = category_options(categories, selected, false),
        description = escape(&form.description),
        start = escape(&form.start_time),
        end = escape(&form.end_time),
        duration = escape(&form.duration_minutes),
        reminder = escape(&form.reminder_time),
    )
}

fn render_goals_modal(categories: &[Category], goals: &Goals) -> String {
    let mut rows = String::new();
    for category in categories {
        let minutes = goals.minutes_for(category.id);
        let value = if minutes > 0.0 {
            minutes.to_string()
        } else {
            String::new()
        };
        let _ = write!(
            rows,
            r#"<label class="goal">{name}<input type="number" min="0" name="goal_{id}" value="{value}" placeholder="minutes"></label>"#,
            name = escape(&category.name),
            id = category.id,
        );
    }

    format!(
        r#"<div class="overlay"><div class="card modal">
  <h3>Set Daily Goals</h3>
  <p>Enter target minutes per category for today (e.g., 60 = 1 hour).</p>
  <form method="post" action="/goals" class="grid">{rows}<button>Save Goals</button></form>
  <form method="post" action="/modal/close"><button>Close</button></form>
</div></div>
"#
    )
}

pub fn render_ai_panel(panel: &AiPanel) -> String {
    let body = match panel {
        AiPanel::Loading { .. } => {
            r#"<meta http-equiv="refresh" content="2" /><p>Generating suggestions…</p>"#.to_string()
        }
        AiPanel::Failed { error, .. } => format!(r#"<p class="error">{}</p>"#, escape(error)),
        AiPanel::Ready { text, .. } => format!("<pre>{}</pre>", escape(text)),
    };

    format!(
        r#"<div class="overlay" role="dialog" aria-modal="true"><div class="card modal">
  <h3>AI Suggestions for {date}</h3>
  {body}
  <form method="post" action="/ai/close"><button>Close</button></form>
</div></div>
"#,
        date = panel.date(),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{APP}}</title>
  <style>
    :root {
      --bg: #0b1020;
      --ink: #e2e8f0;
      --muted: #94a3b8;
      --card: rgba(15, 23, 42, 0.8);
      --edge: #334155;
      --accent: #38bdf8;
      --ok: #34d399;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #1e293b, var(--bg) 70%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
      padding: 16px;
    }

    header form,
    .actions form {
      display: inline-flex;
      gap: 8px;
      margin: 0;
    }

    main {
      display: grid;
      gap: 24px;
      padding: 16px 32px 48px;
    }

    button,
    input,
    select,
    textarea {
      font: inherit;
      color: var(--ink);
      background: rgba(15, 23, 42, 0.6);
      border: 1px solid var(--edge);
      border-radius: 8px;
      padding: 6px 10px;
    }

    button {
      cursor: pointer;
      border-color: var(--accent);
    }

    .card {
      background: var(--card);
      border: 1px solid var(--edge);
      border-radius: 12px;
      padding: 16px;
    }

    .activity {
      display: flex;
      justify-content: space-between;
      gap: 16px;
    }

    .cards {
      display: grid;
      gap: 12px;
    }

    .category-head {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .meta {
      margin-left: 12px;
      font-size: 0.85rem;
      font-weight: 400;
      color: var(--muted);
    }

    .progress {
      width: 16rem;
      height: 8px;
      border-radius: 999px;
      background: var(--edge);
      overflow: hidden;
    }

    .progress > div {
      height: 100%;
      background: var(--accent);
    }

    .badge {
      margin-left: 8px;
      font-size: 0.75rem;
      padding: 2px 8px;
      border-radius: 6px;
      color: var(--ok);
      background: rgba(52, 211, 153, 0.2);
    }

    .description,
    .schedule,
    .empty {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .reminder {
      margin-left: 12px;
    }

    .tab {
      opacity: 0.6;
    }

    .tab.active {
      opacity: 1;
    }

    .notice,
    .error {
      color: #fca5a5;
    }

    .overlay {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      padding: 16px;
      background: rgba(0, 0, 0, 0.55);
    }

    .modal {
      width: min(640px, 100%);
      display: grid;
      gap: 12px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 12px;
    }

    .grid label {
      display: grid;
      gap: 4px;
      color: var(--muted);
    }

    .grid .wide {
      grid-column: 1 / -1;
    }

    pre {
      white-space: pre-wrap;
      line-height: 1.5;
    }
  </style>
</head>
<body>
  <header>
    <a href="/welcome"><strong>{{APP}}</strong></a>
    <div>🔥 Streak: <b>{{STREAK}}</b></div>
    <form method="post" action="/select">
      <input type="date" name="date" value="{{DATE}}" />
      <select name="category">{{CATEGORY_OPTIONS}}</select>
      <button>Show</button>
    </form>
    <form method="post" action="/categories">
      <input name="name" placeholder="New category name" />
      <button>New Category</button>
    </form>
    <form method="post" action="/modal/goals"><button>Goals</button></form>
    <form method="post" action="/modal/add"><button>+ Add</button></form>
    <form method="post" action="/ai">
      <input type="hidden" name="date" value="{{DATE}}" />
      <button>AI suggestion</button>
    </form>
  </header>

  <main>
    {{NOTICE}}
    <form method="post" action="/tab">
      <button name="tab" value="todo" class="{{TODO_ACTIVE}}">To-do ({{TODO_COUNT}})</button>
      <button name="tab" value="done" class="{{DONE_ACTIVE}}">Completed ({{DONE_COUNT}})</button>
    </form>
    {{SECTIONS}}
  </main>

  {{MODAL}}
  {{AI}}
</body>
</html>
"#;

const WELCOME_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{APP}}</title>
  <style>
    body {
      margin: 0;
      min-height: 100vh;
      display: grid;
      place-items: center;
      background: radial-gradient(circle at top, #1e293b, #0b1020 70%);
      color: #e2e8f0;
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      text-align: center;
    }

    a {
      color: #38bdf8;
    }
  </style>
</head>
<body>
  <div>
    <h1>Welcome, Player!</h1>
    <p>You have awakened as a Solo Tracker. Chronicle your quests, forge habits, and level up daily.</p>
    <a href="/">Next →</a>
  </div>
</body>
</html>
"#;
