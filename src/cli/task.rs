//! taskbuddy task command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{load_context, non_empty_title, parse_due, resolve_now};
use crate::date::{self, format_date, WeekWindow};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::projection::{completion_percentage, daily_tasks, weekly_tasks};
use crate::task::{Task, TaskKind};

pub struct AddOptions {
    pub title: String,
    pub kind: String,
    pub due: Option<String>,
    pub time: Option<String>,
    pub category: Option<String>,
    pub home: Option<PathBuf>,
    pub now: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ToggleOptions {
    pub id: i64,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub id: i64,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub today: bool,
    pub week: bool,
    pub home: Option<PathBuf>,
    pub now: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskOutput {
    task: Task,
}

#[derive(Serialize)]
struct TaskRemovedOutput {
    id: i64,
}

#[derive(Serialize)]
struct TaskListOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    today: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    week: Option<WeekWindow>,
    total: usize,
    completed: usize,
    progress: u32,
    tasks: Vec<Task>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    let now = resolve_now(options.now.as_deref())?;

    let title = non_empty_title(&options.title, "task")?;
    let kind: TaskKind = options.kind.parse()?;
    let due = parse_due(options.due.as_deref())?.unwrap_or_else(|| format_date(now.date()));
    let time = match options.time.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            date::parse_time(raw)?;
            Some(raw.to_string())
        }
        _ => None,
    };
    let category = options
        .category
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| ctx.config.tasks.default_category.clone());

    let id = ctx.session.tasks().next_id(now);
    let mut task = Task::new(id, title, kind, &due).with_category(category);
    if let Some(time) = time {
        task = task.with_time(time);
    }
    ctx.session.tasks_mut().add_task(task.clone());
    tracing::info!(id, kind = %kind, due = %task.due_date, "task added");

    let mut human = HumanOutput::new("Task added");
    human.push_summary("ID", id.to_string());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Type", kind.to_string());
    human.push_summary("Due", describe_due(&task));
    human.push_summary("Category", task.category.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task add",
        &TaskOutput { task },
        Some(&human),
    )
}

pub fn run_toggle(options: ToggleOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    if !ctx.session.tasks_mut().toggle_task(options.id) {
        return Err(Error::TaskNotFound(options.id));
    }
    let task = ctx
        .session
        .tasks()
        .get(options.id)
        .cloned()
        .ok_or(Error::TaskNotFound(options.id))?;

    let header = if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Title", task.title.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task toggle",
        &TaskOutput { task },
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    if !ctx.session.tasks_mut().delete_task(options.id) {
        return Err(Error::TaskNotFound(options.id));
    }

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", options.id.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task rm",
        &TaskRemovedOutput { id: options.id },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.home)?;
    let now = resolve_now(options.now.as_deref())?;
    let today = now.date();
    let all = ctx.session.tasks().tasks();

    let output = if options.today {
        let tasks = daily_tasks(&all, today);
        TaskListOutput {
            scope: Some("today"),
            today: Some(format_date(today)),
            week: None,
            total: tasks.len(),
            completed: tasks.iter().filter(|task| task.completed).count(),
            progress: completion_percentage(&tasks),
            tasks: tasks.into_iter().cloned().collect(),
        }
    } else if options.week {
        let week = WeekWindow::containing(today);
        let tasks = weekly_tasks(&all, &week);
        TaskListOutput {
            scope: Some("week"),
            today: None,
            total: tasks.len(),
            completed: tasks.iter().filter(|task| task.completed).count(),
            progress: completion_percentage(&tasks),
            tasks: tasks.into_iter().cloned().collect(),
            week: Some(week),
        }
    } else {
        TaskListOutput {
            scope: None,
            today: None,
            week: None,
            total: all.len(),
            completed: all.iter().filter(|task| task.completed).count(),
            progress: completion_percentage(all.as_slice()),
            tasks: all.as_ref().clone(),
        }
    };

    let header = match (&output.today, &output.week) {
        (Some(today), _) => format!("Today's tasks ({today})"),
        (_, Some(week)) => format!("This week's tasks ({} .. {})", week.start_str(), week.end_str()),
        _ => "Tasks".to_string(),
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("Total", output.total.to_string());
    human.push_summary(
        "Done",
        format!("{}/{} ({}%)", output.completed, output.total, output.progress),
    );
    for task in &output.tasks {
        human.push_detail(format_task_line(task));
    }
    if output.tasks.is_empty() && output.scope.is_none() {
        human.push_next_step("taskbuddy task add \"<title>\"");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &output,
        Some(&human),
    )
}

fn describe_due(task: &Task) -> String {
    match task.time.as_deref() {
        Some(time) => format!("{} {}", task.due_date, time),
        None => task.due_date.clone(),
    }
}

fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!(
        "[{mark}] {} {} ({}, {}, {})",
        task.id,
        task.title,
        task.kind,
        describe_due(task),
        task.category
    )
}
