//! taskbuddy dashboard command.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::cli::{load_context, resolve_now};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::projection::{self, Reminder};

pub struct DashboardOptions {
    pub home: Option<PathBuf>,
    pub now: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: DashboardOptions) -> Result<()> {
    let ctx = load_context(options.home)?;
    let now = resolve_now(options.now.as_deref())?;
    let tasks = ctx.session.tasks().tasks();
    let goals = ctx.session.goals().goals();

    let view = projection::dashboard(&tasks, &goals, now, &ctx.config);

    let mut human = HumanOutput::new(format!("Dashboard for {}", ctx.identity.uid));
    human.push_summary("Today", view.today.clone());
    human.push_summary(
        "Week",
        format!("{} .. {}", view.week.start_str(), view.week.end_str()),
    );
    human.push_summary(
        "Daily progress",
        format!("{}% of {}", view.daily_progress, view.today_tasks.len()),
    );
    human.push_summary(
        "Weekly progress",
        format!("{}% of {}", view.weekly_progress, view.week_tasks.len()),
    );
    human.push_summary(
        "Focus",
        format!(
            "{} done, {:.2}h, {}% productivity",
            view.focus.completed_today, view.focus.hours_focused, view.focus.productivity
        ),
    );

    if let Some(reminder) = view.reminder {
        human.push_detail(describe_reminder(reminder));
    }
    if let Some(deadline) = view.goal_deadline.as_ref() {
        human.push_detail(format!(
            "Next goal due: {} ({})",
            deadline.title,
            format_deadline(deadline.deadline)
        ));
    }
    for goal in &view.goals {
        human.push_detail(format!(
            "Goal {} {}: {}% ({}/{})",
            goal.id, goal.title, goal.progress, goal.completed_subtasks, goal.total_subtasks
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "dashboard",
        &view,
        Some(&human),
    )
}

fn format_deadline(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn describe_reminder(reminder: Reminder) -> String {
    match reminder {
        Reminder::NoTasks => "No tasks yet".to_string(),
        Reminder::Daily {
            deadline: Some(at),
        } => format!("Next daily deadline: {}", format_deadline(at)),
        Reminder::Daily { deadline: None } => {
            "Daily tasks open, no upcoming deadline".to_string()
        }
        Reminder::Weekly {
            deadline: Some(at),
        } => format!("Next weekly deadline: {}", format_deadline(at)),
        Reminder::Weekly { deadline: None } => {
            "Weekly tasks open, no upcoming deadline".to_string()
        }
        Reminder::AllComplete => "All tasks complete".to_string(),
    }
}
