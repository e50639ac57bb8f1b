//! taskbuddy goal command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{load_context, non_empty_title, parse_due, resolve_now, Context};
use crate::error::{Error, Result};
use crate::goal::{Goal, Subtask};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::projection::GoalProgress;

pub struct NewOptions {
    pub title: String,
    pub category: Option<String>,
    pub due: Option<String>,
    pub description: Option<String>,
    pub home: Option<PathBuf>,
    pub now: Option<String>,
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
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SubAddOptions {
    pub goal_id: i64,
    pub title: String,
    pub home: Option<PathBuf>,
    pub now: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SubtaskRefOptions {
    pub goal_id: i64,
    pub subtask_id: i64,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct GoalOutput {
    goal: Goal,
    progress: u32,
    complete: bool,
}

impl From<Goal> for GoalOutput {
    fn from(goal: Goal) -> Self {
        Self {
            progress: goal.progress(),
            complete: goal.is_complete(),
            goal,
        }
    }
}

#[derive(Serialize)]
struct GoalRemovedOutput {
    id: i64,
    subtasks_removed: usize,
}

#[derive(Serialize)]
struct GoalListOutput {
    total: usize,
    complete: usize,
    goals: Vec<GoalProgress>,
}

#[derive(Serialize)]
struct SubtaskOutput {
    goal_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtask: Option<Subtask>,
    changed: bool,
    progress: u32,
    complete: bool,
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    let now = resolve_now(options.now.as_deref())?;

    let title = non_empty_title(&options.title, "goal")?;
    let category = options
        .category
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| ctx.config.goals.default_category.clone());
    let due = parse_due(options.due.as_deref())?;

    let id = ctx.session.goals().next_id(now);
    let mut goal = Goal::new(id, title).with_category(category.clone());
    if let Some(due) = due.as_deref() {
        goal = goal.with_due_date(due);
    }
    if let Some(description) = options.description {
        goal = goal.with_description(description);
    }
    ctx.session.goals_mut().add_goal(goal.clone());
    tracing::info!(id, category = %goal.category, "goal created");

    let mut human = HumanOutput::new("Goal created");
    human.push_summary("ID", id.to_string());
    human.push_summary("Title", goal.title.clone());
    human.push_summary("Category", goal.category.clone());
    if let Some(due) = goal.due_date.as_deref() {
        human.push_summary("Due", due);
    }
    if !ctx.config.goals.is_known_category(&category) {
        human.push_warning(format!(
            "category '{category}' is not one of: {}",
            ctx.config.goals.categories.join(", ")
        ));
    }
    human.push_next_step(format!("taskbuddy goal sub add {id} \"<subtask>\""));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "goal new",
        &GoalOutput::from(goal),
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    let subtasks_removed = ctx
        .session
        .goals()
        .get(options.id)
        .map(|goal| goal.subtasks.len())
        .ok_or(Error::GoalNotFound(options.id))?;
    if !ctx.session.goals_mut().delete_goal(options.id) {
        return Err(Error::GoalNotFound(options.id));
    }

    let mut human = HumanOutput::new("Goal deleted");
    human.push_summary("ID", options.id.to_string());
    human.push_summary("Subtasks removed", subtasks_removed.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "goal rm",
        &GoalRemovedOutput {
            id: options.id,
            subtasks_removed,
        },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.home)?;
    let goals: Vec<GoalProgress> = ctx
        .session
        .goals()
        .goals()
        .iter()
        .map(GoalProgress::from)
        .collect();

    let output = GoalListOutput {
        total: goals.len(),
        complete: goals.iter().filter(|goal| goal.complete).count(),
        goals,
    };

    let mut human = HumanOutput::new("Goals");
    human.push_summary("Total", output.total.to_string());
    human.push_summary("Complete", output.complete.to_string());
    let stored = ctx.session.goals().goals();
    for (goal, progress) in stored.iter().zip(&output.goals) {
        human.push_detail(format_goal_line(progress));
        for subtask in &goal.subtasks {
            let mark = if subtask.completed { "x" } else { " " };
            human.push_detail(format!("    [{mark}] {} {}", subtask.id, subtask.title));
        }
    }
    if output.goals.is_empty() {
        human.push_next_step("taskbuddy goal new \"<title>\"");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "goal list",
        &output,
        Some(&human),
    )
}

pub fn run_sub_add(options: SubAddOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    let now = resolve_now(options.now.as_deref())?;
    let goal_id = options.goal_id;

    let subtask_id = ctx
        .session
        .goals()
        .get(goal_id)
        .map(|goal| goal.next_subtask_id(now))
        .ok_or(Error::GoalNotFound(goal_id))?;
    let changed = ctx
        .session
        .goals_mut()
        .add_subtask(goal_id, Subtask::new(subtask_id, options.title));

    let goal = current_goal(&ctx, goal_id)?;
    let subtask = goal.subtask(subtask_id).cloned();

    let mut human = if changed {
        HumanOutput::new("Subtask added")
    } else {
        HumanOutput::new("Nothing to add")
    };
    human.push_summary("Goal", format!("{} {}", goal.id, goal.title));
    match subtask.as_ref() {
        Some(subtask) => {
            human.push_summary("ID", subtask.id.to_string());
            human.push_summary("Title", subtask.title.clone());
        }
        None => human.push_warning("subtask title is blank; nothing was added"),
    }
    human.push_summary("Progress", format!("{}%", goal.progress()));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "goal sub add",
        &SubtaskOutput {
            goal_id,
            subtask,
            changed,
            progress: goal.progress(),
            complete: goal.is_complete(),
        },
        Some(&human),
    )
}

pub fn run_sub_toggle(options: SubtaskRefOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    require_subtask(&ctx, options.goal_id, options.subtask_id)?;
    ctx.session
        .goals_mut()
        .toggle_subtask(options.goal_id, options.subtask_id);

    let goal = current_goal(&ctx, options.goal_id)?;
    let subtask = goal.subtask(options.subtask_id).cloned();
    let done = subtask.as_ref().map(|subtask| subtask.completed).unwrap_or(false);

    let mut human = if done {
        HumanOutput::new("Subtask completed")
    } else {
        HumanOutput::new("Subtask reopened")
    };
    human.push_summary("Goal", format!("{} {}", goal.id, goal.title));
    human.push_summary("Progress", format!("{}%", goal.progress()));
    if goal.is_complete() {
        human.push_detail("goal complete");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "goal sub toggle",
        &SubtaskOutput {
            goal_id: goal.id,
            subtask,
            changed: true,
            progress: goal.progress(),
            complete: goal.is_complete(),
        },
        Some(&human),
    )
}

pub fn run_sub_rm(options: SubtaskRefOptions) -> Result<()> {
    let mut ctx = load_context(options.home)?;
    require_subtask(&ctx, options.goal_id, options.subtask_id)?;
    ctx.session
        .goals_mut()
        .delete_subtask(options.goal_id, options.subtask_id);

    let goal = current_goal(&ctx, options.goal_id)?;
    let mut human = HumanOutput::new("Subtask deleted");
    human.push_summary("Goal", format!("{} {}", goal.id, goal.title));
    human.push_summary("ID", options.subtask_id.to_string());
    human.push_summary("Progress", format!("{}%", goal.progress()));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "goal sub rm",
        &SubtaskOutput {
            goal_id: goal.id,
            subtask: None,
            changed: true,
            progress: goal.progress(),
            complete: goal.is_complete(),
        },
        Some(&human),
    )
}

fn current_goal(ctx: &Context, goal_id: i64) -> Result<Goal> {
    ctx.session
        .goals()
        .get(goal_id)
        .cloned()
        .ok_or(Error::GoalNotFound(goal_id))
}

fn require_subtask(ctx: &Context, goal_id: i64, subtask_id: i64) -> Result<()> {
    let goal = ctx
        .session
        .goals()
        .get(goal_id)
        .ok_or(Error::GoalNotFound(goal_id))?;
    if goal.subtask(subtask_id).is_none() {
        return Err(Error::SubtaskNotFound {
            goal_id,
            subtask_id,
        });
    }
    Ok(())
}

fn format_goal_line(goal: &GoalProgress) -> String {
    let mark = if goal.complete { "x" } else { " " };
    let due = goal
        .due_date
        .as_deref()
        .map(|due| format!(", due {due}"))
        .unwrap_or_default();
    format!(
        "[{mark}] {} {} ({}{due}) {}/{} {}%",
        goal.id, goal.title, goal.category, goal.completed_subtasks, goal.total_subtasks, goal.progress
    )
}
