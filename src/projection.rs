//! Read-only views derived from the task and goal lists.
//!
//! Everything here is a pure function of `(tasks, goals, now)`; callers
//! recompute after each mutation instead of caching results.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::Config;
use crate::date::{deadline, format_date, normalize_date, WeekWindow};
use crate::goal::{Goal, Subtask};
use crate::task::{Task, TaskKind};

/// Anything with a done flag
pub trait Completable {
    fn is_completed(&self) -> bool;
}

impl Completable for Task {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Completable for Subtask {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

impl<T: Completable> Completable for &T {
    fn is_completed(&self) -> bool {
        (**self).is_completed()
    }
}

/// `round(100 * done / total)`, rounding halves up; 0 for an empty list.
pub fn percentage(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * done + total) / (2 * total)) as u32
}

/// Completion percentage of any task or subtask list
pub fn completion_percentage<T: Completable>(items: &[T]) -> u32 {
    let done = items.iter().filter(|item| item.is_completed()).count();
    percentage(done, items.len())
}

/// Daily tasks due on `today`
pub fn daily_tasks(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let today = format_date(today);
    tasks
        .iter()
        .filter(|task| task.kind == TaskKind::Daily && normalize_date(&task.due_date) == today)
        .collect()
}

/// Weekly tasks due inside `week`
pub fn weekly_tasks<'a>(tasks: &'a [Task], week: &WeekWindow) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.kind == TaskKind::Weekly && week.contains(&normalize_date(&task.due_date)))
        .collect()
}

/// Earliest deadline strictly after `now`. Tasks without a usable due date
/// are skipped; a missing time means `default_time`.
pub fn closest_deadline<'a, I>(tasks: I, now: NaiveDateTime, default_time: &str) -> Option<NaiveDateTime>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter_map(|task| deadline(&task.due_date, task.time.as_deref(), default_time))
        .filter(|at| *at > now)
        .min()
}

/// What the reminder banner should say
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reminder {
    /// No tasks at all
    NoTasks,
    /// Some daily task is open; closest upcoming daily deadline, if any
    Daily { deadline: Option<NaiveDateTime> },
    /// No daily task open, some weekly task is; closest weekly deadline
    Weekly { deadline: Option<NaiveDateTime> },
    /// Every task is done
    AllComplete,
}

/// Pick the reminder: open daily tasks win over open weekly tasks.
pub fn reminder(tasks: &[Task], now: NaiveDateTime, default_time: &str) -> Reminder {
    if tasks.is_empty() {
        return Reminder::NoTasks;
    }

    let open = |kind: TaskKind| {
        tasks
            .iter()
            .filter(move |task| task.kind == kind && !task.completed)
            .collect::<Vec<_>>()
    };

    let daily_open = open(TaskKind::Daily);
    if !daily_open.is_empty() {
        return Reminder::Daily {
            deadline: closest_deadline(daily_open, now, default_time),
        };
    }

    let weekly_open = open(TaskKind::Weekly);
    if !weekly_open.is_empty() {
        return Reminder::Weekly {
            deadline: closest_deadline(weekly_open, now, default_time),
        };
    }

    Reminder::AllComplete
}

/// Closest due date strictly after `now` among goals that are not complete
pub fn closest_goal_deadline(goals: &[Goal], now: NaiveDateTime, default_time: &str) -> Option<GoalDeadline> {
    goals
        .iter()
        .filter(|goal| !goal.is_complete())
        .filter_map(|goal| {
            let due = goal.due_date.as_deref()?;
            let at = deadline(due, None, default_time)?;
            (at > now).then(|| GoalDeadline {
                goal_id: goal.id,
                title: goal.title.clone(),
                deadline: at,
            })
        })
        .min_by_key(|entry| entry.deadline)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalDeadline {
    pub goal_id: i64,
    pub title: String,
    pub deadline: NaiveDateTime,
}

/// Focus numbers for the day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusStats {
    pub completed_today: usize,
    pub completed_yesterday: usize,
    pub trailing_average: f64,
    pub hours_focused: f64,
    pub productivity: u32,
}

/// Focus statistics under the configured heuristic.
///
/// Completed tasks count toward their due date. The baseline is the larger
/// of yesterday's count and the mean over the `trailing_days` days before
/// today; with a zero baseline any completion counts as 100%.
pub fn focus_stats(tasks: &[Task], today: NaiveDate, hours_per_task: f64, trailing_days: u32) -> FocusStats {
    let completed_on = |date: NaiveDate| {
        let date = format_date(date);
        tasks
            .iter()
            .filter(|task| task.completed && normalize_date(&task.due_date) == date)
            .count()
    };

    let completed_today = completed_on(today);
    let completed_yesterday = completed_on(today - Duration::days(1));
    let trailing_days = trailing_days.max(1);
    let trailing_total: usize = (1..=trailing_days as i64)
        .map(|offset| completed_on(today - Duration::days(offset)))
        .sum();
    let trailing_average = trailing_total as f64 / trailing_days as f64;

    let baseline = (completed_yesterday as f64).max(trailing_average);
    let productivity = if baseline > 0.0 {
        (100.0 * completed_today as f64 / baseline).round() as u32
    } else if completed_today > 0 {
        100
    } else {
        0
    };

    FocusStats {
        completed_today,
        completed_yesterday,
        trailing_average,
        hours_focused: completed_today as f64 * hours_per_task,
        productivity,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub id: i64,
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub completed_subtasks: usize,
    pub total_subtasks: usize,
    pub progress: u32,
    pub complete: bool,
}

impl From<&Goal> for GoalProgress {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id,
            title: goal.title.clone(),
            category: goal.category.clone(),
            due_date: goal.due_date.clone(),
            completed_subtasks: goal.completed_subtasks(),
            total_subtasks: goal.subtasks.len(),
            progress: goal.progress(),
            complete: goal.is_complete(),
        }
    }
}

/// Everything the dashboard shows, computed in one pass
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub today: String,
    pub week: WeekWindow,
    pub today_tasks: Vec<Task>,
    pub week_tasks: Vec<Task>,
    pub daily_progress: u32,
    pub weekly_progress: u32,
    pub goals: Vec<GoalProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_deadline: Option<GoalDeadline>,
    pub focus: FocusStats,
}

pub fn dashboard(tasks: &[Task], goals: &[Goal], now: NaiveDateTime, config: &Config) -> Dashboard {
    let today = now.date();
    let week = WeekWindow::containing(today);
    let today_tasks = daily_tasks(tasks, today);
    let week_tasks = weekly_tasks(tasks, &week);
    let default_time = config.reminders.default_time.as_str();

    Dashboard {
        today: format_date(today),
        week,
        daily_progress: completion_percentage(&today_tasks),
        weekly_progress: completion_percentage(&week_tasks),
        today_tasks: today_tasks.into_iter().cloned().collect(),
        week_tasks: week_tasks.into_iter().cloned().collect(),
        goals: goals.iter().map(GoalProgress::from).collect(),
        reminder: config
            .reminders
            .task_reminders
            .then(|| reminder(tasks, now, default_time)),
        goal_deadline: if config.reminders.goal_deadlines {
            closest_goal_deadline(goals, now, default_time)
        } else {
            None
        },
        focus: focus_stats(
            tasks,
            today,
            config.stats.hours_per_task,
            config.stats.trailing_days,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{parse_now, END_OF_DAY};

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn task(id: i64, kind: TaskKind, due: &str) -> Task {
        Task::new(id, format!("task {id}"), kind, due)
    }

    fn done(mut task: Task) -> Task {
        task.completed = true;
        task
    }

    #[test]
    fn percentage_rounds_half_up_and_stays_in_bounds() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(3, 3), 100);
        for total in 1..20 {
            for done in 0..=total {
                assert!(percentage(done, total) <= 100);
            }
        }
    }

    #[test]
    fn completion_of_empty_list_is_zero() {
        let subtasks: Vec<Subtask> = Vec::new();
        assert_eq!(completion_percentage(&subtasks), 0);
    }

    #[test]
    fn daily_filter_matches_type_and_normalized_date() {
        let tasks = vec![
            task(1, TaskKind::Daily, "2024-06-05"),
            task(2, TaskKind::Daily, "2024-06-05T09:00:00Z"),
            task(3, TaskKind::Weekly, "2024-06-05"),
            task(4, TaskKind::Daily, "2024-06-04"),
        ];
        let ids: Vec<i64> = daily_tasks(&tasks, day("2024-06-05"))
            .iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn weekly_filter_uses_inclusive_window() {
        let week = WeekWindow::containing(day("2024-06-05"));
        let before_start = format_date(week.start - Duration::days(1));
        let tasks = vec![
            task(1, TaskKind::Weekly, &before_start),
            task(2, TaskKind::Weekly, &week.end_str()),
            task(3, TaskKind::Weekly, &week.start_str()),
            task(4, TaskKind::Daily, &week.end_str()),
        ];
        let ids: Vec<i64> = weekly_tasks(&tasks, &week).iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn closest_deadline_only_considers_future() {
        let now = parse_now("2024-06-05T12:00").unwrap();
        let tasks = vec![
            task(1, TaskKind::Daily, "2024-06-05").with_time("09:00"),
            task(2, TaskKind::Daily, "2024-06-05").with_time("17:00"),
            task(3, TaskKind::Daily, "2024-06-05"),
            task(4, TaskKind::Daily, ""),
        ];
        assert_eq!(
            closest_deadline(&tasks, now, END_OF_DAY),
            Some(parse_now("2024-06-05T17:00").unwrap())
        );

        let late = parse_now("2024-06-06T00:00").unwrap();
        assert_eq!(closest_deadline(&tasks, late, END_OF_DAY), None);
    }

    #[test]
    fn reminder_prefers_open_daily_tasks() {
        let now = parse_now("2024-06-05T08:00").unwrap();
        let tasks = vec![
            task(1, TaskKind::Weekly, "2024-06-06").with_time("10:00"),
            task(2, TaskKind::Daily, "2024-06-05"),
        ];
        assert_eq!(
            reminder(&tasks, now, END_OF_DAY),
            Reminder::Daily {
                deadline: Some(parse_now("2024-06-05T23:59").unwrap())
            }
        );

        let tasks = vec![
            task(1, TaskKind::Weekly, "2024-06-06").with_time("10:00"),
            done(task(2, TaskKind::Daily, "2024-06-05")),
        ];
        assert_eq!(
            reminder(&tasks, now, END_OF_DAY),
            Reminder::Weekly {
                deadline: Some(parse_now("2024-06-06T10:00").unwrap())
            }
        );
    }

    #[test]
    fn reminder_edge_states() {
        let now = parse_now("2024-06-05T08:00").unwrap();
        assert_eq!(reminder(&[], now, END_OF_DAY), Reminder::NoTasks);

        let tasks = vec![done(task(1, TaskKind::Daily, "2024-06-05"))];
        assert_eq!(reminder(&tasks, now, END_OF_DAY), Reminder::AllComplete);

        let overdue = vec![task(1, TaskKind::Daily, "2024-06-01")];
        assert_eq!(
            reminder(&overdue, now, END_OF_DAY),
            Reminder::Daily { deadline: None }
        );
    }

    #[test]
    fn goal_deadline_skips_complete_and_past_goals() {
        let now = parse_now("2024-06-05T08:00").unwrap();
        let mut finished = Goal::new(1, "done").with_due_date("2024-06-06");
        finished.subtasks.push(Subtask {
            completed: true,
            ..Subtask::new(1, "x")
        });
        let goals = vec![
            finished,
            Goal::new(2, "past").with_due_date("2024-06-01"),
            Goal::new(3, "later").with_due_date("2024-06-20"),
            Goal::new(4, "soon").with_due_date("2024-06-10"),
            Goal::new(5, "undated"),
        ];

        let next = closest_goal_deadline(&goals, now, END_OF_DAY).unwrap();
        assert_eq!(next.goal_id, 4);
        assert_eq!(next.deadline, parse_now("2024-06-10T23:59").unwrap());
    }

    #[test]
    fn focus_stats_compare_against_best_baseline() {
        let tasks = vec![
            done(task(1, TaskKind::Daily, "2024-06-05")),
            done(task(2, TaskKind::Daily, "2024-06-05")),
            done(task(3, TaskKind::Daily, "2024-06-05")),
            task(4, TaskKind::Daily, "2024-06-05"),
            done(task(5, TaskKind::Daily, "2024-06-04")),
            done(task(6, TaskKind::Daily, "2024-06-04")),
            done(task(7, TaskKind::Daily, "2024-05-30")),
        ];
        let stats = focus_stats(&tasks, day("2024-06-05"), 0.75, 7);

        assert_eq!(stats.completed_today, 3);
        assert_eq!(stats.completed_yesterday, 2);
        assert!((stats.trailing_average - 3.0 / 7.0).abs() < 1e-9);
        assert_eq!(stats.hours_focused, 2.25);
        assert_eq!(stats.productivity, 150);
    }

    #[test]
    fn focus_stats_without_history() {
        let tasks = vec![done(task(1, TaskKind::Daily, "2024-06-05"))];
        assert_eq!(focus_stats(&tasks, day("2024-06-05"), 0.75, 7).productivity, 100);
        assert_eq!(focus_stats(&[], day("2024-06-05"), 0.75, 7).productivity, 0);
    }

    #[test]
    fn dashboard_respects_reminder_switches() {
        let now = parse_now("2024-06-05T08:00").unwrap();
        let tasks = vec![task(1, TaskKind::Daily, "2024-06-05")];
        let goals = vec![Goal::new(2, "g").with_due_date("2024-06-07")];

        let mut config = Config::default();
        let view = dashboard(&tasks, &goals, now, &config);
        assert_eq!(view.today, "2024-06-05");
        assert_eq!(view.today_tasks.len(), 1);
        assert_eq!(view.daily_progress, 0);
        assert!(view.reminder.is_some());
        assert_eq!(view.goal_deadline.as_ref().map(|g| g.goal_id), Some(2));

        config.reminders.task_reminders = false;
        config.reminders.goal_deadlines = false;
        let view = dashboard(&tasks, &goals, now, &config);
        assert!(view.reminder.is_none());
        assert!(view.goal_deadline.is_none());
    }
}
