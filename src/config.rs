//! Configuration loading and management
//!
//! Handles parsing of `taskbuddy.toml` in the home directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::date::parse_time;
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Goal categories and defaults
    #[serde(default)]
    pub goals: GoalsConfig,

    /// Deadline reminders shown on the dashboard
    #[serde(default)]
    pub reminders: RemindersConfig,

    /// Focus/productivity heuristic
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Task-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Category for tasks added without one
    #[serde(default = "default_task_category")]
    pub default_category: String,
}

fn default_task_category() -> String {
    crate::task::DEFAULT_TASK_CATEGORY.to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_category: default_task_category(),
        }
    }
}

/// Goal-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsConfig {
    /// Known categories. Advisory: other labels are accepted with a warning.
    #[serde(default = "default_goal_categories")]
    pub categories: Vec<String>,

    /// Category for goals created without one
    #[serde(default = "default_goal_category")]
    pub default_category: String,
}

fn default_goal_categories() -> Vec<String> {
    ["Personal", "Work", "Health", "Finance"]
        .iter()
        .map(|category| category.to_string())
        .collect()
}

fn default_goal_category() -> String {
    crate::goal::DEFAULT_GOAL_CATEGORY.to_string()
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            categories: default_goal_categories(),
            default_category: default_goal_category(),
        }
    }
}

impl GoalsConfig {
    pub fn is_known_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|known| known.trim().eq_ignore_ascii_case(category.trim()))
    }
}

/// Reminder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Time of day assumed for a deadline without an explicit time
    #[serde(default = "default_reminder_time")]
    pub default_time: String,

    /// Show the closest task deadline
    #[serde(default = "default_true")]
    pub task_reminders: bool,

    /// Show the closest goal due date
    #[serde(default = "default_true")]
    pub goal_deadlines: bool,
}

fn default_reminder_time() -> String {
    crate::date::END_OF_DAY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            default_time: default_reminder_time(),
            task_reminders: true,
            goal_deadlines: true,
        }
    }
}

/// Focus statistics policy.
///
/// A product heuristic, not something derived from the data: every
/// completed task counts as a fixed amount of focused time, and today's
/// count is compared against the larger of yesterday and a trailing mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Hours credited per completed task
    #[serde(default = "default_hours_per_task")]
    pub hours_per_task: f64,

    /// Days before today averaged into the baseline
    #[serde(default = "default_trailing_days")]
    pub trailing_days: u32,
}

fn default_hours_per_task() -> f64 {
    0.75
}

fn default_trailing_days() -> u32 {
    7
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            hours_per_task: default_hours_per_task(),
            trailing_days: default_trailing_days(),
        }
    }
}

impl Config {
    /// Load configuration from a `taskbuddy.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `taskbuddy.toml` from `home`, or return defaults when absent
    pub fn load_from_home(home: &Path) -> Result<Self> {
        let path = home.join(crate::storage::CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.tasks.default_category.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.default_category cannot be empty".to_string(),
            ));
        }

        if self.goals.categories.is_empty() {
            return Err(Error::InvalidConfig(
                "goals.categories cannot be empty".to_string(),
            ));
        }
        if self
            .goals
            .categories
            .iter()
            .any(|category| category.trim().is_empty())
        {
            return Err(Error::InvalidConfig(
                "goals.categories cannot include empty entries".to_string(),
            ));
        }
        if self.goals.default_category.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "goals.default_category cannot be empty".to_string(),
            ));
        }

        parse_time(&self.reminders.default_time).map_err(|_| {
            Error::InvalidConfig(format!(
                "reminders.default_time '{}' is not HH:MM",
                self.reminders.default_time
            ))
        })?;

        if !self.stats.hours_per_task.is_finite() || self.stats.hours_per_task <= 0.0 {
            return Err(Error::InvalidConfig(
                "stats.hours_per_task must be > 0".to_string(),
            ));
        }
        if !(1..=366).contains(&self.stats.trailing_days) {
            return Err(Error::InvalidConfig(
                "stats.trailing_days must be between 1 and 366".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.tasks.default_category, "General");
        assert_eq!(
            cfg.goals.categories,
            vec!["Personal", "Work", "Health", "Finance"]
        );
        assert_eq!(cfg.goals.default_category, "Personal");
        assert_eq!(cfg.reminders.default_time, "23:59");
        assert!(cfg.reminders.task_reminders);
        assert!(cfg.reminders.goal_deadlines);
        assert_eq!(cfg.stats.hours_per_task, 0.75);
        assert_eq!(cfg.stats.trailing_days, 7);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("taskbuddy.toml");
        let content = r#"
[tasks]
default_category = "Chores"

[goals]
categories = ["Study", "Work"]
default_category = "Study"

[reminders]
default_time = "18:00"
task_reminders = false

[stats]
hours_per_task = 1.5
trailing_days = 14
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.tasks.default_category, "Chores");
        assert_eq!(cfg.goals.categories, vec!["Study", "Work"]);
        assert_eq!(cfg.goals.default_category, "Study");
        assert_eq!(cfg.reminders.default_time, "18:00");
        assert!(!cfg.reminders.task_reminders);
        assert!(cfg.reminders.goal_deadlines);
        assert_eq!(cfg.stats.hours_per_task, 1.5);
        assert_eq!(cfg.stats.trailing_days, 14);
    }

    #[test]
    fn invalid_reminder_time_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("taskbuddy.toml");
        fs::write(&path, "[reminders]\ndefault_time = \"late\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_stats_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("taskbuddy.toml");
        fs::write(&path, "[stats]\nhours_per_task = 0.0\ntrailing_days = 0")
            .expect("write config");

        assert!(matches!(Config::load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn known_categories_match_case_insensitively() {
        let cfg = Config::default();
        assert!(cfg.goals.is_known_category("health"));
        assert!(!cfg.goals.is_known_category("Hobby"));
    }

    #[test]
    fn load_from_home_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_home(dir.path()).expect("defaults");
        assert_eq!(cfg.reminders.default_time, "23:59");
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("default_time = \"23:59\""));
        let reloaded = Config::load(&path).expect("reload");
        assert_eq!(reloaded.stats.trailing_days, 7);
    }
}
