//! Command-line interface for taskbuddy
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;
use std::rc::Rc;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::date;
use crate::error::{Error, Result};
use crate::identity::{self, Identity};
use crate::session::Session;
use crate::storage::Storage;

mod auth;
mod dashboard;
mod goal;
mod profile;
mod task;

/// taskbuddy - daily/weekly tasks and goals
///
/// Tasks and goals are kept per signed-in user under the taskbuddy home
/// directory.
#[derive(Parser, Debug)]
#[command(name = "taskbuddy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Home directory holding config, session and stored lists
    #[arg(long, global = true, env = "TASKBUDDY_HOME")]
    pub home: Option<PathBuf>,

    /// Pin the local clock (YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])
    #[arg(long, global = true, env = "TASKBUDDY_NOW")]
    pub now: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out, show the signed-in user
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Daily and weekly tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Goals and their subtasks
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Profile of the signed-in user
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Today, this week, goal progress, reminders and focus stats
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in as a user id
    Login {
        /// Stable user id
        uid: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Task type: daily or weekly
        #[arg(long = "type", default_value = "daily")]
        kind: String,

        /// Due date (defaults to today)
        #[arg(long)]
        due: Option<String>,

        /// Due time (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// Category label
        #[arg(long)]
        category: Option<String>,
    },

    /// Flip a task between open and done
    Toggle {
        /// Task id
        id: i64,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: i64,
    },

    /// List tasks
    List {
        /// Only daily tasks due today
        #[arg(long, conflicts_with = "week")]
        today: bool,

        /// Only weekly tasks due this week (Monday..Sunday)
        #[arg(long)]
        week: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Create a goal
    New {
        /// Goal title
        title: String,

        /// Category label
        #[arg(long)]
        category: Option<String>,

        /// Due date
        #[arg(long)]
        due: Option<String>,

        /// Longer description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a goal and its subtasks
    Rm {
        /// Goal id
        id: i64,
    },

    /// List goals with progress
    List,

    /// Subtasks of a goal
    #[command(subcommand)]
    Sub(SubtaskCommands),
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Append a subtask to a goal
    Add {
        /// Goal id
        goal_id: i64,

        /// Subtask title
        title: String,
    },

    /// Flip a subtask between open and done
    Toggle {
        /// Goal id
        goal_id: i64,

        /// Subtask id
        subtask_id: i64,
    },

    /// Delete a subtask
    Rm {
        /// Goal id
        goal_id: i64,

        /// Subtask id
        subtask_id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the profile
    Show,

    /// Update profile fields
    Set {
        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Location
        #[arg(long)]
        location: Option<String>,

        /// Short bio
        #[arg(long)]
        bio: Option<String>,
    },

    /// Discard profile edits
    Reset,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Auth(cmd) => match cmd {
                AuthCommands::Login { uid, name, email } => auth::run_login(auth::LoginOptions {
                    uid,
                    name,
                    email,
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                AuthCommands::Logout => auth::run_logout(auth::LogoutOptions {
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                AuthCommands::Whoami => auth::run_whoami(auth::WhoamiOptions {
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    kind,
                    due,
                    time,
                    category,
                } => task::run_add(task::AddOptions {
                    title,
                    kind,
                    due,
                    time,
                    category,
                    home: self.home,
                    now: self.now,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Toggle { id } => task::run_toggle(task::ToggleOptions {
                    id,
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Rm { id } => task::run_rm(task::RmOptions {
                    id,
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::List { today, week } => task::run_list(task::ListOptions {
                    today,
                    week,
                    home: self.home,
                    now: self.now,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Goal(cmd) => match cmd {
                GoalCommands::New {
                    title,
                    category,
                    due,
                    description,
                } => goal::run_new(goal::NewOptions {
                    title,
                    category,
                    due,
                    description,
                    home: self.home,
                    now: self.now,
                    json: self.json,
                    quiet: self.quiet,
                }),
                GoalCommands::Rm { id } => goal::run_rm(goal::RmOptions {
                    id,
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                GoalCommands::List => goal::run_list(goal::ListOptions {
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                GoalCommands::Sub(sub) => match sub {
                    SubtaskCommands::Add { goal_id, title } => {
                        goal::run_sub_add(goal::SubAddOptions {
                            goal_id,
                            title,
                            home: self.home,
                            now: self.now,
                            json: self.json,
                            quiet: self.quiet,
                        })
                    }
                    SubtaskCommands::Toggle {
                        goal_id,
                        subtask_id,
                    } => goal::run_sub_toggle(goal::SubtaskRefOptions {
                        goal_id,
                        subtask_id,
                        home: self.home,
                        json: self.json,
                        quiet: self.quiet,
                    }),
                    SubtaskCommands::Rm {
                        goal_id,
                        subtask_id,
                    } => goal::run_sub_rm(goal::SubtaskRefOptions {
                        goal_id,
                        subtask_id,
                        home: self.home,
                        json: self.json,
                        quiet: self.quiet,
                    }),
                },
            },
            Commands::Profile(cmd) => match cmd {
                ProfileCommands::Show => profile::run_show(profile::ShowOptions {
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProfileCommands::Set {
                    name,
                    phone,
                    location,
                    bio,
                } => profile::run_set(profile::SetOptions {
                    name,
                    phone,
                    location,
                    bio,
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProfileCommands::Reset => profile::run_reset(profile::ShowOptions {
                    home: self.home,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Dashboard => dashboard::run(dashboard::DashboardOptions {
                home: self.home,
                now: self.now,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

/// Everything a signed-in command needs
struct Context {
    config: Config,
    identity: Identity,
    session: Session,
}

fn load_context(home: Option<PathBuf>) -> Result<Context> {
    let storage = Storage::resolve(home.as_deref())?;
    let identity = identity::current_identity(&storage)?.ok_or(Error::NotSignedIn)?;
    let config = Config::load_from_home(storage.home())?;
    storage.init()?;

    let session = Session::signed_in(Rc::new(storage.file_store()), &identity);
    tracing::debug!(home = %storage.home().display(), uid = %identity.uid, "loaded context");

    Ok(Context {
        config,
        identity,
        session,
    })
}

fn resolve_now(raw: Option<&str>) -> Result<NaiveDateTime> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => date::parse_now(value),
        None => Ok(date::now()),
    }
}

/// Normalize and validate an optional `--due` value.
fn parse_due(raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let normalized = date::normalize_date(raw);
    if normalized.is_empty() {
        return Ok(None);
    }
    date::parse_date(&normalized)?;
    Ok(Some(normalized))
}

fn non_empty_title(raw: &str, what: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} title cannot be empty")));
    }
    Ok(title.to_string())
}
