//! taskbuddy auth command implementations.

use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::identity::{self, Identity};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::session::Session;
use crate::storage::Storage;

pub struct LoginOptions {
    pub uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LogoutOptions {
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct WhoamiOptions {
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct LoginOutput {
    identity: Identity,
    tasks: usize,
    goals: usize,
}

#[derive(Serialize)]
struct LogoutOutput {
    signed_out: Option<Identity>,
}

pub fn run_login(options: LoginOptions) -> Result<()> {
    let storage = Storage::resolve(options.home.as_deref())?;
    storage.init()?;

    let requested = Identity {
        uid: options.uid,
        display_name: options.name,
        email: options.email,
    };
    let identity = identity::sign_in(&storage, &requested)?;

    let session = Session::signed_in(Rc::new(storage.file_store()), &identity);
    let output = LoginOutput {
        tasks: session.tasks().tasks().len(),
        goals: session.goals().goals().len(),
        identity: identity.clone(),
    };

    let mut human = HumanOutput::new(format!("Signed in as {}", identity.uid));
    if let Some(name) = identity.display_name.as_deref() {
        human.push_summary("Name", name);
    }
    if let Some(email) = identity.email.as_deref() {
        human.push_summary("Email", email);
    }
    human.push_summary("Tasks", output.tasks.to_string());
    human.push_summary("Goals", output.goals.to_string());
    if output.tasks == 0 {
        human.push_next_step("taskbuddy task add \"<title>\"");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "auth login",
        &output,
        Some(&human),
    )
}

pub fn run_logout(options: LogoutOptions) -> Result<()> {
    let storage = Storage::resolve(options.home.as_deref())?;
    let previous = identity::sign_out(&storage)?;

    let human = match previous.as_ref() {
        Some(identity) => HumanOutput::new(format!("Signed out {}", identity.uid)),
        None => HumanOutput::new("Not signed in"),
    };
    let output = LogoutOutput {
        signed_out: previous,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "auth logout",
        &output,
        Some(&human),
    )
}

pub fn run_whoami(options: WhoamiOptions) -> Result<()> {
    let storage = Storage::resolve(options.home.as_deref())?;
    let identity = identity::current_identity(&storage)?.ok_or(Error::NotSignedIn)?;

    let mut human = HumanOutput::new(identity.uid.clone());
    if let Some(name) = identity.display_name.as_deref() {
        human.push_summary("Name", name);
    }
    if let Some(email) = identity.email.as_deref() {
        human.push_summary("Email", email);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "auth whoami",
        &identity,
        Some(&human),
    )
}
