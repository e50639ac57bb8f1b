//! taskbuddy profile command implementations.

use std::path::PathBuf;

use crate::cli::load_context;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::profile::{self, Profile, ProfileUpdate};

pub struct ShowOptions {
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SetOptions {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.home)?;
    let profile = profile::load_profile(ctx.session.backend(), &ctx.identity);

    emit_profile(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "profile show",
        "Profile",
        &profile,
    )
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let update = ProfileUpdate {
        display_name: options.name,
        phone: options.phone,
        location: options.location,
        bio: options.bio,
    };
    if update.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to update (use --name, --phone, --location or --bio)".to_string(),
        ));
    }

    let ctx = load_context(options.home)?;
    let profile = profile::update_profile(ctx.session.backend(), &ctx.identity, update);

    emit_profile(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "profile set",
        "Profile updated",
        &profile,
    )
}

pub fn run_reset(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.home)?;
    let profile = profile::reset_profile(ctx.session.backend(), &ctx.identity);

    emit_profile(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "profile reset",
        "Profile reset",
        &profile,
    )
}

fn emit_profile(
    output: OutputOptions,
    command: &str,
    header: &str,
    profile: &Profile,
) -> Result<()> {
    let mut human = HumanOutput::new(header);
    for (key, value) in [
        ("Name", &profile.display_name),
        ("Email", &profile.email),
        ("Phone", &profile.phone),
        ("Location", &profile.location),
        ("Bio", &profile.bio),
    ] {
        if !value.is_empty() {
            human.push_summary(key, value.as_str());
        }
    }

    emit_success(output, command, profile, Some(&human))
}
