// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod manual;

use capacity_portal_api::{
    AddTeamMemberRequest, ApiError, AuthenticatedActor, LoginRequest, LoginResponse,
    PortalSession, RemoveTeamMemberRequest, ReviewRequest, Role, SubmissionCreatedResponse,
    SubmissionDetailResponse, UpdateVendorSettingsRequest, VendorWorkspace, add_team_member,
    approve_submission, capacity_template, current_week_info, export_submission_csv,
    list_pending, list_team, list_vendor_submissions, list_vendors, load_vendor_workspace, login,
    reject_submission, remove_team_member, submit_bulk_upload, submit_manual,
    update_vendor_settings, view_submission, workspace_response,
};
use capacity_portal_domain::{Clock, FiscalCalendar, SubDeptMode, SystemClock};
use capacity_portal_persistence::SheetsClient;
use clap::{Parser, Subcommand, ValueEnum};
use config::{GlobalArgs, PortalConfig, parse_date};
use manual::ManualEdits;
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::{OffsetDateTime, macros::time};
use tracing::info;

/// Capacity Portal - vendor capacity submissions and production review
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    /// Portal to sign in through. Defaults to the portal the command belongs to.
    #[arg(long, value_enum, global = true)]
    portal: Option<Portal>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Portal {
    Vendor,
    Production,
}

impl From<Portal> for Role {
    fn from(portal: Portal) -> Self {
        match portal {
            Portal::Vendor => Self::Vendor,
            Portal::Production => Self::Production,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    Vendor,
    Subdept,
}

impl From<ModeArg> for SubDeptMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Vendor => Self::VendorLevel,
            ModeArg::Subdept => Self::BySubDept,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Show the current fiscal week
    Week {
        /// Evaluate at this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        at: Option<String>,
    },
    /// Print the bulk-upload CSV template
    Template {
        #[arg(long, value_enum)]
        mode: ModeArg,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show a vendor's live capacity for the fiscal year
    Workspace {
        /// Vendor to show; vendors default to their own
        #[arg(long)]
        vendor_id: Option<String>,
    },
    /// Submit a capacity CSV for approval
    SubmitUpload {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        vendor_id: Option<String>,
    },
    /// Edit baselines, dollar limit or overrides and submit for approval
    SubmitManual {
        #[arg(long)]
        vendor_id: Option<String>,
        #[command(flatten)]
        edits: ManualEdits,
        /// Comments for the reviewers
        #[arg(long, default_value = "")]
        comments: String,
    },
    /// List a vendor's submissions, newest first
    History {
        #[arg(long)]
        vendor_id: Option<String>,
    },
    /// List submissions waiting for review
    Pending,
    /// Show a submission with its pending changes
    Show {
        #[arg(long)]
        submission_id: String,
    },
    /// Export a submission's capacity in upload format
    Export {
        #[arg(long)]
        submission_id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Approve a submission and apply it to live capacity
    Approve {
        #[arg(long)]
        submission_id: String,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Reject a submission
    Reject {
        #[arg(long)]
        submission_id: String,
        #[arg(long)]
        comments: Option<String>,
    },
    /// List vendors
    Vendors {
        /// Only vendors tracking unit, value or both
        #[arg(long)]
        tracking: Option<String>,
    },
    /// Change a vendor's tracking type, sub-department mode or status
    ConfigureVendor {
        #[arg(long)]
        vendor_id: String,
        #[arg(long)]
        tracking: Option<String>,
        #[arg(long = "subdept-mode")]
        sub_dept_mode: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Manage the production review team
    Team {
        #[command(subcommand)]
        action: TeamCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum TeamCommand {
    /// List team members
    List,
    /// Add a team member
    Add {
        #[arg(long)]
        member_email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        member_password: String,
    },
    /// Remove a team member
    Remove {
        #[arg(long)]
        member_email: String,
    },
}

impl Command {
    /// Returns the portal a command signs in through when none is given.
    const fn default_portal(&self) -> Role {
        match self {
            Self::Week { .. }
            | Self::Template { .. }
            | Self::Workspace { .. }
            | Self::SubmitUpload { .. }
            | Self::SubmitManual { .. }
            | Self::History { .. }
            | Self::Show { .. }
            | Self::Export { .. } => Role::Vendor,
            Self::Pending
            | Self::Approve { .. }
            | Self::Reject { .. }
            | Self::Vendors { .. }
            | Self::ConfigureVendor { .. }
            | Self::Team { .. } => Role::Production,
        }
    }
}

/// Picks the vendor a command targets.
///
/// An explicit `--vendor-id` wins; otherwise a vendor actor targets itself.
fn vendor_ref<'a>(
    explicit: Option<&'a str>,
    actor: &'a AuthenticatedActor,
) -> Result<&'a str, ApiError> {
    explicit
        .or(actor.vendor_id.as_deref())
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("vendor_id"),
            message: String::from("--vendor-id is required for production users"),
        })
}

fn review(submission_id: &str, comments: Option<&str>) -> ReviewRequest {
    ReviewRequest {
        submission_id: submission_id.to_string(),
        comments: comments.map(str::to_string),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn write_text(text: &str, output: Option<&Path>) -> Result<(), std::io::Error> {
    let Some(path) = output else {
        print!("{text}");
        return Ok(());
    };
    tokio::fs::write(path, text).await?;
    info!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Runs commands that need the store and a signed-in actor.
#[allow(clippy::too_many_lines)]
async fn run_signed_in(
    command: &Command,
    config: &PortalConfig,
    store: &SheetsClient,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<(), Box<dyn std::error::Error>> {
    let calendar: &FiscalCalendar = config.calendar();
    match command {
        Command::Week { .. } | Command::Template { .. } => {}
        Command::Workspace { vendor_id } => {
            let vendor: &str = vendor_ref(vendor_id.as_deref(), actor)?;
            let workspace: VendorWorkspace =
                load_vendor_workspace(store, session, actor, calendar, vendor, now).await?;
            print_json(&workspace_response(&workspace, calendar)?)?;
        }
        Command::SubmitUpload { file, vendor_id } => {
            let vendor: &str = vendor_ref(vendor_id.as_deref(), actor)?;
            let content: String = tokio::fs::read_to_string(file).await?;
            let filename: &str = file
                .file_name()
                .and_then(std::ffi::OsStr::to_str)
                .unwrap_or("upload.csv");
            let response: SubmissionCreatedResponse = submit_bulk_upload(
                store, session, actor, calendar, vendor, &content, filename, now,
            )
            .await?;
            print_json(&response)?;
        }
        Command::SubmitManual {
            vendor_id,
            edits,
            comments,
        } => {
            let vendor: &str = vendor_ref(vendor_id.as_deref(), actor)?;
            let mut workspace: VendorWorkspace =
                load_vendor_workspace(store, session, actor, calendar, vendor, now).await?;
            let written: usize = edits.apply(&mut workspace.state)?;
            info!(vendor_id = %workspace.vendor.id, override_weeks = written, "Edits applied");
            let response: SubmissionCreatedResponse =
                submit_manual(store, actor, &workspace, comments, now).await?;
            print_json(&response)?;
        }
        Command::History { vendor_id } => {
            let vendor: &str = vendor_ref(vendor_id.as_deref(), actor)?;
            print_json(&list_vendor_submissions(store, session, actor, vendor, now).await?)?;
        }
        Command::Pending => {
            print_json(&list_pending(store, session, actor, now).await?)?;
        }
        Command::Show { submission_id } => {
            let detail: SubmissionDetailResponse =
                view_submission(store, session, actor, calendar, submission_id, now).await?;
            print_json(&detail)?;
        }
        Command::Export {
            submission_id,
            output,
        } => {
            let csv: String =
                export_submission_csv(store, session, actor, calendar, submission_id, now).await?;
            write_text(&csv, output.as_deref()).await?;
        }
        Command::Approve {
            submission_id,
            comments,
        } => {
            let request: ReviewRequest = review(submission_id, comments.as_deref());
            print_json(&approve_submission(store, session, actor, calendar, &request, now).await?)?;
        }
        Command::Reject {
            submission_id,
            comments,
        } => {
            let request: ReviewRequest = review(submission_id, comments.as_deref());
            print_json(&reject_submission(store, actor, &request, now).await?)?;
        }
        Command::Vendors { tracking } => {
            print_json(&list_vendors(store, session, actor, tracking.as_deref(), now).await?)?;
        }
        Command::ConfigureVendor {
            vendor_id,
            tracking,
            sub_dept_mode,
            status,
        } => {
            let request: UpdateVendorSettingsRequest = UpdateVendorSettingsRequest {
                vendor_id: vendor_id.clone(),
                tracking: tracking.clone(),
                sub_dept_mode: sub_dept_mode.clone(),
                status: status.clone(),
            };
            print_json(&update_vendor_settings(store, session, actor, &request, now).await?)?;
        }
        Command::Team { action } => match action {
            TeamCommand::List => print_json(&list_team(store, actor).await?)?,
            TeamCommand::Add {
                member_email,
                name,
                member_password,
            } => {
                let request: AddTeamMemberRequest = AddTeamMemberRequest {
                    email: member_email.clone(),
                    name: name.clone(),
                    password: member_password.clone(),
                };
                print_json(&add_team_member(store, session, actor, &request).await?)?;
            }
            TeamCommand::Remove { member_email } => {
                let request: RemoveTeamMemberRequest = RemoveTeamMemberRequest {
                    email: member_email.clone(),
                };
                print_json(&remove_team_member(store, session, actor, &request).await?)?;
            }
        },
    }
    Ok(())
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config: PortalConfig = PortalConfig::from_args(&args.global)?;
    let now: OffsetDateTime = SystemClock.now();

    // Offline commands
    match &args.command {
        Command::Week { at } => {
            let at_time: OffsetDateTime = at
                .as_deref()
                .map(|raw| parse_date("at", raw))
                .transpose()?
                .map_or(now, |date| date.with_time(time!(12:00)).assume_utc());
            print_json(&current_week_info(config.calendar(), at_time)?)?;
            return Ok(());
        }
        Command::Template { mode, output } => {
            write_text(capacity_template((*mode).into()), output.as_deref()).await?;
            return Ok(());
        }
        _ => {}
    }

    let store: &SheetsClient = config.store()?;
    let (email, password): (&str, &str) = config.credentials()?;
    let portal: Role = args
        .portal
        .map_or_else(|| args.command.default_portal(), Role::from);

    let mut session: PortalSession = PortalSession::new(config.refresh());
    let signed_in: LoginResponse = login(
        store,
        &mut session,
        &LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            portal,
        },
        now,
    )
    .await?;
    info!(
        email = %signed_in.actor.email,
        role = signed_in.actor.role.label(),
        "Signed in"
    );

    run_signed_in(
        &args.command,
        &config,
        store,
        &mut session,
        &signed_in.actor,
        now,
    )
    .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    // Logs go to stderr so command output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(&args).await
}
