pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::request::ActionsArgs;
use crate::commands::ticket::{ListArgs, SubmitArgs};

#[derive(Debug, Parser)]
#[command(
    name = "opsdesk",
    about = "Opsdesk operator CLI",
    long_about = "Submit and list operations requests, inspect form schemas and row actions, and check configuration.",
    after_help = "Examples:\n  opsdesk doctor --json\n  opsdesk ticket submit --answers vpn.toml --attach error.log\n  opsdesk request actions --kind cash --status pending_finance --role finance"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, token presence, and API reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(subcommand, about = "Inspect request form definitions")]
    Form(FormCommand),
    #[command(subcommand, about = "Submit and list IT support tickets")]
    Ticket(TicketCommand),
    #[command(subcommand, about = "Inspect request workflow rules")]
    Request(RequestCommand),
}

#[derive(Debug, Subcommand)]
enum FormCommand {
    #[command(about = "Print the step and field definition of a form as JSON")]
    Schema {
        #[arg(help = "it-issue | material-request | onboarding")]
        kind: String,
    },
}

#[derive(Debug, Subcommand)]
enum TicketCommand {
    #[command(about = "Fill the IT issue wizard from an answers file and submit it")]
    Submit {
        #[arg(long, help = "TOML file with answers grouped by step id")]
        answers: PathBuf,
        #[arg(long = "attach", help = "File to upload with the ticket (repeatable)")]
        attachments: Vec<PathBuf>,
        #[arg(long, help = "Validate and print the review and payload without submitting")]
        dry_run: bool,
    },
    #[command(about = "List tickets with filters and the actions available per row")]
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, help = "Created on or after (YYYY-MM-DD)")]
        from: Option<String>,
        #[arg(long, help = "Created on or before (YYYY-MM-DD)")]
        to: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
enum RequestCommand {
    #[command(about = "Show which row actions a role gets for a request status")]
    Actions {
        #[arg(long, help = "cash | it | material")]
        kind: String,
        #[arg(long)]
        status: String,
        #[arg(long, help = "Defaults to session.role from configuration")]
        role: Option<String>,
        #[arg(long, help = "Someone has already acted on the approval chain")]
        acted: bool,
        #[arg(long, help = "Evaluate as someone other than the requester")]
        not_owner: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Form(FormCommand::Schema { kind }) => commands::form::run_schema(&kind),
        Command::Ticket(TicketCommand::Submit { answers, attachments, dry_run }) => {
            commands::ticket::run_submit(SubmitArgs { answers, attachments, dry_run })
        }
        Command::Ticket(TicketCommand::List { search, status, priority, from, to, page }) => {
            commands::ticket::run_list(ListArgs { search, status, priority, from, to, page })
        }
        Command::Request(RequestCommand::Actions { kind, status, role, acted, not_owner }) => {
            commands::request::run_actions(ActionsArgs { kind, status, role, acted, not_owner })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
