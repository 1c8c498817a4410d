use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ActionError, MissingUserDirectory, PageContext, PageController, PageView, RequestExecutor,
    SelectOption, StaticUserDirectory, UserDirectory,
};
use shared::{domain::TicketNumber, protocol::FormField};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod pages;

use config::load_settings;
use pages::{attachment_field, create_page, detail_page, print_report, DetailForm};

#[derive(Parser, Debug)]
#[command(name = "complaint-desk", about = "Submit complaint page actions to a complaint server")]
struct Args {
    /// Config file; `complaint_desk.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Change a complaint's status.
    Status {
        #[arg(long)]
        ticket: String,
        #[arg(long)]
        status: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Add a comment to a complaint.
    Comment {
        #[arg(long)]
        ticket: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        internal: bool,
    },
    /// Assign a complaint; omit --user-id to unassign.
    Assign {
        #[arg(long)]
        ticket: String,
        #[arg(long)]
        user_id: Option<String>,
        /// Selector option offered while editing, as `id=name`.
        #[arg(long = "candidate", value_parser = parse_candidate)]
        candidates: Vec<SelectOption>,
    },
    /// File a new complaint.
    Create {
        /// Form field as `name=value`; repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        attachment: Option<PathBuf>,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

fn parse_candidate(raw: &str) -> Result<SelectOption, String> {
    parse_field(raw).map(|(value, label)| SelectOption { value, label })
}

fn user_directory(candidates: &[SelectOption]) -> Arc<dyn UserDirectory> {
    if candidates.is_empty() {
        return Arc::new(MissingUserDirectory);
    }
    Arc::new(StaticUserDirectory::new(candidates.to_vec()))
}

fn parse_ticket(raw: &str) -> Result<TicketNumber> {
    TicketNumber::parse(raw).map_err(|err| anyhow!("invalid --ticket: {err}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(server_url = %settings.server_url, "complaint desk starting");

    let cookie = settings.page_cookie();
    let (page, context, users) = match &args.command {
        Command::Status {
            ticket,
            status,
            notes,
        } => (
            detail_page(
                cookie,
                &DetailForm {
                    status,
                    resolution_notes: notes,
                    comment: "",
                    is_internal: false,
                },
            ),
            PageContext::for_ticket(parse_ticket(ticket)?),
            user_directory(&[]),
        ),
        Command::Comment {
            ticket,
            text,
            internal,
        } => (
            detail_page(
                cookie,
                &DetailForm {
                    status: "",
                    resolution_notes: "",
                    comment: text,
                    is_internal: *internal,
                },
            ),
            PageContext::for_ticket(parse_ticket(ticket)?),
            user_directory(&[]),
        ),
        Command::Assign {
            ticket,
            candidates,
            ..
        } => (
            detail_page(
                cookie,
                &DetailForm {
                    status: "",
                    resolution_notes: "",
                    comment: "",
                    is_internal: false,
                },
            ),
            PageContext::for_ticket(parse_ticket(ticket)?),
            user_directory(candidates),
        ),
        Command::Create {
            fields,
            category,
            attachment,
        } => {
            let mut form_fields: Vec<FormField> = fields
                .iter()
                .map(|(name, value)| FormField::text(name, value))
                .collect();
            if let Some(category) = category {
                form_fields.push(FormField::text("category", category));
            }
            if let Some(path) = attachment {
                form_fields.push(attachment_field(path).await?);
            }
            (
                create_page(cookie, form_fields, category.as_deref()),
                PageContext::without_ticket(),
                user_directory(&[]),
            )
        }
    };

    let page = Arc::new(page);
    let executor = Arc::new(RequestExecutor::new(
        &settings.server_url,
        context,
        page.clone(),
    )?);
    let controller = PageController::new(executor, users);

    let result = match args.command {
        Command::Status { .. } => controller.submit_status_form().await.map(|_| ()),
        Command::Comment { .. } => controller.submit_comment_form().await.map(|_| ()),
        Command::Create { .. } => controller.submit_complaint_form().await.map(|_| ()),
        Command::Assign { user_id, .. } => {
            assign(&controller, user_id.unwrap_or_default()).await
        }
    };

    print_report(&page);
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!(action = %err.action(), error = %err, "complaint action failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Opens the selector, picks the user and saves, like two button clicks.
async fn assign(controller: &PageController, user_id: String) -> Result<(), ActionError> {
    controller.click_assign_button().await?;
    let executor = controller.executor();
    executor
        .page()
        .set_value(&executor.context().elements.assign_select, &user_id);
    controller.click_assign_button().await.map(|_| ())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
