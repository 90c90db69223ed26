//! Command-line front end for the tracker API.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracker_core::{
    ApiClient, ClientConfig, ClientError, CreateBoard, CreateIssue, IssueQuery, IssueStatus,
    RequestOptions,
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tracker", version, about = "Work with tracker boards and issues")]
struct Cli {
    /// API base URL (defaults to TRACKER_API_URL, then http://localhost:4000)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds; 0 disables it
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Bearer token sent as the Authorization header
    #[arg(long, global = true, env = "TRACKER_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Board operations
    #[command(subcommand)]
    Boards(BoardsCommand),
    /// Issue operations
    #[command(subcommand)]
    Issues(IssuesCommand),
}

#[derive(Subcommand, Debug)]
enum BoardsCommand {
    /// List boards, newest first
    List,
    /// Create a board
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
    },
    /// Show a board and its first page of issues
    Show { slug: String },
}

#[derive(Subcommand, Debug)]
enum IssuesCommand {
    /// List a board's issues
    List {
        slug: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Create an issue on a board
    Create {
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move an issue to another status
    SetStatus { id: Uuid, status: IssueStatus },
}

#[derive(Args, Debug)]
struct PageArgs {
    /// open, in_progress or done
    #[arg(long)]
    status: Option<IssueStatus>,
    #[arg(long)]
    take: Option<u32>,
    #[arg(long)]
    cursor: Option<Uuid>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

/// User-facing wording for a failed command.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(e) if e.is_cancelled() => "request cancelled (interrupted)".to_string(),
        _ => format!("{err:#}"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env().context("reading client configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Some(Duration::from_millis(ms));
    }
    let client = ApiClient::from_config(&config)?;

    // Ctrl-C aborts whatever request is in flight.
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let options = || {
        RequestOptions::new()
            .with_auth(cli.token.as_deref())
            .cancel_on(cancel.clone())
    };

    match cli.command {
        Command::Boards(BoardsCommand::List) => print(&client.boards().list(options()).await?),
        Command::Boards(BoardsCommand::Create { name, slug }) => {
            let board = client.boards().create(&CreateBoard { name, slug }, options()).await?;
            print(&board)
        }
        Command::Boards(BoardsCommand::Show { slug }) => {
            print(&client.boards().by_slug(&slug, options()).await?)
        }
        Command::Issues(IssuesCommand::List { slug, page }) => {
            let filter = IssueQuery {
                status: page.status,
                take: page.take,
                cursor: page.cursor,
            };
            print(&client.issues().list(&slug, &filter, options()).await?)
        }
        Command::Issues(IssuesCommand::Create {
            slug,
            title,
            description,
        }) => {
            let input = CreateIssue { title, description };
            print(&client.issues().create(&slug, &input, options()).await?)
        }
        Command::Issues(IssuesCommand::SetStatus { id, status }) => {
            print(&client.issues().update_status(id, status, options()).await?)
        }
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_status() {
        let cli = Cli::try_parse_from([
            "tracker",
            "issues",
            "set-status",
            "00000000-0000-0000-0000-000000000001",
            "in_progress",
        ])
        .unwrap();
        match cli.command {
            Command::Issues(IssuesCommand::SetStatus { status, .. }) => {
                assert_eq!(status, IssueStatus::InProgress)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_status() {
        let parsed = Cli::try_parse_from([
            "tracker",
            "issues",
            "list",
            "roadmap",
            "--status",
            "closed",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn describes_timeouts() {
        let err = anyhow::Error::new(ClientError::Timeout {
            after: Duration::from_millis(50),
        });
        assert_eq!(describe(&err), "request timed out after 50ms");
    }

    #[test]
    fn describes_cancellation() {
        let err = anyhow::Error::new(ClientError::Cancelled);
        assert_eq!(describe(&err), "request cancelled (interrupted)");
    }

    #[test]
    fn describes_http_errors_with_detail() {
        let err = anyhow::Error::new(ClientError::Http {
            status: 404,
            detail: "Board not found".to_string(),
        });
        assert_eq!(describe(&err), "HTTP 404 – Board not found");
    }
}
