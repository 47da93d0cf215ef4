//! BuildHerald CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — load the `HERALD_*` environment inputs.
//! 2. **Wire observability** — configure `tracing-subscriber` with a JSON
//!    layer; all `tracing` events emitted by every crate in the workspace
//!    flow through it.
//! 3. **Construct infrastructure** — create the AWS and chat adapters and
//!    inject them into the selected handler flow.
//! 4. **Map the outcome to the host contract** — a delivered or deliberately
//!    dropped event exits zero (the host acknowledges it); only retryable
//!    failures exit non-zero so the host re-runs the invocation.
//!
//! One invocation processes exactly one event, read from stdin or
//! `--event-file`.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use handlers::Outcome;
use relay::events::{classify, EventEnvelope, InboundEvent, TriggerRequest};
use relay::ports::WebhookUrlSource;
use relay::{BuildEvent, RelayError, RetryPolicy};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "herald",
    about = "Relays CI build and pull-request events to chat, email, and PR comment sinks."
)]
struct Cli {
    /// Read the event JSON from this file instead of stdin.
    #[arg(long, value_name = "PATH", global = true)]
    event_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Post a build state change to the chat webhook.
    Chat,
    /// Email a completed build's outcome, with the log tail on failure.
    Email,
    /// Start verification builds for pull requests and comment results back.
    PullRequest,
    /// Start a build from a trigger request.
    Trigger,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Outcome::Delivered) => ExitCode::SUCCESS,
        Ok(Outcome::Dropped { reason }) => {
            tracing::info!(%reason, "event acknowledged without delivery");
            ExitCode::SUCCESS
        }
        Err(error) => match error.retry_policy() {
            RetryPolicy::NonRetryable => {
                tracing::warn!(%error, "invocation failed permanently; acknowledging anyway");
                ExitCode::SUCCESS
            }
            RetryPolicy::Retryable { .. } => {
                tracing::error!(%error, "invocation failed; surfacing for retry");
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

async fn run(cli: Cli) -> Result<Outcome, RelayError> {
    let config = Config::from_env();
    let payload = read_event(cli.event_file.as_deref())?;

    match cli.command {
        Command::Chat => {
            let event = expect_build(classify(parse_envelope(&payload)?)?)?;
            let sdk = aws::sdk_config(config.region.as_ref()).await;
            let resolver = aws::WebhookUrlResolver::new(&sdk, config.webhook_secret.clone());
            let url = resolver.webhook_url().await?;
            let sink = chat::WebhookChatSink::new(url);
            handlers::notify_chat(&event, config.chat_channel.as_ref(), &sink).await
        }
        Command::Email => {
            let event = expect_build(classify(parse_envelope(&payload)?)?)?;
            let route = config.email_route()?;
            let sdk = aws::sdk_config(config.region.as_ref()).await;
            let mailer = aws::SesMailer::new(&sdk);
            let logs = aws::CloudWatchLogTail::new(&sdk);
            handlers::notify_email(&event, &route, &mailer, &logs).await
        }
        Command::PullRequest => {
            let event = classify(parse_envelope(&payload)?)?;
            let sdk = aws::sdk_config(config.region.as_ref()).await;
            let starter = aws::CodeBuildStarter::new(&sdk);
            let commenter = aws::CodeCommitCommenter::new(&sdk);
            let logs = aws::CloudWatchLogTail::new(&sdk);
            handlers::handle_pull_request(
                event,
                config.default_project.as_ref(),
                &starter,
                &commenter,
                &logs,
            )
            .await
        }
        Command::Trigger => {
            let request: TriggerRequest =
                serde_json::from_str(&payload).map_err(|error| RelayError::MalformedEvent {
                    kind: "trigger".to_string(),
                    message: error.to_string(),
                })?;
            let defaults = handlers::TriggerDefaults {
                project: config.default_project.clone(),
                buildspec: config.default_buildspec.clone(),
            };
            let sdk = aws::sdk_config(config.region.as_ref()).await;
            let starter = aws::CodeBuildStarter::new(&sdk);
            handlers::trigger_build(&request, &defaults, &starter).await
        }
    }
}

fn read_event(path: Option<&Path>) -> Result<String, RelayError> {
    let payload = match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map(|_| buffer)
        }
    };
    payload.map_err(|error| {
        RelayError::configuration(format!("could not read the event payload: {error}"))
    })
}

fn parse_envelope(payload: &str) -> Result<EventEnvelope, RelayError> {
    serde_json::from_str(payload).map_err(|error| RelayError::MalformedEvent {
        kind: "envelope".to_string(),
        message: error.to_string(),
    })
}

/// The chat and email flows handle build events only; anything else is
/// acknowledged as unrecognized.
fn expect_build(event: InboundEvent) -> Result<BuildEvent, RelayError> {
    event.into_build().ok_or_else(|| RelayError::UnrecognizedEvent {
        event_source: Some(relay::events::PULL_REQUEST_SOURCE.to_string()),
        detail_type: Some(relay::events::PULL_REQUEST_DETAIL_TYPE.to_string()),
    })
}
