//! Pull-request verification: start builds for PR updates and report build
//! outcomes back onto the pull request.

use relay::enrich::enrich;
use relay::events::{
    BuildEvent, InboundEvent, PullRequestEvent, PULL_REQUEST_DST_COMMIT_VAR, PULL_REQUEST_ID_VAR,
    PULL_REQUEST_SRC_COMMIT_VAR,
};
use relay::identifiers::ProjectName;
use relay::ports::{
    BuildStarter, EnvironmentOverride, LogTailSource, PullRequestComment, PullRequestCommenter,
    StartBuildRequest,
};
use relay::types::MarkupFlavor;
use relay::{format, RelayError};

use crate::Outcome;

/// Routes a classified event to the matching pull-request flow.
///
/// Build events become PR comments; pull-request events become verification
/// builds. `verification_project` is only required on the build-starting
/// path, so it stays optional until that path is taken.
pub async fn handle_pull_request<B, C, L>(
    event: InboundEvent,
    verification_project: Option<&ProjectName>,
    starter: &B,
    commenter: &C,
    logs: &L,
) -> Result<Outcome, RelayError>
where
    B: BuildStarter + ?Sized,
    C: PullRequestCommenter + ?Sized,
    L: LogTailSource + ?Sized,
{
    match event {
        InboundEvent::Build(event) => comment_build_status(&event, commenter, logs).await,
        InboundEvent::PullRequest(event) => {
            let project = verification_project.ok_or_else(|| {
                RelayError::configuration("no verification project is configured")
            })?;
            start_pull_request_build(&event, project, starter).await
        }
    }
}

/// Starts a verification build for a new or updated pull request.
///
/// The pull-request coordinates travel with the build as environment
/// variables so that the build's own state-change events can be traced back
/// to the pull request and commented on.
pub async fn start_pull_request_build<B: BuildStarter + ?Sized>(
    event: &PullRequestEvent,
    project: &ProjectName,
    starter: &B,
) -> Result<Outcome, RelayError> {
    if !event.triggers_build() {
        return Ok(Outcome::dropped("not a buildable pull request update"));
    }

    let request = StartBuildRequest {
        project_name: project.clone(),
        source_version: Some(event.source_commit.clone()),
        buildspec_override: None,
        environment_overrides: vec![
            EnvironmentOverride {
                name: PULL_REQUEST_ID_VAR.to_string(),
                value: event.pull_request_id.to_string(),
            },
            EnvironmentOverride {
                name: PULL_REQUEST_SRC_COMMIT_VAR.to_string(),
                value: event.source_commit.to_string(),
            },
            EnvironmentOverride {
                name: PULL_REQUEST_DST_COMMIT_VAR.to_string(),
                value: event.destination_commit.to_string(),
            },
        ],
    };

    let started = starter.start_build(&request).await?;
    tracing::info!(
        pull_request = %event.pull_request_id,
        build_arn = started.build_arn.as_ref().map(|arn| arn.as_str()),
        "verification build started"
    );
    Ok(Outcome::Delivered)
}

/// Posts a build's status as a comment on the pull request it verifies.
///
/// Builds without the full pull-request context are not PR builds and are
/// acknowledged without comment. The comment carries the build+status
/// deduplication token, so a retried invocation never double-posts.
pub async fn comment_build_status<C, L>(
    event: &BuildEvent,
    commenter: &C,
    logs: &L,
) -> Result<Outcome, RelayError>
where
    C: PullRequestCommenter + ?Sized,
    L: LogTailSource + ?Sized,
{
    let Some(context) = event.pull_request_context() else {
        return Ok(Outcome::dropped("not a pull-request build"));
    };
    let Some(repository) = event.repository_name() else {
        return Ok(Outcome::dropped("build carries no source repository"));
    };

    let mut message = format::build_message(event, MarkupFlavor::Markdown);
    enrich(&mut message, event, logs).await;

    let comment = PullRequestComment {
        repository,
        pull_request_id: context.pull_request_id,
        before_commit_id: context.destination_commit,
        after_commit_id: context.source_commit,
        content: message.markup.clone(),
        client_request_token: PullRequestComment::dedup_token(event.build_arn(), event.status()),
    };
    commenter.post_comment(&comment).await?;
    tracing::info!(
        pull_request = %comment.pull_request_id,
        status = %event.status(),
        "build status comment posted"
    );
    Ok(Outcome::Delivered)
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
