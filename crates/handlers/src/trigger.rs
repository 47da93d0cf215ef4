//! Direct build triggering.

use relay::events::TriggerRequest;
use relay::identifiers::{BuildspecPath, ProjectName};
use relay::ports::{BuildStarter, StartBuildRequest};
use relay::RelayError;

use crate::Outcome;

/// Fallbacks applied when a trigger request leaves fields unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerDefaults {
    /// Project built when the request names none.
    pub project: Option<ProjectName>,
    /// Buildspec override applied when the request names none.
    pub buildspec: Option<BuildspecPath>,
}

/// Starts a build for a trigger request.
///
/// Project resolution is explicit field > nested details > configured
/// default; a request that resolves to no project at all is a configuration
/// error and is not retried.
pub async fn trigger_build<B: BuildStarter + ?Sized>(
    request: &TriggerRequest,
    defaults: &TriggerDefaults,
    starter: &B,
) -> Result<Outcome, RelayError> {
    let project = request
        .resolve_project(defaults.project.as_ref())
        .ok_or_else(|| {
            RelayError::configuration(
                "no CodeBuild project named in the request, its details, or the configuration",
            )
        })?;

    let start = StartBuildRequest {
        project_name: project,
        source_version: request.source_version().cloned(),
        buildspec_override: request.resolve_buildspec(defaults.buildspec.as_ref()),
        environment_overrides: Vec::new(),
    };

    let started = starter.start_build(&start).await?;
    tracing::info!(
        project = %start.project_name,
        build_arn = started.build_arn.as_ref().map(|arn| arn.as_str()),
        "build started"
    );
    Ok(Outcome::Delivered)
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
