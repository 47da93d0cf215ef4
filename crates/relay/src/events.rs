//! Inbound event shapes and boundary classification.
//!
//! Events arrive as a generic envelope (source, detail-type, opaque detail).
//! [`classify`] is the single place where the opaque detail is validated into
//! a tagged [`InboundEvent`] variant; everything downstream works with typed
//! events and never touches raw JSON.

use serde::Deserialize;

use crate::errors::RelayError;
use crate::identifiers::{
    BuildArn, BuildspecPath, CommitId, ProjectName, PullRequestId, Region, RepositoryName,
};
use crate::types::{BuildStatus, LogLocation, PullRequestContext};
use crate::{LogGroupName, LogStreamName};

/// Envelope source emitted by the build system.
pub const BUILD_SOURCE: &str = "aws.codebuild";
/// Detail-type of a build state-change event.
pub const BUILD_DETAIL_TYPE: &str = "CodeBuild Build State Change";
/// Envelope source emitted by the source-control service.
pub const PULL_REQUEST_SOURCE: &str = "aws.codecommit";
/// Detail-type of a pull-request state-change event.
pub const PULL_REQUEST_DETAIL_TYPE: &str = "CodeCommit Pull Request State Change";

/// Environment variable naming the pull request a triggered build belongs to.
pub const PULL_REQUEST_ID_VAR: &str = "CODECOMMIT_PULL_REQUEST_ID";
/// Environment variable carrying the pull request's source commit.
pub const PULL_REQUEST_SRC_COMMIT_VAR: &str = "CODECOMMIT_PULL_REQUEST_SRC_COMMIT";
/// Environment variable carrying the pull request's destination commit.
pub const PULL_REQUEST_DST_COMMIT_VAR: &str = "CODECOMMIT_PULL_REQUEST_DST_COMMIT";

// ---------------------------------------------------------------------------
// Envelope and classification
// ---------------------------------------------------------------------------

/// The raw event envelope, before classification.
///
/// Every field is optional at this layer; [`classify`] decides what the
/// envelope actually is and which fields it must carry.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    /// The emitting service, e.g. [`BUILD_SOURCE`].
    #[serde(default)]
    pub source: Option<String>,
    /// The event kind within the source.
    #[serde(default, rename = "detail-type")]
    pub detail_type: Option<String>,
    /// The source-specific payload, left opaque until classification.
    #[serde(default)]
    pub detail: serde_json::Value,
    /// The region the event was emitted in.
    #[serde(default)]
    pub region: Option<String>,
}

/// A classified, fully validated inbound event.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A build changed state.
    Build(BuildEvent),
    /// A pull request changed state.
    PullRequest(PullRequestEvent),
}

impl InboundEvent {
    /// Returns the build event, or `None` for other variants.
    pub fn into_build(self) -> Option<BuildEvent> {
        match self {
            InboundEvent::Build(event) => Some(event),
            InboundEvent::PullRequest(_) => None,
        }
    }
}

/// Inspects the envelope's source and detail-type and validates the detail
/// payload into the matching [`InboundEvent`] variant.
///
/// Any source / detail-type pair outside the two recognised combinations is
/// an [`RelayError::UnrecognizedEvent`] — non-retryable, because replaying
/// the same envelope can never produce a different classification.
pub fn classify(envelope: EventEnvelope) -> Result<InboundEvent, RelayError> {
    match (envelope.source.as_deref(), envelope.detail_type.as_deref()) {
        (Some(BUILD_SOURCE), Some(BUILD_DETAIL_TYPE)) => {
            let detail: BuildDetail = serde_json::from_value(envelope.detail)
                .map_err(|error| RelayError::MalformedEvent {
                    kind: "build".to_string(),
                    message: error.to_string(),
                })?;
            let region = envelope
                .region
                .and_then(|r| Region::new(r))
                .ok_or_else(|| RelayError::MalformedEvent {
                    kind: "build".to_string(),
                    message: "envelope is missing its region".to_string(),
                })?;
            Ok(InboundEvent::Build(BuildEvent::new(region, detail)))
        }
        (Some(PULL_REQUEST_SOURCE), Some(PULL_REQUEST_DETAIL_TYPE)) => {
            let event: PullRequestEvent = serde_json::from_value(envelope.detail)
                .map_err(|error| RelayError::MalformedEvent {
                    kind: "pull request".to_string(),
                    message: error.to_string(),
                })?;
            Ok(InboundEvent::PullRequest(event))
        }
        (source, detail_type) => Err(RelayError::UnrecognizedEvent {
            event_source: source.map(str::to_string),
            detail_type: detail_type.map(str::to_string),
        }),
    }
}

// ---------------------------------------------------------------------------
// Build state-change events
// ---------------------------------------------------------------------------

/// A validated build state-change event.
#[derive(Debug, Clone)]
pub struct BuildEvent {
    region: Region,
    detail: BuildDetail,
}

impl BuildEvent {
    /// Pairs a validated detail payload with the envelope's region.
    pub fn new(region: Region, detail: BuildDetail) -> Self {
        Self { region, detail }
    }

    /// The region the build ran in; used for console deep links.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The full ARN of the build execution.
    pub fn build_arn(&self) -> &BuildArn {
        &self.detail.build_id
    }

    /// The project the build belongs to.
    pub fn project_name(&self) -> &ProjectName {
        &self.detail.project_name
    }

    /// The build's current status class.
    pub fn status(&self) -> &BuildStatus {
        &self.detail.build_status
    }

    /// Where the build's log output lives, when the event names both the
    /// group and the stream.
    pub fn log_location(&self) -> Option<LogLocation> {
        let logs = self.detail.additional_information.logs.as_ref()?;
        let group = LogGroupName::new(logs.group_name.clone()?)?;
        let stream = LogStreamName::new(logs.stream_name.clone()?)?;
        Some(LogLocation { group, stream })
    }

    /// The pull request this build was started for, recovered from the
    /// environment variables the trigger flow injected.
    ///
    /// `None` unless all three `CODECOMMIT_PULL_REQUEST_*` variables are
    /// present — a build without them was not started for a pull request.
    pub fn pull_request_context(&self) -> Option<PullRequestContext> {
        let variables = self
            .detail
            .additional_information
            .environment
            .as_ref()?
            .environment_variables
            .as_slice();
        let value_of = |name: &str| {
            variables
                .iter()
                .find(|variable| variable.name == name)
                .map(|variable| variable.value.clone())
        };
        Some(PullRequestContext {
            pull_request_id: PullRequestId::new(value_of(PULL_REQUEST_ID_VAR)?)?,
            source_commit: CommitId::new(value_of(PULL_REQUEST_SRC_COMMIT_VAR)?)?,
            destination_commit: CommitId::new(value_of(PULL_REQUEST_DST_COMMIT_VAR)?)?,
        })
    }

    /// The repository the build's source came from: the final path segment of
    /// the source location.
    pub fn repository_name(&self) -> Option<RepositoryName> {
        let location = self
            .detail
            .additional_information
            .source
            .as_ref()?
            .location
            .as_deref()?;
        RepositoryName::new(location.rsplit('/').next()?)
    }
}

/// The `detail` payload of a build state-change event, as delivered on the
/// wire. Field names mirror the event JSON exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildDetail {
    /// The build's ARN (the wire calls this `build-id`).
    #[serde(rename = "build-id")]
    pub build_id: BuildArn,
    /// The owning project.
    #[serde(rename = "project-name")]
    pub project_name: ProjectName,
    /// The new status.
    #[serde(rename = "build-status")]
    pub build_status: BuildStatus,
    /// Environment, source, and log metadata.
    #[serde(rename = "additional-information", default)]
    pub additional_information: AdditionalInformation,
}

/// The `additional-information` block of a build event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdditionalInformation {
    /// The environment the build ran with.
    #[serde(default)]
    pub environment: Option<BuildEnvironment>,
    /// The build's source definition.
    #[serde(default)]
    pub source: Option<BuildSource>,
    /// The build's log destination.
    #[serde(default)]
    pub logs: Option<LogsInfo>,
}

/// The environment block: only the variable list matters here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildEnvironment {
    /// Variables the build was started with.
    #[serde(rename = "environment-variables", default)]
    pub environment_variables: Vec<EnvironmentVariable>,
}

/// One environment variable as reported by the build system.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentVariable {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
    /// Variable type (`"PLAINTEXT"`, `"PARAMETER_STORE"`, ...); unused here.
    #[serde(default, rename = "type")]
    pub variable_type: Option<String>,
}

/// The source block: only the location is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSource {
    /// The clone URL or bucket path the build pulled from.
    #[serde(default)]
    pub location: Option<String>,
}

/// The logs block. Either name may be absent while the build is starting up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsInfo {
    /// CloudWatch Logs group name.
    #[serde(default, rename = "group-name")]
    pub group_name: Option<String>,
    /// CloudWatch Logs stream name.
    #[serde(default, rename = "stream-name")]
    pub stream_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Pull-request state-change events
// ---------------------------------------------------------------------------

/// A validated pull-request state-change event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestEvent {
    /// What happened to the pull request.
    pub event: PullRequestEventType,
    /// The pull request's identifier.
    pub pull_request_id: PullRequestId,
    /// Tip commit of the source branch.
    pub source_commit: CommitId,
    /// Tip commit of the destination branch.
    pub destination_commit: CommitId,
}

impl PullRequestEvent {
    /// `true` for the event types that should start a verification build:
    /// a new pull request, or new commits on an existing one.
    pub fn triggers_build(&self) -> bool {
        matches!(
            self.event,
            PullRequestEventType::Created | PullRequestEventType::SourceBranchUpdated
        )
    }
}

/// What happened to a pull request.
///
/// Event types this version does not recognise land in
/// [`PullRequestEventType::Other`] and never trigger a build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PullRequestEventType {
    /// The pull request was opened.
    Created,
    /// New commits were pushed to the source branch.
    SourceBranchUpdated,
    /// Any other lifecycle event (merged, closed, ...), carrying the raw
    /// event string.
    Other(String),
}

impl From<String> for PullRequestEventType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pullRequestCreated" => PullRequestEventType::Created,
            "pullRequestSourceBranchUpdated" => PullRequestEventType::SourceBranchUpdated,
            _ => PullRequestEventType::Other(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Build-trigger requests
// ---------------------------------------------------------------------------

/// A request to start a build, as accepted by the trigger handler.
///
/// Unlike the state-change events this is not an envelope: callers invoke the
/// trigger directly with a small ad-hoc payload. Project and buildspec may be
/// given at the top level, nested under `details`, or omitted in favour of
/// the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerRequest {
    /// Explicit project override.
    #[serde(default)]
    pub project: Option<ProjectName>,
    /// Explicit buildspec override.
    #[serde(default)]
    pub buildspec: Option<BuildspecPath>,
    /// Nested overrides, one level down.
    #[serde(default)]
    pub details: Option<TriggerDetails>,
    /// The emitting service, when the request was forwarded from an event.
    #[serde(default)]
    pub source: Option<String>,
    /// Source-control detail, when the request was forwarded from an event.
    #[serde(default)]
    pub detail: Option<TriggerDetail>,
}

impl TriggerRequest {
    /// Resolves the project to build: explicit field, then nested details,
    /// then the configured default.
    pub fn resolve_project(&self, default: Option<&ProjectName>) -> Option<ProjectName> {
        self.project
            .clone()
            .or_else(|| self.details.as_ref().and_then(|d| d.project.clone()))
            .or_else(|| default.cloned())
    }

    /// Resolves the buildspec override with the same precedence as
    /// [`Self::resolve_project`]. `None` runs the project's own buildspec.
    pub fn resolve_buildspec(&self, default: Option<&BuildspecPath>) -> Option<BuildspecPath> {
        self.buildspec
            .clone()
            .or_else(|| self.details.as_ref().and_then(|d| d.buildspec.clone()))
            .or_else(|| default.cloned())
    }

    /// The commit to build, when the request was forwarded from a
    /// source-control event that names one.
    pub fn source_version(&self) -> Option<&CommitId> {
        if self.source.as_deref() != Some(PULL_REQUEST_SOURCE) {
            return None;
        }
        self.detail.as_ref()?.commit_id.as_ref()
    }
}

/// Nested trigger overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerDetails {
    /// Project override, one level down.
    #[serde(default)]
    pub project: Option<ProjectName>,
    /// Buildspec override, one level down.
    #[serde(default)]
    pub buildspec: Option<BuildspecPath>,
}

/// Source-control detail on a forwarded trigger request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerDetail {
    /// The commit the forwarding event was about.
    #[serde(default, rename = "commitId")]
    pub commit_id: Option<CommitId>,
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
