//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging — for example —
//! a [`LogGroupName`] with a [`LogStreamName`] even though both are `String`
//! under the hood.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — build-system-assigned
// ---------------------------------------------------------------------------

string_id! {
    /// The full ARN of one build execution, as delivered in the
    /// `detail."build-id"` field of a build state-change event.
    ///
    /// The ARN ends in `build/{project}:{uuid}`; [`BuildArn::build_id`] and
    /// [`BuildArn::build_uuid`] expose the shorter forms used in console
    /// links and message text.
    BuildArn
}

impl BuildArn {
    /// The `{project}:{uuid}` build identifier — everything after the final
    /// `/` of the ARN.
    pub fn build_id(&self) -> &str {
        match self.0.rsplit('/').next() {
            Some(id) => id,
            None => &self.0,
        }
    }

    /// The bare build UUID — everything after the final `:` of the build
    /// identifier.
    pub fn build_uuid(&self) -> &str {
        match self.build_id().rsplit(':').next() {
            Some(uuid) => uuid,
            None => self.build_id(),
        }
    }
}

string_id! {
    /// The name of a CodeBuild project.
    ProjectName
}

string_id! {
    /// A CloudWatch Logs log group name.
    LogGroupName
}

string_id! {
    /// A CloudWatch Logs log stream name.
    LogStreamName
}

// ---------------------------------------------------------------------------
// Identifiers — source-control-assigned
// ---------------------------------------------------------------------------

string_id! {
    /// The name of a CodeCommit repository.
    ///
    /// Derived from the final path segment of a build's source location when
    /// commenting on pull requests.
    RepositoryName
}

string_id! {
    /// A CodeCommit pull request identifier.
    ///
    /// CodeCommit assigns numeric identifiers but delivers them as strings in
    /// event payloads; they are never treated as numbers here.
    PullRequestId
}

string_id! {
    /// A Git commit id (full SHA).
    CommitId
}

// ---------------------------------------------------------------------------
// Identifiers — configuration values
// ---------------------------------------------------------------------------

string_id! {
    /// An AWS region name (e.g. `"us-west-2"`), taken from the event envelope
    /// for links and from configuration for client construction.
    Region
}

string_id! {
    /// The chat channel a webhook message is addressed to (e.g. `"#builds"`).
    ChannelName
}

string_id! {
    /// An email address used as a notification source or destination.
    EmailAddress
}

string_id! {
    /// A buildspec file path passed to CodeBuild as an override.
    BuildspecPath
}

string_id! {
    /// A fully resolved chat webhook URL, produced by the secret resolver.
    ///
    /// Treated as a secret: never log the value.
    WebhookUrl
}
