//! Core notification domain for BuildHerald.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, business rule, and cross-cutting error type used by the handler
//! flows. Infrastructure crates implement the traits defined here; they never
//! add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`ProjectName`, `BuildArn`, etc.) |
//! | [`types`] | Shared value types (`BuildStatus`, `NotificationMessage`, etc.) |
//! | [`events`] | Inbound envelope shapes and boundary classification |
//! | [`format`] | Status-to-text message construction (pure) |
//! | [`enrich`] | Best-effort log-tail enrichment |
//! | [`ports`] | Sink traits the infrastructure crates implement |
//! | [`errors`] | Error and retry-policy types |

pub mod enrich;
pub mod errors;
pub mod events;
pub mod format;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{DeliveryError, EnrichmentError, RelayError, RetryPolicy, SecretError};
pub use events::{
    classify, BuildEvent, EventEnvelope, InboundEvent, PullRequestEvent, PullRequestEventType,
    TriggerRequest,
};
pub use identifiers::{
    BuildArn, BuildspecPath, ChannelName, CommitId, EmailAddress, LogGroupName, LogStreamName,
    ProjectName, PullRequestId, Region, RepositoryName, WebhookUrl,
};
pub use ports::{
    BuildStarter, ChatDelivery, ChatMessage, ChatSink, EnvironmentOverride, LogTailSource, Mailer,
    OutboundEmail, PullRequestComment, PullRequestCommenter, StartBuildRequest, StartedBuild,
    WebhookUrlSource,
};
pub use types::{
    BuildStatus, LogLocation, MarkupFlavor, NotificationMessage, PullRequestContext,
};
