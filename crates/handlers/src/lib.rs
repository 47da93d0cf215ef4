//! BuildHerald handler flows.
//!
//! Each flow is one stateless invocation: take a classified event, build the
//! message, enrich it best-effort where the status calls for it, and make
//! exactly one delivery call. Flows are generic over the port traits in
//! [`relay::ports`]; they contain the sequencing, the ports contain the I/O,
//! and the domain rules stay in [`relay`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Flows sequence calls between the domain crate
//! and infrastructure traits. They contain no domain rules of their own.

use serde::Serialize;

pub mod chat;
pub mod email;
pub mod pull_request;
pub mod trigger;

pub use chat::notify_chat;
pub use email::{notify_email, EmailRoute};
pub use pull_request::{comment_build_status, handle_pull_request, start_pull_request_build};
pub use trigger::{trigger_build, TriggerDefaults};

/// How an invocation ended when it did not fail.
///
/// `Dropped` is a *successful* outcome for the host: the event was
/// acknowledged and intentionally not delivered (wrong event kind for the
/// flow, or a final client-side rejection). Only errors are retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The notification (or build start) went out.
    Delivered,
    /// The event was acknowledged and dropped.
    Dropped {
        /// Why the flow chose not to deliver.
        reason: String,
    },
}

impl Outcome {
    /// Convenience constructor for [`Outcome::Dropped`].
    pub fn dropped(reason: impl Into<String>) -> Self {
        Outcome::Dropped {
            reason: reason.into(),
        }
    }
}
