//! Handles the delivery of status-change events to notification channels.
//!
//! This module defines the concrete notifiers and the dispatcher that drives
//! them. It uses a publisher/subscriber model: the event pipeline publishes
//! [`StatusChangedEvent`](crate::core::StatusChangedEvent)s without being
//! aware of the specific notification implementations that are listening for
//! them. New channels implement the [`Notifier`](crate::core::Notifier) trait
//! and get wired up in [`crate::services`].

pub mod dispatcher;
pub mod logging;
pub mod mail;
pub mod webhook;

#[cfg(feature = "test-utils")]
pub mod test_utils;

use crate::core::InstanceId;
use crate::store::StoreError;
use crate::template::TemplateError;
use thiserror::Error;

/// Errors a notifier can surface for a single event.
///
/// A failing notifier never aborts the pipeline; the dispatcher logs the
/// error and carries on with the remaining channels.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The event references an instance the store does not know.
    #[error("instance {0} is not registered")]
    InstanceNotFound(InstanceId),

    #[error("instance lookup failed")]
    Store(#[from] StoreError),

    #[error("notification content could not be rendered")]
    Template(#[from] TemplateError),

    #[error("notification delivery failed: {0}")]
    Delivery(anyhow::Error),
}
