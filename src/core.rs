//! Core domain types and service traits for appwatch
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the notification pipeline.

use crate::notification::NotifyError;
use crate::store::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a registered application instance.
///
/// Opaque to this crate; the registration subsystem decides how ids are
/// minted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration data supplied when an application instance signs up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Human-readable name of the application.
    pub name: String,
    /// URL of the instance's health-check endpoint.
    pub health_url: String,
}

impl Registration {
    pub fn new(name: impl Into<String>, health_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health_url: health_url.into(),
        }
    }
}

/// Health classification of an instance.
///
/// A closed set on purpose: downstream components match on it, and templates
/// rely on the uppercase wire form (`"DOWN"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
    Offline,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::Offline => "OFFLINE",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health state of an instance plus optional diagnostic details.
///
/// Immutable value; transitions replace the whole `StatusInfo` rather than
/// mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub status: Status,
    /// Free-form payload reported by the health endpoint (error messages,
    /// probe timings). Not interpreted here.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl StatusInfo {
    pub fn up() -> Self {
        Self::of(Status::Up)
    }

    pub fn down() -> Self {
        Self::of(Status::Down)
    }

    pub fn offline() -> Self {
        Self::of(Status::Offline)
    }

    pub fn unknown() -> Self {
        Self::of(Status::Unknown)
    }

    pub fn of(status: Status) -> Self {
        Self {
            status,
            details: Map::new(),
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }
}

/// A monitored application instance as known to the admin system.
///
/// Created on registration, updated on status transitions, never physically
/// deleted. Every mutation bumps `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: InstanceId,
    /// Monotonically increasing mutation counter.
    pub version: u64,
    pub registration: Registration,
    pub status_info: StatusInfo,
}

impl Instance {
    /// Creates a freshly registered instance with an unknown status.
    pub fn create(id: InstanceId, registration: Registration) -> Self {
        Self {
            id,
            version: 0,
            registration,
            status_info: StatusInfo::unknown(),
        }
    }

    /// Returns a copy with the new status applied and the version bumped.
    pub fn apply_status(&self, status_info: StatusInfo) -> Self {
        Self {
            version: self.version + 1,
            status_info,
            ..self.clone()
        }
    }

    pub fn status(&self) -> Status {
        self.status_info.status
    }
}

/// Immutable record of one observed status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangedEvent {
    /// Id of the instance the transition belongs to.
    pub instance: InstanceId,
    /// Instance version at the time of the change.
    pub version: u64,
    /// The status the instance transitioned into.
    pub status_info: StatusInfo,
    /// When the transition was observed.
    pub timestamp: DateTime<Utc>,
}

impl StatusChangedEvent {
    pub fn new(instance: InstanceId, version: u64, status_info: StatusInfo) -> Self {
        Self {
            instance,
            version,
            status_info,
            timestamp: Utc::now(),
        }
    }
}

/// A fully formed notification mail, ready to hand to a transport.
///
/// Constructed fresh per event and never persisted. `PartialEq` lets tests
/// assert on whole messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MailMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub from: String,
    pub subject: String,
    pub body: String,
}

// =============================================================================
// Service Traits
// =============================================================================

/// Read access to the admin system's view of registered instances
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Looks up an instance by id
    ///
    /// # Arguments
    /// * `id` - The instance identifier to resolve
    ///
    /// # Returns
    /// * `Ok(Some(instance))` when the instance is registered
    /// * `Ok(None)` when no instance with this id is known
    /// * `Err` when the backing store itself fails
    async fn find(&self, id: &InstanceId) -> Result<Option<Instance>, StoreError>;
}

/// Reacts to status-change events by producing external notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A unique, descriptive name for the notifier (e.g., "mail", "webhook").
    /// Used for logging.
    fn name(&self) -> &str;

    /// Handles a single status-change event
    ///
    /// Implementations resolve the referenced instance before producing any
    /// output and must not dispatch anything when resolution fails.
    ///
    /// # Returns
    /// * `Ok(())` once the notification has been handed off
    /// * `Err` if resolution, rendering or delivery failed
    async fn notify(&self, event: &StatusChangedEvent) -> Result<(), NotifyError>;
}
