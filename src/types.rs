//! Common type aliases used throughout the application.

use crate::core::StatusChangedEvent;
use tokio::sync::broadcast;

pub type EventSender = broadcast::Sender<StatusChangedEvent>;
