//! appwatch - Status-change notifications for monitored application instances
//!
//! This library provides the notification side of an admin/monitoring system:
//! it watches a stream of instance status transitions and fans them out to
//! configurable channels (mail, webhook, log).

pub mod services;
pub mod notification;

pub mod config;
pub mod core;
pub mod store;
pub mod template;
pub mod types;

// Re-export core types for convenience
pub use core::*;
