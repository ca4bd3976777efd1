//! # Shared Bus - Notification Bus for Registry Events
//!
//! Carries the notifications the issuer registry emits after every successful
//! mutation to external observers. Observers only consume; nothing published
//! here feeds back into the registry.
//!
//! ```text
//! ┌──────────────────┐                    ┌──────────────┐
//! │ Issuer Registry  │                    │  Observer    │
//! │                  │    publish()       │              │
//! │                  │ ──────┐            │              │
//! └──────────────────┘       │            └──────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐          │
//!                      │  Event Bus   │          │
//!                      │              │ ─────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! Publishing is synchronous and never blocks: the registry publishes while it
//! still holds its write lock, so the order observers see is the order the
//! mutations were applied.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, RegistryEvent};
pub use publisher::{EventPublisher, InMemoryEventBus, NoOpPublisher};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
