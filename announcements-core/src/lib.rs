//! Core library for hub announcements.
//!
//! # Core Concepts
//!
//! - [`Announcement`]: a timestamped Markdown notice published by the hub's
//!   announcement service. Its timestamp string is its identity.
//! - [`DismissedSet`]: timestamps the viewer has closed, mirrored to a
//!   [`KeyValueStore`] under [`DISMISSED_KEY`] on every dismissal.
//! - [`BoardState`]: the announcement list plus the dismissed set. A card is
//!   shown iff its timestamp is not dismissed.
//! - [`render`]: projection of the visible announcements into HTML or
//!   plain-text cards.

pub mod dismissed;
pub mod models;
pub mod render;
pub mod state;
pub mod store;

pub use dismissed::{DismissedSet, DISMISSED_KEY};
pub use models::*;
pub use state::BoardState;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
