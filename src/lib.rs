//! paperboy: a Hacker News story cache and synchronization engine.
//!
//! The crate keeps a locally persisted, size-bounded SQLite cache of
//! stories per section (`recent` and `top`, plus an unbounded `bookmark`
//! shelf), merges fresh fetches from the Hacker News API into it, and
//! tracks read/unread state across sections so a story read in one list
//! is read in all of them. Read state and bookmarks survive restarts;
//! eviction only ever trims the oldest stories of the bounded sections.
//!
//! The pieces compose explicitly: open a [`storage::Database`], build an
//! [`api::HttpStoryApi`] (or any [`api::StoryApi`]), hand both to a
//! [`reader::Reader`], and render its observable `stories`, `unread`, and
//! `error` state.

pub mod api;
pub mod config;
pub mod reader;
pub mod storage;

pub use api::{ApiError, HttpStoryApi, StoryApi};
pub use config::{Config, ConfigError};
pub use reader::{Reader, SyncError};
pub use storage::{Database, Section, Settings, Story, StoreError};
