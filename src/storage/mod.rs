mod schema;
mod settings;
mod stories;
mod types;

pub use schema::{Database, DEFAULT_MAX_RETAINED};
pub use types::{Section, Settings, Story, StoreError};
