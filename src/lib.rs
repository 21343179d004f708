// stylename - styleName CSS class intelligence
//!
//! Indexes the CSS classes each component imports and answers completion,
//! hover, go-to-definition and diagnostic queries for the `styleName`
//! attribute over the Language Server Protocol.

pub mod cli;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handler;
pub mod index;
pub mod providers;
pub mod watcher;

#[cfg(test)]
pub mod tests;

// Re-export common types
pub use config::Config;
pub use extractors::{ClassDefinition, CssFileRecord, ImportStatement};
pub use index::{ComponentIndex, CssIndex};
pub use watcher::FileWatchers;
