//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Character management commands
pub mod character;

/// General utility commands
pub mod general;

/// Ban, warning and note commands
pub mod moderation;

/// Permission store commands
pub mod permission;

/// Transformation consent commands
pub mod protection;

/// Roleplay session commands
pub mod roleplay;

/// Server settings commands
pub mod server;

/// Appearance transformation commands
pub mod transform;

// Export commands
pub use character::*;
pub use general::*;
pub use moderation::*;
pub use permission::*;
pub use protection::*;
pub use roleplay::*;
pub use server::*;
pub use transform::*;
