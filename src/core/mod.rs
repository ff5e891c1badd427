//! Core business logic, independent of Discord.
//!
//! Every function takes a database connection and plain identifiers (Discord snowflakes
//! as decimal strings) and returns [`crate::errors::Result`]. The bot layer and the
//! background behaviours are the only callers.

/// Moderation bans
pub mod bans;
/// Characters and their default selection
pub mod character;
/// Moderation notes
pub mod notes;
/// Per-server permission store
pub mod permissions;
/// Built-in pronoun families
pub mod pronouns;
/// Transformation consent settings
pub mod protection;
/// Roleplay sessions, participants and message logs
pub mod roleplay;
/// Per-server settings
pub mod server;
/// Template token replacement
pub mod text;
/// Species catalog and the appearance engine
pub mod transformation;
/// Moderation warnings
pub mod warnings;

pub(crate) mod validation;
