//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions that are not commands:
//! autocomplete suggestions and the gateway event hook.

/// Autocomplete handlers for roleplay, character, species and other names
pub mod autocomplete;
/// Gateway event hook feeding the event queue
pub mod events;
