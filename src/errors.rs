//! Unified error type for Ambassador.
//!
//! Every fallible operation in the crate returns [`Result`]. The `Display` output of each
//! variant is written so it can be shown to Discord users as-is.

use thiserror::Error;

/// All errors produced by the bot, its services and its behaviours.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// User input failed validation.
    #[error("{message}")]
    Validation {
        /// Why the input was rejected
        message: String,
    },

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (reading catalogs, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while formatting a reply.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Discord (serenity/poise) failure.
    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),

    /// The invoking user lacks a permission.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Which permission was missing
        message: String,
    },

    /// The target user's protection settings forbid the transformation.
    #[error("You can't transform that character: {reason}")]
    TransformationDenied {
        /// Why consent was not given
        reason: String,
    },

    /// No roleplay matched.
    #[error("No roleplay named '{name}' found")]
    RoleplayNotFound {
        /// Name or id that was searched for
        name: String,
    },

    /// The owner already has a roleplay with that name.
    #[error("You already have a roleplay named '{name}'")]
    RoleplayNameTaken {
        /// The conflicting name
        name: String,
    },

    /// The roleplay is already running.
    #[error("The roleplay '{name}' is already active")]
    RoleplayAlreadyActive {
        /// Roleplay name
        name: String,
    },

    /// The roleplay is not running.
    #[error("The roleplay '{name}' is not active")]
    RoleplayNotActive {
        /// Roleplay name
        name: String,
    },

    /// Another roleplay is already running in the channel.
    #[error("Another roleplay is already active in <#{channel_id}>")]
    ChannelOccupied {
        /// Discord channel id
        channel_id: String,
    },

    /// Participation state does not allow the requested change.
    #[error("{message}")]
    Participation {
        /// What is wrong with the participation request
        message: String,
    },

    /// No character matched.
    #[error("No character named '{name}' found")]
    CharacterNotFound {
        /// Name or id that was searched for
        name: String,
    },

    /// The owner already has a character with that name.
    #[error("You already have a character named '{name}'")]
    CharacterNameTaken {
        /// The conflicting name
        name: String,
    },

    /// No species matched.
    #[error("No species named '{name}' found")]
    SpeciesNotFound {
        /// Species name
        name: String,
    },

    /// The species has no transformation for the body part.
    #[error("The {species} species has no transformation for the {bodypart}")]
    TransformationNotFound {
        /// Species name
        species: String,
        /// Body part name
        bodypart: String,
    },

    /// The character does not have the body part.
    #[error("The character has no {bodypart}")]
    BodypartNotFound {
        /// Body part name
        bodypart: String,
    },

    /// No ban with that id on this server.
    #[error("No ban with ID {id} found")]
    BanNotFound {
        /// Ban id
        id: i64,
    },

    /// No warning with that id on this server.
    #[error("No warning with ID {id} found")]
    WarningNotFound {
        /// Warning id
        id: i64,
    },

    /// No note with that id on this server.
    #[error("No note with ID {id} found")]
    NoteNotFound {
        /// Note id
        id: i64,
    },
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for building a [`Error::Participation`].
    pub fn participation(message: impl Into<String>) -> Self {
        Self::Participation {
            message: message.into(),
        }
    }

    /// Whether the error is caused by the user rather than by the bot.
    ///
    /// User errors are reported back in chat without being logged as failures.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. }
                | Self::Database(_)
                | Self::Io(_)
                | Self::Fmt(_)
                | Self::EnvVar(_)
                | Self::Discord(_)
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_classified() {
        assert!(Error::validation("bad name").is_user_error());
        assert!(
            Error::RoleplayNotFound {
                name: "tavern".to_string()
            }
            .is_user_error()
        );
        assert!(!Error::Database(sea_orm::DbErr::Custom("boom".to_string())).is_user_error());
    }

    #[test]
    fn test_display_is_user_presentable() {
        let error = Error::TransformationNotFound {
            species: "shark".to_string(),
            bodypart: "wing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "The shark species has no transformation for the wing"
        );
    }
}
