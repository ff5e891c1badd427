//! Fixed-choice slash command parameters.

use crate::entities::{Chirality, PermissionTarget, ProtectionType};

/// Side of the body, for chiral parts.
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Side {
    /// Left side
    #[name = "left"]
    Left,
    /// Right side
    #[name = "right"]
    Right,
}

impl From<Side> for Chirality {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Self::Left,
            Side::Right => Self::Right,
        }
    }
}

/// Whose things a permission covers.
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Scope {
    /// Things the user owns
    #[name = "own"]
    Own,
    /// Things other users own
    #[name = "other"]
    Other,
}

impl From<Scope> for PermissionTarget {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Own => Self::Own,
            Scope::Other => Self::Other,
        }
    }
}

/// Consent mode.
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Mode {
    /// Only listed users may transform
    #[name = "whitelist"]
    Whitelist,
    /// Everyone except listed users may transform
    #[name = "blacklist"]
    Blacklist,
}

impl From<Mode> for ProtectionType {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Whitelist => Self::Whitelist,
            Mode::Blacklist => Self::Blacklist,
        }
    }
}
