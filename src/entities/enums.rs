//! Enumerations stored as text columns.
//!
//! Each enum maps to a lowercase string in the database so rows stay readable
//! from the `sqlite3` shell.

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Status of a user within a roleplay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ParticipantStatus {
    /// Taking part in the roleplay
    #[sea_orm(string_value = "joined")]
    Joined,
    /// Left of their own accord
    #[sea_orm(string_value = "left")]
    Left,
    /// Removed by the owner
    #[sea_orm(string_value = "kicked")]
    Kicked,
    /// Invited but not yet joined
    #[sea_orm(string_value = "invited")]
    Invited,
}

/// Which of a character's two appearances a row holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AppearanceKind {
    /// The appearance the character resets to
    #[sea_orm(string_value = "default")]
    Default,
    /// The appearance after any transformations
    #[sea_orm(string_value = "current")]
    Current,
}

/// Side of the body a component sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Chirality {
    /// Non-chiral parts (hair, tail, ...)
    #[sea_orm(string_value = "center")]
    Center,
    /// Left side
    #[sea_orm(string_value = "left")]
    Left,
    /// Right side
    #[sea_orm(string_value = "right")]
    Right,
}

impl fmt::Display for Chirality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

impl FromStr for Chirality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "center" | "centre" => Ok(Self::Center),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("'{other}' is not a side (expected left or right)")),
        }
    }
}

/// A transformable body part.
///
/// Variants are declared in the order descriptions are rendered.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Bodypart {
    /// Hair
    #[sea_orm(string_value = "hair")]
    Hair,
    /// Head shape
    #[sea_orm(string_value = "head")]
    Head,
    /// Face
    #[sea_orm(string_value = "face")]
    Face,
    /// Ears (chiral)
    #[sea_orm(string_value = "ear")]
    Ear,
    /// Eyes (chiral)
    #[sea_orm(string_value = "eye")]
    Eye,
    /// Teeth
    #[sea_orm(string_value = "teeth")]
    Teeth,
    /// Torso and skin
    #[sea_orm(string_value = "body")]
    Body,
    /// Arms (chiral)
    #[sea_orm(string_value = "arm")]
    Arm,
    /// Hands (chiral)
    #[sea_orm(string_value = "hand")]
    Hand,
    /// Wings (chiral)
    #[sea_orm(string_value = "wing")]
    Wing,
    /// Legs (chiral)
    #[sea_orm(string_value = "leg")]
    Leg,
    /// Feet (chiral)
    #[sea_orm(string_value = "foot")]
    Foot,
    /// Tail
    #[sea_orm(string_value = "tail")]
    Tail,
}

impl Bodypart {
    /// Whether the part exists once per side.
    #[must_use]
    pub const fn is_chiral(self) -> bool {
        matches!(
            self,
            Self::Ear | Self::Eye | Self::Arm | Self::Hand | Self::Wing | Self::Leg | Self::Foot
        )
    }

    /// Singular noun for the part.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Hair => "hair",
            Self::Head => "head",
            Self::Face => "face",
            Self::Ear => "ear",
            Self::Eye => "eye",
            Self::Teeth => "teeth",
            Self::Body => "body",
            Self::Arm => "arm",
            Self::Hand => "hand",
            Self::Wing => "wing",
            Self::Leg => "leg",
            Self::Foot => "foot",
            Self::Tail => "tail",
        }
    }

    /// Plural noun for the part, used when both sides are described together.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Hair => "hair",
            Self::Head => "heads",
            Self::Face => "faces",
            Self::Ear => "ears",
            Self::Eye => "eyes",
            Self::Teeth => "teeth",
            Self::Body => "bodies",
            Self::Arm => "arms",
            Self::Hand => "hands",
            Self::Wing => "wings",
            Self::Leg => "legs",
            Self::Foot => "feet",
            Self::Tail => "tails",
        }
    }

    /// The sides a part occupies: both sides for chiral parts, center otherwise.
    #[must_use]
    pub const fn sides(self) -> &'static [Chirality] {
        if self.is_chiral() {
            &[Chirality::Left, Chirality::Right]
        } else {
            &[Chirality::Center]
        }
    }
}

impl fmt::Display for Bodypart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for Bodypart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::iter()
            .find(|part| part.singular() == needle || part.plural() == needle)
            .ok_or_else(|| format!("'{}' is not a known body part", s.trim()))
    }
}

/// Consent mode for transformations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ProtectionType {
    /// Only listed users may transform
    #[sea_orm(string_value = "whitelist")]
    Whitelist,
    /// Everyone except listed users may transform
    #[sea_orm(string_value = "blacklist")]
    Blacklist,
}

impl fmt::Display for ProtectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Whitelist => "whitelist",
            Self::Blacklist => "blacklist",
        })
    }
}

/// Actions gated by the permission store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Permission {
    /// Rename, summarise, toggle flags of a roleplay
    #[sea_orm(string_value = "edit_roleplay")]
    EditRoleplay,
    /// Delete a roleplay
    #[sea_orm(string_value = "delete_roleplay")]
    DeleteRoleplay,
    /// Start or stop a roleplay
    #[sea_orm(string_value = "start_stop_roleplay")]
    StartStopRoleplay,
    /// Kick participants from a roleplay
    #[sea_orm(string_value = "kick_roleplay_member")]
    KickRoleplayMember,
    /// Transfer a roleplay to someone else
    #[sea_orm(string_value = "transfer_roleplay")]
    TransferRoleplay,
    /// Create characters
    #[sea_orm(string_value = "create_character")]
    CreateCharacter,
    /// Edit characters
    #[sea_orm(string_value = "edit_character")]
    EditCharacter,
    /// Delete characters
    #[sea_orm(string_value = "delete_character")]
    DeleteCharacter,
    /// Transform characters
    #[sea_orm(string_value = "transform")]
    Transform,
    /// Issue and lift bans
    #[sea_orm(string_value = "manage_bans")]
    ManageBans,
    /// Issue and remove warnings
    #[sea_orm(string_value = "manage_warnings")]
    ManageWarnings,
    /// Add and remove notes
    #[sea_orm(string_value = "manage_notes")]
    ManageNotes,
    /// Change server settings
    #[sea_orm(string_value = "manage_server")]
    ManageServer,
}

impl Permission {
    /// Whether users hold this permission on their own things unless revoked.
    #[must_use]
    pub const fn is_granted_on_self_by_default(self) -> bool {
        matches!(
            self,
            Self::EditRoleplay
                | Self::DeleteRoleplay
                | Self::StartStopRoleplay
                | Self::KickRoleplayMember
                | Self::TransferRoleplay
                | Self::CreateCharacter
                | Self::EditCharacter
                | Self::DeleteCharacter
                | Self::Transform
        )
    }

    /// Stable snake-case name, as stored in the database.
    #[must_use]
    pub fn name(self) -> String {
        self.to_value()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::iter()
            .find(|permission| permission.to_value() == needle)
            .ok_or_else(|| format!("'{}' is not a known permission", s.trim()))
    }
}

/// Whose things a permission applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PermissionTarget {
    /// Things the user owns
    #[sea_orm(string_value = "own")]
    Own,
    /// Things other users own
    #[sea_orm(string_value = "other")]
    Other,
}

impl fmt::Display for PermissionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Own => "self",
            Self::Other => "other",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bodypart_parses_singular_and_plural() {
        assert_eq!("ear".parse::<Bodypart>(), Ok(Bodypart::Ear));
        assert_eq!(" Ears ".parse::<Bodypart>(), Ok(Bodypart::Ear));
        assert_eq!("feet".parse::<Bodypart>(), Ok(Bodypart::Foot));
        assert!("antenna".parse::<Bodypart>().is_err());
    }

    #[test]
    fn test_bodypart_sides() {
        assert_eq!(Bodypart::Tail.sides(), &[Chirality::Center]);
        assert_eq!(Bodypart::Wing.sides(), &[Chirality::Left, Chirality::Right]);
    }

    #[test]
    fn test_permission_round_trips_through_name() {
        assert_eq!(
            "manage bans".parse::<Permission>(),
            Ok(Permission::ManageBans)
        );
        assert_eq!(Permission::StartStopRoleplay.name(), "start_stop_roleplay");
    }

    #[test]
    fn test_moderation_permissions_are_not_default() {
        assert!(Permission::Transform.is_granted_on_self_by_default());
        assert!(!Permission::ManageBans.is_granted_on_self_by_default());
    }

    #[test]
    fn test_permission_target_storage_and_display() {
        assert_eq!(PermissionTarget::Own.to_value(), "own");
        assert_eq!(PermissionTarget::Other.to_value(), "other");
        assert_eq!(PermissionTarget::Own.to_string(), "self");
    }
}
