//! Character entity - A user's role-play persona.
//!
//! A character has a pronoun family used when rendering transformation text, and
//! owns two appearances (default and current).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Character database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "characters")]
pub struct Model {
    /// Unique identifier for the character
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub server_id: String,
    /// Discord user ID of the owner
    pub owner_id: String,
    /// Name, unique per owner and server
    pub name: String,
    /// Nickname applied on Discord while the character is in use
    pub nickname: Option<String>,
    /// One-line summary
    pub summary: String,
    /// Free-form description prefixed to generated appearance text
    pub description: String,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Pronoun family name (e.g. "Feminine")
    pub pronoun_family: String,
    /// Whether the character is adult-only
    pub is_nsfw: bool,
    /// Whether this is the owner's default character on the server
    pub is_default: bool,
    /// When the character was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Character and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One character has a default and a current appearance
    #[sea_orm(has_many = "super::appearance::Entity")]
    Appearances,
}

impl Related<super::appearance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appearances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
