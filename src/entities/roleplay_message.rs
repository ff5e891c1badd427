//! Roleplay message entity - One logged message of a running roleplay.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Logged message database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roleplay_messages")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Roleplay the message was posted in
    pub roleplay_id: i64,
    /// Discord message ID
    pub discord_message_id: String,
    /// Discord user ID of the author
    pub author_id: String,
    /// Display name of the author when the message was posted
    pub author_nickname: String,
    /// Message text, kept in sync with edits
    pub contents: String,
    /// When the message was posted
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between `RoleplayMessage` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each message belongs to one roleplay
    #[sea_orm(
        belongs_to = "super::roleplay::Entity",
        from = "Column::RoleplayId",
        to = "super::roleplay::Column::Id"
    )]
    Roleplay,
}

impl Related<super::roleplay::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roleplay.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
