//! Roleplay entity - A persisted role-play session.
//!
//! Each roleplay belongs to an owner, has participants, may run in a channel
//! (`active_channel_id`) and may have a channel of its own (`dedicated_channel_id`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Roleplay database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roleplays")]
pub struct Model {
    /// Unique identifier for the roleplay
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub server_id: String,
    /// Discord user ID of the owner
    pub owner_id: String,
    /// Name, unique per owner and server
    pub name: String,
    /// Short blurb shown in listings
    pub summary: String,
    /// Whether the roleplay contains adult content
    pub is_nsfw: bool,
    /// Whether anyone may join without an invite
    pub is_public: bool,
    /// Whether the roleplay is currently running
    pub is_active: bool,
    /// Channel the roleplay is running in, when active
    pub active_channel_id: Option<String>,
    /// Channel created for this roleplay
    pub dedicated_channel_id: Option<String>,
    /// When the roleplay was created
    pub created_at: DateTimeUtc,
    /// When the last message was logged
    pub last_updated: Option<DateTimeUtc>,
}

/// Defines relationships between Roleplay and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One roleplay has many participants
    #[sea_orm(has_many = "super::roleplay_participant::Entity")]
    Participants,
    /// One roleplay has many logged messages
    #[sea_orm(has_many = "super::roleplay_message::Entity")]
    Messages,
}

impl Related<super::roleplay_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::roleplay_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
