//! Roleplay participant entity - Links a user to a roleplay with a status.

use super::enums::ParticipantStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Participant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roleplay_participants")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Roleplay this participation belongs to
    pub roleplay_id: i64,
    /// Discord user ID of the participant
    pub user_id: String,
    /// Joined, left, kicked or invited
    pub status: ParticipantStatus,
}

/// Defines relationships between `RoleplayParticipant` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each participation belongs to one roleplay
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
