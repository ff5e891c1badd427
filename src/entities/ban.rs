//! Ban entity - A server ban issued by a moderator, optionally time-limited.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ban database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bans")]
pub struct Model {
    /// Unique identifier for the ban
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID the ban applies to
    pub server_id: String,
    /// Discord user ID of the banned user
    pub user_id: String,
    /// Discord user ID of the moderator who issued the ban
    pub author_id: String,
    /// Reason shown in the ban list
    pub reason: String,
    /// Optional Discord message ID that prompted the ban
    pub message_id: Option<String>,
    /// When the ban was issued
    pub created_at: DateTimeUtc,
    /// When the ban was last modified
    pub updated_at: DateTimeUtc,
    /// When the ban lapses, None for permanent bans
    pub expires_on: Option<DateTimeUtc>,
}

/// Bans have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
