//! Note entity - A private moderator note about a user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Note database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    /// Unique identifier for the note
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub server_id: String,
    /// Discord user ID the note is about
    pub user_id: String,
    /// Discord user ID of the moderator who wrote it
    pub author_id: String,
    /// Note text
    pub content: String,
    /// When the note was written
    pub created_at: DateTimeUtc,
    /// When the note was last modified
    pub updated_at: DateTimeUtc,
    /// When the note is discarded, None to keep it forever
    pub expires_on: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
