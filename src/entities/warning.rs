//! Warning entity - A formal warning on a user's record.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Warning database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warnings")]
pub struct Model {
    /// Unique identifier for the warning
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub server_id: String,
    /// Discord user ID of the warned user
    pub user_id: String,
    /// Discord user ID of the moderator
    pub author_id: String,
    /// Reason for the warning
    pub reason: String,
    /// Optional Discord message ID that prompted the warning
    pub message_id: Option<String>,
    /// When the warning was issued
    pub created_at: DateTimeUtc,
    /// When the warning was last modified
    pub updated_at: DateTimeUtc,
    /// When the warning drops off the record, None if it never does
    pub expires_on: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
