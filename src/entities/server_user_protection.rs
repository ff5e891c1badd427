//! Server user protection entity - A user's transformation consent on one server.

use super::enums::ProtectionType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-server protection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "server_user_protections")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub server_id: String,
    /// Discord user ID
    pub user_id: String,
    /// Whitelist or blacklist mode on this server
    pub protection_type: ProtectionType,
    /// Whether the user accepts transformations on this server at all
    pub has_opted_in: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
