//! Protection entry entity - A whitelist or blacklist entry.

use super::enums::ProtectionType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Protection list entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "protection_entries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID of the protected user
    pub owner_id: String,
    /// Discord user ID of the listed user
    pub target_id: String,
    /// Which list the target is on
    pub entry_type: ProtectionType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
