//! Global user protection entity - A user's default transformation consent.

use super::enums::ProtectionType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Global protection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "global_user_protections")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID
    #[sea_orm(unique)]
    pub user_id: String,
    /// Protection mode new servers start with
    pub default_type: ProtectionType,
    /// Whether the user is opted in on servers they have not configured
    pub default_opt_in: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
