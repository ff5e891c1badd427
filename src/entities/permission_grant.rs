//! Permission grant entity - An explicit grant or revocation of a permission.

use super::enums::{Permission, PermissionTarget};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Permission grant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permission_grants")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub server_id: String,
    /// Discord user ID
    pub user_id: String,
    /// Which permission
    pub permission: Permission,
    /// Own things or other users' things
    pub target: PermissionTarget,
    /// True for a grant, false for an explicit revocation
    pub is_granted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
