//! Species entity - A family of transformations (e.g. "shark", "wolf").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Species database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "species")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Species name, unique across the catalog
    #[sea_orm(unique)]
    pub name: String,
    /// Short description shown in listings
    pub description: String,
    /// Species this one derives from, if any
    pub parent_id: Option<i64>,
}

/// Defines relationships between Species and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One species has one transformation per body part
    #[sea_orm(has_many = "super::transformation::Entity")]
    Transformations,
}

impl Related<super::transformation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transformations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
