//! Appearance component entity - One body part of an appearance.
//!
//! A component ties a `(bodypart, chirality)` slot to the transformation that
//! currently occupies it, along with its colouring.

use super::enums::{Bodypart, Chirality};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Appearance component database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appearance_components")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Appearance the component belongs to
    pub appearance_id: i64,
    /// Which body part
    pub bodypart: Bodypart,
    /// Which side
    pub chirality: Chirality,
    /// Transformation occupying the slot
    pub transformation_id: i64,
    /// Base colour (e.g. "dark brown")
    pub base_colour: String,
    /// Optional pattern (e.g. "stripes")
    pub pattern: Option<String>,
    /// Colour of the pattern
    pub pattern_colour: Option<String>,
}

/// Defines relationships between `AppearanceComponent` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each component belongs to one appearance
    #[sea_orm(
        belongs_to = "super::appearance::Entity",
        from = "Column::AppearanceId",
        to = "super::appearance::Column::Id"
    )]
    Appearance,
    /// Each component is occupied by one transformation
    #[sea_orm(
        belongs_to = "super::transformation::Entity",
        from = "Column::TransformationId",
        to = "super::transformation::Column::Id"
    )]
    Transformation,
}

impl Related<super::appearance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appearance.def()
    }
}

impl Related<super::transformation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transformation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
