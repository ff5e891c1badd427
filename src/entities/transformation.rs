//! Transformation entity - What a body part looks like for a species.
//!
//! The message and description fields are templates rendered by `core::text`.

use super::enums::Bodypart;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transformation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transformations")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Species the transformation belongs to
    pub species_id: i64,
    /// Body part it applies to
    pub bodypart: Bodypart,
    /// Short description shown in listings
    pub description: String,
    /// Colour given to freshly shifted parts
    pub default_base_colour: String,
    /// Pattern given to freshly shifted parts
    pub default_pattern: Option<String>,
    /// Pattern colour given to freshly shifted parts
    pub default_pattern_colour: Option<String>,
    /// Whether the transformation is adult-only
    pub is_nsfw: bool,
    /// Template used when an existing part changes species
    pub shift_message: String,
    /// Template used when a missing part is added
    pub grow_message: String,
    /// Template describing one part
    pub single_description: String,
    /// Template used when both sides change species together
    pub uniform_shift_message: Option<String>,
    /// Template used when both sides are added together
    pub uniform_grow_message: Option<String>,
    /// Template describing a matching pair
    pub uniform_description: Option<String>,
}

/// Defines relationships between Transformation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transformation belongs to one species
    #[sea_orm(
        belongs_to = "super::species::Entity",
        from = "Column::SpeciesId",
        to = "super::species::Column::Id"
    )]
    Species,
}

impl Related<super::species::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Species.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
