//! Species and transformation catalog loading from a TOML file.
//!
//! The catalog seeds the `species` and `transformations` tables at start-up. Seeding is
//! idempotent: existing species and transformations are updated in place, so editing
//! the file and restarting the bot is enough to change the catalog.

use crate::{
    core::transformation::{self, NewTransformation},
    entities::Bodypart,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

/// Configuration structure representing the whole catalog file
#[derive(Debug, Deserialize)]
pub struct Catalog {
    /// Species definitions, parents before children
    #[serde(default)]
    pub species: Vec<SpeciesConfig>,
}

/// Configuration for a single species
#[derive(Debug, Deserialize, Clone)]
pub struct SpeciesConfig {
    /// Unique species name
    pub name: String,
    /// Short description
    pub description: String,
    /// Name of the parent species, if any
    pub parent: Option<String>,
    /// Transformations this species provides
    #[serde(default)]
    pub transformations: Vec<TransformationConfig>,
}

/// Configuration for a single transformation
#[derive(Debug, Deserialize, Clone)]
pub struct TransformationConfig {
    /// Body part the transformation applies to
    pub bodypart: Bodypart,
    /// Short description
    pub description: String,
    /// Colour given to freshly shifted parts
    pub default_base_colour: String,
    /// Pattern given to freshly shifted parts
    pub default_pattern: Option<String>,
    /// Pattern colour given to freshly shifted parts
    pub default_pattern_colour: Option<String>,
    /// Adult-only flag
    #[serde(default)]
    pub is_nsfw: bool,
    /// Template for shifting an existing part
    pub shift_message: String,
    /// Template for growing a missing part
    pub grow_message: String,
    /// Template describing one part
    pub single_description: String,
    /// Template for shifting both sides at once
    pub uniform_shift_message: Option<String>,
    /// Template for growing both sides at once
    pub uniform_grow_message: Option<String>,
    /// Template describing a matching pair
    pub uniform_description: Option<String>,
}

impl From<TransformationConfig> for NewTransformation {
    fn from(value: TransformationConfig) -> Self {
        Self {
            bodypart: value.bodypart,
            description: value.description,
            default_base_colour: value.default_base_colour,
            default_pattern: value.default_pattern,
            default_pattern_colour: value.default_pattern_colour,
            is_nsfw: value.is_nsfw,
            shift_message: value.shift_message,
            grow_message: value.grow_message,
            single_description: value.single_description,
            uniform_shift_message: value.uniform_shift_message,
            uniform_grow_message: value.uniform_grow_message,
            uniform_description: value.uniform_description,
        }
    }
}

/// Counts reported after seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Species upserted
    pub species: usize,
    /// Transformations upserted
    pub transformations: usize,
}

/// Parses a catalog from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid or a required field is missing.
pub fn parse_catalog(contents: &str) -> Result<Catalog> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse transformation catalog: {e}"),
    })
}

/// Loads a catalog from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!(
            "Failed to read transformation catalog {}: {e}",
            path.as_ref().display()
        ),
    })?;
    parse_catalog(&contents)
}

/// Upserts every species and transformation in the catalog.
///
/// # Errors
/// Returns an error if a parent species is unknown or a database write fails.
#[instrument(skip(db, catalog))]
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &Catalog) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for species in &catalog.species {
        let parent_id = match &species.parent {
            Some(parent) => Some(transformation::get_species_by_name(db, parent).await?.id),
            None => None,
        };

        let stored =
            transformation::upsert_species(db, &species.name, &species.description, parent_id)
                .await?;
        summary.species += 1;

        for config in &species.transformations {
            transformation::upsert_transformation(db, stored.id, config.clone().into()).await?;
            summary.transformations += 1;
        }
    }

    info!(
        species = summary.species,
        transformations = summary.transformations,
        "Transformation catalog seeded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    const CATALOG: &str = r#"
        [[species]]
        name = "canine"
        description = "Dog-like creatures."

        [[species]]
        name = "wolf"
        description = "A large wild canine."
        parent = "canine"

        [[species.transformations]]
        bodypart = "tail"
        description = "A bushy wolf tail."
        default_base_colour = "grey"
        shift_message = "{@target}'s tail bristles, becoming a bushy wolf tail."
        grow_message = "A bushy {@colour} wolf tail sprouts from {@target}'s lower back."
        single_description = "{@f|they} {@f|have} a bushy {@colour} wolf tail."

        [[species.transformations]]
        bodypart = "ear"
        description = "Pointed wolf ears."
        default_base_colour = "grey"
        shift_message = "{@target}'s {@side} ear stretches into a pointed wolf ear."
        grow_message = "A pointed wolf ear grows on the {@side} of {@target}'s head."
        single_description = "{@f|their} {@side} ear is a pointed {@colour} wolf ear."
        uniform_description = "{@f|they} {@f|have} pointed {@colour} wolf ears."
    "#;

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(CATALOG).unwrap();
        assert_eq!(catalog.species.len(), 2);
        assert_eq!(catalog.species[1].parent.as_deref(), Some("canine"));
        assert_eq!(catalog.species[1].transformations.len(), 2);
        assert_eq!(catalog.species[1].transformations[1].bodypart, Bodypart::Ear);
        assert!(!catalog.species[1].transformations[0].is_nsfw);
    }

    #[test]
    fn test_parse_catalog_rejects_unknown_bodypart() {
        let result = parse_catalog(
            r#"
            [[species]]
            name = "odd"
            description = "Odd."

            [[species.transformations]]
            bodypart = "antenna"
            description = "?"
            default_base_colour = "red"
            shift_message = "x"
            grow_message = "x"
            single_description = "x"
            "#,
        );
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = parse_catalog(CATALOG)?;

        let first = seed_catalog(&db, &catalog).await?;
        let second = seed_catalog(&db, &catalog).await?;
        assert_eq!(first, second);

        let species = transformation::list_species(&db).await?;
        assert_eq!(species.len(), 2);

        let wolf = transformation::get_species_by_name(&db, "wolf").await?;
        let canine = transformation::get_species_by_name(&db, "canine").await?;
        assert_eq!(wolf.parent_id, Some(canine.id));
        assert_eq!(transformation::list_transformations(&db, wolf.id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_requires_known_parent() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = parse_catalog(
            r#"
            [[species]]
            name = "wolf"
            description = "A large wild canine."
            parent = "canine"
            "#,
        )?;

        let result = seed_catalog(&db, &catalog).await;
        assert!(matches!(result, Err(Error::SpeciesNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_shipped_catalog_seeds() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = parse_catalog(include_str!("../../transformations.toml"))?;

        let summary = seed_catalog(&db, &catalog).await?;
        assert_eq!(summary.species, catalog.species.len());

        let wyvern = transformation::get_species_by_name(&db, "Wyvern").await?;
        let dragon = transformation::get_species_by_name(&db, "dragon").await?;
        assert_eq!(wyvern.parent_id, Some(dragon.id));
        Ok(())
    }
}
