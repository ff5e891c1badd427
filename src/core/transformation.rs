//! Species catalog and appearance engine.
//!
//! A character has a default appearance and, once transformed, a current appearance.
//! Each appearance is a set of components, one per `(bodypart, side)` slot, each
//! occupied by a transformation of some species. Shifting a slot swaps its
//! transformation; the user-facing text comes from the transformation's templates,
//! rendered through [`crate::core::text`].

use super::{
    pronouns::{self, PronounFamily},
    server,
    text::{self, TokenContext},
    validation::require_text,
};
use crate::{
    entities::{
        Appearance, AppearanceComponent, AppearanceKind, Bodypart, Chirality, Species,
        Transformation, appearance, appearance_component, character, species, transformation,
    },
    errors::{Error, Result},
};
use sea_orm::{Iterable, QueryOrder, Set, TransactionTrait, TryIntoModel, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const UNCHANGED_MESSAGE: &str = "{@target}'s {@part} is already a {@species} {@bodypart}.";
const UNCHANGED_PAIR_MESSAGE: &str = "{@target}'s {@part} are already {@species} {@bodypart}.";
const REMOVE_MESSAGE: &str = "{@target}'s {@part} fades away, leaving nothing behind.";
const COLOUR_MESSAGE: &str =
    "{@target}'s {@part} shimmers as it shifts colour, becoming {@colour}.";
const PATTERN_MESSAGE: &str = "{@pattern_colour} {@pattern} spread across {@target}'s {@part}.";
const PATTERN_REMOVED_MESSAGE: &str = "The markings on {@target}'s {@part} fade away.";

/// Fields of a transformation, as provided by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransformation {
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

/// What happened to a body part slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftAction {
    /// A missing part was added
    Grown,
    /// An existing part changed species
    Shifted,
    /// The part already matched the request
    Unchanged,
    /// The part's colouring changed
    Recoloured,
    /// The part was removed
    Removed,
}

/// Result of a transformation request, ready to be posted in chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftOutcome {
    /// The most significant thing that happened (the first change, or `Unchanged`)
    pub action: ShiftAction,
    /// Rendered message describing the change
    pub message: String,
}

fn normalize_species_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lists every species, alphabetically.
pub async fn list_species(db: &DatabaseConnection) -> Result<Vec<species::Model>> {
    Species::find()
        .order_by_asc(species::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a species by name, ignoring case.
///
/// # Errors
/// Returns [`Error::SpeciesNotFound`] if no species has that name.
pub async fn get_species_by_name<C>(db: &C, name: &str) -> Result<species::Model>
where
    C: ConnectionTrait,
{
    let normalized = normalize_species_name(name);
    Species::find()
        .filter(species::Column::Name.eq(normalized.as_str()))
        .one(db)
        .await?
        .ok_or(Error::SpeciesNotFound { name: normalized })
}

/// Inserts a species, or updates the description and parent of an existing one.
pub async fn upsert_species(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
    parent_id: Option<i64>,
) -> Result<species::Model> {
    let name = normalize_species_name(&require_text(name, "Species name")?);

    let existing = Species::find()
        .filter(species::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        let mut active: species::ActiveModel = existing.into();
        active.description = Set(description.trim().to_string());
        active.parent_id = Set(parent_id);
        return active.update(db).await.map_err(Into::into);
    }

    let created = species::ActiveModel {
        name: Set(name),
        description: Set(description.trim().to_string()),
        parent_id: Set(parent_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!(species = %created.name, "Species added");
    Ok(created)
}

/// Inserts a transformation, or replaces the texts of the existing one for the same
/// species and body part.
pub async fn upsert_transformation(
    db: &DatabaseConnection,
    species_id: i64,
    new: NewTransformation,
) -> Result<transformation::Model> {
    let existing = get_transformation(db, species_id, new.bodypart).await?;

    let mut active: transformation::ActiveModel = match existing {
        Some(existing) => existing.into(),
        None => transformation::ActiveModel {
            species_id: Set(species_id),
            bodypart: Set(new.bodypart),
            ..Default::default()
        },
    };

    active.description = Set(new.description);
    active.default_base_colour = Set(new.default_base_colour);
    active.default_pattern = Set(new.default_pattern);
    active.default_pattern_colour = Set(new.default_pattern_colour);
    active.is_nsfw = Set(new.is_nsfw);
    active.shift_message = Set(new.shift_message);
    active.grow_message = Set(new.grow_message);
    active.single_description = Set(new.single_description);
    active.uniform_shift_message = Set(new.uniform_shift_message);
    active.uniform_grow_message = Set(new.uniform_grow_message);
    active.uniform_description = Set(new.uniform_description);

    active.save(db).await?.try_into_model().map_err(Into::into)
}

/// Finds the transformation a species provides for a body part.
pub async fn get_transformation<C>(
    db: &C,
    species_id: i64,
    bodypart: Bodypart,
) -> Result<Option<transformation::Model>>
where
    C: ConnectionTrait,
{
    Transformation::find()
        .filter(transformation::Column::SpeciesId.eq(species_id))
        .filter(transformation::Column::Bodypart.eq(bodypart))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the transformations a species provides.
pub async fn list_transformations(
    db: &DatabaseConnection,
    species_id: i64,
) -> Result<Vec<transformation::Model>> {
    Transformation::find()
        .filter(transformation::Column::SpeciesId.eq(species_id))
        .order_by_asc(transformation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the body parts a species can shift, in canonical order.
pub async fn available_bodyparts(
    db: &DatabaseConnection,
    species_id: i64,
) -> Result<Vec<Bodypart>> {
    let transformations = list_transformations(db, species_id).await?;
    Ok(Bodypart::iter()
        .filter(|part| transformations.iter().any(|t| t.bodypart == *part))
        .collect())
}

/// Fetches one of a character's appearances.
pub async fn get_appearance<C>(
    db: &C,
    character_id: i64,
    kind: AppearanceKind,
) -> Result<Option<appearance::Model>>
where
    C: ConnectionTrait,
{
    Appearance::find()
        .filter(appearance::Column::CharacterId.eq(character_id))
        .filter(appearance::Column::Kind.eq(kind))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn create_appearance<C>(
    db: &C,
    character_id: i64,
    kind: AppearanceKind,
) -> Result<appearance::Model>
where
    C: ConnectionTrait,
{
    appearance::ActiveModel {
        character_id: Set(character_id),
        kind: Set(kind),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates the (empty) default appearance of a new character.
pub async fn create_default_appearance<C>(db: &C, character_id: i64) -> Result<appearance::Model>
where
    C: ConnectionTrait,
{
    create_appearance(db, character_id, AppearanceKind::Default).await
}

/// Fetches the current appearance, creating it as a copy of the default on first use.
pub async fn get_or_create_current_appearance<C>(
    db: &C,
    character_id: i64,
) -> Result<appearance::Model>
where
    C: ConnectionTrait,
{
    if let Some(current) = get_appearance(db, character_id, AppearanceKind::Current).await? {
        return Ok(current);
    }

    let current = create_appearance(db, character_id, AppearanceKind::Current).await?;
    if let Some(default) = get_appearance(db, character_id, AppearanceKind::Default).await? {
        copy_components(db, default.id, current.id).await?;
    }
    debug!(character_id, "Created current appearance");
    Ok(current)
}

/// Lists the components of an appearance.
pub async fn get_components<C>(
    db: &C,
    appearance_id: i64,
) -> Result<Vec<appearance_component::Model>>
where
    C: ConnectionTrait,
{
    AppearanceComponent::find()
        .filter(appearance_component::Column::AppearanceId.eq(appearance_id))
        .order_by_asc(appearance_component::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the components of `to` with copies of the components of `from`.
async fn copy_components<C>(db: &C, from: i64, to: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    AppearanceComponent::delete_many()
        .filter(appearance_component::Column::AppearanceId.eq(to))
        .exec(db)
        .await?;

    for component in get_components(db, from).await? {
        appearance_component::ActiveModel {
            appearance_id: Set(to),
            bodypart: Set(component.bodypart),
            chirality: Set(component.chirality),
            transformation_id: Set(component.transformation_id),
            base_colour: Set(component.base_colour),
            pattern: Set(component.pattern),
            pattern_colour: Set(component.pattern_colour),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Deletes both appearances of a character along with their components.
pub async fn delete_appearances<C>(db: &C, character_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let appearances = Appearance::find()
        .filter(appearance::Column::CharacterId.eq(character_id))
        .all(db)
        .await?;
    let ids: Vec<i64> = appearances.iter().map(|a| a.id).collect();

    AppearanceComponent::delete_many()
        .filter(appearance_component::Column::AppearanceId.is_in(ids.clone()))
        .exec(db)
        .await?;
    Appearance::delete_many()
        .filter(appearance::Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(())
}

async fn find_component<C>(
    db: &C,
    appearance_id: i64,
    bodypart: Bodypart,
    side: Chirality,
) -> Result<Option<appearance_component::Model>>
where
    C: ConnectionTrait,
{
    AppearanceComponent::find()
        .filter(appearance_component::Column::AppearanceId.eq(appearance_id))
        .filter(appearance_component::Column::Bodypart.eq(bodypart))
        .filter(appearance_component::Column::Chirality.eq(side))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Works out which slots a request targets.
///
/// Chiral parts without a side target both sides; non-chiral parts only accept no side
/// (or center).
///
/// # Errors
/// Returns [`Error::Validation`] if a side is given for a part that has none, or center
/// is given for a part that has sides.
pub fn resolve_sides(bodypart: Bodypart, side: Option<Chirality>) -> Result<Vec<Chirality>> {
    match (bodypart.is_chiral(), side) {
        (true, None) => Ok(vec![Chirality::Left, Chirality::Right]),
        (true, Some(Chirality::Center)) => Err(Error::validation(format!(
            "The {} has a left and a right side; pick one or leave it out for both",
            bodypart.plural()
        ))),
        (true, Some(side)) => Ok(vec![side]),
        (false, None | Some(Chirality::Center)) => Ok(vec![Chirality::Center]),
        (false, Some(_)) => Err(Error::validation(format!(
            "The {bodypart} doesn't have a left or right side"
        ))),
    }
}

/// Noun phrase for a slot or pair of slots, e.g. "left ear", "ears" or "tail".
fn part_phrase(bodypart: Bodypart, sides: &[Chirality]) -> String {
    match sides {
        [Chirality::Left] => format!("left {}", bodypart.singular()),
        [Chirality::Right] => format!("right {}", bodypart.singular()),
        [_, _] => bodypart.plural().to_string(),
        _ => bodypart.singular().to_string(),
    }
}

fn side_word(sides: &[Chirality]) -> Option<&'static str> {
    match sides {
        [Chirality::Left] => Some("left"),
        [Chirality::Right] => Some("right"),
        [_, _] => Some("both"),
        _ => None,
    }
}

/// Renders a template for a slot (or a pair of slots), filling in the part phrase too.
fn render_for(
    template: &str,
    character: &character::Model,
    pronouns: &PronounFamily,
    bodypart: Bodypart,
    sides: &[Chirality],
    colouring: Colouring<'_>,
    species: Option<&str>,
) -> String {
    let part = part_phrase(bodypart, sides);
    let template = template.replace("{@part}", &part);
    let bodypart_noun = if sides.len() == 2 {
        bodypart.plural()
    } else {
        bodypart.singular()
    };

    let mut context = TokenContext::new(&character.name, pronouns);
    context.side = side_word(sides);
    context.bodypart = Some(bodypart_noun);
    context.colour = colouring.base;
    context.pattern = colouring.pattern;
    context.pattern_colour = colouring.pattern_colour;
    context.species = species;
    text::render(&template, &context)
}

#[derive(Debug, Clone, Copy, Default)]
struct Colouring<'a> {
    base: Option<&'a str>,
    pattern: Option<&'a str>,
    pattern_colour: Option<&'a str>,
}

impl<'a> Colouring<'a> {
    fn of(component: &'a appearance_component::Model) -> Self {
        Self {
            base: Some(&component.base_colour),
            pattern: component.pattern.as_deref(),
            pattern_colour: component.pattern_colour.as_deref(),
        }
    }

    fn defaults_of(transformation: &'a transformation::Model) -> Self {
        Self {
            base: Some(&transformation.default_base_colour),
            pattern: transformation.default_pattern.as_deref(),
            pattern_colour: transformation.default_pattern_colour.as_deref(),
        }
    }
}

fn combine(actions: &[ShiftAction]) -> ShiftAction {
    actions
        .iter()
        .copied()
        .find(|action| *action != ShiftAction::Unchanged)
        .unwrap_or(ShiftAction::Unchanged)
}

/// NSFW transformations need an NSFW character on a server that allows NSFW content.
async fn require_nsfw_allowed(db: &DatabaseConnection, character: &character::Model) -> Result<()> {
    if !character.is_nsfw {
        return Err(Error::validation(format!(
            "{} isn't marked NSFW, so NSFW transformations can't be applied",
            character.name
        )));
    }
    if !server::get_or_create_server(db, &character.server_id).await?.is_nsfw {
        return Err(Error::validation(
            "NSFW transformations aren't allowed on this server",
        ));
    }
    Ok(())
}

/// Shifts a body part of a character's current appearance to another species.
///
/// Missing parts are grown, parts of another species are shifted (and recoloured to the
/// transformation's defaults), parts already of the species are left alone. When both
/// sides of a chiral part change the same way, the uniform message is used if the
/// transformation has one.
///
/// # Errors
/// Returns an error if the species or its transformation for the part does not exist,
/// the side is invalid for the part, the transformation is NSFW where NSFW content is not
/// allowed, or a database write fails.
#[instrument(skip(db, character), fields(character_id = character.id))]
pub async fn shift_bodypart(
    db: &DatabaseConnection,
    character: &character::Model,
    bodypart: Bodypart,
    side: Option<Chirality>,
    species_name: &str,
) -> Result<ShiftOutcome> {
    let sides = resolve_sides(bodypart, side)?;
    let species = get_species_by_name(db, species_name).await?;
    let transformation = get_transformation(db, species.id, bodypart)
        .await?
        .ok_or_else(|| Error::TransformationNotFound {
            species: species.name.clone(),
            bodypart: bodypart.to_string(),
        })?;
    if transformation.is_nsfw {
        require_nsfw_allowed(db, character).await?;
    }
    let pronouns = pronouns::family_or_default(&character.pronoun_family);

    let txn = db.begin().await?;
    let appearance = get_or_create_current_appearance(&txn, character.id).await?;

    let mut actions = Vec::with_capacity(sides.len());
    for &slot in &sides {
        let action = match find_component(&txn, appearance.id, bodypart, slot).await? {
            Some(existing) if existing.transformation_id == transformation.id => {
                ShiftAction::Unchanged
            }
            Some(existing) => {
                let mut active: appearance_component::ActiveModel = existing.into();
                active.transformation_id = Set(transformation.id);
                active.base_colour = Set(transformation.default_base_colour.clone());
                active.pattern = Set(transformation.default_pattern.clone());
                active.pattern_colour = Set(transformation.default_pattern_colour.clone());
                active.update(&txn).await?;
                ShiftAction::Shifted
            }
            None => {
                appearance_component::ActiveModel {
                    appearance_id: Set(appearance.id),
                    bodypart: Set(bodypart),
                    chirality: Set(slot),
                    transformation_id: Set(transformation.id),
                    base_colour: Set(transformation.default_base_colour.clone()),
                    pattern: Set(transformation.default_pattern.clone()),
                    pattern_colour: Set(transformation.default_pattern_colour.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                ShiftAction::Grown
            }
        };
        actions.push(action);
    }

    txn.commit().await?;

    let colouring = Colouring::defaults_of(&transformation);
    let render = |template: &str, slots: &[Chirality]| {
        render_for(
            template,
            character,
            pronouns,
            bodypart,
            slots,
            colouring,
            Some(&species.name),
        )
    };

    let uniform_template = match actions.as_slice() {
        [ShiftAction::Shifted, ShiftAction::Shifted] => {
            transformation.uniform_shift_message.as_deref()
        }
        [ShiftAction::Grown, ShiftAction::Grown] => transformation.uniform_grow_message.as_deref(),
        [ShiftAction::Unchanged, ShiftAction::Unchanged] => Some(UNCHANGED_PAIR_MESSAGE),
        _ => None,
    };

    let message = if let Some(template) = uniform_template {
        render(template, &sides)
    } else {
        sides
            .iter()
            .zip(&actions)
            .map(|(slot, action)| {
                let template = match action {
                    ShiftAction::Grown => transformation.grow_message.as_str(),
                    ShiftAction::Shifted => transformation.shift_message.as_str(),
                    _ => UNCHANGED_MESSAGE,
                };
                render(template, std::slice::from_ref(slot))
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    let action = combine(&actions);
    info!(?action, %bodypart, species = %species.name, "Body part shifted");
    Ok(ShiftOutcome { action, message })
}

/// Loads the components occupying the requested slots, failing if any is missing.
async fn require_components<C>(
    db: &C,
    appearance_id: i64,
    bodypart: Bodypart,
    sides: &[Chirality],
) -> Result<Vec<appearance_component::Model>>
where
    C: ConnectionTrait,
{
    let mut components = Vec::with_capacity(sides.len());
    for &slot in sides {
        let component = find_component(db, appearance_id, bodypart, slot)
            .await?
            .ok_or_else(|| Error::BodypartNotFound {
                bodypart: part_phrase(bodypart, &[slot]),
            })?;
        components.push(component);
    }
    Ok(components)
}

/// Changes the base colour of a body part.
///
/// # Errors
/// Returns [`Error::BodypartNotFound`] if the character lacks the part.
pub async fn shift_colour(
    db: &DatabaseConnection,
    character: &character::Model,
    bodypart: Bodypart,
    side: Option<Chirality>,
    colour: &str,
) -> Result<ShiftOutcome> {
    let colour = require_text(colour, "Colour")?.to_lowercase();
    let sides = resolve_sides(bodypart, side)?;

    let txn = db.begin().await?;
    let appearance = get_or_create_current_appearance(&txn, character.id).await?;
    let components = require_components(&txn, appearance.id, bodypart, &sides).await?;

    let mut actions = Vec::with_capacity(components.len());
    for component in components {
        if component.base_colour == colour {
            actions.push(ShiftAction::Unchanged);
            continue;
        }
        let mut active: appearance_component::ActiveModel = component.into();
        active.base_colour = Set(colour.clone());
        active.update(&txn).await?;
        actions.push(ShiftAction::Recoloured);
    }
    txn.commit().await?;

    let colouring = Colouring {
        base: Some(&colour),
        ..Colouring::default()
    };
    let pronouns = pronouns::family_or_default(&character.pronoun_family);
    let message = render_for(
        COLOUR_MESSAGE,
        character,
        pronouns,
        bodypart,
        &sides,
        colouring,
        None,
    );

    Ok(ShiftOutcome {
        action: combine(&actions),
        message,
    })
}

/// Sets or clears the pattern of a body part.
///
/// # Errors
/// Returns [`Error::BodypartNotFound`] if the character lacks the part.
pub async fn shift_pattern(
    db: &DatabaseConnection,
    character: &character::Model,
    bodypart: Bodypart,
    side: Option<Chirality>,
    pattern: Option<&str>,
    pattern_colour: Option<&str>,
) -> Result<ShiftOutcome> {
    let sides = resolve_sides(bodypart, side)?;
    let pattern = pattern
        .map(|p| require_text(p, "Pattern"))
        .transpose()?
        .map(|p| p.to_lowercase());
    let pattern_colour = pattern_colour
        .map(|c| require_text(c, "Pattern colour"))
        .transpose()?
        .map(|c| c.to_lowercase());
    if pattern.is_none() && pattern_colour.is_some() {
        return Err(Error::validation("A pattern colour needs a pattern"));
    }

    let txn = db.begin().await?;
    let appearance = get_or_create_current_appearance(&txn, character.id).await?;
    let components = require_components(&txn, appearance.id, bodypart, &sides).await?;
    for component in components {
        let mut active: appearance_component::ActiveModel = component.into();
        active.pattern = Set(pattern.clone());
        active.pattern_colour = Set(pattern_colour.clone());
        active.update(&txn).await?;
    }
    txn.commit().await?;

    let pronouns = pronouns::family_or_default(&character.pronoun_family);
    let (template, colour_word) = match &pattern {
        Some(_) => (
            PATTERN_MESSAGE,
            pattern_colour.as_deref().unwrap_or("faint"),
        ),
        None => (PATTERN_REMOVED_MESSAGE, ""),
    };
    let colouring = Colouring {
        base: None,
        pattern: pattern.as_deref(),
        pattern_colour: Some(colour_word),
    };
    let message = render_for(template, character, pronouns, bodypart, &sides, colouring, None);

    Ok(ShiftOutcome {
        action: ShiftAction::Recoloured,
        message,
    })
}

/// Removes a body part from the current appearance.
///
/// # Errors
/// Returns [`Error::BodypartNotFound`] if the character lacks the part.
pub async fn remove_bodypart(
    db: &DatabaseConnection,
    character: &character::Model,
    bodypart: Bodypart,
    side: Option<Chirality>,
) -> Result<ShiftOutcome> {
    let sides = resolve_sides(bodypart, side)?;

    let txn = db.begin().await?;
    let appearance = get_or_create_current_appearance(&txn, character.id).await?;
    let components = require_components(&txn, appearance.id, bodypart, &sides).await?;
    let ids: Vec<i64> = components.iter().map(|c| c.id).collect();
    AppearanceComponent::delete_many()
        .filter(appearance_component::Column::Id.is_in(ids))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    let pronouns = pronouns::family_or_default(&character.pronoun_family);
    let message = render_for(
        REMOVE_MESSAGE,
        character,
        pronouns,
        bodypart,
        &sides,
        Colouring::default(),
        None,
    );
    info!(character_id = character.id, %bodypart, "Body part removed");
    Ok(ShiftOutcome {
        action: ShiftAction::Removed,
        message,
    })
}

/// Resets the current appearance to a copy of the default appearance.
pub async fn reset_appearance(db: &DatabaseConnection, character_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let current = get_or_create_current_appearance(&txn, character_id).await?;
    let default = match get_appearance(&txn, character_id, AppearanceKind::Default).await? {
        Some(default) => default,
        None => create_default_appearance(&txn, character_id).await?,
    };
    copy_components(&txn, default.id, current.id).await?;
    txn.commit().await?;
    info!(character_id, "Appearance reset to default");
    Ok(())
}

/// Makes the current appearance the new default.
pub async fn save_current_as_default(db: &DatabaseConnection, character_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let current = get_or_create_current_appearance(&txn, character_id).await?;
    let default = match get_appearance(&txn, character_id, AppearanceKind::Default).await? {
        Some(default) => default,
        None => create_default_appearance(&txn, character_id).await?,
    };
    copy_components(&txn, current.id, default.id).await?;
    txn.commit().await?;
    info!(character_id, "Current appearance saved as default");
    Ok(())
}

/// Builds the full textual description of a character.
///
/// The character's free-form description comes first, followed by one sentence per body
/// part in canonical order. Matching left/right pairs are described together when the
/// transformation has a uniform description.
pub async fn describe_character(
    db: &DatabaseConnection,
    character: &character::Model,
) -> Result<String> {
    let appearance = match get_appearance(db, character.id, AppearanceKind::Current).await? {
        Some(current) => Some(current),
        None => get_appearance(db, character.id, AppearanceKind::Default).await?,
    };
    let components = match &appearance {
        Some(appearance) => get_components(db, appearance.id).await?,
        None => Vec::new(),
    };

    let transformation_ids: Vec<i64> = components.iter().map(|c| c.transformation_id).collect();
    let transformations: HashMap<i64, transformation::Model> = Transformation::find()
        .filter(transformation::Column::Id.is_in(transformation_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();
    let species_ids: Vec<i64> = transformations.values().map(|t| t.species_id).collect();
    let species_names: HashMap<i64, String> = Species::find()
        .filter(species::Column::Id.is_in(species_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let pronouns = pronouns::family_or_default(&character.pronoun_family);
    let mut sentences = Vec::new();

    for bodypart in Bodypart::iter() {
        let slots: Vec<&appearance_component::Model> = components
            .iter()
            .filter(|c| c.bodypart == bodypart)
            .collect();

        if let [first, second] = slots.as_slice() {
            let matching = first.transformation_id == second.transformation_id
                && first.base_colour == second.base_colour
                && first.pattern == second.pattern
                && first.pattern_colour == second.pattern_colour;
            let uniform = transformations
                .get(&first.transformation_id)
                .and_then(|t| t.uniform_description.as_deref().map(|d| (t, d)));

            if let (true, Some((transformation, template))) = (matching, uniform) {
                let sides = [first.chirality, second.chirality];
                let species = species_names.get(&transformation.species_id).map(String::as_str);
                sentences.push(render_for(
                    template,
                    character,
                    pronouns,
                    bodypart,
                    &sides,
                    Colouring::of(first),
                    species,
                ));
                if let Some(pattern) = describe_pattern(character, pronouns, first, &sides) {
                    sentences.push(pattern);
                }
                continue;
            }
        }

        for component in slots {
            let Some(transformation) = transformations.get(&component.transformation_id) else {
                continue;
            };
            let sides = [component.chirality];
            let species = species_names.get(&transformation.species_id).map(String::as_str);
            sentences.push(render_for(
                &transformation.single_description,
                character,
                pronouns,
                bodypart,
                &sides,
                Colouring::of(component),
                species,
            ));
            if let Some(pattern) = describe_pattern(character, pronouns, component, &sides) {
                sentences.push(pattern);
            }
        }
    }

    let body = sentences.join(" ");
    let description = character.description.trim();
    Ok(match (description.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => description.to_string(),
        (false, false) => format!("{description}\n\n{body}"),
    })
}

fn describe_pattern(
    character: &character::Model,
    pronouns: &PronounFamily,
    component: &appearance_component::Model,
    sides: &[Chirality],
) -> Option<String> {
    let pattern = component.pattern.as_deref()?;
    let verb = if sides.len() == 2 { "are" } else { "is" };
    let markings = if component.pattern_colour.is_some() {
        "{@pattern_colour} {@pattern}"
    } else {
        "{@pattern}"
    };
    let template = format!("{{@f|their}} {{@part}} {verb} marked with {markings}.");
    let colouring = Colouring {
        base: None,
        pattern: Some(pattern),
        pattern_colour: component.pattern_colour.as_deref(),
    };
    Some(render_for(
        &template,
        character,
        pronouns,
        component.bodypart,
        sides,
        colouring,
        None,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_resolve_sides() {
        assert_eq!(
            resolve_sides(Bodypart::Ear, None).unwrap(),
            vec![Chirality::Left, Chirality::Right]
        );
        assert_eq!(
            resolve_sides(Bodypart::Ear, Some(Chirality::Left)).unwrap(),
            vec![Chirality::Left]
        );
        assert_eq!(
            resolve_sides(Bodypart::Tail, None).unwrap(),
            vec![Chirality::Center]
        );
        assert!(resolve_sides(Bodypart::Tail, Some(Chirality::Right)).is_err());
        assert!(resolve_sides(Bodypart::Wing, Some(Chirality::Center)).is_err());
    }

    #[tokio::test]
    async fn test_species_lookup_ignores_case() -> Result<()> {
        let db = setup_with_catalog().await?;
        let wolf = get_species_by_name(&db, "  WOLF ").await?;
        assert_eq!(wolf.name, "wolf");

        let missing = get_species_by_name(&db, "dragon").await;
        assert!(matches!(missing, Err(Error::SpeciesNotFound { .. })));

        let parts = available_bodyparts(&db, wolf.id).await?;
        assert_eq!(parts, vec![Bodypart::Ear, Bodypart::Tail]);
        Ok(())
    }

    #[tokio::test]
    async fn test_grow_then_shift_single_part() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;

        let grown = shift_bodypart(&db, &character, Bodypart::Tail, None, "wolf").await?;
        assert_eq!(grown.action, ShiftAction::Grown);
        assert_eq!(
            grown.message,
            "A bushy grey wolf tail sprouts from Amby's lower back."
        );

        let again = shift_bodypart(&db, &character, Bodypart::Tail, None, "wolf").await?;
        assert_eq!(again.action, ShiftAction::Unchanged);
        assert_eq!(again.message, "Amby's tail is already a wolf tail.");

        let shifted = shift_bodypart(&db, &character, Bodypart::Tail, None, "shark").await?;
        assert_eq!(shifted.action, ShiftAction::Shifted);
        assert_eq!(
            shifted.message,
            "Amby's tail thickens and stiffens into a powerful shark tail."
        );

        let current = get_or_create_current_appearance(&db, character.id).await?;
        let components = get_components(&db, current.id).await?;
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].base_colour, "slate blue");
        assert_eq!(components[0].pattern.as_deref(), Some("countershading"));
        Ok(())
    }

    #[tokio::test]
    async fn test_shift_both_sides_uses_uniform_message() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;

        let grown = shift_bodypart(&db, &character, Bodypart::Ear, None, "wolf").await?;
        assert_eq!(grown.action, ShiftAction::Grown);
        assert_eq!(
            grown.message,
            "A pair of pointed grey wolf ears grows on Amby's head."
        );

        let current = get_or_create_current_appearance(&db, character.id).await?;
        assert_eq!(get_components(&db, current.id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_shift_one_side_uses_single_message() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;

        let grown =
            shift_bodypart(&db, &character, Bodypart::Ear, Some(Chirality::Left), "wolf").await?;
        assert_eq!(
            grown.message,
            "A pointed wolf ear grows on the left of Amby's head."
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_transformation() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;

        let result = shift_bodypart(&db, &character, Bodypart::Ear, None, "shark").await;
        assert!(matches!(
            result,
            Err(Error::TransformationNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_nsfw_transformation_needs_nsfw_character_and_server() -> Result<()> {
        let db = setup_with_catalog().await?;
        let species = upsert_species(&db, "incubus", "A seductive demon.", None).await?;
        upsert_transformation(
            &db,
            species.id,
            NewTransformation {
                bodypart: Bodypart::Tail,
                description: "A spaded demon tail.".to_string(),
                default_base_colour: "red".to_string(),
                default_pattern: None,
                default_pattern_colour: None,
                is_nsfw: true,
                shift_message: "{@target}'s {@part} ends in a spade.".to_string(),
                grow_message: "A spaded tail sprouts from {@target}.".to_string(),
                single_description: "{@f|they} {@f|have} a spaded tail.".to_string(),
                uniform_shift_message: None,
                uniform_grow_message: None,
                uniform_description: None,
            },
        )
        .await?;
        let character = create_test_character(&db, "Amby").await?;

        let result = shift_bodypart(&db, &character, Bodypart::Tail, None, "incubus").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let character = crate::core::character::set_nsfw(&db, character.id, true).await?;
        let result = shift_bodypart(&db, &character, Bodypart::Tail, None, "incubus").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(
            get_appearance(&db, character.id, AppearanceKind::Current)
                .await?
                .is_none()
        );

        server::set_nsfw(&db, TEST_SERVER, true).await?;
        let outcome = shift_bodypart(&db, &character, Bodypart::Tail, None, "incubus").await?;
        assert_eq!(outcome.action, ShiftAction::Grown);
        Ok(())
    }

    #[tokio::test]
    async fn test_colour_pattern_and_remove() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;
        shift_bodypart(&db, &character, Bodypart::Tail, None, "wolf").await?;

        let recoloured =
            shift_colour(&db, &character, Bodypart::Tail, None, "Jet Black").await?;
        assert_eq!(recoloured.action, ShiftAction::Recoloured);
        assert_eq!(
            recoloured.message,
            "Amby's tail shimmers as it shifts colour, becoming jet black."
        );

        let patterned = shift_pattern(
            &db,
            &character,
            Bodypart::Tail,
            None,
            Some("stripes"),
            Some("white"),
        )
        .await?;
        assert_eq!(
            patterned.message,
            "White stripes spread across Amby's tail."
        );

        let removed = remove_bodypart(&db, &character, Bodypart::Tail, None).await?;
        assert_eq!(removed.action, ShiftAction::Removed);

        let missing = shift_colour(&db, &character, Bodypart::Tail, None, "red").await;
        assert!(matches!(missing, Err(Error::BodypartNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_and_save_default() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;

        shift_bodypart(&db, &character, Bodypart::Tail, None, "wolf").await?;
        save_current_as_default(&db, character.id).await?;

        shift_bodypart(&db, &character, Bodypart::Tail, None, "shark").await?;
        shift_bodypart(&db, &character, Bodypart::Ear, None, "wolf").await?;
        reset_appearance(&db, character.id).await?;

        let current = get_or_create_current_appearance(&db, character.id).await?;
        let components = get_components(&db, current.id).await?;
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].bodypart, Bodypart::Tail);
        assert_eq!(components[0].base_colour, "grey");
        Ok(())
    }

    #[tokio::test]
    async fn test_describe_character() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;

        // Only the free-form description before any transformation
        assert_eq!(
            describe_character(&db, &character).await?,
            "A curious traveller."
        );

        shift_bodypart(&db, &character, Bodypart::Ear, None, "wolf").await?;
        shift_bodypart(&db, &character, Bodypart::Tail, None, "wolf").await?;
        let description = describe_character(&db, &character).await?;
        assert_eq!(
            description,
            "A curious traveller.\n\n\
             She has pointed grey wolf ears. She has a bushy grey wolf tail."
        );

        // Mismatched sides are described one by one
        shift_colour(&db, &character, Bodypart::Ear, Some(Chirality::Right), "white").await?;
        shift_pattern(
            &db,
            &character,
            Bodypart::Tail,
            None,
            Some("rings"),
            Some("black"),
        )
        .await?;
        let description = describe_character(&db, &character).await?;
        assert_eq!(
            description,
            "A curious traveller.\n\n\
             Her left ear is a pointed grey wolf ear. \
             Her right ear is a pointed white wolf ear. \
             She has a bushy grey wolf tail. \
             Her tail is marked with black rings."
        );
        Ok(())
    }
}
