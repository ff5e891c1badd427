//! Character business logic - Creating, editing and deleting role-play personas.

use super::{
    pronouns::{self, DEFAULT_FAMILY},
    transformation,
    validation::{require_name, require_text},
};
use crate::{
    entities::{Character, character},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use tracing::{debug, info, instrument};

/// Details of a character to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCharacter {
    /// Display name, unique per owner and server
    pub name: String,
    /// Optional shorter name used in chat
    pub nickname: Option<String>,
    /// One-line summary
    pub summary: String,
    /// Free-form description shown before the body parts
    pub description: String,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Pronoun family name; the default family when `None`
    pub pronoun_family: Option<String>,
    /// Adult-only flag
    pub is_nsfw: bool,
}

impl NewCharacter {
    /// A character with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

fn canonical_family(name: &str) -> Result<&'static str> {
    pronouns::find_family(name)
        .map(|family| family.name)
        .ok_or_else(|| Error::validation(format!("Unknown pronoun family '{}'", name.trim())))
}

/// Case-insensitive name comparison.
fn name_matches(name: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(character::Column::Name))).eq(name.to_lowercase())
}

async fn ensure_name_free<C>(
    db: &C,
    server_id: &str,
    owner_id: &str,
    name: &str,
    except: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Character::find()
        .filter(character::Column::ServerId.eq(server_id))
        .filter(character::Column::OwnerId.eq(owner_id))
        .filter(name_matches(name));
    if let Some(id) = except {
        query = query.filter(character::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::CharacterNameTaken {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Creates a character along with its (empty) default appearance.
///
/// # Errors
/// Returns an error if the name is empty or taken, the pronoun family is unknown, or
/// the database write fails.
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_character(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: &str,
    new: NewCharacter,
) -> Result<character::Model> {
    let name = require_name(&new.name, "Character name")?;
    let pronoun_family =
        canonical_family(new.pronoun_family.as_deref().unwrap_or(DEFAULT_FAMILY))?;
    let nickname = new.nickname.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    let txn = db.begin().await?;
    ensure_name_free(&txn, server_id, owner_id, &name, None).await?;

    let created = character::ActiveModel {
        server_id: Set(server_id.to_string()),
        owner_id: Set(owner_id.to_string()),
        name: Set(name),
        nickname: Set(nickname),
        summary: Set(new.summary.trim().to_string()),
        description: Set(new.description.trim().to_string()),
        avatar_url: Set(new.avatar_url),
        pronoun_family: Set(pronoun_family.to_string()),
        is_nsfw: Set(new.is_nsfw),
        is_default: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    transformation::create_default_appearance(&txn, created.id).await?;
    txn.commit().await?;

    info!(character_id = created.id, "Character created");
    Ok(created)
}

/// Fetches a character by ID.
pub async fn get_character_by_id<C>(db: &C, character_id: i64) -> Result<character::Model>
where
    C: ConnectionTrait,
{
    Character::find_by_id(character_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::CharacterNotFound {
            name: character_id.to_string(),
        })
}

/// Fetches one of a user's characters by name, ignoring case.
pub async fn get_character_by_name(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: &str,
    name: &str,
) -> Result<character::Model> {
    let name = name.trim();
    debug!(server_id, owner_id, name, "Looking up character");
    Character::find()
        .filter(character::Column::ServerId.eq(server_id))
        .filter(character::Column::OwnerId.eq(owner_id))
        .filter(name_matches(name))
        .one(db)
        .await?
        .ok_or_else(|| Error::CharacterNotFound {
            name: name.to_string(),
        })
}

/// Lists a user's characters on a server, by name.
pub async fn list_characters(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: &str,
) -> Result<Vec<character::Model>> {
    Character::find()
        .filter(character::Column::ServerId.eq(server_id))
        .filter(character::Column::OwnerId.eq(owner_id))
        .order_by_asc(character::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The character a user transforms when no name is given, if any.
pub async fn get_default_character(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: &str,
) -> Result<Option<character::Model>> {
    Character::find()
        .filter(character::Column::ServerId.eq(server_id))
        .filter(character::Column::OwnerId.eq(owner_id))
        .filter(character::Column::IsDefault.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Renames a character.
pub async fn set_name(
    db: &DatabaseConnection,
    character_id: i64,
    name: &str,
) -> Result<character::Model> {
    let name = require_name(name, "Character name")?;
    let existing = get_character_by_id(db, character_id).await?;
    ensure_name_free(
        db,
        &existing.server_id,
        &existing.owner_id,
        &name,
        Some(character_id),
    )
    .await?;

    let mut active: character::ActiveModel = existing.into();
    active.name = Set(name);
    active.update(db).await.map_err(Into::into)
}

/// Sets or clears the nickname.
pub async fn set_nickname(
    db: &DatabaseConnection,
    character_id: i64,
    nickname: Option<&str>,
) -> Result<character::Model> {
    let nickname = nickname.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    let mut active: character::ActiveModel = get_character_by_id(db, character_id).await?.into();
    active.nickname = Set(nickname);
    active.update(db).await.map_err(Into::into)
}

/// Replaces the summary.
pub async fn set_summary(
    db: &DatabaseConnection,
    character_id: i64,
    summary: &str,
) -> Result<character::Model> {
    let mut active: character::ActiveModel = get_character_by_id(db, character_id).await?.into();
    active.summary = Set(summary.trim().to_string());
    active.update(db).await.map_err(Into::into)
}

/// Replaces the free-form description.
pub async fn set_description(
    db: &DatabaseConnection,
    character_id: i64,
    description: &str,
) -> Result<character::Model> {
    let mut active: character::ActiveModel = get_character_by_id(db, character_id).await?.into();
    active.description = Set(description.trim().to_string());
    active.update(db).await.map_err(Into::into)
}

/// Sets or clears the avatar URL.
pub async fn set_avatar(
    db: &DatabaseConnection,
    character_id: i64,
    avatar_url: Option<&str>,
) -> Result<character::Model> {
    let avatar_url = avatar_url
        .map(|url| require_text(url, "Avatar URL"))
        .transpose()?;
    let mut active: character::ActiveModel = get_character_by_id(db, character_id).await?.into();
    active.avatar_url = Set(avatar_url);
    active.update(db).await.map_err(Into::into)
}

/// Changes the pronoun family.
///
/// # Errors
/// Returns [`Error::Validation`] if the family is unknown.
pub async fn set_pronouns(
    db: &DatabaseConnection,
    character_id: i64,
    family: &str,
) -> Result<character::Model> {
    let family = canonical_family(family)?;
    let mut active: character::ActiveModel = get_character_by_id(db, character_id).await?.into();
    active.pronoun_family = Set(family.to_string());
    active.update(db).await.map_err(Into::into)
}

/// Sets the adult-only flag.
pub async fn set_nsfw(
    db: &DatabaseConnection,
    character_id: i64,
    is_nsfw: bool,
) -> Result<character::Model> {
    let mut active: character::ActiveModel = get_character_by_id(db, character_id).await?.into();
    active.is_nsfw = Set(is_nsfw);
    active.update(db).await.map_err(Into::into)
}

/// Makes a character its owner's default on the server, clearing any previous default.
pub async fn set_default_character(
    db: &DatabaseConnection,
    character_id: i64,
) -> Result<character::Model> {
    let txn = db.begin().await?;
    let existing = get_character_by_id(&txn, character_id).await?;

    Character::update_many()
        .col_expr(character::Column::IsDefault, Expr::value(false))
        .filter(character::Column::ServerId.eq(existing.server_id.as_str()))
        .filter(character::Column::OwnerId.eq(existing.owner_id.as_str()))
        .exec(&txn)
        .await?;

    let mut active: character::ActiveModel = existing.into();
    active.is_default = Set(true);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(character_id, "Default character set");
    Ok(updated)
}

/// Clears a user's default character on a server.
pub async fn clear_default_character(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: &str,
) -> Result<()> {
    Character::update_many()
        .col_expr(character::Column::IsDefault, Expr::value(false))
        .filter(character::Column::ServerId.eq(server_id))
        .filter(character::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Deletes a character and its appearances.
pub async fn delete_character(db: &DatabaseConnection, character_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = get_character_by_id(&txn, character_id).await?;
    transformation::delete_appearances(&txn, existing.id).await?;
    Character::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    info!(character_id, "Character deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::transformation::{get_appearance, shift_bodypart},
        entities::{AppearanceKind, Bodypart},
        test_utils::*,
    };

    #[tokio::test]
    async fn test_create_character_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_character(&db, "1", "2", NewCharacter::named("  ")).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let bad_pronouns = NewCharacter {
            pronoun_family: Some("Draconic".to_string()),
            ..NewCharacter::named("Amby")
        };
        let result = create_character(&db, "1", "2", bad_pronouns).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_character_with_default_appearance() -> Result<()> {
        let db = setup_test_db().await?;

        let character =
            create_character(&db, TEST_SERVER, TEST_USER, NewCharacter::named(" Amby ")).await?;
        assert_eq!(character.name, "Amby");
        assert_eq!(character.pronoun_family, DEFAULT_FAMILY);
        assert!(!character.is_default);

        let appearance = get_appearance(&db, character.id, AppearanceKind::Default).await?;
        assert!(appearance.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_names_are_unique_per_owner() -> Result<()> {
        let db = setup_test_db().await?;
        create_character(&db, TEST_SERVER, TEST_USER, NewCharacter::named("Amby")).await?;

        let duplicate =
            create_character(&db, TEST_SERVER, TEST_USER, NewCharacter::named("amby")).await;
        assert!(matches!(duplicate, Err(Error::CharacterNameTaken { .. })));

        // Another user may reuse the name
        create_character(&db, TEST_SERVER, "other", NewCharacter::named("Amby")).await?;

        let found = get_character_by_name(&db, TEST_SERVER, TEST_USER, "AMBY").await?;
        assert_eq!(found.owner_id, TEST_USER);
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_and_edit() -> Result<()> {
        let db = setup_test_db().await?;
        let first =
            create_character(&db, TEST_SERVER, TEST_USER, NewCharacter::named("Amby")).await?;
        create_character(&db, TEST_SERVER, TEST_USER, NewCharacter::named("Bex")).await?;

        let taken = set_name(&db, first.id, "Bex").await;
        assert!(matches!(taken, Err(Error::CharacterNameTaken { .. })));

        // Renaming to the same name with different case is allowed
        let renamed = set_name(&db, first.id, "AMBY").await?;
        assert_eq!(renamed.name, "AMBY");

        let edited = set_pronouns(&db, first.id, "feminine").await?;
        assert_eq!(edited.pronoun_family, "Feminine");
        let edited = set_nickname(&db, first.id, Some("  ")).await?;
        assert!(edited.nickname.is_none());
        let edited = set_description(&db, first.id, "  Tall.  ").await?;
        assert_eq!(edited.description, "Tall.");
        Ok(())
    }

    #[tokio::test]
    async fn test_default_character_is_exclusive() -> Result<()> {
        let db = setup_test_db().await?;
        let first =
            create_character(&db, TEST_SERVER, TEST_USER, NewCharacter::named("Amby")).await?;
        let second =
            create_character(&db, TEST_SERVER, TEST_USER, NewCharacter::named("Bex")).await?;

        assert!(get_default_character(&db, TEST_SERVER, TEST_USER).await?.is_none());

        set_default_character(&db, first.id).await?;
        set_default_character(&db, second.id).await?;
        let default = get_default_character(&db, TEST_SERVER, TEST_USER).await?.unwrap();
        assert_eq!(default.id, second.id);
        assert!(!get_character_by_id(&db, first.id).await?.is_default);

        clear_default_character(&db, TEST_SERVER, TEST_USER).await?;
        assert!(get_default_character(&db, TEST_SERVER, TEST_USER).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_character_cascades() -> Result<()> {
        let db = setup_with_catalog().await?;
        let character = create_test_character(&db, "Amby").await?;
        shift_bodypart(&db, &character, Bodypart::Tail, None, "wolf").await?;

        delete_character(&db, character.id).await?;

        assert!(matches!(
            get_character_by_id(&db, character.id).await,
            Err(Error::CharacterNotFound { .. })
        ));
        assert!(get_appearance(&db, character.id, AppearanceKind::Current).await?.is_none());
        assert!(list_characters(&db, TEST_SERVER, TEST_USER).await?.is_empty());
        Ok(())
    }
}
