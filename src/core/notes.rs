//! Note business logic - Private moderator notes about users.

use super::validation::{require_future, require_text};
use crate::{
    entities::{Note, note},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Adds a note about a user.
///
/// # Errors
/// Returns an error if the content is empty, the expiry is not in the future, or the
/// insert fails.
pub async fn create_note(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    author_id: &str,
    content: &str,
    expires_on: Option<DateTime<Utc>>,
) -> Result<note::Model> {
    let content = require_text(content, "Note content")?;
    let now = Utc::now();
    require_future(expires_on, now)?;

    let created = note::ActiveModel {
        server_id: Set(server_id.to_string()),
        user_id: Set(user_id.to_string()),
        author_id: Set(author_id.to_string()),
        content: Set(content),
        created_at: Set(now),
        updated_at: Set(now),
        expires_on: Set(expires_on),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(note_id = created.id, server_id, "Note added");
    Ok(created)
}

/// Fetches a note by ID, scoped to a server.
pub async fn get_note<C>(db: &C, server_id: &str, note_id: i64) -> Result<note::Model>
where
    C: ConnectionTrait,
{
    Note::find_by_id(note_id)
        .filter(note::Column::ServerId.eq(server_id))
        .one(db)
        .await?
        .ok_or(Error::NoteNotFound { id: note_id })
}

/// Lists the notes about a user on a server, oldest first.
pub async fn list_notes(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
) -> Result<Vec<note::Model>> {
    Note::find()
        .filter(note::Column::ServerId.eq(server_id))
        .filter(note::Column::UserId.eq(user_id))
        .order_by_asc(note::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the text of a note.
pub async fn set_note_content(
    db: &DatabaseConnection,
    server_id: &str,
    note_id: i64,
    content: &str,
) -> Result<note::Model> {
    let content = require_text(content, "Note content")?;
    let mut active: note::ActiveModel = get_note(db, server_id, note_id).await?.into();
    active.content = Set(content);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Changes when a note is discarded. `None` keeps it forever.
pub async fn set_note_expiry(
    db: &DatabaseConnection,
    server_id: &str,
    note_id: i64,
    expires_on: Option<DateTime<Utc>>,
) -> Result<note::Model> {
    let now = Utc::now();
    require_future(expires_on, now)?;
    let mut active: note::ActiveModel = get_note(db, server_id, note_id).await?.into();
    active.expires_on = Set(expires_on);
    active.updated_at = Set(now);
    active.update(db).await.map_err(Into::into)
}

/// Deletes a note.
pub async fn delete_note<C>(db: &C, server_id: &str, note_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let note = get_note(db, server_id, note_id).await?;
    Note::delete_by_id(note.id).exec(db).await?;
    info!(note_id, "Note deleted");
    Ok(())
}

/// Lists notes on any server whose expiry is at or before `now`.
pub async fn get_expired_notes<C>(db: &C, now: DateTime<Utc>) -> Result<Vec<note::Model>>
where
    C: ConnectionTrait,
{
    Note::find()
        .filter(note::Column::ExpiresOn.is_not_null())
        .filter(note::Column::ExpiresOn.lte(now))
        .order_by_asc(note::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_note_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;

        let note = create_note(&db, TEST_SERVER, "42", TEST_USER, "Seems nice", None).await?;
        assert_eq!(list_notes(&db, TEST_SERVER, "42").await?.len(), 1);

        let edited = set_note_content(&db, TEST_SERVER, note.id, "Seems very nice").await?;
        assert_eq!(edited.content, "Seems very nice");
        assert!(edited.updated_at >= note.updated_at);

        delete_note(&db, TEST_SERVER, note.id).await?;
        assert!(list_notes(&db, TEST_SERVER, "42").await?.is_empty());

        let missing = get_note(&db, TEST_SERVER, note.id).await;
        assert!(matches!(missing, Err(Error::NoteNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_note_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_note(&db, TEST_SERVER, "42", TEST_USER, "\n\t", None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_notes() -> Result<()> {
        let db = setup_test_db().await?;
        let note = create_note(&db, TEST_SERVER, "42", TEST_USER, "Temporary", None).await?;
        create_note(&db, TEST_SERVER, "42", TEST_USER, "Forever", None).await?;

        set_note_expiry(&db, TEST_SERVER, note.id, Some(Utc::now() + Duration::minutes(5)))
            .await?;

        assert!(get_expired_notes(&db, Utc::now()).await?.is_empty());
        let expired = get_expired_notes(&db, Utc::now() + Duration::hours(1)).await?;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].content, "Temporary");
        Ok(())
    }
}
