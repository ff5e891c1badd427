//! Ban business logic - Recording, editing and expiring server bans.
//!
//! This module only keeps the bot's ban records. Applying or lifting the ban on Discord
//! is done by the caller (the ban command, or the expiration behaviour).

use super::validation::{require_future, require_text};
use crate::{
    entities::{Ban, ban},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Records a new ban.
///
/// # Errors
/// Returns an error if:
/// - The reason is empty or whitespace-only
/// - The expiry time is not in the future
/// - The database insert fails
#[instrument(skip(db, reason))]
pub async fn create_ban(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    author_id: &str,
    reason: &str,
    expires_on: Option<DateTime<Utc>>,
) -> Result<ban::Model> {
    let reason = require_text(reason, "Ban reason")?;
    let now = Utc::now();
    require_future(expires_on, now)?;

    let created = ban::ActiveModel {
        server_id: Set(server_id.to_string()),
        user_id: Set(user_id.to_string()),
        author_id: Set(author_id.to_string()),
        reason: Set(reason),
        message_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        expires_on: Set(expires_on),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(ban_id = created.id, "Ban recorded");
    Ok(created)
}

/// Fetches a ban by ID, scoped to a server.
///
/// # Errors
/// Returns [`Error::BanNotFound`] if no ban with that ID exists on the server.
pub async fn get_ban<C>(db: &C, server_id: &str, ban_id: i64) -> Result<ban::Model>
where
    C: ConnectionTrait,
{
    Ban::find_by_id(ban_id)
        .filter(ban::Column::ServerId.eq(server_id))
        .one(db)
        .await?
        .ok_or(Error::BanNotFound { id: ban_id })
}

/// Lists every ban on a server, oldest first.
pub async fn list_bans(db: &DatabaseConnection, server_id: &str) -> Result<Vec<ban::Model>> {
    Ban::find()
        .filter(ban::Column::ServerId.eq(server_id))
        .order_by_asc(ban::Column::CreatedAt)
        .order_by_asc(ban::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the bans of one user on a server, oldest first.
pub async fn list_bans_for_user(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
) -> Result<Vec<ban::Model>> {
    Ban::find()
        .filter(ban::Column::ServerId.eq(server_id))
        .filter(ban::Column::UserId.eq(user_id))
        .order_by_asc(ban::Column::CreatedAt)
        .order_by_asc(ban::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the reason of a ban.
///
/// # Errors
/// Returns an error if the reason is empty or the ban does not exist on the server.
pub async fn set_ban_reason(
    db: &DatabaseConnection,
    server_id: &str,
    ban_id: i64,
    reason: &str,
) -> Result<ban::Model> {
    let reason = require_text(reason, "Ban reason")?;
    let mut active: ban::ActiveModel = get_ban(db, server_id, ban_id).await?.into();
    active.reason = Set(reason);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Changes when a ban expires. `None` makes it permanent.
///
/// # Errors
/// Returns an error if the new expiry is in the past or the ban does not exist.
pub async fn set_ban_expiry(
    db: &DatabaseConnection,
    server_id: &str,
    ban_id: i64,
    expires_on: Option<DateTime<Utc>>,
) -> Result<ban::Model> {
    let now = Utc::now();
    require_future(expires_on, now)?;
    let mut active: ban::ActiveModel = get_ban(db, server_id, ban_id).await?.into();
    active.expires_on = Set(expires_on);
    active.updated_at = Set(now);
    active.update(db).await.map_err(Into::into)
}

/// Links a ban to the Discord message that prompted it.
pub async fn set_ban_context_message(
    db: &DatabaseConnection,
    server_id: &str,
    ban_id: i64,
    message_id: &str,
) -> Result<ban::Model> {
    let mut active: ban::ActiveModel = get_ban(db, server_id, ban_id).await?.into();
    active.message_id = Set(Some(message_id.to_string()));
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a ban record.
///
/// # Errors
/// Returns [`Error::BanNotFound`] if the ban does not exist on the server.
pub async fn delete_ban<C>(db: &C, server_id: &str, ban_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let ban = get_ban(db, server_id, ban_id).await?;
    Ban::delete_by_id(ban.id).exec(db).await?;
    info!(ban_id, "Ban deleted");
    Ok(())
}

/// Lists bans on any server whose expiry is at or before `now`.
pub async fn get_expired_bans<C>(db: &C, now: DateTime<Utc>) -> Result<Vec<ban::Model>>
where
    C: ConnectionTrait,
{
    let expired = Ban::find()
        .filter(ban::Column::ExpiresOn.is_not_null())
        .filter(ban::Column::ExpiresOn.lte(now))
        .order_by_asc(ban::Column::Id)
        .all(db)
        .await?;
    debug!(count = expired.len(), "Found expired bans");
    Ok(expired)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_ban_validation() -> Result<()> {
        let db = setup_test_db().await?;

        // Test empty reason validation
        let result = create_ban(&db, "1", "2", "3", "   ", None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Test past expiry validation
        let past = Utc::now() - Duration::hours(1);
        let result = create_ban(&db, "1", "2", "3", "spam", Some(past)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_ban() -> Result<()> {
        let db = setup_test_db().await?;

        let ban = create_ban(&db, TEST_SERVER, "42", TEST_USER, "  spamming  ", None).await?;
        assert_eq!(ban.reason, "spamming");
        assert!(ban.expires_on.is_none());

        let found = get_ban(&db, TEST_SERVER, ban.id).await?;
        assert_eq!(found.id, ban.id);
        assert_eq!(found.user_id, "42");

        // Bans are scoped to their server
        let other_server = get_ban(&db, "other", ban.id).await;
        assert!(matches!(other_server, Err(Error::BanNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_bans_for_user() -> Result<()> {
        let db = setup_test_db().await?;

        create_ban(&db, TEST_SERVER, "42", TEST_USER, "first", None).await?;
        create_ban(&db, TEST_SERVER, "43", TEST_USER, "second", None).await?;
        create_ban(&db, TEST_SERVER, "42", TEST_USER, "third", None).await?;
        create_ban(&db, "other", "42", TEST_USER, "elsewhere", None).await?;

        assert_eq!(list_bans(&db, TEST_SERVER).await?.len(), 3);

        let for_user = list_bans_for_user(&db, TEST_SERVER, "42").await?;
        let reasons: Vec<_> = for_user.iter().map(|b| b.reason.as_str()).collect();
        assert_eq!(reasons, ["first", "third"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_ban() -> Result<()> {
        let db = setup_test_db().await?;
        let ban = create_ban(&db, TEST_SERVER, "42", TEST_USER, "spam", None).await?;

        let updated = set_ban_reason(&db, TEST_SERVER, ban.id, "raiding").await?;
        assert_eq!(updated.reason, "raiding");

        let expiry = Utc::now() + Duration::days(7);
        let updated = set_ban_expiry(&db, TEST_SERVER, ban.id, Some(expiry)).await?;
        assert!(updated.expires_on.is_some());

        let updated = set_ban_context_message(&db, TEST_SERVER, ban.id, "999").await?;
        assert_eq!(updated.message_id.as_deref(), Some("999"));

        let result = set_ban_reason(&db, TEST_SERVER, 999, "raiding").await;
        assert!(matches!(result, Err(Error::BanNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_bans() -> Result<()> {
        let db = setup_test_db().await?;

        let short = create_ban(
            &db,
            TEST_SERVER,
            "42",
            TEST_USER,
            "short",
            Some(Utc::now() + Duration::hours(1)),
        )
        .await?;
        create_ban(
            &db,
            TEST_SERVER,
            "43",
            TEST_USER,
            "long",
            Some(Utc::now() + Duration::days(30)),
        )
        .await?;
        create_ban(&db, TEST_SERVER, "44", TEST_USER, "permanent", None).await?;

        let later = Utc::now() + Duration::hours(2);
        let expired = get_expired_bans(&db, later).await?;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, short.id);

        delete_ban(&db, TEST_SERVER, short.id).await?;
        assert!(get_expired_bans(&db, later).await?.is_empty());
        assert!(matches!(
            delete_ban(&db, TEST_SERVER, short.id).await,
            Err(Error::BanNotFound { .. })
        ));

        Ok(())
    }
}
