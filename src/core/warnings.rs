//! Warning business logic - A user's formal warnings on a server.
//!
//! Warnings may expire, after which the expiration behaviour removes them.

use super::validation::{require_future, require_text};
use crate::{
    entities::{Warning, warning},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Records a new warning.
///
/// # Errors
/// Returns an error if:
/// - The reason is empty or whitespace-only
/// - The expiry time is not in the future
/// - The database insert fails
#[instrument(skip(db, reason))]
pub async fn create_warning(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    author_id: &str,
    reason: &str,
    expires_on: Option<DateTime<Utc>>,
) -> Result<warning::Model> {
    let reason = require_text(reason, "Warning reason")?;
    let now = Utc::now();
    require_future(expires_on, now)?;

    let created = warning::ActiveModel {
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

    info!(warning_id = created.id, "Warning recorded");
    Ok(created)
}

/// Fetches a warning by ID, scoped to a server.
///
/// # Errors
/// Returns [`Error::WarningNotFound`] if no warning with that ID exists on the server.
pub async fn get_warning<C>(db: &C, server_id: &str, warning_id: i64) -> Result<warning::Model>
where
    C: ConnectionTrait,
{
    Warning::find_by_id(warning_id)
        .filter(warning::Column::ServerId.eq(server_id))
        .one(db)
        .await?
        .ok_or(Error::WarningNotFound { id: warning_id })
}

/// Lists every warning on a server, oldest first.
pub async fn list_warnings(
    db: &DatabaseConnection,
    server_id: &str,
) -> Result<Vec<warning::Model>> {
    Warning::find()
        .filter(warning::Column::ServerId.eq(server_id))
        .order_by_asc(warning::Column::CreatedAt)
        .order_by_asc(warning::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the warnings of one user on a server, oldest first.
pub async fn list_warnings_for_user(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
) -> Result<Vec<warning::Model>> {
    Warning::find()
        .filter(warning::Column::ServerId.eq(server_id))
        .filter(warning::Column::UserId.eq(user_id))
        .order_by_asc(warning::Column::CreatedAt)
        .order_by_asc(warning::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the reason of a warning.
///
/// # Errors
/// Returns an error if the reason is empty or the warning does not exist on the server.
pub async fn set_warning_reason(
    db: &DatabaseConnection,
    server_id: &str,
    warning_id: i64,
    reason: &str,
) -> Result<warning::Model> {
    let reason = require_text(reason, "Warning reason")?;
    let mut active: warning::ActiveModel = get_warning(db, server_id, warning_id).await?.into();
    active.reason = Set(reason);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Changes when a warning expires. `None` makes it permanent.
///
/// # Errors
/// Returns an error if the new expiry is in the past or the warning does not exist.
pub async fn set_warning_expiry(
    db: &DatabaseConnection,
    server_id: &str,
    warning_id: i64,
    expires_on: Option<DateTime<Utc>>,
) -> Result<warning::Model> {
    let now = Utc::now();
    require_future(expires_on, now)?;
    let mut active: warning::ActiveModel = get_warning(db, server_id, warning_id).await?.into();
    active.expires_on = Set(expires_on);
    active.updated_at = Set(now);
    active.update(db).await.map_err(Into::into)
}

/// Links a warning to the Discord message that prompted it.
pub async fn set_warning_context_message(
    db: &DatabaseConnection,
    server_id: &str,
    warning_id: i64,
    message_id: &str,
) -> Result<warning::Model> {
    let mut active: warning::ActiveModel = get_warning(db, server_id, warning_id).await?.into();
    active.message_id = Set(Some(message_id.to_string()));
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a warning record.
///
/// # Errors
/// Returns [`Error::WarningNotFound`] if the warning does not exist on the server.
pub async fn delete_warning<C>(db: &C, server_id: &str, warning_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let warning = get_warning(db, server_id, warning_id).await?;
    Warning::delete_by_id(warning.id).exec(db).await?;
    info!(warning_id, "Warning deleted");
    Ok(())
}

/// Lists warnings on any server whose expiry is at or before `now`.
pub async fn get_expired_warnings<C>(db: &C, now: DateTime<Utc>) -> Result<Vec<warning::Model>>
where
    C: ConnectionTrait,
{
    let expired = Warning::find()
        .filter(warning::Column::ExpiresOn.is_not_null())
        .filter(warning::Column::ExpiresOn.lte(now))
        .order_by_asc(warning::Column::Id)
        .all(db)
        .await?;
    debug!(count = expired.len(), "Found expired warnings");
    Ok(expired)
}

/// Counts the warnings a user has on a server.
pub async fn count_warnings(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
) -> Result<u64> {
    Warning::find()
        .filter(warning::Column::ServerId.eq(server_id))
        .filter(warning::Column::UserId.eq(user_id))
        .count(db)
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
    async fn test_create_warning_validation() -> Result<()> {
        let db = setup_test_db().await?;

        // Test empty reason validation
        let result = create_warning(&db, "1", "2", "3", "   ", None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Test past expiry validation
        let past = Utc::now() - Duration::hours(1);
        let result = create_warning(&db, "1", "2", "3", "spam", Some(past)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_warning() -> Result<()> {
        let db = setup_test_db().await?;

        let warning =
            create_warning(&db, TEST_SERVER, "42", TEST_USER, "  spamming  ", None).await?;
        assert_eq!(warning.reason, "spamming");
        assert!(warning.expires_on.is_none());

        let found = get_warning(&db, TEST_SERVER, warning.id).await?;
        assert_eq!(found.id, warning.id);
        assert_eq!(found.user_id, "42");

        // Warnings are scoped to their server
        let other_server = get_warning(&db, "other", warning.id).await;
        assert!(matches!(other_server, Err(Error::WarningNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_warnings_for_user() -> Result<()> {
        let db = setup_test_db().await?;

        create_warning(&db, TEST_SERVER, "42", TEST_USER, "first", None).await?;
        create_warning(&db, TEST_SERVER, "43", TEST_USER, "second", None).await?;
        create_warning(&db, TEST_SERVER, "42", TEST_USER, "third", None).await?;
        create_warning(&db, "other", "42", TEST_USER, "elsewhere", None).await?;

        assert_eq!(list_warnings(&db, TEST_SERVER).await?.len(), 3);

        let for_user = list_warnings_for_user(&db, TEST_SERVER, "42").await?;
        let reasons: Vec<_> = for_user.iter().map(|w| w.reason.as_str()).collect();
        assert_eq!(reasons, ["first", "third"]);
        assert_eq!(count_warnings(&db, TEST_SERVER, "42").await?, 2);
        assert_eq!(count_warnings(&db, TEST_SERVER, "nobody").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_warning() -> Result<()> {
        let db = setup_test_db().await?;
        let warning = create_warning(&db, TEST_SERVER, "42", TEST_USER, "spam", None).await?;

        let updated = set_warning_reason(&db, TEST_SERVER, warning.id, "rudeness").await?;
        assert_eq!(updated.reason, "rudeness");

        let expiry = Utc::now() + Duration::days(7);
        let updated = set_warning_expiry(&db, TEST_SERVER, warning.id, Some(expiry)).await?;
        assert!(updated.expires_on.is_some());

        let updated = set_warning_context_message(&db, TEST_SERVER, warning.id, "999").await?;
        assert_eq!(updated.message_id.as_deref(), Some("999"));

        let result = set_warning_reason(&db, TEST_SERVER, 999, "rudeness").await;
        assert!(matches!(result, Err(Error::WarningNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_warnings() -> Result<()> {
        let db = setup_test_db().await?;

        let short = create_warning(
            &db,
            TEST_SERVER,
            "42",
            TEST_USER,
            "short",
            Some(Utc::now() + Duration::hours(1)),
        )
        .await?;
        create_warning(
            &db,
            TEST_SERVER,
            "43",
            TEST_USER,
            "long",
            Some(Utc::now() + Duration::days(30)),
        )
        .await?;
        create_warning(&db, TEST_SERVER, "44", TEST_USER, "permanent", None).await?;

        let later = Utc::now() + Duration::hours(2);
        let expired = get_expired_warnings(&db, later).await?;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, short.id);

        delete_warning(&db, TEST_SERVER, short.id).await?;
        assert!(get_expired_warnings(&db, later).await?.is_empty());
        assert!(matches!(
            delete_warning(&db, TEST_SERVER, short.id).await,
            Err(Error::WarningNotFound { .. })
        ));

        Ok(())
    }
}
