//! Server settings business logic.

use crate::{
    entities::{Server, server},
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Fetches the settings row for a server, creating it with defaults on first use.
///
/// # Errors
/// Returns an error if the database query or insert fails.
pub async fn get_or_create_server<C>(db: &C, server_id: &str) -> Result<server::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = Server::find()
        .filter(server::Column::ServerId.eq(server_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let created = server::ActiveModel {
        server_id: Set(server_id.to_string()),
        is_nsfw: Set(false),
        roleplay_category_id: Set(None),
        archive_channel_id: Set(None),
        moderation_log_channel_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(server_id, "Registered new server");
    Ok(created)
}

/// Marks whether the server allows NSFW content.
pub async fn set_nsfw(
    db: &DatabaseConnection,
    server_id: &str,
    is_nsfw: bool,
) -> Result<server::Model> {
    let mut active: server::ActiveModel = get_or_create_server(db, server_id).await?.into();
    active.is_nsfw = Set(is_nsfw);
    active.update(db).await.map_err(Into::into)
}

/// Sets (or clears) the category dedicated roleplay channels are created under.
pub async fn set_roleplay_category(
    db: &DatabaseConnection,
    server_id: &str,
    category_id: Option<String>,
) -> Result<server::Model> {
    let mut active: server::ActiveModel = get_or_create_server(db, server_id).await?.into();
    active.roleplay_category_id = Set(category_id);
    active.update(db).await.map_err(Into::into)
}

/// Sets (or clears) the channel finished roleplay logs are archived to.
pub async fn set_archive_channel(
    db: &DatabaseConnection,
    server_id: &str,
    channel_id: Option<String>,
) -> Result<server::Model> {
    let mut active: server::ActiveModel = get_or_create_server(db, server_id).await?.into();
    active.archive_channel_id = Set(channel_id);
    active.update(db).await.map_err(Into::into)
}

/// Sets (or clears) the channel moderation actions are reported to.
pub async fn set_moderation_log_channel(
    db: &DatabaseConnection,
    server_id: &str,
    channel_id: Option<String>,
) -> Result<server::Model> {
    let mut active: server::ActiveModel = get_or_create_server(db, server_id).await?.into();
    active.moderation_log_channel_id = Set(channel_id);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_get_or_create_server_creates_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create_server(&db, "100").await?;
        let second = get_or_create_server(&db, "100").await?;

        assert_eq!(first.id, second.id);
        assert!(!first.is_nsfw);
        assert!(first.roleplay_category_id.is_none());
        assert_eq!(Server::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_settings_are_updated() -> Result<()> {
        let db = setup_test_db().await?;

        set_nsfw(&db, "100", true).await?;
        set_roleplay_category(&db, "100", Some("200".to_string())).await?;
        set_archive_channel(&db, "100", Some("300".to_string())).await?;
        let settings = set_moderation_log_channel(&db, "100", Some("400".to_string())).await?;

        assert!(settings.is_nsfw);
        assert_eq!(settings.roleplay_category_id.as_deref(), Some("200"));
        assert_eq!(settings.archive_channel_id.as_deref(), Some("300"));
        assert_eq!(settings.moderation_log_channel_id.as_deref(), Some("400"));

        let cleared = set_archive_channel(&db, "100", None).await?;
        assert!(cleared.archive_channel_id.is_none());
        Ok(())
    }
}
