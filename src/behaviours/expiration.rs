//! Lifts expired bans and discards expired warnings and notes.

use super::ContinuousBehaviour;
use crate::{
    core::{bans, notes, warnings},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info};

/// The Discord side of moderation, as needed by [`ExpirationBehaviour`].
#[async_trait]
pub trait ModerationGateway: Send + Sync + 'static {
    /// Lifts a user's ban on a server.
    async fn unban(&self, server_id: &str, user_id: &str) -> Result<()>;
}

fn parse_snowflake(value: &str, what: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::validation(format!("Invalid {what} ID '{value}'")))
}

#[async_trait]
impl ModerationGateway for serenity::Http {
    async fn unban(&self, server_id: &str, user_id: &str) -> Result<()> {
        let guild_id = serenity::GuildId::new(parse_snowflake(server_id, "server")?);
        let user_id = serenity::UserId::new(parse_snowflake(user_id, "user")?);
        self.remove_ban(guild_id, user_id, Some("Ban expired")).await?;
        Ok(())
    }
}

/// Handles expiry of bans, warnings and notes.
pub struct ExpirationBehaviour<G: ?Sized> {
    db: DatabaseConnection,
    gateway: Arc<G>,
}

impl<G: ModerationGateway + ?Sized> ExpirationBehaviour<G> {
    /// Creates the behaviour.
    pub const fn new(db: DatabaseConnection, gateway: Arc<G>) -> Self {
        Self { db, gateway }
    }

    async fn expire_bans(&self) -> Result<()> {
        for ban in bans::get_expired_bans(&self.db, Utc::now()).await? {
            // A ban that can't be lifted on Discord stays recorded and is retried next tick
            if let Err(e) = self.gateway.unban(&ban.server_id, &ban.user_id).await {
                error!(ban_id = ban.id, error = %e, "Failed to lift expired ban");
                continue;
            }
            match bans::delete_ban(&self.db, &ban.server_id, ban.id).await {
                Ok(()) => info!(ban_id = ban.id, user_id = %ban.user_id, "Expired ban lifted"),
                Err(e) => error!(ban_id = ban.id, error = %e, "Failed to delete expired ban"),
            }
        }
        Ok(())
    }

    async fn expire_warnings(&self) -> Result<()> {
        for warning in warnings::get_expired_warnings(&self.db, Utc::now()).await? {
            if let Err(e) = warnings::delete_warning(&self.db, &warning.server_id, warning.id).await
            {
                error!(warning_id = warning.id, error = %e, "Failed to delete expired warning");
            }
        }
        Ok(())
    }

    async fn expire_notes(&self) -> Result<()> {
        for note in notes::get_expired_notes(&self.db, Utc::now()).await? {
            if let Err(e) = notes::delete_note(&self.db, &note.server_id, note.id).await {
                error!(note_id = note.id, error = %e, "Failed to delete expired note");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<G: ModerationGateway + ?Sized> ContinuousBehaviour for ExpirationBehaviour<G> {
    fn name(&self) -> &'static str {
        "expiration"
    }

    async fn tick(&self) -> Result<()> {
        // One kind failing to load must not block the others
        let results = [
            self.expire_bans().await,
            self.expire_warnings().await,
            self.expire_notes().await,
        ];
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        entities::{ban, note, warning},
        test_utils::*,
    };
    use chrono::Duration;
    use sea_orm::{ActiveModelTrait, Set};
    use std::sync::Mutex;

    /// Records unbans and refuses those of one user.
    #[derive(Default)]
    struct MockGateway {
        unbanned: Mutex<Vec<String>>,
        refuse: Option<String>,
    }

    #[async_trait]
    impl ModerationGateway for MockGateway {
        async fn unban(&self, _server_id: &str, user_id: &str) -> Result<()> {
            if self.refuse.as_deref() == Some(user_id) {
                return Err(Error::validation("refused"));
            }
            self.unbanned.lock().unwrap().push(user_id.to_string());
            Ok(())
        }
    }

    fn an_hour_ago() -> sea_orm::ActiveValue<Option<chrono::DateTime<Utc>>> {
        Set(Some(Utc::now() - Duration::hours(1)))
    }

    #[tokio::test]
    async fn test_tick_expires_everything_due() -> Result<()> {
        let db = setup_test_db().await?;

        let due = bans::create_ban(&db, TEST_SERVER, "42", TEST_USER, "spam", None).await?;
        let mut active: ban::ActiveModel = due.into();
        active.expires_on = an_hour_ago();
        active.update(&db).await?;
        bans::create_ban(&db, TEST_SERVER, "43", TEST_USER, "forever", None).await?;

        let warned =
            warnings::create_warning(&db, TEST_SERVER, "42", TEST_USER, "rude", None).await?;
        let mut active: warning::ActiveModel = warned.into();
        active.expires_on = an_hour_ago();
        active.update(&db).await?;

        let noted = notes::create_note(&db, TEST_SERVER, "42", TEST_USER, "hmm", None).await?;
        let mut active: note::ActiveModel = noted.into();
        active.expires_on = an_hour_ago();
        active.update(&db).await?;

        let gateway = Arc::new(MockGateway::default());
        let behaviour = ExpirationBehaviour::new(db.clone(), Arc::clone(&gateway));
        behaviour.tick().await?;

        assert_eq!(*gateway.unbanned.lock().unwrap(), ["42"]);
        let remaining = bans::list_bans(&db, TEST_SERVER).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, "43");
        assert!(warnings::list_warnings(&db, TEST_SERVER).await?.is_empty());
        assert!(notes::list_notes(&db, TEST_SERVER, "42").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_unban_is_kept_for_retry() -> Result<()> {
        let db = setup_test_db().await?;
        for user in ["42", "43"] {
            let created = bans::create_ban(&db, TEST_SERVER, user, TEST_USER, "spam", None).await?;
            let mut active: ban::ActiveModel = created.into();
            active.expires_on = an_hour_ago();
            active.update(&db).await?;
        }

        let gateway = Arc::new(MockGateway {
            refuse: Some("42".to_string()),
            ..MockGateway::default()
        });
        let behaviour = ExpirationBehaviour::new(db.clone(), gateway);
        behaviour.tick().await?;

        // The refused ban is still there, the other one was lifted
        let remaining = bans::list_bans(&db, TEST_SERVER).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, "42");
        Ok(())
    }
}
