//! Records messages posted in channels with an active roleplay.

use super::{ContinuousBehaviour, EventReceiver, GatewayEvent};
use crate::{
    core::roleplay::{self, NewMessage},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, mpsc::error::TryRecvError};
use tracing::{debug, error, warn};

/// Drains the [`super::EventQueue`] into roleplay logs.
pub struct RoleplayLoggingBehaviour {
    db: DatabaseConnection,
    events: Mutex<EventReceiver>,
}

impl RoleplayLoggingBehaviour {
    /// Creates the behaviour from the receiving half of the queue.
    #[must_use]
    pub fn new(db: DatabaseConnection, events: EventReceiver) -> Self {
        Self {
            db,
            events: Mutex::new(events),
        }
    }

    async fn handle(&self, event: GatewayEvent) -> Result<()> {
        match event {
            GatewayEvent::MessageCreated {
                channel_id,
                message_id,
                author_id,
                author_nickname,
                contents,
                timestamp,
                is_bot,
            } => {
                if is_bot || contents.trim().is_empty() {
                    return Ok(());
                }
                let active = roleplay::get_active_roleplay_in_channel(&self.db, &channel_id).await?;
                let Some(rp) = active else {
                    return Ok(());
                };
                roleplay::record_message(
                    &self.db,
                    rp.id,
                    NewMessage {
                        discord_message_id: message_id,
                        author_id,
                        author_nickname,
                        contents,
                        timestamp,
                    },
                )
                .await?;
            }
            GatewayEvent::MessageUpdated {
                message_id,
                contents,
            } => {
                if roleplay::edit_message(&self.db, &message_id, &contents).await?.is_some() {
                    debug!(message_id, "Logged roleplay message edited");
                }
            }
            GatewayEvent::MessageDeleted { message_id } => {
                if roleplay::delete_message(&self.db, &message_id).await? {
                    debug!(message_id, "Logged roleplay message deleted");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ContinuousBehaviour for RoleplayLoggingBehaviour {
    fn name(&self) -> &'static str {
        "roleplay-logging"
    }

    async fn tick(&self) -> Result<()> {
        let mut events = self.events.lock().await;
        loop {
            let event = match events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Event queue closed");
                    break;
                }
            };
            if let Err(e) = self.handle(event).await {
                error!(error = %e, "Failed to process gateway event");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{behaviours::EventQueue, test_utils::*};
    use chrono::Utc;

    fn created(channel_id: &str, message_id: &str, contents: &str) -> GatewayEvent {
        posted_by(channel_id, message_id, contents, false)
    }

    fn posted_by(channel_id: &str, message_id: &str, contents: &str, is_bot: bool) -> GatewayEvent {
        GatewayEvent::MessageCreated {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            author_id: TEST_USER.to_string(),
            author_nickname: "Amby".to_string(),
            contents: contents.to_string(),
            timestamp: Utc::now(),
            is_bot,
        }
    }

    #[tokio::test]
    async fn test_messages_in_active_channel_are_logged() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;
        roleplay::start_roleplay(&db, rp.id, "100").await?;

        let (queue, receiver) = EventQueue::new();
        let behaviour = RoleplayLoggingBehaviour::new(db.clone(), receiver);

        queue.push(created("100", "1", "walks in"));
        queue.push(created("999", "2", "elsewhere"));
        queue.push(posted_by("100", "3", "beep", true));
        queue.push(created("100", "4", "sits down"));
        queue.push(GatewayEvent::MessageUpdated {
            message_id: "1".to_string(),
            contents: "strides in".to_string(),
        });
        queue.push(GatewayEvent::MessageDeleted {
            message_id: "4".to_string(),
        });
        behaviour.tick().await?;

        let messages = roleplay::get_messages(&db, rp.id).await?;
        let contents: Vec<_> = messages.iter().map(|m| m.contents.as_str()).collect();
        assert_eq!(contents, ["strides in"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_stopped_roleplay_is_not_logged() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;
        roleplay::start_roleplay(&db, rp.id, "100").await?;
        roleplay::stop_roleplay(&db, rp.id).await?;

        let (queue, receiver) = EventQueue::new();
        let behaviour = RoleplayLoggingBehaviour::new(db.clone(), receiver);
        queue.push(created("100", "1", "anyone here?"));
        behaviour.tick().await?;

        assert!(roleplay::get_messages(&db, rp.id).await?.is_empty());
        Ok(())
    }
}
