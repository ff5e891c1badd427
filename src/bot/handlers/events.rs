//! Gateway event handler.
//!
//! Only translates the events the behaviours care about and queues them; all database
//! work happens on the next behaviour tick.

use crate::{
    behaviours::GatewayEvent,
    bot::BotData,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use tracing::trace;

/// Poise event hook, wired up in [`crate::bot::run_bot`].
pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    if let Some(event) = to_gateway_event(event) {
        trace!(?event, "Queueing gateway event");
        data.events.push(event);
    }
    Ok(())
}

fn to_gateway_event(event: &serenity::FullEvent) -> Option<GatewayEvent> {
    match event {
        serenity::FullEvent::Message { new_message } => Some(created(new_message)),
        serenity::FullEvent::MessageUpdate { event, .. } => {
            // Embed-only updates carry no content
            let contents = event.content.clone()?;
            Some(GatewayEvent::MessageUpdated {
                message_id: event.id.to_string(),
                contents,
            })
        }
        serenity::FullEvent::MessageDelete {
            deleted_message_id,
            ..
        } => Some(GatewayEvent::MessageDeleted {
            message_id: deleted_message_id.to_string(),
        }),
        _ => None,
    }
}

fn created(message: &serenity::Message) -> GatewayEvent {
    let author_nickname = message
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| message.author.display_name().to_string());

    GatewayEvent::MessageCreated {
        channel_id: message.channel_id.to_string(),
        message_id: message.id.to_string(),
        author_id: message.author.id.to_string(),
        author_nickname,
        contents: message.content.clone(),
        timestamp: DateTime::from_timestamp(message.timestamp.unix_timestamp(), 0)
            .unwrap_or_else(Utc::now),
        is_bot: message.author.bot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_message_is_queued_by_id() {
        let event = serenity::FullEvent::MessageDelete {
            channel_id: serenity::ChannelId::new(10),
            deleted_message_id: serenity::MessageId::new(42),
            guild_id: None,
        };
        assert_eq!(
            to_gateway_event(&event),
            Some(GatewayEvent::MessageDeleted {
                message_id: "42".to_string()
            })
        );
    }
}
