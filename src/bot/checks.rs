//! Context checks, permission checks and lookups shared by the command modules.

use crate::{
    bot::BotData,
    core::{character, permissions, roleplay, server},
    entities::{Bodypart, CharacterModel, Permission, PermissionTarget, RoleplayModel},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use poise::serenity_prelude as serenity;
use tracing::warn;

/// The server the command was invoked in.
pub fn server_id(ctx: poise::Context<'_, BotData, Error>) -> Result<String> {
    ctx.guild_id()
        .map(|id| id.to_string())
        .ok_or_else(|| Error::validation("This command can only be used in a server"))
}

/// Whether the invoker is the server owner or holds Discord's administrator permission.
///
/// Administrators bypass the permission store entirely.
pub async fn is_administrator(ctx: poise::Context<'_, BotData, Error>) -> bool {
    let author = ctx.author().id;
    if ctx.guild().is_some_and(|guild| guild.owner_id == author) {
        return true;
    }
    // Only interaction payloads carry resolved member permissions
    ctx.author_member()
        .await
        .and_then(|member| member.permissions)
        .is_some_and(|perms| perms.administrator())
}

/// Fails unless the invoker may perform `permission` on things owned by `owner_id`.
pub async fn require_permission(
    ctx: poise::Context<'_, BotData, Error>,
    permission: Permission,
    owner_id: &str,
) -> Result<()> {
    let invoker = ctx.author().id.to_string();
    let target = if invoker == owner_id {
        PermissionTarget::Own
    } else {
        PermissionTarget::Other
    };
    require_permission_for(ctx, permission, target).await
}

/// Fails unless the invoker holds `permission` for `target`.
pub async fn require_permission_for(
    ctx: poise::Context<'_, BotData, Error>,
    permission: Permission,
    target: PermissionTarget,
) -> Result<()> {
    if is_administrator(ctx).await {
        return Ok(());
    }
    let server = server_id(ctx)?;
    let invoker = ctx.author().id.to_string();
    let db = &ctx.data().database;

    if permissions::has_permission(db, &server, &invoker, permission, target).await? {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            message: format!("you need the `{permission}` permission ({target})"),
        })
    }
}

/// Looks up a roleplay by name, owned by `owner` or by the invoker.
pub async fn find_roleplay(
    ctx: poise::Context<'_, BotData, Error>,
    name: &str,
    owner: Option<&serenity::User>,
) -> Result<RoleplayModel> {
    let server = server_id(ctx)?;
    let owner_id = owner.unwrap_or_else(|| ctx.author()).id.to_string();
    roleplay::get_roleplay_by_name(&ctx.data().database, &server, &owner_id, name).await
}

/// Looks up a character of `owner_id` by name, falling back to their default character.
pub async fn find_character(
    ctx: poise::Context<'_, BotData, Error>,
    owner_id: &str,
    name: Option<&str>,
) -> Result<CharacterModel> {
    let server = server_id(ctx)?;
    let db = &ctx.data().database;
    match name {
        Some(name) => character::get_character_by_name(db, &server, owner_id, name).await,
        None => character::get_default_character(db, &server, owner_id)
            .await?
            .ok_or_else(|| Error::validation("No character given and no default character set")),
    }
}

/// Parses a body part name typed by a user.
pub fn parse_bodypart(value: &str) -> Result<Bodypart> {
    value.parse().map_err(Error::validation)
}

/// Parses a permission name typed by a user.
pub fn parse_permission(value: &str) -> Result<Permission> {
    value.parse().map_err(Error::validation)
}

/// Longest expiry a moderator may set, in days.
pub const MAX_EXPIRY_DAYS: u32 = 36_500;

/// Expiry `days` from now, or never.
///
/// # Errors
/// Returns [`Error::Validation`] if `days` exceeds [`MAX_EXPIRY_DAYS`].
pub fn expiry_in_days(days: Option<u32>) -> Result<Option<DateTime<Utc>>> {
    let Some(days) = days else {
        return Ok(None);
    };
    if days > MAX_EXPIRY_DAYS {
        return Err(Error::validation(format!(
            "An expiry can be at most {MAX_EXPIRY_DAYS} days away"
        )));
    }
    Utc::now()
        .checked_add_signed(Duration::days(i64::from(days)))
        .map(Some)
        .ok_or_else(|| Error::validation("That expiry is too far in the future"))
}

/// Formats an optional expiry for display.
pub fn format_expiry(expires_on: Option<DateTime<Utc>>) -> String {
    expires_on.map_or_else(
        || "never".to_string(),
        |at| format!("<t:{}:R>", at.timestamp()),
    )
}

/// Parses a snowflake stored as text into a channel id.
pub fn channel_id(value: &str) -> Result<serenity::ChannelId> {
    value
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(serenity::ChannelId::new)
        .ok_or_else(|| Error::validation(format!("Invalid channel ID '{value}'")))
}

/// Posts to the server's moderation log channel, if one is configured.
///
/// Failing to post is logged and otherwise ignored; the moderation action itself already
/// succeeded.
pub async fn log_moderation(
    ctx: poise::Context<'_, BotData, Error>,
    message: &str,
) -> Result<()> {
    let server_id = server_id(ctx)?;
    let settings = server::get_or_create_server(&ctx.data().database, &server_id).await?;
    let Some(channel) = settings.moderation_log_channel_id else {
        return Ok(());
    };

    if let Err(e) = channel_id(&channel)?.say(ctx.http(), message).await {
        warn!(server_id, channel, error = %e, "Failed to post to moderation log");
    }
    Ok(())
}

/// Parses a snowflake stored as text into a user id.
pub fn user_id(value: &str) -> Result<serenity::UserId> {
    value
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(serenity::UserId::new)
        .ok_or_else(|| Error::validation(format!("Invalid user ID '{value}'")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_bodypart_reports_unknown_parts() {
        assert_eq!(parse_bodypart("Wings").ok(), Some(Bodypart::Wing));
        assert!(matches!(
            parse_bodypart("antenna"),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_snowflakes_must_be_non_zero_numbers() {
        assert_eq!(
            channel_id("123456789012345678").ok(),
            Some(serenity::ChannelId::new(123_456_789_012_345_678))
        );
        assert!(channel_id("0").is_err());
        assert!(user_id("general").is_err());
    }

    #[test]
    fn test_expiry_formatting() {
        assert_eq!(format_expiry(None), "never");
        let at = DateTime::from_timestamp(1_700_000_000, 0);
        assert_eq!(format_expiry(at), "<t:1700000000:R>");
        assert!(expiry_in_days(Some(1)).unwrap().is_some_and(|at| at > Utc::now()));
        assert!(expiry_in_days(None).unwrap().is_none());
    }

    #[test]
    fn test_expiry_rejects_huge_day_counts() {
        assert!(expiry_in_days(Some(MAX_EXPIRY_DAYS)).unwrap().is_some());
        for days in [MAX_EXPIRY_DAYS + 1, u32::MAX] {
            assert!(matches!(
                expiry_in_days(Some(days)),
                Err(Error::Validation { .. })
            ));
        }
    }
}
