//! Roleplay business logic - Sessions, their participants and their message logs.
//!
//! A roleplay is owned by one user and is unique by name per owner and server. While
//! active it is bound to a channel, and messages posted there are recorded to its log.

use super::validation::{require_name, require_text};
use crate::{
    entities::{
        ParticipantStatus, Roleplay, RoleplayMessage, RoleplayParticipant, roleplay,
        roleplay_message, roleplay_participant,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use std::fmt::Write as _;
use tracing::{debug, info, instrument};

/// A message to add to a roleplay's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Discord message snowflake
    pub discord_message_id: String,
    /// Author snowflake
    pub author_id: String,
    /// Author display name at the time of posting
    pub author_nickname: String,
    /// Message text
    pub contents: String,
    /// When the message was posted
    pub timestamp: DateTime<Utc>,
}

fn name_matches(name: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(roleplay::Column::Name))).eq(name.to_lowercase())
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
    let mut query = Roleplay::find()
        .filter(roleplay::Column::ServerId.eq(server_id))
        .filter(roleplay::Column::OwnerId.eq(owner_id))
        .filter(name_matches(name));
    if let Some(id) = except {
        query = query.filter(roleplay::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::RoleplayNameTaken {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Creates a roleplay. The owner joins it immediately.
///
/// # Errors
/// Returns an error if the name is empty, too long or already used by the owner.
#[instrument(skip(db, summary))]
pub async fn create_roleplay(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: &str,
    name: &str,
    summary: &str,
    is_nsfw: bool,
    is_public: bool,
) -> Result<roleplay::Model> {
    let name = require_name(name, "Roleplay name")?;

    let txn = db.begin().await?;
    ensure_name_free(&txn, server_id, owner_id, &name, None).await?;

    let created = roleplay::ActiveModel {
        server_id: Set(server_id.to_string()),
        owner_id: Set(owner_id.to_string()),
        name: Set(name),
        summary: Set(summary.trim().to_string()),
        is_nsfw: Set(is_nsfw),
        is_public: Set(is_public),
        is_active: Set(false),
        active_channel_id: Set(None),
        dedicated_channel_id: Set(None),
        created_at: Set(Utc::now()),
        last_updated: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    set_status(&txn, created.id, owner_id, ParticipantStatus::Joined).await?;
    txn.commit().await?;

    info!(roleplay_id = created.id, "Roleplay created");
    Ok(created)
}

/// Fetches a roleplay by ID.
pub async fn get_roleplay_by_id<C>(db: &C, roleplay_id: i64) -> Result<roleplay::Model>
where
    C: ConnectionTrait,
{
    Roleplay::find_by_id(roleplay_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::RoleplayNotFound {
            name: roleplay_id.to_string(),
        })
}

/// Fetches one of a user's roleplays by name, ignoring case.
pub async fn get_roleplay_by_name(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: &str,
    name: &str,
) -> Result<roleplay::Model> {
    let name = name.trim();
    debug!(server_id, owner_id, name, "Looking up roleplay");
    Roleplay::find()
        .filter(roleplay::Column::ServerId.eq(server_id))
        .filter(roleplay::Column::OwnerId.eq(owner_id))
        .filter(name_matches(name))
        .one(db)
        .await?
        .ok_or_else(|| Error::RoleplayNotFound {
            name: name.to_string(),
        })
}

/// The roleplay currently running in a channel, if any.
pub async fn get_active_roleplay_in_channel<C>(
    db: &C,
    channel_id: &str,
) -> Result<Option<roleplay::Model>>
where
    C: ConnectionTrait,
{
    Roleplay::find()
        .filter(roleplay::Column::IsActive.eq(true))
        .filter(roleplay::Column::ActiveChannelId.eq(channel_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the roleplays of a server, optionally only those of one owner.
pub async fn list_roleplays(
    db: &DatabaseConnection,
    server_id: &str,
    owner_id: Option<&str>,
) -> Result<Vec<roleplay::Model>> {
    let mut query = Roleplay::find().filter(roleplay::Column::ServerId.eq(server_id));
    if let Some(owner_id) = owner_id {
        query = query.filter(roleplay::Column::OwnerId.eq(owner_id));
    }
    query
        .order_by_asc(roleplay::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a roleplay's participant rows, optionally filtered by status.
pub async fn get_participants(
    db: &DatabaseConnection,
    roleplay_id: i64,
    status: Option<ParticipantStatus>,
) -> Result<Vec<roleplay_participant::Model>> {
    let mut query = RoleplayParticipant::find()
        .filter(roleplay_participant::Column::RoleplayId.eq(roleplay_id));
    if let Some(status) = status {
        query = query.filter(roleplay_participant::Column::Status.eq(status));
    }
    query
        .order_by_asc(roleplay_participant::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_participant<C>(
    db: &C,
    roleplay_id: i64,
    user_id: &str,
) -> Result<Option<roleplay_participant::Model>>
where
    C: ConnectionTrait,
{
    RoleplayParticipant::find()
        .filter(roleplay_participant::Column::RoleplayId.eq(roleplay_id))
        .filter(roleplay_participant::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether a user has joined a roleplay.
pub async fn is_participant(
    db: &DatabaseConnection,
    roleplay_id: i64,
    user_id: &str,
) -> Result<bool> {
    Ok(find_participant(db, roleplay_id, user_id)
        .await?
        .is_some_and(|p| p.status == ParticipantStatus::Joined))
}

async fn set_status<C>(
    db: &C,
    roleplay_id: i64,
    user_id: &str,
    status: ParticipantStatus,
) -> Result<roleplay_participant::Model>
where
    C: ConnectionTrait,
{
    match find_participant(db, roleplay_id, user_id).await? {
        Some(existing) => {
            let mut active: roleplay_participant::ActiveModel = existing.into();
            active.status = Set(status);
            active.update(db).await.map_err(Into::into)
        }
        None => roleplay_participant::ActiveModel {
            roleplay_id: Set(roleplay_id),
            user_id: Set(user_id.to_string()),
            status: Set(status),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(Into::into),
    }
}

/// Renames a roleplay.
pub async fn set_name(
    db: &DatabaseConnection,
    roleplay_id: i64,
    name: &str,
) -> Result<roleplay::Model> {
    let name = require_name(name, "Roleplay name")?;
    let existing = get_roleplay_by_id(db, roleplay_id).await?;
    ensure_name_free(db, &existing.server_id, &existing.owner_id, &name, Some(roleplay_id)).await?;

    let mut active: roleplay::ActiveModel = existing.into();
    active.name = Set(name);
    active.update(db).await.map_err(Into::into)
}

/// Replaces the summary.
pub async fn set_summary(
    db: &DatabaseConnection,
    roleplay_id: i64,
    summary: &str,
) -> Result<roleplay::Model> {
    let mut active: roleplay::ActiveModel = get_roleplay_by_id(db, roleplay_id).await?.into();
    active.summary = Set(summary.trim().to_string());
    active.update(db).await.map_err(Into::into)
}

/// Sets the adult-only flag.
pub async fn set_nsfw(
    db: &DatabaseConnection,
    roleplay_id: i64,
    is_nsfw: bool,
) -> Result<roleplay::Model> {
    let mut active: roleplay::ActiveModel = get_roleplay_by_id(db, roleplay_id).await?.into();
    active.is_nsfw = Set(is_nsfw);
    active.update(db).await.map_err(Into::into)
}

/// Sets whether anyone may join without an invitation.
pub async fn set_public(
    db: &DatabaseConnection,
    roleplay_id: i64,
    is_public: bool,
) -> Result<roleplay::Model> {
    let mut active: roleplay::ActiveModel = get_roleplay_by_id(db, roleplay_id).await?.into();
    active.is_public = Set(is_public);
    active.update(db).await.map_err(Into::into)
}

/// Sets or clears the channel dedicated to a roleplay.
pub async fn set_dedicated_channel(
    db: &DatabaseConnection,
    roleplay_id: i64,
    channel_id: Option<&str>,
) -> Result<roleplay::Model> {
    let mut active: roleplay::ActiveModel = get_roleplay_by_id(db, roleplay_id).await?.into();
    active.dedicated_channel_id = Set(channel_id.map(str::to_string));
    active.update(db).await.map_err(Into::into)
}

/// Hands a roleplay over to another user, who joins it if they have not already.
///
/// # Errors
/// Returns [`Error::RoleplayNameTaken`] if the new owner already has a roleplay with the
/// same name.
pub async fn transfer_ownership(
    db: &DatabaseConnection,
    roleplay_id: i64,
    new_owner_id: &str,
) -> Result<roleplay::Model> {
    let txn = db.begin().await?;
    let existing = get_roleplay_by_id(&txn, roleplay_id).await?;
    if existing.owner_id == new_owner_id {
        return Err(Error::participation("That user already owns the roleplay"));
    }
    ensure_name_free(&txn, &existing.server_id, new_owner_id, &existing.name, None).await?;

    let mut active: roleplay::ActiveModel = existing.into();
    active.owner_id = Set(new_owner_id.to_string());
    let updated = active.update(&txn).await?;
    set_status(&txn, roleplay_id, new_owner_id, ParticipantStatus::Joined).await?;
    txn.commit().await?;

    info!(roleplay_id, new_owner_id, "Roleplay ownership transferred");
    Ok(updated)
}

/// Deletes a roleplay with its participants and message log.
pub async fn delete_roleplay(db: &DatabaseConnection, roleplay_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = get_roleplay_by_id(&txn, roleplay_id).await?;

    RoleplayMessage::delete_many()
        .filter(roleplay_message::Column::RoleplayId.eq(existing.id))
        .exec(&txn)
        .await?;
    RoleplayParticipant::delete_many()
        .filter(roleplay_participant::Column::RoleplayId.eq(existing.id))
        .exec(&txn)
        .await?;
    Roleplay::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    info!(roleplay_id, "Roleplay deleted");
    Ok(())
}

/// Starts a roleplay in a channel.
///
/// # Errors
/// - [`Error::RoleplayAlreadyActive`] if the roleplay is running
/// - [`Error::ChannelOccupied`] if another roleplay runs in the channel
pub async fn start_roleplay<C>(
    db: &C,
    roleplay_id: i64,
    channel_id: &str,
) -> Result<roleplay::Model>
where
    C: ConnectionTrait,
{
    let existing = get_roleplay_by_id(db, roleplay_id).await?;
    if existing.is_active {
        return Err(Error::RoleplayAlreadyActive {
            name: existing.name,
        });
    }
    if get_active_roleplay_in_channel(db, channel_id).await?.is_some() {
        return Err(Error::ChannelOccupied {
            channel_id: channel_id.to_string(),
        });
    }

    let mut active: roleplay::ActiveModel = existing.into();
    active.is_active = Set(true);
    active.active_channel_id = Set(Some(channel_id.to_string()));
    active.last_updated = Set(Some(Utc::now()));
    let started = active.update(db).await?;

    info!(roleplay_id, channel_id, "Roleplay started");
    Ok(started)
}

/// Stops a running roleplay.
///
/// # Errors
/// Returns [`Error::RoleplayNotActive`] if the roleplay is not running.
pub async fn stop_roleplay<C>(db: &C, roleplay_id: i64) -> Result<roleplay::Model>
where
    C: ConnectionTrait,
{
    let existing = get_roleplay_by_id(db, roleplay_id).await?;
    if !existing.is_active {
        return Err(Error::RoleplayNotActive {
            name: existing.name,
        });
    }

    let mut active: roleplay::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.active_channel_id = Set(None);
    let stopped = active.update(db).await?;

    info!(roleplay_id, "Roleplay stopped");
    Ok(stopped)
}

/// Invites a user. Kicked users can be invited back.
pub async fn invite(db: &DatabaseConnection, roleplay_id: i64, user_id: &str) -> Result<()> {
    get_roleplay_by_id(db, roleplay_id).await?;
    match find_participant(db, roleplay_id, user_id).await? {
        Some(p) if p.status == ParticipantStatus::Joined => {
            Err(Error::participation("That user has already joined the roleplay"))
        }
        Some(p) if p.status == ParticipantStatus::Invited => {
            Err(Error::participation("That user has already been invited"))
        }
        _ => {
            set_status(db, roleplay_id, user_id, ParticipantStatus::Invited).await?;
            info!(roleplay_id, user_id, "User invited to roleplay");
            Ok(())
        }
    }
}

/// Joins a roleplay.
///
/// # Errors
/// Returns [`Error::Participation`] if the user already joined, or the roleplay is
/// private (or the user was kicked) and there is no pending invitation.
pub async fn join(db: &DatabaseConnection, roleplay_id: i64, user_id: &str) -> Result<()> {
    let roleplay = get_roleplay_by_id(db, roleplay_id).await?;
    let status = find_participant(db, roleplay_id, user_id)
        .await?
        .map(|p| p.status);

    match status {
        Some(ParticipantStatus::Joined) => {
            return Err(Error::participation("You have already joined this roleplay"));
        }
        Some(ParticipantStatus::Kicked) => {
            return Err(Error::participation(
                "You were kicked from this roleplay and need a new invitation",
            ));
        }
        Some(ParticipantStatus::Invited) => {}
        Some(ParticipantStatus::Left) | None if roleplay.is_public => {}
        Some(ParticipantStatus::Left) | None => {
            return Err(Error::participation(
                "This roleplay is private; you need an invitation to join",
            ));
        }
    }

    set_status(db, roleplay_id, user_id, ParticipantStatus::Joined).await?;
    info!(roleplay_id, user_id, "User joined roleplay");
    Ok(())
}

/// Leaves a roleplay. The owner cannot leave their own roleplay.
pub async fn leave(db: &DatabaseConnection, roleplay_id: i64, user_id: &str) -> Result<()> {
    let roleplay = get_roleplay_by_id(db, roleplay_id).await?;
    if roleplay.owner_id == user_id {
        return Err(Error::participation(
            "The owner can't leave; transfer or delete the roleplay instead",
        ));
    }
    if !is_participant(db, roleplay_id, user_id).await? {
        return Err(Error::participation("You are not part of this roleplay"));
    }

    set_status(db, roleplay_id, user_id, ParticipantStatus::Left).await?;
    info!(roleplay_id, user_id, "User left roleplay");
    Ok(())
}

/// Kicks a participant (or withdraws an invitation). The owner cannot be kicked.
pub async fn kick(db: &DatabaseConnection, roleplay_id: i64, user_id: &str) -> Result<()> {
    let roleplay = get_roleplay_by_id(db, roleplay_id).await?;
    if roleplay.owner_id == user_id {
        return Err(Error::participation("The owner can't be kicked"));
    }
    let status = find_participant(db, roleplay_id, user_id)
        .await?
        .map(|p| p.status);
    if !matches!(
        status,
        Some(ParticipantStatus::Joined | ParticipantStatus::Invited)
    ) {
        return Err(Error::participation("That user is not part of this roleplay"));
    }

    set_status(db, roleplay_id, user_id, ParticipantStatus::Kicked).await?;
    info!(roleplay_id, user_id, "User kicked from roleplay");
    Ok(())
}

async fn touch<C>(db: &C, roleplay_id: i64, now: DateTime<Utc>) -> Result<()>
where
    C: ConnectionTrait,
{
    Roleplay::update_many()
        .col_expr(roleplay::Column::LastUpdated, Expr::value(Some(now)))
        .filter(roleplay::Column::Id.eq(roleplay_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Adds a message to a roleplay's log, or updates its text if it is already logged.
pub async fn record_message<C>(
    db: &C,
    roleplay_id: i64,
    message: NewMessage,
) -> Result<roleplay_message::Model>
where
    C: ConnectionTrait,
{
    let contents = require_text(&message.contents, "Message")?;
    let existing = RoleplayMessage::find()
        .filter(roleplay_message::Column::RoleplayId.eq(roleplay_id))
        .filter(roleplay_message::Column::DiscordMessageId.eq(message.discord_message_id.as_str()))
        .one(db)
        .await?;

    let recorded = match existing {
        Some(existing) => {
            let mut active: roleplay_message::ActiveModel = existing.into();
            active.contents = Set(contents);
            active.update(db).await?
        }
        None => {
            roleplay_message::ActiveModel {
                roleplay_id: Set(roleplay_id),
                discord_message_id: Set(message.discord_message_id),
                author_id: Set(message.author_id),
                author_nickname: Set(message.author_nickname),
                contents: Set(contents),
                timestamp: Set(message.timestamp),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    touch(db, roleplay_id, Utc::now()).await?;
    debug!(roleplay_id, message_id = recorded.id, "Roleplay message recorded");
    Ok(recorded)
}

/// Replaces the text of a logged message, wherever it was logged.
///
/// Returns `None` if the message is not part of any roleplay log.
pub async fn edit_message<C>(
    db: &C,
    discord_message_id: &str,
    contents: &str,
) -> Result<Option<roleplay_message::Model>>
where
    C: ConnectionTrait,
{
    let Some(existing) = RoleplayMessage::find()
        .filter(roleplay_message::Column::DiscordMessageId.eq(discord_message_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let roleplay_id = existing.roleplay_id;
    let mut active: roleplay_message::ActiveModel = existing.into();
    active.contents = Set(contents.to_string());
    let updated = active.update(db).await?;
    touch(db, roleplay_id, Utc::now()).await?;
    Ok(Some(updated))
}

/// Removes a message from the log. Returns whether anything was deleted.
pub async fn delete_message<C>(db: &C, discord_message_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = RoleplayMessage::delete_many()
        .filter(roleplay_message::Column::DiscordMessageId.eq(discord_message_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// A roleplay's log, oldest message first.
pub async fn get_messages(
    db: &DatabaseConnection,
    roleplay_id: i64,
) -> Result<Vec<roleplay_message::Model>> {
    RoleplayMessage::find()
        .filter(roleplay_message::Column::RoleplayId.eq(roleplay_id))
        .order_by_asc(roleplay_message::Column::Timestamp)
        .order_by_asc(roleplay_message::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active roleplays with no activity since `now - timeout`.
///
/// Activity is the last recorded message, or the start of the roleplay.
pub async fn get_timed_out_roleplays<C>(
    db: &C,
    now: DateTime<Utc>,
    timeout: Duration,
) -> Result<Vec<roleplay::Model>>
where
    C: ConnectionTrait,
{
    let Some(cutoff) = now.checked_sub_signed(timeout) else {
        return Ok(Vec::new());
    };
    let active = Roleplay::find()
        .filter(roleplay::Column::IsActive.eq(true))
        .order_by_asc(roleplay::Column::Id)
        .all(db)
        .await?;

    Ok(active
        .into_iter()
        .filter(|rp| rp.last_updated.unwrap_or(rp.created_at) < cutoff)
        .collect())
}

/// Renders a roleplay log as plain text for export.
///
/// # Errors
/// Returns [`Error::Fmt`] if writing into the buffer fails.
pub fn render_log(
    roleplay: &roleplay::Model,
    messages: &[roleplay_message::Model],
) -> Result<String> {
    let mut log = String::new();
    writeln!(log, "{}", roleplay.name)?;
    if !roleplay.summary.is_empty() {
        writeln!(log, "{}", roleplay.summary)?;
    }
    log.push('\n');

    for message in messages {
        writeln!(
            log,
            "[{}] {}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            message.author_nickname,
            message.contents
        )?;
    }
    Ok(log)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn message(id: &str, contents: &str, minute: u32) -> NewMessage {
        NewMessage {
            discord_message_id: id.to_string(),
            author_id: TEST_USER.to_string(),
            author_nickname: "Amby".to_string(),
            contents: contents.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 20, minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_roleplay_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_roleplay(&db, "1", "2", " ", "", false, true).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_roleplay_joins_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;

        assert!(!rp.is_active);
        assert!(is_participant(&db, rp.id, TEST_USER).await?);
        let joined = get_participants(&db, rp.id, Some(ParticipantStatus::Joined)).await?;
        assert_eq!(joined.len(), 1);

        let duplicate =
            create_roleplay(&db, TEST_SERVER, TEST_USER, "tavern", "", false, true).await;
        assert!(matches!(duplicate, Err(Error::RoleplayNameTaken { .. })));

        let found = get_roleplay_by_name(&db, TEST_SERVER, TEST_USER, "TAVERN").await?;
        assert_eq!(found.id, rp.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_start_and_stop() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_roleplay(&db, "Tavern").await?;
        let second = create_test_roleplay(&db, "Forest").await?;

        let started = start_roleplay(&db, first.id, "100").await?;
        assert!(started.is_active);
        assert_eq!(started.active_channel_id.as_deref(), Some("100"));

        let again = start_roleplay(&db, first.id, "200").await;
        assert!(matches!(again, Err(Error::RoleplayAlreadyActive { .. })));

        let occupied = start_roleplay(&db, second.id, "100").await;
        assert!(matches!(occupied, Err(Error::ChannelOccupied { .. })));

        let in_channel = get_active_roleplay_in_channel(&db, "100").await?.unwrap();
        assert_eq!(in_channel.id, first.id);

        let stopped = stop_roleplay(&db, first.id).await?;
        assert!(!stopped.is_active);
        assert!(stopped.active_channel_id.is_none());
        assert!(matches!(
            stop_roleplay(&db, first.id).await,
            Err(Error::RoleplayNotActive { .. })
        ));

        // The channel is free again
        start_roleplay(&db, second.id, "100").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_participation_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_roleplay(&db, TEST_SERVER, TEST_USER, "Secret", "", false, false).await?;

        let uninvited = join(&db, rp.id, "42").await;
        assert!(matches!(uninvited, Err(Error::Participation { .. })));

        invite(&db, rp.id, "42").await?;
        join(&db, rp.id, "42").await?;
        assert!(is_participant(&db, rp.id, "42").await?);
        assert!(join(&db, rp.id, "42").await.is_err());

        kick(&db, rp.id, "42").await?;
        assert!(!is_participant(&db, rp.id, "42").await?);
        assert!(join(&db, rp.id, "42").await.is_err());

        // A fresh invitation lets a kicked user back in
        invite(&db, rp.id, "42").await?;
        join(&db, rp.id, "42").await?;
        leave(&db, rp.id, "42").await?;
        assert!(leave(&db, rp.id, "42").await.is_err());

        assert!(leave(&db, rp.id, TEST_USER).await.is_err());
        assert!(kick(&db, rp.id, TEST_USER).await.is_err());
        assert!(kick(&db, rp.id, "nobody").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_public_roleplay_can_be_rejoined() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;

        join(&db, rp.id, "42").await?;
        leave(&db, rp.id, "42").await?;
        join(&db, rp.id, "42").await?;
        assert!(is_participant(&db, rp.id, "42").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_ownership() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;
        create_roleplay(&db, TEST_SERVER, "42", "Tavern", "", false, true).await?;

        let clash = transfer_ownership(&db, rp.id, "42").await;
        assert!(matches!(clash, Err(Error::RoleplayNameTaken { .. })));

        let moved = transfer_ownership(&db, rp.id, "43").await?;
        assert_eq!(moved.owner_id, "43");
        assert!(is_participant(&db, rp.id, "43").await?);
        // The previous owner can now leave
        leave(&db, rp.id, TEST_USER).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_message_log() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;
        start_roleplay(&db, rp.id, "100").await?;

        record_message(&db, rp.id, message("2", "waves back", 5)).await?;
        record_message(&db, rp.id, message("1", "waves", 1)).await?;
        record_message(&db, rp.id, message("1", "waves happily", 1)).await?;

        let messages = get_messages(&db, rp.id).await?;
        let contents: Vec<_> = messages.iter().map(|m| m.contents.as_str()).collect();
        assert_eq!(contents, ["waves happily", "waves back"]);

        assert!(edit_message(&db, "2", "bows").await?.is_some());
        assert!(edit_message(&db, "999", "nothing").await?.is_none());
        assert!(delete_message(&db, "1").await?);
        assert!(!delete_message(&db, "1").await?);

        let rp = get_roleplay_by_id(&db, rp.id).await?;
        let log = render_log(&rp, &get_messages(&db, rp.id).await?)?;
        assert_eq!(log, "Tavern\nA test roleplay\n\n[2024-05-01 20:05] Amby: bows\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_roleplay_cascades() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;
        record_message(&db, rp.id, message("1", "hello", 0)).await?;

        delete_roleplay(&db, rp.id).await?;
        assert!(get_roleplay_by_id(&db, rp.id).await.is_err());
        assert!(get_messages(&db, rp.id).await?.is_empty());
        assert!(get_participants(&db, rp.id, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_timed_out_roleplays() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;
        create_test_roleplay(&db, "Idle but stopped").await?;
        start_roleplay(&db, rp.id, "100").await?;

        let timeout = Duration::hours(72);
        assert!(get_timed_out_roleplays(&db, Utc::now(), timeout).await?.is_empty());

        let later = Utc::now() + Duration::hours(73);
        let timed_out = get_timed_out_roleplays(&db, later, timeout).await?;
        assert_eq!(timed_out.len(), 1);
        assert_eq!(timed_out[0].id, rp.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_timeout_beyond_calendar_range_times_nothing_out() -> Result<()> {
        let db = setup_test_db().await?;
        let rp = create_test_roleplay(&db, "Tavern").await?;
        start_roleplay(&db, rp.id, "100").await?;

        let timeout = Duration::days(365 * 1_000_000);
        assert!(get_timed_out_roleplays(&db, Utc::now(), timeout).await?.is_empty());
        Ok(())
    }
}
