//! Moderation Discord commands - bans, warnings and notes.
//!
//! Every action is recorded in the database and echoed to the server's moderation log
//! channel when one is configured. Bans are also applied on Discord itself.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks},
        core::{bans, notes, warnings},
        entities::{Permission, PermissionTarget},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    async fn require(
        ctx: poise::Context<'_, BotData, Error>,
        permission: Permission,
    ) -> Result<()> {
        checks::require_permission_for(ctx, permission, PermissionTarget::Other).await
    }

    async fn reply_private(ctx: poise::Context<'_, BotData, Error>, content: String) -> Result<()> {
        ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
            .await?;
        Ok(())
    }

    // ----- Bans -----

    /// Parent command for bans.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands(
            "ban_add",
            "ban_list",
            "ban_reason",
            "ban_expiry",
            "ban_context",
            "ban_lift"
        )
    )]
    pub async fn ban(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Ban command. Available subcommands:\n\
            `/ban add` - Ban a user, optionally for a number of days\n\
            `/ban list` - List bans\n\
            `/ban reason` / `expiry` / `context` - Edit a ban\n\
            `/ban lift` - Lift a ban";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Bans a user from this server.
    #[poise::command(slash_command, guild_only, rename = "add")]
    pub async fn ban_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to ban"] user: serenity::User,
        #[description = "Why the user is banned"] reason: String,
        #[description = "Lift the ban after this many days (default: never)"] days: Option<u32>,
        #[description = "ID of the message that prompted the ban"] message_id: Option<String>,
    ) -> Result<()> {
        require(ctx, Permission::ManageBans).await?;
        let server_id = checks::server_id(ctx)?;
        let author_id = ctx.author().id.to_string();
        let guild_id = ctx
            .guild_id()
            .ok_or_else(|| Error::validation("This command can only be used in a server"))?;
        let db = &ctx.data().database;

        if reason.trim().is_empty() {
            return Err(Error::validation("Ban reason cannot be empty"));
        }
        let expires_on = checks::expiry_in_days(days)?;
        guild_id
            .ban_with_reason(ctx.http(), user.id, 0, reason.trim())
            .await?;

        let mut created = bans::create_ban(
            db,
            &server_id,
            &user.id.to_string(),
            &author_id,
            &reason,
            expires_on,
        )
        .await?;
        if let Some(message_id) = message_id {
            created = bans::set_ban_context_message(db, &server_id, created.id, &message_id).await?;
        }

        let summary = format!(
            "🔨 <@{}> was banned by <@{author_id}> (ban #{}, expires {}): {}",
            user.id,
            created.id,
            checks::format_expiry(created.expires_on),
            created.reason
        );
        checks::log_moderation(ctx, &summary).await?;
        ctx.say(summary).await?;
        Ok(())
    }

    /// Lists bans on this server.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn ban_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show bans of this user"] user: Option<serenity::User>,
    ) -> Result<()> {
        require(ctx, Permission::ManageBans).await?;
        let server_id = checks::server_id(ctx)?;
        let db = &ctx.data().database;

        let found = match &user {
            Some(user) => bans::list_bans_for_user(db, &server_id, &user.id.to_string()).await?,
            None => bans::list_bans(db, &server_id).await?,
        };
        if found.is_empty() {
            return reply_private(ctx, "📋 No bans found.".to_string()).await;
        }

        let mut response = String::from("**Bans**\n");
        for entry in &found {
            writeln!(
                &mut response,
                "#{} <@{}> by <@{}>, expires {}: {}",
                entry.id,
                entry.user_id,
                entry.author_id,
                checks::format_expiry(entry.expires_on),
                entry.reason
            )?;
        }
        reply_private(ctx, response).await
    }

    /// Changes the reason of a ban.
    #[poise::command(slash_command, guild_only, rename = "reason")]
    pub async fn ban_reason(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ban ID"] id: i64,
        #[description = "New reason"] reason: String,
    ) -> Result<()> {
        require(ctx, Permission::ManageBans).await?;
        let server_id = checks::server_id(ctx)?;

        let updated = bans::set_ban_reason(&ctx.data().database, &server_id, id, &reason).await?;
        reply_private(ctx, format!("✅ Reason of ban #{} updated.", updated.id)).await
    }

    /// Changes when a ban is lifted.
    #[poise::command(slash_command, guild_only, rename = "expiry")]
    pub async fn ban_expiry(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ban ID"] id: i64,
        #[description = "Lift the ban after this many days from now (default: never)"]
        days: Option<u32>,
    ) -> Result<()> {
        require(ctx, Permission::ManageBans).await?;
        let server_id = checks::server_id(ctx)?;
        let expires_on = checks::expiry_in_days(days)?;

        let updated =
            bans::set_ban_expiry(&ctx.data().database, &server_id, id, expires_on).await?;
        reply_private(
            ctx,
            format!(
                "✅ Ban #{} now expires {}.",
                updated.id,
                checks::format_expiry(updated.expires_on)
            ),
        )
        .await
    }

    /// Links a ban to the message that prompted it.
    #[poise::command(slash_command, guild_only, rename = "context")]
    pub async fn ban_context(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ban ID"] id: i64,
        #[description = "Message ID"] message_id: String,
    ) -> Result<()> {
        require(ctx, Permission::ManageBans).await?;
        let server_id = checks::server_id(ctx)?;

        bans::set_ban_context_message(&ctx.data().database, &server_id, id, &message_id).await?;
        reply_private(ctx, format!("✅ Context of ban #{id} updated.")).await
    }

    /// Lifts a ban on Discord and removes it.
    #[poise::command(slash_command, guild_only, rename = "lift")]
    pub async fn ban_lift(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ban ID"] id: i64,
    ) -> Result<()> {
        require(ctx, Permission::ManageBans).await?;
        let server_id = checks::server_id(ctx)?;
        let guild_id = ctx
            .guild_id()
            .ok_or_else(|| Error::validation("This command can only be used in a server"))?;
        let db = &ctx.data().database;

        let found = bans::get_ban(db, &server_id, id).await?;
        guild_id
            .unban(ctx.http(), checks::user_id(&found.user_id)?)
            .await?;
        bans::delete_ban(db, &server_id, id).await?;

        let summary = format!(
            "🕊️ Ban #{id} of <@{}> was lifted by <@{}>.",
            found.user_id,
            ctx.author().id
        );
        checks::log_moderation(ctx, &summary).await?;
        ctx.say(summary).await?;
        Ok(())
    }

    // ----- Warnings -----

    /// Parent command for warnings.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("warn_add", "warn_list", "warn_reason", "warn_expiry", "warn_remove")
    )]
    pub async fn warn(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Warning command. Available subcommands:\n\
            `/warn add` - Warn a user\n\
            `/warn list` - List warnings\n\
            `/warn reason` / `expiry` - Edit a warning\n\
            `/warn remove` - Remove a warning";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Warns a user.
    #[poise::command(slash_command, guild_only, rename = "add")]
    pub async fn warn_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to warn"] user: serenity::User,
        #[description = "Why the user is warned"] reason: String,
        #[description = "Forget the warning after this many days (default: never)"]
        days: Option<u32>,
        #[description = "ID of the message that prompted the warning"] message_id: Option<String>,
    ) -> Result<()> {
        require(ctx, Permission::ManageWarnings).await?;
        let server_id = checks::server_id(ctx)?;
        let author_id = ctx.author().id.to_string();
        let user_id = user.id.to_string();
        let db = &ctx.data().database;

        let expires_on = checks::expiry_in_days(days)?;
        let mut created =
            warnings::create_warning(db, &server_id, &user_id, &author_id, &reason, expires_on)
                .await?;
        if let Some(message_id) = message_id {
            created =
                warnings::set_warning_context_message(db, &server_id, created.id, &message_id)
                    .await?;
        }
        let total = warnings::count_warnings(db, &server_id, &user_id).await?;

        let summary = format!(
            "⚠️ <@{user_id}> was warned by <@{author_id}> (warning #{}, {total} in total): {}",
            created.id, created.reason
        );
        checks::log_moderation(ctx, &summary).await?;
        ctx.say(summary).await?;
        Ok(())
    }

    /// Lists warnings on this server.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn warn_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show warnings of this user"] user: Option<serenity::User>,
    ) -> Result<()> {
        require(ctx, Permission::ManageWarnings).await?;
        let server_id = checks::server_id(ctx)?;
        let db = &ctx.data().database;

        let found = match &user {
            Some(user) => {
                warnings::list_warnings_for_user(db, &server_id, &user.id.to_string()).await?
            }
            None => warnings::list_warnings(db, &server_id).await?,
        };
        if found.is_empty() {
            return reply_private(ctx, "📋 No warnings found.".to_string()).await;
        }

        let mut response = String::from("**Warnings**\n");
        for entry in &found {
            writeln!(
                &mut response,
                "#{} <@{}> by <@{}>, expires {}: {}",
                entry.id,
                entry.user_id,
                entry.author_id,
                checks::format_expiry(entry.expires_on),
                entry.reason
            )?;
        }
        reply_private(ctx, response).await
    }

    /// Changes the reason of a warning.
    #[poise::command(slash_command, guild_only, rename = "reason")]
    pub async fn warn_reason(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Warning ID"] id: i64,
        #[description = "New reason"] reason: String,
    ) -> Result<()> {
        require(ctx, Permission::ManageWarnings).await?;
        let server_id = checks::server_id(ctx)?;

        let updated =
            warnings::set_warning_reason(&ctx.data().database, &server_id, id, &reason).await?;
        reply_private(ctx, format!("✅ Reason of warning #{} updated.", updated.id)).await
    }

    /// Changes when a warning is forgotten.
    #[poise::command(slash_command, guild_only, rename = "expiry")]
    pub async fn warn_expiry(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Warning ID"] id: i64,
        #[description = "Forget the warning after this many days from now (default: never)"]
        days: Option<u32>,
    ) -> Result<()> {
        require(ctx, Permission::ManageWarnings).await?;
        let server_id = checks::server_id(ctx)?;
        let expires_on = checks::expiry_in_days(days)?;

        let updated =
            warnings::set_warning_expiry(&ctx.data().database, &server_id, id, expires_on).await?;
        reply_private(
            ctx,
            format!(
                "✅ Warning #{} now expires {}.",
                updated.id,
                checks::format_expiry(updated.expires_on)
            ),
        )
        .await
    }

    /// Removes a warning.
    #[poise::command(slash_command, guild_only, rename = "remove")]
    pub async fn warn_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Warning ID"] id: i64,
    ) -> Result<()> {
        require(ctx, Permission::ManageWarnings).await?;
        let server_id = checks::server_id(ctx)?;

        warnings::delete_warning(&ctx.data().database, &server_id, id).await?;
        let summary = format!("🧽 Warning #{id} was removed by <@{}>.", ctx.author().id);
        checks::log_moderation(ctx, &summary).await?;
        reply_private(ctx, summary).await
    }

    // ----- Notes -----

    /// Parent command for moderator notes.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("note_add", "note_list", "note_edit", "note_expiry", "note_remove")
    )]
    pub async fn note(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Note command. Available subcommands:\n\
            `/note add` - Write a note about a user\n\
            `/note list` - Read the notes about a user\n\
            `/note edit` / `expiry` - Edit a note\n\
            `/note remove` - Remove a note";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Writes a moderator note about a user.
    #[poise::command(slash_command, guild_only, rename = "add")]
    pub async fn note_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User the note is about"] user: serenity::User,
        #[description = "The note"] content: String,
        #[description = "Forget the note after this many days (default: never)"] days: Option<
            u32,
        >,
    ) -> Result<()> {
        require(ctx, Permission::ManageNotes).await?;
        let server_id = checks::server_id(ctx)?;
        let author_id = ctx.author().id.to_string();
        let expires_on = checks::expiry_in_days(days)?;

        let created = notes::create_note(
            &ctx.data().database,
            &server_id,
            &user.id.to_string(),
            &author_id,
            &content,
            expires_on,
        )
        .await?;
        reply_private(ctx, format!("📝 Note #{} saved about <@{}>.", created.id, user.id)).await
    }

    /// Lists the notes about a user.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn note_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User the notes are about"] user: serenity::User,
    ) -> Result<()> {
        require(ctx, Permission::ManageNotes).await?;
        let server_id = checks::server_id(ctx)?;

        let found =
            notes::list_notes(&ctx.data().database, &server_id, &user.id.to_string()).await?;
        if found.is_empty() {
            return reply_private(ctx, format!("📋 No notes about <@{}>.", user.id)).await;
        }

        let mut response = format!("**Notes about <@{}>**\n", user.id);
        for entry in &found {
            writeln!(
                &mut response,
                "#{} by <@{}>, expires {}: {}",
                entry.id,
                entry.author_id,
                checks::format_expiry(entry.expires_on),
                entry.content
            )?;
        }
        reply_private(ctx, response).await
    }

    /// Rewrites a note.
    #[poise::command(slash_command, guild_only, rename = "edit")]
    pub async fn note_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Note ID"] id: i64,
        #[description = "New content"] content: String,
    ) -> Result<()> {
        require(ctx, Permission::ManageNotes).await?;
        let server_id = checks::server_id(ctx)?;

        let updated =
            notes::set_note_content(&ctx.data().database, &server_id, id, &content).await?;
        reply_private(ctx, format!("✅ Note #{} updated.", updated.id)).await
    }

    /// Changes when a note is forgotten.
    #[poise::command(slash_command, guild_only, rename = "expiry")]
    pub async fn note_expiry(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Note ID"] id: i64,
        #[description = "Forget the note after this many days from now (default: never)"]
        days: Option<u32>,
    ) -> Result<()> {
        require(ctx, Permission::ManageNotes).await?;
        let server_id = checks::server_id(ctx)?;
        let expires_on = checks::expiry_in_days(days)?;

        let updated =
            notes::set_note_expiry(&ctx.data().database, &server_id, id, expires_on).await?;
        reply_private(
            ctx,
            format!(
                "✅ Note #{} now expires {}.",
                updated.id,
                checks::format_expiry(updated.expires_on)
            ),
        )
        .await
    }

    /// Removes a note.
    #[poise::command(slash_command, guild_only, rename = "remove")]
    pub async fn note_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Note ID"] id: i64,
    ) -> Result<()> {
        require(ctx, Permission::ManageNotes).await?;
        let server_id = checks::server_id(ctx)?;

        notes::delete_note(&ctx.data().database, &server_id, id).await?;
        reply_private(ctx, format!("🗑️ Note #{id} removed.")).await
    }
}

// Re-export all commands
pub use inner::*;
