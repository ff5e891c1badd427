//! Roleplay Discord commands - creating, running and browsing roleplay sessions.
//!
//! Roleplays are looked up by name within the invoker's own roleplays unless an owner
//! is given, so two users can each run a roleplay called "Tavern".

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks, handlers::autocomplete},
        core::{roleplay, server},
        entities::{ParticipantStatus, Permission},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for roleplay sessions.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands(
            "roleplay_create",
            "roleplay_info",
            "roleplay_list",
            "roleplay_start",
            "roleplay_stop",
            "roleplay_join",
            "roleplay_leave",
            "roleplay_invite",
            "roleplay_kick",
            "roleplay_rename",
            "roleplay_summary",
            "roleplay_nsfw",
            "roleplay_public",
            "roleplay_transfer",
            "roleplay_dedicate",
            "roleplay_export",
            "roleplay_archive",
            "roleplay_delete"
        )
    )]
    pub async fn roleplay(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Roleplay command. Available subcommands:\n\
            `/roleplay create` - Create a new roleplay\n\
            `/roleplay start` / `stop` - Run a roleplay in this channel\n\
            `/roleplay join` / `leave` / `invite` / `kick` - Manage participants\n\
            `/roleplay info` / `list` - Browse roleplays\n\
            `/roleplay export` / `archive` - Export a roleplay's log";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a new roleplay owned by you.
    #[poise::command(slash_command, guild_only, rename = "create")]
    pub async fn roleplay_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"] name: String,
        #[description = "What the roleplay is about"] summary: String,
        #[description = "Is the roleplay NSFW? (default: false)"] nsfw: Option<bool>,
        #[description = "Can anyone join without an invite? (default: true)"] public: Option<bool>,
    ) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let owner_id = ctx.author().id.to_string();
        let db = &ctx.data().database;
        let is_nsfw = nsfw.unwrap_or(false);

        if is_nsfw && !server::get_or_create_server(db, &server_id).await?.is_nsfw {
            return Err(Error::validation("NSFW roleplays are disabled on this server"));
        }

        let created = roleplay::create_roleplay(
            db,
            &server_id,
            &owner_id,
            &name,
            &summary,
            is_nsfw,
            public.unwrap_or(true),
        )
        .await?;

        ctx.say(format!(
            "✅ Roleplay **{}** created. Start it in a channel with `/roleplay start`.",
            created.name
        ))
        .await?;
        Ok(())
    }

    /// Shows details about a roleplay.
    #[poise::command(slash_command, guild_only, rename = "info")]
    pub async fn roleplay_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        let db = &ctx.data().database;
        let joined = roleplay::get_participants(db, rp.id, Some(ParticipantStatus::Joined)).await?;

        let participants = joined
            .iter()
            .map(|p| format!("<@{}>", p.user_id))
            .collect::<Vec<_>>()
            .join(", ");
        let participants = if participants.is_empty() {
            "Nobody yet".to_string()
        } else {
            participants
        };
        let status = rp.active_channel_id.as_ref().map_or_else(
            || "Not running".to_string(),
            |channel| format!("Running in <#{channel}>"),
        );

        let mut embed = serenity::CreateEmbed::new()
            .title(&rp.name)
            .description(&rp.summary)
            .field("Owner", format!("<@{}>", rp.owner_id), true)
            .field("Status", status, true)
            .field("Visibility", if rp.is_public { "Public" } else { "Invite only" }, true)
            .field("Participants", participants, false)
            .color(if rp.is_nsfw { 0xe7_4c_3c } else { 0x34_98_db });
        if let Some(channel) = &rp.dedicated_channel_id {
            embed = embed.field("Dedicated channel", format!("<#{channel}>"), true);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists the roleplays on this server.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn roleplay_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show roleplays of this user"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let owner_id = owner.map(|user| user.id.to_string());
        let db = &ctx.data().database;

        let roleplays = roleplay::list_roleplays(db, &server_id, owner_id.as_deref()).await?;
        if roleplays.is_empty() {
            ctx.say("📜 No roleplays found. Create one with `/roleplay create`!")
                .await?;
            return Ok(());
        }

        let mut response = String::from("**Roleplays**\n");
        for rp in &roleplays {
            let active = if rp.is_active { "🟢" } else { "⚪" };
            let locked = if rp.is_public { "" } else { " 🔒" };
            let nsfw = if rp.is_nsfw { " 🔞" } else { "" };
            writeln!(
                &mut response,
                "{active} **{}**{locked}{nsfw} by <@{}> - {}",
                rp.name, rp.owner_id, rp.summary
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Starts a roleplay in this channel.
    #[poise::command(slash_command, guild_only, rename = "start")]
    pub async fn roleplay_start(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::StartStopRoleplay, &rp.owner_id).await?;

        if rp.is_nsfw {
            let channel_is_nsfw = ctx.guild_channel().await.is_some_and(|c| c.nsfw);
            if !channel_is_nsfw {
                return Err(Error::validation("NSFW roleplays can only run in NSFW channels"));
            }
        }

        let channel_id = ctx.channel_id().to_string();
        let started = roleplay::start_roleplay(&ctx.data().database, rp.id, &channel_id).await?;

        ctx.say(format!(
            "🎬 **{}** has started! Messages in this channel are now logged.\n> {}",
            started.name, started.summary
        ))
        .await?;
        Ok(())
    }

    /// Stops a roleplay. Without a name, stops the one running in this channel.
    #[poise::command(slash_command, guild_only, rename = "stop")]
    pub async fn roleplay_stop(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay (default: the one in this channel)"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: Option<String>,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let rp = match name {
            Some(name) => checks::find_roleplay(ctx, &name, owner.as_ref()).await?,
            None => {
                let channel_id = ctx.channel_id().to_string();
                roleplay::get_active_roleplay_in_channel(db, &channel_id)
                    .await?
                    .ok_or_else(|| Error::validation("No roleplay is running in this channel"))?
            }
        };
        checks::require_permission(ctx, Permission::StartStopRoleplay, &rp.owner_id).await?;

        let stopped = roleplay::stop_roleplay(db, rp.id).await?;
        ctx.say(format!("🛑 **{}** has ended.", stopped.name)).await?;
        Ok(())
    }

    /// Joins a roleplay.
    #[poise::command(slash_command, guild_only, rename = "join")]
    pub async fn roleplay_join(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay"] owner: serenity::User,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, Some(&owner)).await?;
        let user_id = ctx.author().id.to_string();

        roleplay::join(&ctx.data().database, rp.id, &user_id).await?;
        ctx.say(format!("✅ You joined **{}**.", rp.name)).await?;
        Ok(())
    }

    /// Leaves a roleplay.
    #[poise::command(slash_command, guild_only, rename = "leave")]
    pub async fn roleplay_leave(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay"] owner: serenity::User,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, Some(&owner)).await?;
        let user_id = ctx.author().id.to_string();

        roleplay::leave(&ctx.data().database, rp.id, &user_id).await?;
        ctx.say(format!("👋 You left **{}**.", rp.name)).await?;
        Ok(())
    }

    /// Invites a user to one of your roleplays.
    #[poise::command(slash_command, guild_only, rename = "invite")]
    pub async fn roleplay_invite(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "User to invite"] user: serenity::User,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::EditRoleplay, &rp.owner_id).await?;

        roleplay::invite(&ctx.data().database, rp.id, &user.id.to_string()).await?;
        ctx.say(format!(
            "📨 <@{}>, you've been invited to **{}**! Use `/roleplay join` to accept.",
            user.id, rp.name
        ))
        .await?;
        Ok(())
    }

    /// Removes a participant from a roleplay.
    #[poise::command(slash_command, guild_only, rename = "kick")]
    pub async fn roleplay_kick(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "User to kick"] user: serenity::User,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::KickRoleplayMember, &rp.owner_id).await?;

        roleplay::kick(&ctx.data().database, rp.id, &user.id.to_string()).await?;
        ctx.say(format!("✅ <@{}> was removed from **{}**.", user.id, rp.name))
            .await?;
        Ok(())
    }

    /// Renames a roleplay.
    #[poise::command(slash_command, guild_only, rename = "rename")]
    pub async fn roleplay_rename(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Current name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "New name"] new_name: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::EditRoleplay, &rp.owner_id).await?;

        let renamed = roleplay::set_name(&ctx.data().database, rp.id, &new_name).await?;
        ctx.say(format!("✅ **{}** is now called **{}**.", rp.name, renamed.name))
            .await?;
        Ok(())
    }

    /// Changes a roleplay's summary.
    #[poise::command(slash_command, guild_only, rename = "summary")]
    pub async fn roleplay_summary(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "New summary"] summary: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::EditRoleplay, &rp.owner_id).await?;

        roleplay::set_summary(&ctx.data().database, rp.id, &summary).await?;
        ctx.say(format!("✅ Summary of **{}** updated.", rp.name))
            .await?;
        Ok(())
    }

    /// Marks a roleplay as NSFW or not.
    #[poise::command(slash_command, guild_only, rename = "nsfw")]
    pub async fn roleplay_nsfw(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Is the roleplay NSFW?"] nsfw: bool,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::EditRoleplay, &rp.owner_id).await?;
        let db = &ctx.data().database;

        if nsfw && !server::get_or_create_server(db, &rp.server_id).await?.is_nsfw {
            return Err(Error::validation("NSFW roleplays are disabled on this server"));
        }

        roleplay::set_nsfw(db, rp.id, nsfw).await?;
        let label = if nsfw { "NSFW" } else { "SFW" };
        ctx.say(format!("✅ **{}** is now {label}.", rp.name)).await?;
        Ok(())
    }

    /// Makes a roleplay public or invite-only.
    #[poise::command(slash_command, guild_only, rename = "public")]
    pub async fn roleplay_public(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Can anyone join without an invite?"] public: bool,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::EditRoleplay, &rp.owner_id).await?;

        roleplay::set_public(&ctx.data().database, rp.id, public).await?;
        let label = if public { "public" } else { "invite only" };
        ctx.say(format!("✅ **{}** is now {label}.", rp.name)).await?;
        Ok(())
    }

    /// Hands a roleplay over to another user.
    #[poise::command(slash_command, guild_only, rename = "transfer")]
    pub async fn roleplay_transfer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "The new owner"] new_owner: serenity::User,
        #[description = "Current owner of the roleplay (default: you)"] owner: Option<
            serenity::User,
        >,
    ) -> Result<()> {
        if new_owner.bot {
            return Err(Error::validation("Bots can't own roleplays"));
        }
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::TransferRoleplay, &rp.owner_id).await?;

        let new_owner_id = new_owner.id.to_string();
        roleplay::transfer_ownership(&ctx.data().database, rp.id, &new_owner_id).await?;
        ctx.say(format!("✅ <@{new_owner_id}> now owns **{}**.", rp.name))
            .await?;
        Ok(())
    }

    /// Creates a channel dedicated to a roleplay, under the server's roleplay category.
    #[poise::command(slash_command, guild_only, rename = "dedicate")]
    pub async fn roleplay_dedicate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::EditRoleplay, &rp.owner_id).await?;
        if let Some(channel) = &rp.dedicated_channel_id {
            return Err(Error::validation(format!(
                "**{}** already has a dedicated channel: <#{channel}>",
                rp.name
            )));
        }

        let guild_id = ctx
            .guild_id()
            .ok_or_else(|| Error::validation("This command can only be used in a server"))?;
        let db = &ctx.data().database;
        let settings = server::get_or_create_server(db, &rp.server_id).await?;

        let channel_name = rp.name.to_lowercase().replace(char::is_whitespace, "-");
        let mut builder = serenity::CreateChannel::new(channel_name)
            .kind(serenity::ChannelType::Text)
            .topic(rp.summary.clone())
            .nsfw(rp.is_nsfw);
        if let Some(category) = &settings.roleplay_category_id {
            builder = builder.category(checks::channel_id(category)?);
        }
        let channel = guild_id.create_channel(ctx.http(), builder).await?;

        let channel_id = channel.id.to_string();
        roleplay::set_dedicated_channel(db, rp.id, Some(&channel_id)).await?;
        ctx.say(format!("✅ Created <#{channel_id}> for **{}**.", rp.name))
            .await?;
        Ok(())
    }

    /// Sends you a roleplay's log as a text file.
    #[poise::command(slash_command, guild_only, rename = "export")]
    pub async fn roleplay_export(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        if !rp.is_public && !roleplay::is_participant(db, rp.id, &user_id).await? {
            return Err(Error::participation(format!(
                "Only participants can export **{}**",
                rp.name
            )));
        }

        let messages = roleplay::get_messages(db, rp.id).await?;
        let log = roleplay::render_log(&rp, &messages)?;
        let file = serenity::CreateAttachment::bytes(log.into_bytes(), format!("{}.txt", rp.name));

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📜 Log of **{}** ({} messages)", rp.name, messages.len()))
                .attachment(file)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Posts a roleplay's log to the server's archive channel.
    #[poise::command(slash_command, guild_only, rename = "archive")]
    pub async fn roleplay_archive(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::EditRoleplay, &rp.owner_id).await?;
        let db = &ctx.data().database;

        let settings = server::get_or_create_server(db, &rp.server_id).await?;
        let Some(archive) = settings.archive_channel_id else {
            return Err(Error::validation(
                "This server has no archive channel. Set one with `/server archive`",
            ));
        };

        let messages = roleplay::get_messages(db, rp.id).await?;
        let log = roleplay::render_log(&rp, &messages)?;
        let file = serenity::CreateAttachment::bytes(log.into_bytes(), format!("{}.txt", rp.name));
        let message = serenity::CreateMessage::new()
            .content(format!("📜 **{}** by <@{}>\n> {}", rp.name, rp.owner_id, rp.summary))
            .add_file(file);
        checks::channel_id(&archive)?
            .send_message(ctx.http(), message)
            .await?;

        ctx.say(format!("✅ **{}** archived in <#{archive}>.", rp.name))
            .await?;
        Ok(())
    }

    /// Deletes a roleplay together with its participants and log.
    #[poise::command(slash_command, guild_only, rename = "delete")]
    pub async fn roleplay_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the roleplay to delete"]
        #[autocomplete = "autocomplete::autocomplete_roleplay_name"]
        name: String,
        #[description = "Owner of the roleplay (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let rp = checks::find_roleplay(ctx, &name, owner.as_ref()).await?;
        checks::require_permission(ctx, Permission::DeleteRoleplay, &rp.owner_id).await?;

        roleplay::delete_roleplay(&ctx.data().database, rp.id).await?;
        ctx.say(format!("🗑️ Roleplay **{}** deleted.", rp.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
