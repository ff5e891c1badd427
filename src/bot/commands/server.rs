//! Server settings Discord commands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks},
        core::server,
        entities::{Permission, PermissionTarget},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    async fn require_manage_server(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        checks::require_permission_for(ctx, Permission::ManageServer, PermissionTarget::Other)
            .await
    }

    fn channel_mention(channel: Option<&str>) -> String {
        channel.map_or_else(|| "not set".to_string(), |id| format!("<#{id}>"))
    }

    /// Parent command for server settings.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands(
            "server_show",
            "server_nsfw",
            "server_category",
            "server_archive",
            "server_modlog"
        )
    )]
    pub async fn server(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Server command. Available subcommands:\n\
            `/server show` - Show the settings\n\
            `/server nsfw` - Allow or forbid NSFW roleplays and characters\n\
            `/server category` - Category for dedicated roleplay channels\n\
            `/server archive` - Channel roleplay logs are archived to\n\
            `/server modlog` - Channel moderation actions are logged to";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows this server's settings.
    #[poise::command(slash_command, guild_only, rename = "show")]
    pub async fn server_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let settings = server::get_or_create_server(&ctx.data().database, &server_id).await?;

        let embed = serenity::CreateEmbed::new()
            .title("Server settings")
            .field("NSFW", if settings.is_nsfw { "Allowed" } else { "Forbidden" }, true)
            .field(
                "Roleplay category",
                channel_mention(settings.roleplay_category_id.as_deref()),
                true,
            )
            .field("Archive", channel_mention(settings.archive_channel_id.as_deref()), true)
            .field(
                "Moderation log",
                channel_mention(settings.moderation_log_channel_id.as_deref()),
                true,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Allows or forbids NSFW roleplays and characters.
    #[poise::command(slash_command, guild_only, rename = "nsfw")]
    pub async fn server_nsfw(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Allow NSFW content?"] allowed: bool,
    ) -> Result<()> {
        require_manage_server(ctx).await?;
        let server_id = checks::server_id(ctx)?;

        server::set_nsfw(&ctx.data().database, &server_id, allowed).await?;
        let label = if allowed { "allowed" } else { "forbidden" };
        ctx.say(format!("✅ NSFW content is now {label} on this server."))
            .await?;
        Ok(())
    }

    /// Sets or clears the category dedicated roleplay channels are created in.
    #[poise::command(slash_command, guild_only, rename = "category")]
    pub async fn server_category(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category (leave empty to clear)"]
        #[channel_types("Category")]
        category: Option<serenity::GuildChannel>,
    ) -> Result<()> {
        require_manage_server(ctx).await?;
        let server_id = checks::server_id(ctx)?;
        let category_id = category.map(|channel| channel.id.to_string());

        let updated =
            server::set_roleplay_category(&ctx.data().database, &server_id, category_id).await?;
        ctx.say(format!(
            "✅ Roleplay category: {}",
            channel_mention(updated.roleplay_category_id.as_deref())
        ))
        .await?;
        Ok(())
    }

    /// Sets or clears the channel roleplay logs are archived to.
    #[poise::command(slash_command, guild_only, rename = "archive")]
    pub async fn server_archive(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Channel (leave empty to clear)"]
        #[channel_types("Text")]
        channel: Option<serenity::GuildChannel>,
    ) -> Result<()> {
        require_manage_server(ctx).await?;
        let server_id = checks::server_id(ctx)?;
        let channel_id = channel.map(|channel| channel.id.to_string());

        let updated =
            server::set_archive_channel(&ctx.data().database, &server_id, channel_id).await?;
        ctx.say(format!(
            "✅ Archive channel: {}",
            channel_mention(updated.archive_channel_id.as_deref())
        ))
        .await?;
        Ok(())
    }

    /// Sets or clears the channel moderation actions are logged to.
    #[poise::command(slash_command, guild_only, rename = "modlog")]
    pub async fn server_modlog(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Channel (leave empty to clear)"]
        #[channel_types("Text")]
        channel: Option<serenity::GuildChannel>,
    ) -> Result<()> {
        require_manage_server(ctx).await?;
        let server_id = checks::server_id(ctx)?;
        let channel_id = channel.map(|channel| channel.id.to_string());

        let updated =
            server::set_moderation_log_channel(&ctx.data().database, &server_id, channel_id)
                .await?;
        ctx.say(format!(
            "✅ Moderation log channel: {}",
            channel_mention(updated.moderation_log_channel_id.as_deref())
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
