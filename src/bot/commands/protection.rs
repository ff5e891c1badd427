//! Protection Discord commands - who may transform your characters.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks, choices::Mode},
        core::protection,
        entities::ProtectionType,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for transformation consent settings.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands(
            "protection_show",
            "protection_optin",
            "protection_optout",
            "protection_mode",
            "protection_default_mode",
            "protection_default_optin",
            "protection_whitelist",
            "protection_blacklist",
            "protection_unlist"
        )
    )]
    pub async fn protection(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Protection command. Available subcommands:\n\
            `/protection show` - Show your settings\n\
            `/protection optin` / `optout` - Allow or forbid transformations on this server\n\
            `/protection mode` - Whitelist or blacklist mode on this server\n\
            `/protection whitelist` / `blacklist` / `unlist` - Manage your lists\n\
            `/protection default_mode` / `default_optin` - Defaults for new servers";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your protection settings.
    #[poise::command(slash_command, guild_only, rename = "show")]
    pub async fn protection_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let user_id = ctx.author().id.to_string();
        let db = &ctx.data().database;

        let global = protection::get_or_create_global_protection(db, &user_id).await?;
        let local = protection::get_or_create_server_protection(db, &server_id, &user_id).await?;
        let entries = protection::list_entries(db, &user_id).await?;

        let mut response = String::from("**Your protection settings**\n");
        let consent = if local.has_opted_in { "opted in" } else { "opted out" };
        writeln!(
            &mut response,
            "This server: {consent}, {} mode",
            local.protection_type
        )?;
        let default_consent = if global.default_opt_in { "opted in" } else { "opted out" };
        writeln!(
            &mut response,
            "New servers: {default_consent}, {} mode",
            global.default_type
        )?;

        for (label, kind) in [
            ("Whitelist", ProtectionType::Whitelist),
            ("Blacklist", ProtectionType::Blacklist),
        ] {
            let users: Vec<String> = entries
                .iter()
                .filter(|entry| entry.entry_type == kind)
                .map(|entry| format!("<@{}>", entry.target_id))
                .collect();
            if !users.is_empty() {
                writeln!(&mut response, "{label}: {}", users.join(", "))?;
            }
        }

        ctx.send(poise::CreateReply::default().content(response).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Lets others transform your characters on this server.
    #[poise::command(slash_command, guild_only, rename = "optin")]
    pub async fn protection_optin(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let user_id = ctx.author().id.to_string();

        protection::opt_in(&ctx.data().database, &server_id, &user_id).await?;
        ctx.say("✅ Others may now transform your characters on this server.")
            .await?;
        Ok(())
    }

    /// Stops others from transforming your characters on this server.
    #[poise::command(slash_command, guild_only, rename = "optout")]
    pub async fn protection_optout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let user_id = ctx.author().id.to_string();

        protection::opt_out(&ctx.data().database, &server_id, &user_id).await?;
        ctx.say("🛡️ Nobody else may transform your characters on this server.")
            .await?;
        Ok(())
    }

    /// Chooses whitelist or blacklist mode on this server.
    #[poise::command(slash_command, guild_only, rename = "mode")]
    pub async fn protection_mode(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Whitelist: only listed users. Blacklist: all but listed users."]
        mode: Mode,
    ) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let user_id = ctx.author().id.to_string();

        let updated =
            protection::set_protection_type(&ctx.data().database, &server_id, &user_id, mode.into())
                .await?;
        ctx.say(format!(
            "✅ Protection on this server is now in {} mode.",
            updated.protection_type
        ))
        .await?;
        Ok(())
    }

    /// Chooses the mode used on servers you haven't configured yet.
    #[poise::command(slash_command, rename = "default_mode")]
    pub async fn protection_default_mode(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Whitelist: only listed users. Blacklist: all but listed users."]
        mode: Mode,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();

        let updated =
            protection::set_default_type(&ctx.data().database, &user_id, mode.into()).await?;
        ctx.say(format!(
            "✅ New servers will use {} mode.",
            updated.default_type
        ))
        .await?;
        Ok(())
    }

    /// Chooses whether you are opted in on servers you haven't configured yet.
    #[poise::command(slash_command, rename = "default_optin")]
    pub async fn protection_default_optin(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Opt in by default?"] opt_in: bool,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();

        protection::set_default_opt_in(&ctx.data().database, &user_id, opt_in).await?;
        let consent = if opt_in { "opted in" } else { "opted out" };
        ctx.say(format!("✅ You will be {consent} on new servers."))
            .await?;
        Ok(())
    }

    /// Adds a user to your whitelist.
    #[poise::command(slash_command, rename = "whitelist")]
    pub async fn protection_whitelist(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to whitelist"] user: serenity::User,
    ) -> Result<()> {
        let owner_id = ctx.author().id.to_string();

        protection::whitelist_user(&ctx.data().database, &owner_id, &user.id.to_string()).await?;
        ctx.send(
            poise::CreateReply::default()
                .content(format!("✅ <@{}> is on your whitelist.", user.id))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Adds a user to your blacklist.
    #[poise::command(slash_command, rename = "blacklist")]
    pub async fn protection_blacklist(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to blacklist"] user: serenity::User,
    ) -> Result<()> {
        let owner_id = ctx.author().id.to_string();

        protection::blacklist_user(&ctx.data().database, &owner_id, &user.id.to_string()).await?;
        ctx.send(
            poise::CreateReply::default()
                .content(format!("✅ <@{}> is on your blacklist.", user.id))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Removes a user from your whitelist or blacklist.
    #[poise::command(slash_command, rename = "unlist")]
    pub async fn protection_unlist(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to remove"] user: serenity::User,
    ) -> Result<()> {
        let owner_id = ctx.author().id.to_string();

        let removed =
            protection::remove_entry(&ctx.data().database, &owner_id, &user.id.to_string()).await?;
        let message = if removed {
            format!("✅ <@{}> was removed from your lists.", user.id)
        } else {
            format!("ℹ️ <@{}> wasn't on any of your lists.", user.id)
        };
        ctx.send(poise::CreateReply::default().content(message).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
