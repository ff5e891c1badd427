//! Permission Discord commands - granting and revoking actions per user.
//!
//! Only server administrators and holders of `manage_server` may change grants.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks, choices::Scope, handlers::autocomplete},
        core::permissions,
        entities::{Permission, PermissionTarget},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use sea_orm::Iterable;
    use std::fmt::Write;

    /// Parent command for the permission store.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("permission_grant", "permission_revoke", "permission_list")
    )]
    pub async fn permission(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Permission command. Available subcommands:\n\
            `/permission grant` - Allow a user to do something\n\
            `/permission revoke` - Forbid a user from doing something\n\
            `/permission list` - Show what a user may do";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Allows a user to perform an action.
    #[poise::command(slash_command, guild_only, rename = "grant")]
    pub async fn permission_grant(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to grant the permission to"] user: serenity::User,
        #[description = "Permission to grant"]
        #[autocomplete = "autocomplete::autocomplete_permission"]
        permission: String,
        #[description = "On their own things or on other users' things"] scope: Scope,
    ) -> Result<()> {
        checks::require_permission_for(ctx, Permission::ManageServer, PermissionTarget::Other)
            .await?;
        let permission = checks::parse_permission(&permission)?;
        let server_id = checks::server_id(ctx)?;
        let target = PermissionTarget::from(scope);

        permissions::grant_permission(
            &ctx.data().database,
            &server_id,
            &user.id.to_string(),
            permission,
            target,
        )
        .await?;
        ctx.say(format!("✅ <@{}> now has `{permission}` ({target}).", user.id))
            .await?;
        Ok(())
    }

    /// Forbids a user from performing an action.
    #[poise::command(slash_command, guild_only, rename = "revoke")]
    pub async fn permission_revoke(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to revoke the permission from"] user: serenity::User,
        #[description = "Permission to revoke"]
        #[autocomplete = "autocomplete::autocomplete_permission"]
        permission: String,
        #[description = "On their own things or on other users' things"] scope: Scope,
    ) -> Result<()> {
        checks::require_permission_for(ctx, Permission::ManageServer, PermissionTarget::Other)
            .await?;
        let permission = checks::parse_permission(&permission)?;
        let server_id = checks::server_id(ctx)?;
        let target = PermissionTarget::from(scope);

        permissions::revoke_permission(
            &ctx.data().database,
            &server_id,
            &user.id.to_string(),
            permission,
            target,
        )
        .await?;
        ctx.say(format!("🚫 <@{}> no longer has `{permission}` ({target}).", user.id))
            .await?;
        Ok(())
    }

    /// Shows what a user may do on this server.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn permission_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to inspect (default: you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let user_id = user.as_ref().unwrap_or_else(|| ctx.author()).id.to_string();
        let db = &ctx.data().database;

        let mut response = format!("**Permissions of <@{user_id}>**\n");
        for permission in Permission::iter() {
            let mut scopes = Vec::new();
            for target in PermissionTarget::iter() {
                if permissions::has_permission(db, &server_id, &user_id, permission, target)
                    .await?
                {
                    scopes.push(target.to_string());
                }
            }
            let granted = if scopes.is_empty() {
                "❌".to_string()
            } else {
                format!("✅ {}", scopes.join(", "))
            };
            writeln!(&mut response, "`{permission}`: {granted}")?;
        }

        let explicit = permissions::list_permissions(db, &server_id, &user_id).await?;
        if !explicit.is_empty() {
            writeln!(&mut response, "\n{} explicit grant(s) or revocation(s).", explicit.len())?;
        }

        ctx.send(poise::CreateReply::default().content(response).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
