//! Character Discord commands - creating, describing and editing characters.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks, handlers::autocomplete},
        core::{
            character::{self, NewCharacter},
            server, transformation,
        },
        entities::{CharacterModel, Permission, PermissionTarget},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Resolves a character to edit and checks the invoker may edit it.
    async fn editable(
        ctx: poise::Context<'_, BotData, Error>,
        name: Option<&str>,
        owner: Option<&serenity::User>,
        permission: Permission,
    ) -> Result<CharacterModel> {
        let owner_id = owner.unwrap_or_else(|| ctx.author()).id.to_string();
        let found = checks::find_character(ctx, &owner_id, name).await?;
        checks::require_permission(ctx, permission, &found.owner_id).await?;
        Ok(found)
    }

    /// Parent command for characters.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands(
            "character_create",
            "character_show",
            "character_list",
            "character_rename",
            "character_nickname",
            "character_summary",
            "character_description",
            "character_avatar",
            "character_pronouns",
            "character_nsfw",
            "character_default",
            "character_delete"
        )
    )]
    pub async fn character(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Character command. Available subcommands:\n\
            `/character create` - Create a new character\n\
            `/character show` / `list` - Look at characters\n\
            `/character rename` / `nickname` / `summary` / `description` / `avatar` / \
            `pronouns` / `nsfw` - Edit a character\n\
            `/character default` - Pick the character commands use when none is named\n\
            `/character delete` - Delete a character";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a new character.
    #[poise::command(slash_command, guild_only, rename = "create")]
    pub async fn character_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the character"] name: String,
        #[description = "One-line summary"] summary: Option<String>,
        #[description = "Free-form description"] description: Option<String>,
        #[description = "Pronoun family (default: Neuter)"]
        #[autocomplete = "autocomplete::autocomplete_pronouns"]
        pronouns: Option<String>,
        #[description = "Avatar image URL"] avatar_url: Option<String>,
        #[description = "Is the character NSFW? (default: false)"] nsfw: Option<bool>,
    ) -> Result<()> {
        checks::require_permission_for(ctx, Permission::CreateCharacter, PermissionTarget::Own)
            .await?;
        let server_id = checks::server_id(ctx)?;
        let owner_id = ctx.author().id.to_string();
        let db = &ctx.data().database;
        let is_nsfw = nsfw.unwrap_or(false);

        if is_nsfw && !server::get_or_create_server(db, &server_id).await?.is_nsfw {
            return Err(Error::validation("NSFW characters are disabled on this server"));
        }

        let new = NewCharacter {
            summary: summary.unwrap_or_default(),
            description: description.unwrap_or_default(),
            avatar_url,
            pronoun_family: pronouns,
            is_nsfw,
            ..NewCharacter::named(name)
        };
        let created = character::create_character(db, &server_id, &owner_id, new).await?;

        ctx.say(format!(
            "✅ Character **{}** created. Transform them with `/transform shift`!",
            created.name
        ))
        .await?;
        Ok(())
    }

    /// Shows a character and their current appearance.
    #[poise::command(slash_command, guild_only, rename = "show")]
    pub async fn character_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let owner_id = owner.as_ref().unwrap_or_else(|| ctx.author()).id.to_string();
        let found = checks::find_character(ctx, &owner_id, name.as_deref()).await?;
        let description = transformation::describe_character(&ctx.data().database, &found).await?;

        let title = found.nickname.as_ref().map_or_else(
            || found.name.clone(),
            |nickname| format!("{} ({nickname})", found.name),
        );
        let mut embed = serenity::CreateEmbed::new()
            .title(title)
            .description(description)
            .field("Owner", format!("<@{}>", found.owner_id), true)
            .field("Pronouns", &found.pronoun_family, true);
        if !found.summary.is_empty() {
            embed = embed.field("Summary", &found.summary, false);
        }
        if let Some(url) = &found.avatar_url {
            embed = embed.thumbnail(url);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists characters on this server.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn character_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Whose characters to list (default: yours)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let owner_id = owner.as_ref().unwrap_or_else(|| ctx.author()).id.to_string();

        let characters =
            character::list_characters(&ctx.data().database, &server_id, &owner_id).await?;
        if characters.is_empty() {
            ctx.say("🎭 No characters found. Create one with `/character create`!")
                .await?;
            return Ok(());
        }

        let mut response = format!("**Characters of <@{owner_id}>**\n");
        for found in &characters {
            let default = if found.is_default { " ⭐" } else { "" };
            let nsfw = if found.is_nsfw { " 🔞" } else { "" };
            write!(&mut response, "• **{}**{default}{nsfw}", found.name)?;
            if found.summary.is_empty() {
                writeln!(&mut response)?;
            } else {
                writeln!(&mut response, " - {}", found.summary)?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Renames a character.
    #[poise::command(slash_command, guild_only, rename = "rename")]
    pub async fn character_rename(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Current name of the character"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: String,
        #[description = "New name"] new_name: String,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found = editable(ctx, Some(&name), owner.as_ref(), Permission::EditCharacter).await?;
        let renamed = character::set_name(&ctx.data().database, found.id, &new_name).await?;
        ctx.say(format!("✅ **{}** is now called **{}**.", found.name, renamed.name))
            .await?;
        Ok(())
    }

    /// Sets or clears a character's nickname.
    #[poise::command(slash_command, guild_only, rename = "nickname")]
    pub async fn character_nickname(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "New nickname (leave empty to clear)"] nickname: Option<String>,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found =
            editable(ctx, name.as_deref(), owner.as_ref(), Permission::EditCharacter).await?;
        character::set_nickname(&ctx.data().database, found.id, nickname.as_deref()).await?;
        ctx.say(format!("✅ Nickname of **{}** updated.", found.name))
            .await?;
        Ok(())
    }

    /// Changes a character's summary.
    #[poise::command(slash_command, guild_only, rename = "summary")]
    pub async fn character_summary(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "New summary"] summary: String,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found =
            editable(ctx, name.as_deref(), owner.as_ref(), Permission::EditCharacter).await?;
        character::set_summary(&ctx.data().database, found.id, &summary).await?;
        ctx.say(format!("✅ Summary of **{}** updated.", found.name))
            .await?;
        Ok(())
    }

    /// Changes a character's free-form description.
    #[poise::command(slash_command, guild_only, rename = "description")]
    pub async fn character_description(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "New description"] description: String,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found =
            editable(ctx, name.as_deref(), owner.as_ref(), Permission::EditCharacter).await?;
        character::set_description(&ctx.data().database, found.id, &description).await?;
        ctx.say(format!("✅ Description of **{}** updated.", found.name))
            .await?;
        Ok(())
    }

    /// Sets or clears a character's avatar.
    #[poise::command(slash_command, guild_only, rename = "avatar")]
    pub async fn character_avatar(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Uploaded avatar image"] image: Option<serenity::Attachment>,
        #[description = "Avatar image URL"] url: Option<String>,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found =
            editable(ctx, name.as_deref(), owner.as_ref(), Permission::EditCharacter).await?;
        let avatar_url = image.map(|attachment| attachment.url).or(url);

        character::set_avatar(&ctx.data().database, found.id, avatar_url.as_deref()).await?;
        let verb = if avatar_url.is_some() { "updated" } else { "cleared" };
        ctx.say(format!("✅ Avatar of **{}** {verb}.", found.name))
            .await?;
        Ok(())
    }

    /// Changes the pronouns used when describing a character.
    #[poise::command(slash_command, guild_only, rename = "pronouns")]
    pub async fn character_pronouns(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Pronoun family"]
        #[autocomplete = "autocomplete::autocomplete_pronouns"]
        pronouns: String,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found =
            editable(ctx, name.as_deref(), owner.as_ref(), Permission::EditCharacter).await?;
        let updated = character::set_pronouns(&ctx.data().database, found.id, &pronouns).await?;
        ctx.say(format!(
            "✅ **{}** now uses {} pronouns.",
            updated.name, updated.pronoun_family
        ))
        .await?;
        Ok(())
    }

    /// Marks a character as NSFW or not.
    #[poise::command(slash_command, guild_only, rename = "nsfw")]
    pub async fn character_nsfw(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Is the character NSFW?"] nsfw: bool,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found =
            editable(ctx, name.as_deref(), owner.as_ref(), Permission::EditCharacter).await?;
        let db = &ctx.data().database;
        if nsfw && !server::get_or_create_server(db, &found.server_id).await?.is_nsfw {
            return Err(Error::validation("NSFW characters are disabled on this server"));
        }

        character::set_nsfw(db, found.id, nsfw).await?;
        let label = if nsfw { "NSFW" } else { "SFW" };
        ctx.say(format!("✅ **{}** is now {label}.", found.name)).await?;
        Ok(())
    }

    /// Picks your default character, or clears it when no name is given.
    #[poise::command(slash_command, guild_only, rename = "default")]
    pub async fn character_default(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the character (leave empty to clear)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: Option<String>,
    ) -> Result<()> {
        let server_id = checks::server_id(ctx)?;
        let owner_id = ctx.author().id.to_string();
        let db = &ctx.data().database;

        let Some(name) = name else {
            character::clear_default_character(db, &server_id, &owner_id).await?;
            ctx.say("✅ Default character cleared.").await?;
            return Ok(());
        };

        let found = character::get_character_by_name(db, &server_id, &owner_id, &name).await?;
        character::set_default_character(db, found.id).await?;
        ctx.say(format!("⭐ **{}** is now your default character.", found.name))
            .await?;
        Ok(())
    }

    /// Deletes a character and their appearance.
    #[poise::command(slash_command, guild_only, rename = "delete")]
    pub async fn character_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the character to delete"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        name: String,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let found = editable(ctx, Some(&name), owner.as_ref(), Permission::DeleteCharacter).await?;
        character::delete_character(&ctx.data().database, found.id).await?;
        ctx.say(format!("🗑️ Character **{}** deleted.", found.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
