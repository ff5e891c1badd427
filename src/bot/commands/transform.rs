//! Transformation Discord commands - shifting body parts, colours and patterns.
//!
//! Transforming someone else's character needs both the `transform` permission for
//! other users and the owner's consent through their protection settings.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks, choices::Side, handlers::autocomplete},
        core::{protection, transformation},
        entities::{CharacterModel, Chirality, Permission},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::info;

    /// Resolves the character to transform and checks permission and consent.
    async fn transformable(
        ctx: poise::Context<'_, BotData, Error>,
        name: Option<&str>,
        owner: Option<&serenity::User>,
    ) -> Result<CharacterModel> {
        let owner_id = owner.unwrap_or_else(|| ctx.author()).id.to_string();
        let target = checks::find_character(ctx, &owner_id, name).await?;
        checks::require_permission(ctx, Permission::Transform, &target.owner_id).await?;

        let invoker_id = ctx.author().id.to_string();
        protection::can_transform(
            &ctx.data().database,
            &target.server_id,
            &invoker_id,
            &target.owner_id,
        )
        .await?;
        Ok(target)
    }

    /// Parent command for transformations.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands(
            "transform_shift",
            "transform_colour",
            "transform_pattern",
            "transform_remove",
            "transform_reset",
            "transform_save",
            "transform_species"
        )
    )]
    pub async fn transform(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Transformation command. Available subcommands:\n\
            `/transform shift` - Turn a body part into another species' part\n\
            `/transform colour` / `pattern` - Recolour a body part\n\
            `/transform remove` - Remove a body part\n\
            `/transform reset` / `save` - Revert to or overwrite the default appearance\n\
            `/transform species` - Browse the species catalog";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shifts a body part into the given species' version of it.
    #[poise::command(slash_command, guild_only, rename = "shift")]
    pub async fn transform_shift(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Body part to shift"]
        #[autocomplete = "autocomplete::autocomplete_bodypart"]
        bodypart: String,
        #[description = "Species to shift it into"]
        #[autocomplete = "autocomplete::autocomplete_species"]
        species: String,
        #[description = "Only one side (default: both)"] side: Option<Side>,
        #[description = "Name of the character (default: their default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        character: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let bodypart = checks::parse_bodypart(&bodypart)?;
        let target = transformable(ctx, character.as_deref(), owner.as_ref()).await?;

        let outcome = transformation::shift_bodypart(
            &ctx.data().database,
            &target,
            bodypart,
            side.map(Chirality::from),
            &species,
        )
        .await?;

        info!(character_id = target.id, %bodypart, %species, action = ?outcome.action, "Shifted");
        ctx.say(outcome.message).await?;
        Ok(())
    }

    /// Changes the base colour of a body part.
    #[poise::command(slash_command, guild_only, rename = "colour")]
    pub async fn transform_colour(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Body part to recolour"]
        #[autocomplete = "autocomplete::autocomplete_bodypart"]
        bodypart: String,
        #[description = "New colour (e.g. 'jet black')"] colour: String,
        #[description = "Only one side (default: both)"] side: Option<Side>,
        #[description = "Name of the character (default: their default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        character: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let bodypart = checks::parse_bodypart(&bodypart)?;
        let target = transformable(ctx, character.as_deref(), owner.as_ref()).await?;

        let outcome = transformation::shift_colour(
            &ctx.data().database,
            &target,
            bodypart,
            side.map(Chirality::from),
            &colour,
        )
        .await?;

        ctx.say(outcome.message).await?;
        Ok(())
    }

    /// Adds, changes or clears the pattern on a body part.
    #[poise::command(slash_command, guild_only, rename = "pattern")]
    pub async fn transform_pattern(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Body part to change"]
        #[autocomplete = "autocomplete::autocomplete_bodypart"]
        bodypart: String,
        #[description = "Pattern (e.g. 'stripes'); leave empty to remove it"] pattern: Option<
            String,
        >,
        #[description = "Pattern colour (e.g. 'white')"] pattern_colour: Option<String>,
        #[description = "Only one side (default: both)"] side: Option<Side>,
        #[description = "Name of the character (default: their default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        character: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let bodypart = checks::parse_bodypart(&bodypart)?;
        let target = transformable(ctx, character.as_deref(), owner.as_ref()).await?;

        let outcome = transformation::shift_pattern(
            &ctx.data().database,
            &target,
            bodypart,
            side.map(Chirality::from),
            pattern.as_deref(),
            pattern_colour.as_deref(),
        )
        .await?;

        ctx.say(outcome.message).await?;
        Ok(())
    }

    /// Removes a body part.
    #[poise::command(slash_command, guild_only, rename = "remove")]
    pub async fn transform_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Body part to remove"]
        #[autocomplete = "autocomplete::autocomplete_bodypart"]
        bodypart: String,
        #[description = "Only one side (default: both)"] side: Option<Side>,
        #[description = "Name of the character (default: their default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        character: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let bodypart = checks::parse_bodypart(&bodypart)?;
        let target = transformable(ctx, character.as_deref(), owner.as_ref()).await?;

        let outcome = transformation::remove_bodypart(
            &ctx.data().database,
            &target,
            bodypart,
            side.map(Chirality::from),
        )
        .await?;

        ctx.say(outcome.message).await?;
        Ok(())
    }

    /// Reverts a character to their default appearance.
    #[poise::command(slash_command, guild_only, rename = "reset")]
    pub async fn transform_reset(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the character (default: their default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        character: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let target = transformable(ctx, character.as_deref(), owner.as_ref()).await?;
        transformation::reset_appearance(&ctx.data().database, target.id).await?;

        ctx.say(format!("✨ **{}** is back to their usual self.", target.name))
            .await?;
        Ok(())
    }

    /// Makes a character's current appearance their default.
    #[poise::command(slash_command, guild_only, rename = "save")]
    pub async fn transform_save(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the character (default: your default character)"]
        #[autocomplete = "autocomplete::autocomplete_character_name"]
        character: Option<String>,
        #[description = "Owner of the character (default: you)"] owner: Option<serenity::User>,
    ) -> Result<()> {
        let owner_id = owner.as_ref().unwrap_or_else(|| ctx.author()).id.to_string();
        let target = checks::find_character(ctx, &owner_id, character.as_deref()).await?;
        checks::require_permission(ctx, Permission::EditCharacter, &target.owner_id).await?;

        transformation::save_current_as_default(&ctx.data().database, target.id).await?;
        ctx.say(format!(
            "💾 **{}**'s current appearance is now their default.",
            target.name
        ))
        .await?;
        Ok(())
    }

    /// Lists the species in the catalog, or the body parts one species offers.
    #[poise::command(slash_command, guild_only, rename = "species")]
    pub async fn transform_species(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Show the body parts of this species"]
        #[autocomplete = "autocomplete::autocomplete_species"]
        name: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let Some(name) = name else {
            let species = transformation::list_species(db).await?;
            if species.is_empty() {
                ctx.say("🧬 The species catalog is empty.").await?;
                return Ok(());
            }
            let mut response = String::from("**Species**\n");
            for entry in &species {
                writeln!(&mut response, "• **{}** - {}", entry.name, entry.description)?;
            }
            ctx.say(response).await?;
            return Ok(());
        };

        let species = transformation::get_species_by_name(db, &name).await?;
        let transformations = transformation::list_transformations(db, species.id).await?;

        let mut response = format!("**{}**\n{}\n\n", species.name, species.description);
        for entry in &transformations {
            let nsfw = if entry.is_nsfw { " 🔞" } else { "" };
            writeln!(
                &mut response,
                "• **{}**{nsfw} - {}",
                entry.bodypart, entry.description
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
