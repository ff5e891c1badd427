//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module suggests roleplay, character, species, body part, pronoun and permission
//! names as the user types. Lookups that fail return no suggestions rather than an error.

use crate::{
    bot::BotData,
    core::{character, pronouns, roleplay, transformation},
    entities::{Bodypart, Permission},
    errors::Error,
};
use sea_orm::Iterable;

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Keeps the names containing `partial` (case-insensitive), sorted and capped.
fn matching<I>(names: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .collect();
    matching.sort();
    matching.dedup();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Provides autocomplete suggestions for roleplay names.
///
/// Suggests roleplays across the whole server, since commands such as `/roleplay join`
/// refer to roleplays owned by someone else.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
pub async fn autocomplete_roleplay_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Some(server_id) = ctx.guild_id() else {
        return Vec::new();
    };
    let db = &ctx.data().database;

    let Ok(roleplays) = roleplay::list_roleplays(db, &server_id.to_string(), None).await else {
        return Vec::new();
    };
    matching(roleplays.into_iter().map(|rp| rp.name), partial)
}

/// Suggests the invoker's own character names.
pub async fn autocomplete_character_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Some(server_id) = ctx.guild_id() else {
        return Vec::new();
    };
    let db = &ctx.data().database;
    let owner_id = ctx.author().id.to_string();

    let Ok(characters) =
        character::list_characters(db, &server_id.to_string(), &owner_id).await
    else {
        return Vec::new();
    };
    matching(characters.into_iter().map(|c| c.name), partial)
}

/// Suggests species from the catalog.
pub async fn autocomplete_species(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(species) = transformation::list_species(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(species.into_iter().map(|s| s.name), partial)
}

/// Suggests body parts.
#[allow(clippy::unused_async)] // poise requires autocomplete callbacks to be async
pub async fn autocomplete_bodypart(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(Bodypart::iter().map(|part| part.to_string()), partial)
}

/// Suggests pronoun families.
#[allow(clippy::unused_async)]
pub async fn autocomplete_pronouns(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(
        pronouns::FAMILIES.iter().map(|family| family.name.to_string()),
        partial,
    )
}

/// Suggests permission names.
#[allow(clippy::unused_async)]
pub async fn autocomplete_permission(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(Permission::iter().map(|permission| permission.name()), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_filters_case_insensitively() {
        let names = ["Tavern", "tavern brawl", "Forest"].map(String::from);
        assert_eq!(matching(names, "TAV"), ["Tavern", "tavern brawl"]);
    }

    #[test]
    fn test_matching_caps_suggestions() {
        let names = (0..40).map(|i| format!("rp{i:02}"));
        let suggestions = matching(names, "rp");
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0], "rp00");
    }
}
