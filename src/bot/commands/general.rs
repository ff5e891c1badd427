//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Ambassador Help**\n\
        Here is a summary of the available command groups.\n\n\
        **Roleplay**\n\
        • `/roleplay create|start|stop|join|leave|invite|kick` - Run roleplay sessions.\n\
        • `/roleplay info|list|export|archive` - Browse roleplays and their logs.\n\n\
        **Characters**\n\
        • `/character create|list|show|edit|default|delete` - Manage your characters.\n\
        • `/transform shift|colour|pattern|remove|reset|save` - Change how a character looks.\n\
        • `/protection ...` - Decide who may transform your characters.\n\n\
        **Moderation**\n\
        • `/ban`, `/warn`, `/note` - Record and manage moderation actions.\n\
        • `/permission grant|revoke|list` - Manage who may do what.\n\
        • `/server ...` - Configure this server.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
