//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for Ambassador, including all slash
//! commands, autocomplete handlers, the gateway event shim and the start-up of the
//! background behaviours.

/// Permission and context checks shared by commands
pub mod checks;
/// Fixed-choice command parameters
pub mod choices;
/// Discord command implementations
pub mod commands;
/// Discord interaction and gateway event handlers
pub mod handlers;

use crate::{
    behaviours::{
        EventQueue, EventReceiver, ExpirationBehaviour, RoleplayLoggingBehaviour,
        RoleplayTimeoutBehaviour, spawn_behaviour,
    },
    config::AppConfig,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application settings
    pub config: Arc<AppConfig>,
    /// Queue feeding gateway events to the roleplay logger
    pub events: EventQueue,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(
        database: DatabaseConnection,
        config: Arc<AppConfig>,
        events: EventQueue,
    ) -> Self {
        Self {
            database,
            config,
            events,
        }
    }
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::roleplay(),
        commands::character(),
        commands::transform(),
        commands::protection(),
        commands::ban(),
        commands::warn(),
        commands::note(),
        commands::permission(),
        commands::server(),
    ]
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!(error = %error, "Failed to start bot");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.is_user_error() {
                warn!(command = %ctx.command().qualified_name, error = %error, "Command rejected");
            } else {
                error!(command = %ctx.command().qualified_name, error = ?error, "Command failed");
            }
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!(error = %e, "Failed to send error message");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!(error = %e, "Error while handling error");
            }
        }
    }
}

/// Starts the background behaviours. Sending `true` on the returned sender stops them.
fn start_behaviours(
    database: &DatabaseConnection,
    config: &AppConfig,
    http: Arc<serenity::Http>,
    events: EventReceiver,
) -> Result<watch::Sender<bool>> {
    let timeout = chrono::Duration::from_std(config.roleplay_timeout).map_err(|e| {
        Error::Config {
            message: format!("Roleplay timeout out of range: {e}"),
        }
    })?;
    let (stop, shutdown) = watch::channel(false);
    let tick = config.behaviour_tick;

    spawn_behaviour(
        Arc::new(RoleplayTimeoutBehaviour::new(database.clone(), timeout)),
        tick,
        shutdown.clone(),
    );
    spawn_behaviour(
        Arc::new(ExpirationBehaviour::new(database.clone(), http)),
        tick,
        shutdown.clone(),
    );
    spawn_behaviour(
        Arc::new(RoleplayLoggingBehaviour::new(database.clone(), events)),
        tick,
        shutdown,
    );

    info!("Background behaviours started");
    Ok(stop)
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// # Errors
/// Returns an error if the client cannot be built or the gateway connection fails.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    database: DatabaseConnection,
) -> Result<()> {
    let (events, receiver) = EventQueue::new();
    let (stop_tx, mut stop_rx) = watch::channel::<Option<watch::Sender<bool>>>(None);

    let setup_config = Arc::clone(&config);
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(user = %ready.user.name, "Logged in");

                if let Some(guild_id) = setup_config.dev_guild_id {
                    let guild_id = serenity::GuildId::new(guild_id);
                    let commands = &framework.options().commands;
                    poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
                    info!(%guild_id, "Registered commands in development guild");
                } else {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Registered commands globally");
                }

                let stop = start_behaviours(&database, &setup_config, ctx.http.clone(), receiver)?;
                // Ignored if run_bot already returned
                let _ = stop_tx.send(Some(stop));

                Ok(BotData::new(database, setup_config, events))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    let result = client.start().await;

    if let Some(stop) = stop_rx.borrow_and_update().as_ref() {
        let _ = stop.send(true);
    }
    result.map_err(Error::from)
}
