//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the framework-agnostic core into Poise: it owns the shared
//! [`BotData`], starts the client, forwards component interactions to the
//! registry and renders interactive messages.

/// Discord command implementations (general, economy)
pub mod commands;
/// Discord interaction handlers (autocomplete, components)
pub mod handlers;
/// Core payload to Serenity builder conversion
pub mod render;

use crate::{
    config::settings::Settings,
    core::{message::InteractiveMessage, registry::ComponentRegistry},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared data available to all bot commands and event handlers.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Process-wide table of live control ids, empty at startup
    pub registry: Arc<ComponentRegistry>,
    /// Settings loaded at startup
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance with an empty component registry.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self {
            database,
            registry: Arc::new(ComponentRegistry::new()),
            settings,
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                "Error while handling event `{}`: {}",
                event.snake_case_name(),
                error
            );
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    if let serenity::FullEvent::InteractionCreate { interaction } = event {
        handlers::components::handle_interaction(ctx, interaction, data).await?;
    }
    Ok(())
}

/// Sends `message` as the command's reply and keeps it alive until it is destroyed.
///
/// Once destroyed (explicitly or by timeout) the sent message is edited to drop
/// its controls. A message without pressable controls is released right after
/// sending. A failed send destroys the message locally before returning
/// the error; a failed final edit is only logged.
pub async fn run_interactive(
    ctx: poise::Context<'_, BotData, Error>,
    message: Arc<InteractiveMessage>,
) -> Result<()> {
    let handle = match ctx.send(render::reply(&message.render())).await {
        Ok(handle) => handle,
        Err(e) => {
            message.destroy();
            return Err(e.into());
        }
    };

    if message.destroy_if_inert() {
        return Ok(());
    }
    message.closed().await;

    let final_state = render::reply(&message.render().without_controls());
    if let Err(e) = handle.edit(ctx, final_state).await {
        warn!(id = %message.id(), "Failed to remove controls after destroy: {}", e);
    }
    Ok(())
}

/// Starts the Discord client and blocks until it shuts down.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
