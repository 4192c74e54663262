//! General Discord commands - ping, help, and links.
//! `/help` and `/links` are interactive: help is a paged view over the command
//! list and links carries a dismiss button next to an invite link.

use crate::core::message::Embed;
use std::collections::BTreeMap;

/// Category used for commands that do not declare one.
const DEFAULT_CATEGORY: &str = "General";
const HELP_COLOR: u32 = 0x0034_98DB;

/// One command as listed by `/help`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Command category
    pub category: String,
    /// Command name without the slash
    pub name: String,
    /// Short description
    pub description: String,
}

/// Builds help pages, one per category in alphabetical order.
///
/// With `only` set, returns a single page for that command, or no pages if it
/// does not exist.
#[must_use]
pub fn help_pages(entries: &[HelpEntry], only: Option<&str>) -> Vec<Embed> {
    if let Some(name) = only {
        return entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name.trim_start_matches('/')))
            .map(|entry| {
                vec![
                    Embed::new()
                        .title(format!("/{}", entry.name))
                        .description(entry.description.clone())
                        .footer(entry.category.clone())
                        .color(HELP_COLOR),
                ]
            })
            .unwrap_or_default();
    }

    let mut categories: BTreeMap<&str, Vec<&HelpEntry>> = BTreeMap::new();
    for entry in entries {
        categories.entry(entry.category.as_str()).or_default().push(entry);
    }

    categories
        .into_iter()
        .map(|(category, commands)| {
            commands.into_iter().fold(
                Embed::new()
                    .title(format!("📖 Help · {category}"))
                    .color(HELP_COLOR),
                |embed, entry| embed.field(format!("/{}", entry.name), &entry.description, false),
            )
        })
        .collect()
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{DEFAULT_CATEGORY, HelpEntry, help_pages};
    use crate::{
        bot::{BotData, handlers::autocomplete, run_interactive},
        core::{
            control::{Control, ControlStyle},
            message::{Embed, InteractiveMessage},
            paged::PagedView,
        },
        errors::{Error, Result},
    };
    use std::sync::Arc;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command, category = "General")]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Lists available commands, one page per category.
    #[poise::command(slash_command, prefix_command, category = "General")]
    pub async fn help(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Show only this command"]
        #[autocomplete = "autocomplete::autocomplete_command_name"]
        command: Option<String>,
    ) -> Result<()> {
        let entries: Vec<HelpEntry> = ctx
            .framework()
            .options()
            .commands
            .iter()
            .filter(|command| !command.hide_in_help)
            .map(|command| HelpEntry {
                category: command
                    .category
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                name: command.name.clone(),
                description: command.description.clone().unwrap_or_default(),
            })
            .collect();

        let pages = help_pages(&entries, command.as_deref());
        if pages.is_empty() {
            ctx.say(format!(
                "❓ No command named `{}`. Use `/help` to see all commands.",
                command.unwrap_or_default()
            ))
            .await?;
            return Ok(());
        }

        let data = ctx.data();
        let view = PagedView::new(
            &data.registry,
            pages,
            data.settings
                .components
                .paged_options_for(ctx.author().id.to_string()),
        )?;
        run_interactive(ctx, Arc::clone(view.message())).await
    }

    /// Shows the bot's invite link.
    #[poise::command(slash_command, category = "General")]
    pub async fn links(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let invite = format!(
            "https://discord.com/oauth2/authorize?client_id={}&scope=bot%20applications.commands",
            ctx.framework().bot_id
        );

        let message = InteractiveMessage::new(
            &data.registry,
            Embed::new()
                .title("🔗 Links")
                .description("Add me to your own server with the button below.")
                .color(0x0058_65F2),
            vec![
                Control::link("Invite", invite),
                Control::pressable("Dismiss").with_style(ControlStyle::Danger),
            ],
            &data.settings.components.message_options(),
        )?;

        let author = ctx.author().id.to_string();
        message.set_press_guard(move |event| event.user_id == author);
        let weak = Arc::downgrade(&message);
        message.on_press(move |_, _| {
            if let Some(message) = weak.upgrade() {
                message.destroy();
            }
        });

        run_interactive(ctx, message).await
    }
}

// Re-export all commands
pub use inner::*;
