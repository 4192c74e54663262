//! Economy Discord commands - balance, daily, pay, and leaderboard.
//!
//! Wallets are scoped per guild, so every command here is guild-only. Expected
//! failures (cooldowns, insufficient funds) are answered with a friendly message
//! instead of bubbling up to the error handler.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, run_interactive},
        core::{economy, paged::PagedView},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use std::sync::Arc;

    async fn guild_key(ctx: poise::Context<'_, BotData, Error>) -> Result<Option<String>> {
        let guild_id = ctx.guild_id().map(|id| id.to_string());
        if guild_id.is_none() {
            ctx.say("❌ The economy only works inside a server.").await?;
        }
        Ok(guild_id)
    }

    /// Shows how many coins you (or another user) have.
    #[poise::command(slash_command, prefix_command, guild_only, category = "Economy")]
    pub async fn balance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let Some(guild_id) = guild_key(ctx).await? else {
            return Ok(());
        };
        let target = user.as_ref().unwrap_or_else(|| ctx.author());

        let data = ctx.data();
        let coins = economy::balance(
            &data.database,
            &guild_id,
            &target.id.to_string(),
            data.settings.economy.starting_balance,
        )
        .await?;
        ctx.say(format!("💰 <@{}> has **{coins}** coins.", target.id))
            .await?;
        Ok(())
    }

    /// Claims your daily coin reward.
    #[poise::command(slash_command, prefix_command, guild_only, category = "Economy")]
    pub async fn daily(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let Some(guild_id) = guild_key(ctx).await? else {
            return Ok(());
        };
        let data = ctx.data();
        let settings = &data.settings.economy;

        match economy::claim_daily(
            &data.database,
            &guild_id,
            &ctx.author().id.to_string(),
            settings,
            Utc::now(),
        )
        .await
        {
            Ok(wallet) => {
                ctx.say(format!(
                    "🎁 You claimed **{}** coins! You now have **{}** coins.",
                    settings.daily_reward, wallet.coins
                ))
                .await?;
            }
            Err(Error::DailyCooldown { remaining_secs }) => {
                ctx.say(format!(
                    "⏳ You already claimed your daily reward. Come back in {}.",
                    economy::format_cooldown(remaining_secs)
                ))
                .await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Sends coins to another user.
    #[poise::command(slash_command, prefix_command, guild_only, category = "Economy")]
    pub async fn pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who receives the coins"] user: serenity::User,
        #[description = "How many coins to send"]
        #[min = 1]
        amount: i64,
    ) -> Result<()> {
        let Some(guild_id) = guild_key(ctx).await? else {
            return Ok(());
        };
        if user.bot {
            ctx.say("❌ Bots don't need coins.").await?;
            return Ok(());
        }

        let data = ctx.data();
        let result = economy::transfer(
            &data.database,
            &guild_id,
            &ctx.author().id.to_string(),
            &user.id.to_string(),
            amount,
            data.settings.economy.starting_balance,
        )
        .await;

        let reply = match result {
            Ok((sender, _)) => format!(
                "✅ Sent **{amount}** coins to <@{}>. You have **{}** coins left.",
                user.id, sender.coins
            ),
            Err(Error::InsufficientFunds { current, .. }) => {
                format!("❌ Insufficient funds! You only have **{current}** coins.")
            }
            Err(Error::SelfTransfer) => "❌ You can't pay yourself.".to_string(),
            Err(Error::InvalidAmount { .. }) => {
                "❌ Invalid amount: must be greater than zero".to_string()
            }
            Err(e) => return Err(e),
        };
        ctx.say(reply).await?;
        Ok(())
    }

    /// Shows the richest users of this server.
    #[poise::command(slash_command, prefix_command, guild_only, category = "Economy")]
    pub async fn leaderboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let Some(guild_id) = guild_key(ctx).await? else {
            return Ok(());
        };
        let data = ctx.data();

        let entries = economy::leaderboard(&data.database, &guild_id).await?;
        let pages = economy::leaderboard_pages(&entries, data.settings.economy.leaderboard_page_size);

        let view = PagedView::new(
            &data.registry,
            pages,
            data.settings
                .components
                .paged_options_for(ctx.author().id.to_string()),
        )?;
        run_interactive(ctx, Arc::clone(view.message())).await
    }
}

// Re-export all commands
pub use inner::*;
