//! Economy business logic - coin wallets, daily rewards, transfers and the leaderboard.
//!
//! All balance changes go through single `UPDATE ... SET coins = coins + delta`
//! statements so concurrent commands cannot lose updates.

use crate::{
    config::settings::EconomySettings,
    core::message::Embed,
    entities::{Wallet, wallet},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Sidebar colour of leaderboard pages.
const LEADERBOARD_COLOR: u32 = 0x00F1_C40F;

/// Finds the wallet of `user_id` in `guild_id`, if one exists.
pub async fn find_wallet<C>(db: &C, guild_id: &str, user_id: &str) -> Result<Option<wallet::Model>>
where
    C: ConnectionTrait,
{
    Wallet::find()
        .filter(wallet::Column::GuildId.eq(guild_id))
        .filter(wallet::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's wallet, creating it with `starting_balance` coins on first use.
pub async fn get_or_create_wallet<C>(
    db: &C,
    guild_id: &str,
    user_id: &str,
    starting_balance: i64,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_wallet(db, guild_id, user_id).await? {
        return Ok(existing);
    }

    let wallet = wallet::ActiveModel {
        guild_id: Set(guild_id.to_string()),
        user_id: Set(user_id.to_string()),
        coins: Set(starting_balance.max(0)),
        last_daily: Set(None),
        ..Default::default()
    };
    match wallet.insert(db).await {
        Ok(created) => Ok(created),
        // Lost the race against a concurrent command for the same user.
        Err(e) => find_wallet(db, guild_id, user_id)
            .await?
            .ok_or_else(|| Error::from(e)),
    }
}

/// Coins held by the user. Users without a wallet hold the starting balance.
pub async fn balance(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
    starting_balance: i64,
) -> Result<i64> {
    Ok(find_wallet(db, guild_id, user_id)
        .await?
        .map_or(starting_balance, |wallet| wallet.coins))
}

fn missing_wallet(wallet_id: i64) -> Error {
    Error::Database(DbErr::RecordNotFound(format!("wallet {wallet_id}")))
}

/// Adds `delta` coins to a wallet in a single statement.
async fn add_coins<C>(db: &C, wallet_id: i64, delta: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Wallet::update_many()
        .col_expr(
            wallet::Column::Coins,
            Expr::col(wallet::Column::Coins).add(delta),
        )
        .filter(wallet::Column::Id.eq(wallet_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Grants the daily reward.
///
/// Fails with [`Error::DailyCooldown`] if the previous claim happened less than
/// `daily_cooldown_hours` before `now`.
pub async fn claim_daily(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
    settings: &EconomySettings,
    now: DateTime<Utc>,
) -> Result<wallet::Model> {
    let txn = db.begin().await?;
    let wallet = get_or_create_wallet(&txn, guild_id, user_id, settings.starting_balance).await?;

    if let Some(last) = wallet.last_daily {
        let next_claim = Duration::try_hours(settings.daily_cooldown_hours)
            .and_then(|cooldown| last.checked_add_signed(cooldown))
            .ok_or_else(|| Error::Config {
                message: format!(
                    "daily_cooldown_hours out of range: {}",
                    settings.daily_cooldown_hours
                ),
            })?;
        if now < next_claim {
            return Err(Error::DailyCooldown {
                remaining_secs: (next_claim - now).num_seconds(),
            });
        }
    }

    add_coins(&txn, wallet.id, settings.daily_reward).await?;
    let mut stamped: wallet::ActiveModel = Wallet::find_by_id(wallet.id)
        .one(&txn)
        .await?
        .ok_or_else(|| missing_wallet(wallet.id))?
        .into();
    stamped.last_daily = Set(Some(now));
    let updated = stamped.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Moves `amount` coins between two users of the same guild.
///
/// Returns the sender and recipient wallets after the transfer.
pub async fn transfer(
    db: &DatabaseConnection,
    guild_id: &str,
    from_user: &str,
    to_user: &str,
    amount: i64,
    starting_balance: i64,
) -> Result<(wallet::Model, wallet::Model)> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if from_user == to_user {
        return Err(Error::SelfTransfer);
    }

    let txn = db.begin().await?;

    let sender = get_or_create_wallet(&txn, guild_id, from_user, starting_balance).await?;
    if sender.coins < amount {
        return Err(Error::InsufficientFunds {
            current: sender.coins,
            required: amount,
        });
    }
    let recipient = get_or_create_wallet(&txn, guild_id, to_user, starting_balance).await?;

    add_coins(&txn, sender.id, -amount).await?;
    add_coins(&txn, recipient.id, amount).await?;

    let sender = Wallet::find_by_id(sender.id)
        .one(&txn)
        .await?
        .ok_or_else(|| missing_wallet(sender.id))?;
    let recipient = Wallet::find_by_id(recipient.id)
        .one(&txn)
        .await?
        .ok_or_else(|| missing_wallet(recipient.id))?;

    txn.commit().await?;
    Ok((sender, recipient))
}

/// All wallets of a guild, richest first.
pub async fn leaderboard(db: &DatabaseConnection, guild_id: &str) -> Result<Vec<wallet::Model>> {
    Wallet::find()
        .filter(wallet::Column::GuildId.eq(guild_id))
        .order_by_desc(wallet::Column::Coins)
        .order_by_asc(wallet::Column::UserId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Splits leaderboard entries into embed pages of `page_size` ranks each.
///
/// Always returns at least one page so the result can back a paged view.
#[must_use]
pub fn leaderboard_pages(entries: &[wallet::Model], page_size: usize) -> Vec<Embed> {
    let title = "🏆 Leaderboard";
    if entries.is_empty() {
        return vec![
            Embed::new()
                .title(title)
                .description("Nobody has earned any coins yet. Try `/daily`!")
                .color(LEADERBOARD_COLOR),
        ];
    }

    let page_size = page_size.max(1);
    entries
        .chunks(page_size)
        .enumerate()
        .map(|(page, chunk)| {
            let lines: Vec<String> = chunk
                .iter()
                .enumerate()
                .map(|(offset, wallet)| {
                    let rank = page * page_size + offset + 1;
                    format!("**#{rank}** <@{}> · {} coins", wallet.user_id, wallet.coins)
                })
                .collect();
            Embed::new()
                .title(title)
                .description(lines.join("\n"))
                .color(LEADERBOARD_COLOR)
        })
        .collect()
}

/// Formats a cooldown as `"Xh Ym"` for user-facing messages.
#[must_use]
pub fn format_cooldown(remaining_secs: i64) -> String {
    let total_minutes = (remaining_secs.max(0) + 59) / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use chrono::TimeZone;

    const GUILD: &str = "guild1";

    fn settings() -> EconomySettings {
        EconomySettings {
            starting_balance: 0,
            daily_reward: 100,
            daily_cooldown_hours: 24,
            leaderboard_page_size: 10,
        }
    }

    #[tokio::test]
    async fn test_balance_without_wallet_is_starting_balance() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(balance(&db, GUILD, "nobody", 0).await?, 0);
        assert_eq!(balance(&db, GUILD, "nobody", 50).await?, 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_wallet_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let first = get_or_create_wallet(&db, GUILD, "u1", 50).await?;
        let second = get_or_create_wallet(&db, GUILD, "u1", 999).await?;
        assert_eq!(first, second);
        assert_eq!(second.coins, 50);

        let other_guild = get_or_create_wallet(&db, "guild2", "u1", 5).await?;
        assert_ne!(other_guild.id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_daily_respects_cooldown() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        let wallet = claim_daily(&db, GUILD, "u1", &settings(), now).await?;
        assert_eq!(wallet.coins, 100);
        assert!(wallet.last_daily.is_some());

        let err = claim_daily(&db, GUILD, "u1", &settings(), now + Duration::hours(23))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DailyCooldown { remaining_secs } if remaining_secs == 3600
        ));
        assert_eq!(balance(&db, GUILD, "u1", 0).await?, 100);

        let wallet = claim_daily(&db, GUILD, "u1", &settings(), now + Duration::hours(24)).await?;
        assert_eq!(wallet.coins, 200);
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_daily_rejects_out_of_range_cooldown() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let settings = EconomySettings {
            daily_cooldown_hours: i64::MAX,
            ..settings()
        };

        claim_daily(&db, GUILD, "u1", &settings, now).await?;
        let err = claim_daily(&db, GUILD, "u1", &settings, now + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(balance(&db, GUILD, "u1", 0).await?, 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_moves_coins() -> Result<()> {
        let db = setup_test_db().await?;
        get_or_create_wallet(&db, GUILD, "alice", 300).await?;

        let (sender, recipient) = transfer(&db, GUILD, "alice", "bob", 120, 0).await?;
        assert_eq!(sender.coins, 180);
        assert_eq!(recipient.coins, 120);
        assert_eq!(balance(&db, GUILD, "bob", 0).await?, 120);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_validation() -> Result<()> {
        let db = setup_test_db().await?;
        get_or_create_wallet(&db, GUILD, "alice", 10).await?;

        assert!(matches!(
            transfer(&db, GUILD, "alice", "bob", 0, 0).await.unwrap_err(),
            Error::InvalidAmount { amount: 0 }
        ));
        assert!(matches!(
            transfer(&db, GUILD, "alice", "alice", 5, 0).await.unwrap_err(),
            Error::SelfTransfer
        ));
        assert!(matches!(
            transfer(&db, GUILD, "alice", "bob", 11, 0).await.unwrap_err(),
            Error::InsufficientFunds {
                current: 10,
                required: 11
            }
        ));
        assert_eq!(balance(&db, GUILD, "alice", 0).await?, 10);
        assert_eq!(balance(&db, GUILD, "bob", 0).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_coins() -> Result<()> {
        let db = setup_test_db().await?;
        get_or_create_wallet(&db, GUILD, "low", 5).await?;
        get_or_create_wallet(&db, GUILD, "high", 500).await?;
        get_or_create_wallet(&db, GUILD, "mid", 50).await?;
        get_or_create_wallet(&db, "elsewhere", "rich", 10_000).await?;

        let board = leaderboard(&db, GUILD).await?;
        let users: Vec<&str> = board.iter().map(|w| w.user_id.as_str()).collect();
        assert_eq!(users, vec!["high", "mid", "low"]);
        Ok(())
    }

    #[test]
    fn test_leaderboard_pages_chunk_and_rank() {
        let entries: Vec<wallet::Model> = (0..12)
            .map(|i| wallet::Model {
                id: i,
                guild_id: GUILD.to_string(),
                user_id: format!("u{i}"),
                coins: 1000 - i,
                last_daily: None,
            })
            .collect();

        let pages = leaderboard_pages(&entries, 5);
        assert_eq!(pages.len(), 3);
        let last = pages[2].description.clone().unwrap();
        assert!(last.starts_with("**#11** <@u10>"));
        assert_eq!(last.lines().count(), 2);
    }

    #[test]
    fn test_leaderboard_pages_never_empty() {
        let pages = leaderboard_pages(&[], 10);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_format_cooldown() {
        assert_eq!(format_cooldown(3600), "1h 0m");
        assert_eq!(format_cooldown(61), "2m");
        assert_eq!(format_cooldown(5 * 3600 + 30 * 60), "5h 30m");
    }
}
