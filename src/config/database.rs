//! Database configuration module.
//!
//! Handles `SQLite` connection setup and table creation using `SeaORM`'s
//! `Schema::create_table_from_entity`, so the schema always matches the entity
//! definitions without hand-written SQL.

use crate::entities::{Wallet, WalletColumn};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/component_buddy.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if database_url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut wallet_table = schema.create_table_from_entity(Wallet);
    wallet_table.if_not_exists();

    db.execute(builder.build(&wallet_table)).await?;

    // One wallet per user and guild
    let wallet_owner_index = Index::create()
        .name("idx_wallets_guild_user")
        .table(Wallet)
        .col(WalletColumn::GuildId)
        .col(WalletColumn::UserId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&wallet_owner_index)).await?;

    Ok(())
}
