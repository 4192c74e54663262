//! Wallet entity - coin balance of one user in one guild.
//!
//! Wallets are created lazily the first time a user touches the economy and are
//! unique per (`guild_id`, `user_id`) pair.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Unique identifier for the wallet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID the wallet belongs to
    pub guild_id: String,
    /// Discord user ID of the owner
    pub user_id: String,
    /// Current coin balance, never negative
    pub coins: i64,
    /// When the daily reward was last claimed
    pub last_daily: Option<DateTimeUtc>,
}

/// Wallets have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
