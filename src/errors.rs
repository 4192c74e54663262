//! Unified error types for `ComponentBuddy`.
//!
//! Component lifecycle errors only cover programming invariant violations and
//! caller mistakes. Races such as a press on an expired control are not errors
//! and never reach this type.

use thiserror::Error;

/// Every failure the bot can surface, from the component core up to the framework.
#[derive(Debug, Error)]
pub enum Error {
    /// A control id was registered while another live instance still owns it.
    #[error("Control id '{control_id}' is already registered")]
    DuplicateId {
        /// The colliding control id
        control_id: String,
    },

    /// A page index outside `[0, len)` was requested.
    #[error("Page index {index} is out of range (0..{len})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of pages
        len: usize,
    },

    /// More controls than the configured layout can hold.
    #[error("Too many controls: {count} (at most {max})")]
    TooManyControls {
        /// Controls passed in
        count: usize,
        /// Layout capacity
        max: usize,
    },

    /// A paged view was built without pages.
    #[error("A paged view needs at least one page")]
    EmptyPages,

    /// Coin amount is zero, negative or otherwise unusable.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Wallet does not hold enough coins.
    #[error("Insufficient funds: have {current}, need {required}")]
    InsufficientFunds {
        /// Coins available
        current: i64,
        /// Coins requested
        required: i64,
    },

    /// Daily reward was already claimed within the cooldown window.
    #[error("Daily reward already claimed, try again in {remaining_secs}s")]
    DailyCooldown {
        /// Seconds until the next claim is allowed
        remaining_secs: i64,
    },

    /// Sender and recipient are the same user.
    #[error("Cannot transfer coins to yourself")]
    SelfTransfer,

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database failure from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Failure while formatting message text.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise failure.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
