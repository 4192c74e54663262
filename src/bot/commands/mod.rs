//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

use crate::{bot::BotData, errors::Error};

/// Coin economy commands
pub mod economy;

/// General utility commands
pub mod general;

// Export commands
pub use economy::*;
pub use general::*;

/// Every command the framework registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        links(),
        balance(),
        daily(),
        pay(),
        leaderboard(),
    ]
}
