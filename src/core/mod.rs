//! Core logic - framework-agnostic interactive components and the economy.
//!
//! Nothing in here knows about Discord. The bot layer renders the payloads
//! produced here and feeds interaction events back in.

/// Pressable and link controls
pub mod control;
/// Coin wallets, daily rewards and transfers
pub mod economy;
/// Interactive messages and their lifecycle
pub mod message;
/// Paged views built on interactive messages
pub mod paged;
/// Control id to message routing
pub mod registry;
