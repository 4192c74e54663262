//! Entity module - `SeaORM` entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod wallet;

pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
