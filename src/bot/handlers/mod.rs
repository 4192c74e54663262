//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions that are not slash
//! command invocations: autocomplete, button presses and modal submissions.

/// Autocomplete handlers for command parameters
pub mod autocomplete;
/// Button press and modal submit delivery into the component registry
pub mod components;
