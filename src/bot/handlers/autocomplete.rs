//! Autocomplete handlers for Discord slash command parameters.

use crate::{bot::BotData, errors::Error};

/// Discord's limit on autocomplete suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Case-insensitive substring filter over `names`, sorted and capped at 25.
pub fn matching_names<'a>(names: impl IntoIterator<Item = &'a str>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .collect();

    matching.sort();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Provides autocomplete suggestions for command names, used by `/help`.
///
/// Commands hidden from help are never suggested.
pub async fn autocomplete_command_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let commands = &ctx.framework().options().commands;
    matching_names(
        commands
            .iter()
            .filter(|command| !command.hide_in_help)
            .map(|command| command.name.as_str()),
        partial,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_names_filters_case_insensitively() {
        let names = ["leaderboard", "Daily", "balance", "pay"];
        assert_eq!(matching_names(names, "A"), vec!["Daily", "balance", "leaderboard", "pay"]);
        assert_eq!(matching_names(names, "bal"), vec!["balance"]);
        assert!(matching_names(names, "zzz").is_empty());
    }

    #[test]
    fn test_matching_names_caps_suggestions() {
        let names: Vec<String> = (0..40).map(|i| format!("cmd{i:02}")).collect();
        let matching = matching_names(names.iter().map(String::as_str), "cmd");
        assert_eq!(matching.len(), MAX_SUGGESTIONS);
        assert_eq!(matching[0], "cmd00");
    }
}
