//! Conversion of core payloads into Serenity/Poise builders.
//!
//! The core describes messages in its own terms ([`RenderedMessage`]); this
//! module is the only place that knows how they map onto Discord embeds,
//! buttons, replies and interaction responses.

use crate::core::{
    control::{Control, ControlStyle},
    message::{Content, Embed, RenderedControl, RenderedMessage},
};
use poise::serenity_prelude as serenity;

/// Custom id of the single text input inside a prompt modal.
pub const PROMPT_INPUT_ID: &str = "value";

/// Maps a core embed onto a Serenity embed.
#[must_use]
pub fn embed(embed: &Embed) -> serenity::CreateEmbed {
    let mut created = serenity::CreateEmbed::new();
    if let Some(title) = &embed.title {
        created = created.title(title);
    }
    if let Some(description) = &embed.description {
        created = created.description(description);
    }
    for field in &embed.fields {
        created = created.field(&field.name, &field.value, field.inline);
    }
    if let Some(color) = embed.color {
        created = created.color(color);
    }
    if let Some(thumbnail) = &embed.thumbnail {
        created = created.thumbnail(thumbnail);
    }
    if let Some(footer) = &embed.footer {
        created = created.footer(serenity::CreateEmbedFooter::new(footer));
    }
    created
}

const fn button_style(style: ControlStyle) -> serenity::ButtonStyle {
    match style {
        ControlStyle::Primary => serenity::ButtonStyle::Primary,
        ControlStyle::Secondary => serenity::ButtonStyle::Secondary,
        ControlStyle::Success => serenity::ButtonStyle::Success,
        ControlStyle::Danger => serenity::ButtonStyle::Danger,
    }
}

fn button(rendered: &RenderedControl) -> serenity::CreateButton {
    match (&rendered.control, &rendered.control_id) {
        (Control::Link { label, url }, _) => serenity::CreateButton::new_link(url).label(label),
        (
            Control::Pressable {
                label,
                style,
                emoji,
            },
            control_id,
        ) => {
            let created = serenity::CreateButton::new(control_id.as_deref().unwrap_or_default())
                .label(label)
                .style(button_style(*style));
            match emoji {
                Some(emoji) => created.emoji(serenity::ReactionType::Unicode(emoji.clone())),
                None => created,
            }
        }
    }
}

/// Maps control rows onto Discord action rows.
#[must_use]
pub fn action_rows(rows: &[Vec<RenderedControl>]) -> Vec<serenity::CreateActionRow> {
    rows.iter()
        .map(|row| serenity::CreateActionRow::Buttons(row.iter().map(button).collect()))
        .collect()
}

fn embeds(content: &Content) -> Vec<serenity::CreateEmbed> {
    match content {
        Content::Text(_) => Vec::new(),
        Content::Embeds(blocks) => blocks.iter().map(embed).collect(),
    }
}

fn text(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Embeds(_) => String::new(),
    }
}

/// Builds a command reply (initial send or edit) from a rendered message.
#[must_use]
pub fn reply(rendered: &RenderedMessage) -> poise::CreateReply {
    let mut created = poise::CreateReply::default().components(action_rows(&rendered.rows));
    if let Content::Text(content) = &rendered.content {
        created = created.content(content);
    }
    embeds(&rendered.content)
        .into_iter()
        .fold(created, poise::CreateReply::embed)
}

/// Builds an interaction response that replaces the pressed message in place.
#[must_use]
pub fn update_response(rendered: &RenderedMessage) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::UpdateMessage(
        serenity::CreateInteractionResponseMessage::new()
            .content(text(&rendered.content))
            .embeds(embeds(&rendered.content))
            .components(action_rows(&rendered.rows)),
    )
}

/// Builds a modal asking for one line of text. Its custom id is the control id,
/// so the submission routes back to the same control.
#[must_use]
pub fn prompt_modal(control_id: &str, title: &str, label: &str) -> serenity::CreateInteractionResponse {
    let input = serenity::CreateInputText::new(serenity::InputTextStyle::Short, label, PROMPT_INPUT_ID)
        .required(true);
    serenity::CreateInteractionResponse::Modal(
        serenity::CreateModal::new(control_id, title)
            .components(vec![serenity::CreateActionRow::InputText(input)]),
    )
}
