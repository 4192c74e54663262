//! Component interaction delivery.
//!
//! Every button press and modal submission Discord sends is turned into a
//! [`PressEvent`] and routed through the [`ComponentRegistry`]. The registry's
//! answer decides how the interaction is acknowledged: an in-place update of
//! the message, a prompt modal, or a silent acknowledge for stale and refused
//! presses.
//!
//! [`ComponentRegistry`]: crate::core::registry::ComponentRegistry

use crate::{
    bot::{BotData, render},
    core::{
        message::{PressEvent, PressReply},
        registry::Dispatch,
    },
    errors::Result,
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::trace;

/// Entry point from the framework's event handler.
pub async fn handle_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::Interaction,
    data: &BotData,
) -> Result<()> {
    match interaction {
        serenity::Interaction::Component(component) => {
            handle_component(ctx, component, data).await
        }
        serenity::Interaction::Modal(modal) => handle_modal_submit(ctx, modal, data).await,
        _ => Ok(()),
    }
}

async fn handle_component(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &BotData,
) -> Result<()> {
    let control_id = component.data.custom_id.clone();
    trace!(%control_id, user = %component.user.id, "button pressed");

    let event = PressEvent::new(control_id.clone(), component.user.id.to_string())
        .with_raw(Arc::new(component.clone()));
    let outcome = data.registry.dispatch(event);

    component
        .create_response(&ctx.http, response_for(outcome, &control_id))
        .await?;
    Ok(())
}

async fn handle_modal_submit(
    ctx: &serenity::Context,
    modal: &serenity::ModalInteraction,
    data: &BotData,
) -> Result<()> {
    let control_id = modal.data.custom_id.clone();
    let Some(input) = submitted_text(&modal.data.components) else {
        trace!(%control_id, "modal submitted without text input");
        modal
            .create_response(&ctx.http, serenity::CreateInteractionResponse::Acknowledge)
            .await?;
        return Ok(());
    };

    let event = PressEvent::new(control_id.clone(), modal.user.id.to_string())
        .with_input(input)
        .with_raw(Arc::new(modal.clone()));
    let outcome = data.registry.dispatch(event);

    modal
        .create_response(&ctx.http, response_for(outcome, &control_id))
        .await?;
    Ok(())
}

/// Value of the prompt's text input, if the submission carries one.
fn submitted_text(rows: &[serenity::ActionRow]) -> Option<String> {
    rows.iter()
        .flat_map(|row| &row.components)
        .find_map(|component| match component {
            serenity::ActionRowComponent::InputText(input)
                if input.custom_id == render::PROMPT_INPUT_ID =>
            {
                input.value.clone()
            }
            _ => None,
        })
}

/// Chooses the interaction response for a dispatch outcome.
fn response_for(outcome: Dispatch, control_id: &str) -> serenity::CreateInteractionResponse {
    match outcome {
        Dispatch::Ignored => serenity::CreateInteractionResponse::Acknowledge,
        Dispatch::Handled { message, reply } => match reply {
            PressReply::Prompt { title, label } => render::prompt_modal(control_id, &title, &label),
            PressReply::Update if message.is_destroyed() => {
                render::update_response(&message.render().without_controls())
            }
            PressReply::Update => render::update_response(&message.render()),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        control::Control,
        message::{InteractiveMessage, MessageOptions},
        registry::ComponentRegistry,
    };

    fn message(registry: &Arc<ComponentRegistry>) -> Arc<InteractiveMessage> {
        let options = MessageOptions {
            timeout: None,
            ..MessageOptions::default()
        };
        InteractiveMessage::new(registry, "hi", vec![Control::pressable("A")], &options).unwrap()
    }

    #[test]
    fn test_ignored_press_is_acknowledged() {
        assert!(matches!(
            response_for(Dispatch::Ignored, "x@0"),
            serenity::CreateInteractionResponse::Acknowledge
        ));
    }

    #[test]
    fn test_handled_press_updates_message() {
        let registry = Arc::new(ComponentRegistry::new());
        let message = message(&registry);
        let outcome = Dispatch::Handled {
            message,
            reply: PressReply::Update,
        };
        assert!(matches!(
            response_for(outcome, "x@0"),
            serenity::CreateInteractionResponse::UpdateMessage(_)
        ));
    }

    #[test]
    fn test_prompt_reply_opens_modal() {
        let registry = Arc::new(ComponentRegistry::new());
        let message = message(&registry);
        let outcome = Dispatch::Handled {
            message,
            reply: PressReply::Prompt {
                title: "Go to page".to_string(),
                label: "Page".to_string(),
            },
        };
        assert!(matches!(
            response_for(outcome, "x@0"),
            serenity::CreateInteractionResponse::Modal(_)
        ));
    }
}
