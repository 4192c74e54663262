//! Component registry - routes inbound press events to the interactive message
//! that owns the pressed control.
//!
//! The registry holds non-owning references only. An entry never keeps its
//! message alive, and a message removes its entries when it is destroyed or
//! dropped. Lookups that hit a stale entry prune it and ignore the press.

use crate::{
    core::message::{InteractiveMessage, PressEvent, PressReply},
    errors::{Error, Result},
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};
use tracing::{debug, trace};

/// Outcome of routing a press event.
#[derive(Debug)]
pub enum Dispatch {
    /// Unknown control, destroyed owner, or a press the owner refused.
    Ignored,
    /// The owning message handled the press.
    Handled {
        /// Message that owns the pressed control
        message: Arc<InteractiveMessage>,
        /// How the delivery layer should answer the interaction
        reply: PressReply,
    },
}

/// Process-wide table of active control ids.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    active: Mutex<HashMap<String, Weak<InteractiveMessage>>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Weak<InteractiveMessage>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `ids` as owned by `owner`.
    ///
    /// Either every id is registered or none is. Fails with
    /// [`Error::DuplicateId`] when an id is already held by a live message or
    /// appears twice in `ids`.
    pub fn add_controls(&self, ids: &[String], owner: &Weak<InteractiveMessage>) -> Result<()> {
        let mut active = self.lock();

        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            let live = active
                .get(id)
                .is_some_and(|existing| existing.strong_count() > 0);
            if live || !seen.insert(id.as_str()) {
                return Err(Error::DuplicateId {
                    control_id: id.clone(),
                });
            }
        }

        for id in ids {
            active.insert(id.clone(), Weak::clone(owner));
        }
        trace!(count = ids.len(), "registered controls");
        Ok(())
    }

    /// Unregisters `ids`. Unknown ids are ignored.
    pub fn remove_controls<S: AsRef<str>>(&self, ids: &[S]) {
        let mut active = self.lock();
        for id in ids {
            active.remove(id.as_ref());
        }
    }

    /// Routes a press to the owning message.
    ///
    /// Never fails: presses for unknown or expired controls are dropped, since
    /// they may legitimately arrive after the owner was destroyed.
    pub fn dispatch(&self, event: PressEvent) -> Dispatch {
        let owner = {
            let mut active = self.lock();
            match active.get(&event.control_id).map(Weak::upgrade) {
                Some(Some(message)) => Some(message),
                Some(None) => {
                    active.remove(&event.control_id);
                    None
                }
                None => None,
            }
        };

        let Some(message) = owner else {
            debug!(control_id = %event.control_id, "ignoring press for unknown control");
            return Dispatch::Ignored;
        };

        match message.handle_press(event) {
            Some(reply) => Dispatch::Handled { message, reply },
            None => Dispatch::Ignored,
        }
    }

    /// Whether `id` currently maps to an entry.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Number of registered control ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no control ids are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        control::Control,
        message::{InteractiveMessage, MessageOptions},
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn no_timeout() -> MessageOptions {
        MessageOptions {
            timeout: None,
            ..MessageOptions::default()
        }
    }

    fn three_buttons() -> Vec<Control> {
        vec![
            Control::pressable("A"),
            Control::pressable("B"),
            Control::pressable("C"),
        ]
    }

    #[test]
    fn test_add_controls_rejects_live_duplicate() {
        let registry = Arc::new(ComponentRegistry::new());
        let message =
            InteractiveMessage::new(&registry, "hi", three_buttons(), &no_timeout()).unwrap();
        let taken = message.control_ids().next().unwrap().to_string();

        let err = registry
            .add_controls(&[taken.clone()], &Arc::downgrade(&message))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateId { control_id } if control_id == taken));
    }

    #[test]
    fn test_add_controls_is_all_or_nothing() {
        let registry = Arc::new(ComponentRegistry::new());
        let message =
            InteractiveMessage::new(&registry, "hi", three_buttons(), &no_timeout()).unwrap();
        let taken = message.control_ids().next().unwrap().to_string();
        let before = registry.len();

        let result = registry.add_controls(
            &["fresh@0".to_string(), taken],
            &Arc::downgrade(&message),
        );
        assert!(result.is_err());
        assert_eq!(registry.len(), before);
        assert!(!registry.contains("fresh@0"));
    }

    #[test]
    fn test_add_controls_rejects_duplicate_within_batch() {
        let registry = ComponentRegistry::new();
        let result = registry.add_controls(&["x@0".to_string(), "x@0".to_string()], &Weak::new());
        assert!(matches!(result, Err(Error::DuplicateId { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_unknown_ids_is_noop() {
        let registry = ComponentRegistry::new();
        registry.remove_controls(&["nope@0", "nope@1"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dispatch_unknown_id_is_ignored() {
        let registry = ComponentRegistry::new();
        let outcome = registry.dispatch(PressEvent::new("missing@0", "U1"));
        assert!(matches!(outcome, Dispatch::Ignored));
    }

    #[test]
    fn test_dispatch_routes_only_to_owner() {
        let registry = Arc::new(ComponentRegistry::new());
        let a = InteractiveMessage::new(&registry, "a", three_buttons(), &no_timeout()).unwrap();
        let b = InteractiveMessage::new(&registry, "b", three_buttons(), &no_timeout()).unwrap();

        let a_hits = Arc::new(AtomicUsize::new(0));
        let b_hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&a_hits);
        a.on_press(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&b_hits);
        b.on_press(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let id = a.control_ids().nth(1).unwrap().to_string();
        let outcome = registry.dispatch(PressEvent::new(id, "U1"));

        match outcome {
            Dispatch::Handled { message, reply } => {
                assert_eq!(message.id(), a.id());
                assert_eq!(reply, PressReply::Update);
            }
            Dispatch::Ignored => panic!("press should have been handled"),
        }
        assert_eq!(a_hits.load(Ordering::SeqCst), 1);
        assert_eq!(b_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropped_owner_leaves_no_entries() {
        let registry = Arc::new(ComponentRegistry::new());
        let message =
            InteractiveMessage::new(&registry, "hi", three_buttons(), &no_timeout()).unwrap();
        let id = message.control_ids().next().unwrap().to_string();
        assert_eq!(registry.len(), 3);

        drop(message);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.dispatch(PressEvent::new(id, "U1")),
            Dispatch::Ignored
        ));
    }

    #[test]
    fn test_stale_entry_is_pruned_on_dispatch() {
        let registry = ComponentRegistry::new();
        registry
            .add_controls(&["ghost@0".to_string()], &Weak::new())
            .unwrap();
        assert!(registry.contains("ghost@0"));

        let outcome = registry.dispatch(PressEvent::new("ghost@0", "U1"));
        assert!(matches!(outcome, Dispatch::Ignored));
        assert!(!registry.contains("ghost@0"));
    }

    #[test]
    fn test_stale_entry_can_be_reclaimed() {
        let registry = ComponentRegistry::new();
        registry
            .add_controls(&["ghost@0".to_string()], &Weak::new())
            .unwrap();
        assert!(
            registry
                .add_controls(&["ghost@0".to_string()], &Weak::new())
                .is_ok()
        );
    }
}
