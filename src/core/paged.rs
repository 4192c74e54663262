//! Paged views - an interactive message that flips through an ordered set of embeds.
//!
//! A view with more than one page carries previous/next controls, plus a
//! go-to-page control once the page count passes a threshold. The cursor
//! wraps in both directions.

use crate::{
    core::{
        control::{self, Control, ControlStyle},
        message::{Content, Embed, InteractiveMessage, MessageOptions, PressEvent, PressReply},
        registry::ComponentRegistry,
    },
    errors::{Error, Result},
};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::time::Instant;
use tracing::debug;

/// Page count above which a go-to-page control is offered.
pub const DEFAULT_GO_TO_PAGE_THRESHOLD: usize = 5;

const PREVIOUS: usize = 0;
const NEXT: usize = 1;
const GO_TO: usize = 2;

/// Who may operate a view's controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Every user.
    Anyone,
    /// A single user, optionally opened to everyone once `open_after` has
    /// elapsed since the view was created.
    User {
        /// Discord id of the permitted user
        user_id: String,
        /// Delay before the view opens to all users
        open_after: Option<Duration>,
    },
}

impl AccessPolicy {
    /// Locks the view to `user_id` for its whole lifetime.
    pub fn only(user_id: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
            open_after: None,
        }
    }

    /// Whether `user_id` may press controls `elapsed` after creation.
    #[must_use]
    pub fn permits(&self, user_id: &str, elapsed: Duration) -> bool {
        match self {
            Self::Anyone => true,
            Self::User {
                user_id: owner,
                open_after,
            } => owner == user_id || open_after.is_some_and(|after| elapsed >= after),
        }
    }
}

/// Construction options for a [`PagedView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedOptions {
    /// Authorization policy for presses
    pub access: AccessPolicy,
    /// Page count above which the go-to control appears
    pub go_to_page_threshold: usize,
    /// Options for the underlying message
    pub message: MessageOptions,
}

impl Default for PagedOptions {
    fn default() -> Self {
        Self {
            access: AccessPolicy::Anyone,
            go_to_page_threshold: DEFAULT_GO_TO_PAGE_THRESHOLD,
            message: MessageOptions::default(),
        }
    }
}

#[derive(Debug)]
struct Pager {
    pages: Vec<Embed>,
    cursor: usize,
}

impl Pager {
    fn next(&mut self) {
        self.cursor = (self.cursor + 1) % self.pages.len();
    }

    fn previous(&mut self) {
        self.cursor = (self.cursor + self.pages.len() - 1) % self.pages.len();
    }

    fn go_to(&mut self, index: usize) -> Result<()> {
        if index >= self.pages.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.pages.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    /// Current page, annotated with its position when there is more than one.
    fn current(&self) -> Content {
        let total = self.pages.len();
        let mut page = self.pages[self.cursor].clone();
        if total > 1 {
            let position = format!("Page {}/{total}", self.cursor + 1);
            page.footer = Some(match page.footer.take() {
                Some(footer) => format!("{footer} • {position}"),
                None => position,
            });
        }
        Content::from(page)
    }
}

fn lock(pager: &Mutex<Pager>) -> MutexGuard<'_, Pager> {
    pager.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An [`InteractiveMessage`] with a page cursor.
#[derive(Debug, Clone)]
pub struct PagedView {
    message: Arc<InteractiveMessage>,
    pager: Arc<Mutex<Pager>>,
}

impl PagedView {
    /// Creates the view and its underlying message.
    ///
    /// Fails with [`Error::EmptyPages`] when `pages` is empty.
    pub fn new(
        registry: &Arc<ComponentRegistry>,
        pages: Vec<Embed>,
        options: PagedOptions,
    ) -> Result<Self> {
        if pages.is_empty() {
            return Err(Error::EmptyPages);
        }

        let total = pages.len();
        let mut controls = Vec::new();
        if total > 1 {
            controls.push(
                Control::pressable("Previous")
                    .with_style(ControlStyle::Secondary)
                    .with_emoji("◀"),
            );
            controls.push(
                Control::pressable("Next")
                    .with_style(ControlStyle::Secondary)
                    .with_emoji("▶"),
            );
            if total > options.go_to_page_threshold {
                controls.push(
                    Control::pressable("Go to page")
                        .with_style(ControlStyle::Primary)
                        .with_emoji("🔢"),
                );
            }
        }

        let pager = Arc::new(Mutex::new(Pager { pages, cursor: 0 }));
        let first = lock(&pager).current();
        let message = InteractiveMessage::new(registry, first, controls, &options.message)?;

        let created = Instant::now();
        let access = options.access;
        message.set_press_guard(move |event| access.permits(&event.user_id, created.elapsed()));

        let weak = Arc::downgrade(&message);
        let shared = Arc::clone(&pager);
        message.on_press(move |_, event| handle_press(&weak, &shared, event));

        Ok(Self { message, pager })
    }

    /// Advances to the next page, wrapping to the first.
    pub fn next(&self) {
        lock(&self.pager).next();
        self.refresh();
    }

    /// Goes back one page, wrapping to the last.
    pub fn previous(&self) {
        lock(&self.pager).previous();
        self.refresh();
    }

    /// Jumps to `index`. Fails with [`Error::OutOfRange`] and leaves the cursor
    /// unchanged if `index` is not a valid page.
    pub fn go_to(&self, index: usize) -> Result<()> {
        lock(&self.pager).go_to(index)?;
        self.refresh();
        Ok(())
    }

    /// Zero-based index of the displayed page.
    #[must_use]
    pub fn cursor(&self) -> usize {
        lock(&self.pager).cursor
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        lock(&self.pager).pages.len()
    }

    /// The underlying message.
    #[must_use]
    pub const fn message(&self) -> &Arc<InteractiveMessage> {
        &self.message
    }

    fn refresh(&self) {
        let content = lock(&self.pager).current();
        self.message.set_content(content);
    }
}

fn handle_press(message: &Weak<InteractiveMessage>, pager: &Mutex<Pager>, event: &mut PressEvent) {
    let Some(message) = message.upgrade() else {
        return;
    };
    let Some((_, index)) = control::parse_control_id(&event.control_id) else {
        return;
    };

    let mut state = lock(pager);
    match index {
        PREVIOUS => state.previous(),
        NEXT => state.next(),
        GO_TO => match event.input.as_deref() {
            None => {
                event.reply(PressReply::Prompt {
                    title: "Go to page".to_string(),
                    label: format!("Page number (1-{})", state.pages.len()),
                });
                drop(state);
                // The user is still interacting while the prompt is open.
                message.reset_timeout();
                return;
            }
            Some(input) => {
                let jumped = input
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|page| page.checked_sub(1))
                    .map(|index| state.go_to(index));
                if !matches!(jumped, Some(Ok(()))) {
                    debug!(input, "ignoring invalid page number");
                }
            }
        },
        _ => return,
    }

    let content = state.current();
    drop(state);
    message.set_content(content);
    message.reset_timeout();
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::registry::Dispatch;

    fn pages(count: usize) -> Vec<Embed> {
        (1..=count)
            .map(|i| Embed::new().title(format!("Page {i}")))
            .collect()
    }

    fn options(access: AccessPolicy) -> PagedOptions {
        PagedOptions {
            access,
            message: MessageOptions {
                timeout: None,
                ..MessageOptions::default()
            },
            ..PagedOptions::default()
        }
    }

    fn press(view: &PagedView, index: usize, user: &str) -> PressEvent {
        PressEvent::new(control::control_id(view.message().id(), index), user)
    }

    fn title(view: &PagedView) -> Option<String> {
        match view.message().render().content {
            Content::Embeds(embeds) => embeds[0].title.clone(),
            Content::Text(_) => None,
        }
    }

    #[test]
    fn test_empty_pages_rejected() {
        let registry = Arc::new(ComponentRegistry::new());
        let err = PagedView::new(&registry, Vec::new(), PagedOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyPages));
    }

    #[test]
    fn test_next_cycles_back_to_start() {
        let registry = Arc::new(ComponentRegistry::new());
        let view = PagedView::new(&registry, pages(4), options(AccessPolicy::Anyone)).unwrap();
        view.go_to(2).unwrap();
        for _ in 0..view.page_count() {
            view.next();
        }
        assert_eq!(view.cursor(), 2);
    }

    #[test]
    fn test_previous_wraps_to_last() {
        let registry = Arc::new(ComponentRegistry::new());
        let view = PagedView::new(&registry, pages(3), options(AccessPolicy::Anyone)).unwrap();
        view.previous();
        assert_eq!(view.cursor(), 2);
        assert_eq!(title(&view).as_deref(), Some("Page 3"));
    }

    #[test]
    fn test_go_to_out_of_range_keeps_cursor() {
        let registry = Arc::new(ComponentRegistry::new());
        let view = PagedView::new(&registry, pages(3), options(AccessPolicy::Anyone)).unwrap();
        view.next();

        let err = view.go_to(3).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { index: 3, len: 3 }));
        assert_eq!(view.cursor(), 1);
    }

    #[test]
    fn test_single_page_has_no_controls_or_annotation() {
        let registry = Arc::new(ComponentRegistry::new());
        let view = PagedView::new(&registry, pages(1), options(AccessPolicy::Anyone)).unwrap();

        let rendered = view.message().render();
        assert!(rendered.rows.is_empty());
        assert!(registry.is_empty());
        assert_eq!(
            rendered.content,
            Content::Embeds(vec![Embed::new().title("Page 1")])
        );
        assert!(view.message().destroy_if_inert());
    }

    #[test]
    fn test_pages_are_annotated_with_position() {
        let registry = Arc::new(ComponentRegistry::new());
        let mut content = pages(2);
        content[1] = content[1].clone().footer("Leaderboard");
        let view = PagedView::new(&registry, content, options(AccessPolicy::Anyone)).unwrap();

        let footer = |view: &PagedView| match view.message().render().content {
            Content::Embeds(embeds) => embeds[0].footer.clone(),
            Content::Text(_) => None,
        };
        assert_eq!(footer(&view).as_deref(), Some("Page 1/2"));
        view.next();
        assert_eq!(footer(&view).as_deref(), Some("Leaderboard • Page 2/2"));
    }

    #[test]
    fn test_go_to_control_only_above_threshold() {
        let registry = Arc::new(ComponentRegistry::new());
        let small = PagedView::new(&registry, pages(5), options(AccessPolicy::Anyone)).unwrap();
        let large = PagedView::new(&registry, pages(6), options(AccessPolicy::Anyone)).unwrap();
        assert_eq!(small.message().controls().len(), 2);
        assert_eq!(large.message().controls().len(), 3);
    }

    #[test]
    fn test_presses_move_cursor() {
        let registry = Arc::new(ComponentRegistry::new());
        let view = PagedView::new(&registry, pages(3), options(AccessPolicy::Anyone)).unwrap();

        registry.dispatch(press(&view, NEXT, "U1"));
        registry.dispatch(press(&view, NEXT, "U2"));
        assert_eq!(view.cursor(), 2);
        assert_eq!(title(&view).as_deref(), Some("Page 3"));

        registry.dispatch(press(&view, PREVIOUS, "U1"));
        assert_eq!(view.cursor(), 1);
    }

    #[test]
    fn test_press_from_other_user_is_ignored() {
        let registry = Arc::new(ComponentRegistry::new());
        let view = PagedView::new(&registry, pages(3), options(AccessPolicy::only("U1"))).unwrap();
        let before = view.message().render();

        let outcome = registry.dispatch(press(&view, NEXT, "U2"));

        assert!(matches!(outcome, Dispatch::Ignored));
        assert_eq!(view.cursor(), 0);
        assert_eq!(view.message().render(), before);
    }

    #[test]
    fn test_go_to_press_prompts_then_jumps() {
        let registry = Arc::new(ComponentRegistry::new());
        let view = PagedView::new(&registry, pages(8), options(AccessPolicy::Anyone)).unwrap();

        match registry.dispatch(press(&view, GO_TO, "U1")) {
            Dispatch::Handled { reply, .. } => assert_eq!(
                reply,
                PressReply::Prompt {
                    title: "Go to page".to_string(),
                    label: "Page number (1-8)".to_string(),
                }
            ),
            Dispatch::Ignored => panic!("go-to press should prompt"),
        }
        assert_eq!(view.cursor(), 0);

        registry.dispatch(press(&view, GO_TO, "U1").with_input(" 7 "));
        assert_eq!(view.cursor(), 6);

        registry.dispatch(press(&view, GO_TO, "U1").with_input("0"));
        registry.dispatch(press(&view, GO_TO, "U1").with_input("99"));
        registry.dispatch(press(&view, GO_TO, "U1").with_input("seven"));
        assert_eq!(view.cursor(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_prompt_extends_timeout() {
        let registry = Arc::new(ComponentRegistry::new());
        let mut opts = options(AccessPolicy::Anyone);
        opts.message.timeout = Some(Duration::from_millis(1000));
        let view = PagedView::new(&registry, pages(8), opts).unwrap();

        tokio::time::sleep(Duration::from_millis(700)).await;
        registry.dispatch(press(&view, GO_TO, "U1"));
        tokio::time::sleep(Duration::from_millis(700)).await;
        tokio::task::yield_now().await;
        assert!(!view.message().is_destroyed());

        registry.dispatch(press(&view, GO_TO, "U1").with_input("5"));
        assert_eq!(view.cursor(), 4);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        tokio::task::yield_now().await;
        assert!(view.message().is_destroyed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_opens_to_everyone_after_window() {
        let registry = Arc::new(ComponentRegistry::new());
        let mut opts = options(AccessPolicy::User {
            user_id: "U1".to_string(),
            open_after: Some(Duration::from_secs(30)),
        });
        opts.message.timeout = Some(Duration::from_secs(120));
        let view = PagedView::new(&registry, pages(3), opts).unwrap();

        registry.dispatch(press(&view, NEXT, "U2"));
        assert_eq!(view.cursor(), 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        registry.dispatch(press(&view, NEXT, "U2"));
        assert_eq!(view.cursor(), 1);
    }

    #[test]
    fn test_access_policy_permits() {
        let locked = AccessPolicy::only("U1");
        assert!(locked.permits("U1", Duration::ZERO));
        assert!(!locked.permits("U2", Duration::from_secs(3600)));

        let opening = AccessPolicy::User {
            user_id: "U1".to_string(),
            open_after: Some(Duration::from_secs(10)),
        };
        assert!(!opening.permits("U2", Duration::from_secs(9)));
        assert!(opening.permits("U2", Duration::from_secs(10)));
        assert!(AccessPolicy::Anyone.permits("anyone", Duration::ZERO));
    }
}
