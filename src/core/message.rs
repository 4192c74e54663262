//! Interactive messages - an outgoing message paired with pressable controls and a lifecycle.
//!
//! An [`InteractiveMessage`] registers its pressable controls with the
//! [`ComponentRegistry`] on construction, fans press events out to its
//! subscribers, and tears itself down on [`InteractiveMessage::destroy`] or when
//! its timeout elapses. The state machine is `active -> destroyed`; a timeout
//! reset stays in `active`.
//!
//! Nothing here performs Discord I/O. Callers render the message with
//! [`InteractiveMessage::render`] and hand the payload to whatever sends or
//! edits it.

use crate::{
    core::{
        control::{self, CONTROLS_PER_ROW, Control, DEFAULT_MAX_ROWS},
        registry::ComponentRegistry,
    },
    errors::{Error, Result},
};
use std::{
    any::Any,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default lifetime of an interactive message.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A single name/value pair inside an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field heading
    pub name: String,
    /// Field body
    pub value: String,
    /// Whether the field may share a line with its neighbours
    pub inline: bool,
}

/// Rich content block. Passed through to the renderer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    /// Bold heading
    pub title: Option<String>,
    /// Body text
    pub description: Option<String>,
    /// Name/value pairs below the body
    pub fields: Vec<EmbedField>,
    /// Sidebar colour as `0xRRGGBB`
    pub color: Option<u32>,
    /// Thumbnail image URL
    pub thumbnail: Option<String>,
    /// Small text at the bottom
    pub footer: Option<String>,
}

impl Embed {
    /// Creates an empty embed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Sets the sidebar colour.
    #[must_use]
    pub const fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the thumbnail URL.
    #[must_use]
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    /// Sets the footer text.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// What the message displays besides its controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Plain message text
    Text(String),
    /// One or more embeds
    Embeds(Vec<Embed>),
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Embed> for Content {
    fn from(value: Embed) -> Self {
        Self::Embeds(vec![value])
    }
}

impl From<Vec<Embed>> for Content {
    fn from(value: Vec<Embed>) -> Self {
        Self::Embeds(value)
    }
}

/// How the delivery layer should answer a handled press.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PressReply {
    /// Re-render the message in place.
    #[default]
    Update,
    /// Ask the presser for a line of text. The answer comes back as a press on
    /// the same control with [`PressEvent::input`] set.
    Prompt {
        /// Prompt window title
        title: String,
        /// Label of the text input
        label: String,
    },
}

/// Opaque interaction payload supplied by the delivery layer.
pub type RawContext = Arc<dyn Any + Send + Sync>;

/// A user activated a control.
pub struct PressEvent {
    /// Id of the pressed control
    pub control_id: String,
    /// Discord id of the user who pressed it
    pub user_id: String,
    /// Text submitted in answer to a [`PressReply::Prompt`]
    pub input: Option<String>,
    /// Raw interaction, if the delivery layer attached one
    pub raw: Option<RawContext>,
    reply: PressReply,
}

impl PressEvent {
    /// Creates a press event without input or raw context.
    pub fn new(control_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            user_id: user_id.into(),
            input: None,
            raw: None,
            reply: PressReply::Update,
        }
    }

    /// Attaches submitted prompt text.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Attaches the raw interaction.
    #[must_use]
    pub fn with_raw(mut self, raw: RawContext) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Requests a reply. Later subscribers override earlier ones.
    pub fn reply(&mut self, reply: PressReply) {
        self.reply = reply;
    }

    /// The reply requested so far.
    #[must_use]
    pub const fn requested_reply(&self) -> &PressReply {
        &self.reply
    }
}

impl fmt::Debug for PressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PressEvent")
            .field("control_id", &self.control_id)
            .field("user_id", &self.user_id)
            .field("input", &self.input)
            .field("reply", &self.reply)
            .finish_non_exhaustive()
    }
}

/// Construction options for an [`InteractiveMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOptions {
    /// Lifetime before auto-destroy. `None` disables the timeout.
    pub timeout: Option<Duration>,
    /// Number of action rows available for controls.
    pub max_rows: usize,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// A control as it should be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedControl {
    /// The control itself
    pub control: Control,
    /// Registry id, `None` for links
    pub control_id: Option<String>,
}

/// Displayable payload for the send/edit collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Text or embeds
    pub content: Content,
    /// Controls grouped into action rows
    pub rows: Vec<Vec<RenderedControl>>,
}

impl RenderedMessage {
    /// Drops all controls, leaving only the content.
    #[must_use]
    pub fn without_controls(mut self) -> Self {
        self.rows.clear();
        self
    }
}

type PressHandler = Arc<dyn Fn(&Control, &mut PressEvent) + Send + Sync>;
type PressGuard = Arc<dyn Fn(&PressEvent) -> bool + Send + Sync>;
type LifecycleHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    guard: Option<PressGuard>,
    press: Vec<PressHandler>,
    timeout: Vec<LifecycleHandler>,
    destroy: Vec<LifecycleHandler>,
}

#[derive(Default)]
struct Timer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

/// One outgoing message with attached controls and a timeout.
pub struct InteractiveMessage {
    id: String,
    controls: Vec<Control>,
    control_ids: Vec<Option<String>>,
    content: Mutex<Content>,
    timeout: Option<Duration>,
    destroyed: AtomicBool,
    subscribers: Mutex<Subscribers>,
    timer: Mutex<Timer>,
    closed: watch::Sender<bool>,
    registry: Arc<ComponentRegistry>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InteractiveMessage {
    /// Creates a message, registers its pressable controls and arms its timeout.
    ///
    /// Fails with [`Error::TooManyControls`] when the controls do not fit into
    /// `options.max_rows` rows, or [`Error::DuplicateId`] if registration
    /// collides (which indicates a bug in id generation).
    pub fn new(
        registry: &Arc<ComponentRegistry>,
        content: impl Into<Content>,
        controls: Vec<Control>,
        options: &MessageOptions,
    ) -> Result<Arc<Self>> {
        Self::with_id(
            registry,
            Uuid::new_v4().simple().to_string(),
            content.into(),
            controls,
            options,
        )
    }

    fn with_id(
        registry: &Arc<ComponentRegistry>,
        id: String,
        content: Content,
        controls: Vec<Control>,
        options: &MessageOptions,
    ) -> Result<Arc<Self>> {
        let max = CONTROLS_PER_ROW * options.max_rows;
        if controls.len() > max {
            return Err(Error::TooManyControls {
                count: controls.len(),
                max,
            });
        }

        let control_ids = controls
            .iter()
            .enumerate()
            .map(|(index, c)| (!c.is_link()).then(|| control::control_id(&id, index)))
            .collect();

        let message = Arc::new(Self {
            id,
            controls,
            control_ids,
            content: Mutex::new(content),
            timeout: options.timeout,
            destroyed: AtomicBool::new(false),
            subscribers: Mutex::new(Subscribers::default()),
            timer: Mutex::new(Timer::default()),
            closed: watch::channel(false).0,
            registry: Arc::clone(registry),
        });

        let owned: Vec<String> = message.control_ids().map(str::to_string).collect();
        // Nothing was registered, so Drop must not remove ids held by the other owner.
        registry
            .add_controls(&owned, &Arc::downgrade(&message))
            .inspect_err(|_| message.destroyed.store(true, Ordering::SeqCst))?;
        message.arm_timer();

        debug!(id = %message.id, controls = owned.len(), "created interactive message");
        Ok(message)
    }

    /// Process-unique id of this message.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Controls in the order they were passed in.
    #[must_use]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Registry ids of the pressable controls.
    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        self.control_ids.iter().filter_map(Option::as_deref)
    }

    /// Configured lifetime, `None` when disabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether [`Self::destroy`] has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> Content {
        lock(&self.content).clone()
    }

    /// Replaces the displayed content. Takes effect on the next render.
    pub fn set_content(&self, content: impl Into<Content>) {
        *lock(&self.content) = content.into();
    }

    /// Subscribes to press events. Handlers run in subscription order.
    pub fn on_press<F>(&self, handler: F)
    where
        F: Fn(&Control, &mut PressEvent) + Send + Sync + 'static,
    {
        if self.is_destroyed() {
            return;
        }
        lock(&self.subscribers).press.push(Arc::new(handler));
    }

    /// Installs a gate evaluated before any press handler. A press the gate
    /// rejects is dropped without notifying subscribers.
    pub fn set_press_guard<F>(&self, guard: F)
    where
        F: Fn(&PressEvent) -> bool + Send + Sync + 'static,
    {
        if self.is_destroyed() {
            return;
        }
        lock(&self.subscribers).guard = Some(Arc::new(guard));
    }

    /// Subscribes to the timeout firing. Runs just before the timeout destroys the message.
    pub fn on_timeout<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.is_destroyed() {
            return;
        }
        lock(&self.subscribers).timeout.push(Arc::new(handler));
    }

    /// Subscribes to destruction.
    pub fn on_destroy<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.is_destroyed() {
            return;
        }
        lock(&self.subscribers).destroy.push(Arc::new(handler));
    }

    /// Produces the current payload. Pure.
    #[must_use]
    pub fn render(&self) -> RenderedMessage {
        let rendered = self
            .controls
            .iter()
            .zip(&self.control_ids)
            .map(|(control, control_id)| RenderedControl {
                control: control.clone(),
                control_id: control_id.clone(),
            });

        RenderedMessage {
            content: self.content(),
            rows: control::layout_rows(rendered),
        }
    }

    /// Cancels the pending timeout and schedules a fresh one from now.
    pub fn reset_timeout(self: &Arc<Self>) {
        if self.is_destroyed() {
            return;
        }
        self.arm_timer();
    }

    /// Tears the message down. Idempotent.
    ///
    /// Marks the message destroyed, notifies destroy subscribers, drops every
    /// subscription, unregisters all control ids and cancels the timer.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        let handlers = lock(&self.subscribers).destroy.clone();
        for handler in &handlers {
            handler();
        }
        let cleared = std::mem::take(&mut *lock(&self.subscribers));
        drop(cleared);

        self.unregister();
        self.cancel_timer();
        self.closed.send_replace(true);
        debug!(id = %self.id, "destroyed interactive message");
    }

    /// Resolves once the message has been destroyed.
    ///
    /// Holding an `Arc` across this await is how a command handler keeps the
    /// message alive for its whole interactive window.
    pub async fn closed(&self) {
        let mut destroyed = self.closed.subscribe();
        // The sender lives as long as `self`, so this cannot fail while borrowed.
        let _ = destroyed.wait_for(|destroyed| *destroyed).await;
    }

    /// Destroys the message if it has no pressable controls, since nothing but
    /// the timeout could ever close it. Returns whether the message is now destroyed.
    pub fn destroy_if_inert(&self) -> bool {
        if self.control_ids().next().is_none() {
            self.destroy();
        }
        self.is_destroyed()
    }

    /// Runs press handlers for `event`. Returns `None` when the press is ignored.
    pub(crate) fn handle_press(&self, mut event: PressEvent) -> Option<PressReply> {
        if self.is_destroyed() {
            return None;
        }

        let (message_id, index) = control::parse_control_id(&event.control_id)?;
        if message_id != self.id {
            return None;
        }
        let control = self.controls.get(index).filter(|c| !c.is_link())?;

        let (guard, handlers) = {
            let subscribers = lock(&self.subscribers);
            (subscribers.guard.clone(), subscribers.press.clone())
        };

        if guard.is_some_and(|guard| !guard(&event)) {
            debug!(id = %self.id, user_id = %event.user_id, "press rejected");
            return None;
        }

        for handler in &handlers {
            if self.is_destroyed() {
                break;
            }
            handler(control, &mut event);
        }
        Some(event.reply)
    }

    fn arm_timer(self: &Arc<Self>) {
        let Some(timeout) = self.timeout else {
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!(id = %self.id, "no async runtime, timeout not armed");
            return;
        };

        let mut timer = lock(&self.timer);
        if let Some(previous) = timer.handle.take() {
            previous.abort();
        }
        timer.generation += 1;

        let generation = timer.generation;
        let weak = Arc::downgrade(self);
        timer.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(message) = weak.upgrade() {
                message.expire(generation);
            }
        }));
    }

    fn cancel_timer(&self) {
        let mut timer = lock(&self.timer);
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
        timer.generation += 1;
    }

    fn expire(&self, generation: u64) {
        {
            let mut timer = lock(&self.timer);
            if timer.generation != generation {
                return;
            }
            // Running inside the timer task itself, nothing to abort.
            timer.handle = None;
        }
        if self.is_destroyed() {
            return;
        }

        debug!(id = %self.id, "interactive message timed out");
        let handlers = lock(&self.subscribers).timeout.clone();
        for handler in &handlers {
            handler();
        }
        self.destroy();
    }

    fn unregister(&self) {
        let owned: Vec<&str> = self.control_ids().collect();
        self.registry.remove_controls(&owned);
    }
}

impl Drop for InteractiveMessage {
    fn drop(&mut self) {
        if !self.is_destroyed() {
            self.unregister();
            self.cancel_timer();
        }
    }
}

impl fmt::Debug for InteractiveMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveMessage")
            .field("id", &self.id)
            .field("controls", &self.controls)
            .field("timeout", &self.timeout)
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}
