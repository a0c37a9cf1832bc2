//! The chat session controller.
//!
//! One `ChatSession` owns everything for a conversation: the correspondent,
//! the in-memory log, the display surface, and the timers. Deferred work
//! (history load, typing debounce, presence flicker, simulated replies) comes
//! back as `SessionEvent`s on the receiver returned by `start`, and the caller
//! feeds them to `handle` from the same task that handles user input.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SessionSettings;
use crate::correspondent::Correspondent;
use crate::history::HistoryStore;
use crate::message::{HistoryLog, Message};
use crate::render::{paint, render};
use crate::scheduler::{Scheduler, SessionEvent, TaskHandle};
use crate::simulation::{SimulationSource, REPLY_POOL};
use crate::store::KvStore;
use crate::surface::{DisplaySurface, Region};

pub const STATUS_TYPING: &str = "Typing...";
pub const LOAD_FAILED_NOTICE: &str = "Failed to load chat history";
pub const SAVE_FAILED_NOTICE: &str = "Failed to save chat history";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    pub fn label(&self) -> &'static str {
        match self {
            Presence::Online => "Online",
            Presence::Offline => "Offline",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Presence::Online => "#2ecc71",
            Presence::Offline => "#95a5a6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Voice,
    Video,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Voice => "voice",
            CallKind::Video => "video",
        }
    }
}

enum TypingState {
    Idle,
    Typing(TaskHandle),
}

pub struct ChatSession<S: DisplaySurface> {
    correspondent: Correspondent,
    history: HistoryStore,
    log: HistoryLog,
    loaded: bool,
    surface: S,
    source: Box<dyn SimulationSource>,
    settings: SessionSettings,
    scheduler: Scheduler,
    typing: TypingState,
    typing_generation: u64,
    presence: Presence,
    load_timer: Option<TaskHandle>,
    presence_timer: Option<TaskHandle>,
    pending_replies: HashMap<u64, TaskHandle>,
    next_reply_id: u64,
    closed: bool,
}

impl<S: DisplaySurface> ChatSession<S> {
    /// Bootstrap a session from page parameters and schedule the history load.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        params: &HashMap<String, String>,
        store: Arc<dyn KvStore>,
        surface: S,
        source: Box<dyn SimulationSource>,
        settings: SessionSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (scheduler, rx) = Scheduler::channel();
        let correspondent = Correspondent::from_params(params, Utc::now());

        let mut session = Self {
            correspondent,
            history: HistoryStore::new(store),
            log: HistoryLog::new(),
            loaded: false,
            surface,
            source,
            settings,
            scheduler,
            typing: TypingState::Idle,
            typing_generation: 0,
            presence: Presence::Offline,
            load_timer: None,
            presence_timer: None,
            pending_replies: HashMap::new(),
            next_reply_id: 0,
            closed: false,
        };

        info!(
            correspondent = %session.correspondent.id,
            name = %session.correspondent.display_name,
            "chat session started"
        );

        session.surface.set_visible(Region::MessageLoading, true);
        session.show_user_info();
        session.load_timer = Some(
            session
                .scheduler
                .after(session.settings.history_load_delay, SessionEvent::HistoryReady),
        );

        (session, rx)
    }

    pub fn correspondent(&self) -> &Correspondent {
        &self.correspondent
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.typing, TypingState::Typing(_))
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn pending_replies(&self) -> usize {
        self.pending_replies.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Apply a deferred event. Events that arrive after `shutdown` are dropped.
    pub fn handle(&mut self, event: SessionEvent) {
        if self.closed {
            debug!(?event, "ignoring event after teardown");
            return;
        }

        match event {
            SessionEvent::HistoryReady => self.finish_loading(),
            SessionEvent::TypingElapsed(generation) => self.typing_elapsed(generation),
            SessionEvent::PresenceTick => self.roll_presence(),
            SessionEvent::ReplyDue(id) => self.deliver_reply(id),
        }
    }

    /// Register a keystroke in the message input. Re-arms the debounce timer.
    pub fn keystroke(&mut self) {
        if self.closed {
            return;
        }

        self.typing_generation += 1;
        let handle = self.scheduler.after(
            self.settings.typing_debounce,
            SessionEvent::TypingElapsed(self.typing_generation),
        );

        match std::mem::replace(&mut self.typing, TypingState::Typing(handle)) {
            TypingState::Idle => {
                debug!("typing started");
                self.surface.set_text(Region::StatusText, STATUS_TYPING);
            }
            TypingState::Typing(previous) => previous.cancel(),
        }
    }

    /// Send the input text. Returns false (and changes nothing) if the text is
    /// empty after trimming.
    pub fn send_message(&mut self, raw: &str) -> bool {
        if self.closed {
            return false;
        }

        let text = raw.trim();
        if text.is_empty() {
            return false;
        }

        self.log.push(Message::sent(text, Utc::now()));
        self.persist();
        self.repaint();
        self.surface.set_text(Region::MessageInput, "");

        if self.source.roll_reply(self.settings.reply_probability) {
            let delay = self
                .source
                .reply_delay(self.settings.reply_delay_min, self.settings.reply_delay_max);
            let id = self.next_reply_id;
            self.next_reply_id += 1;

            debug!(reply_id = id, delay_ms = delay.as_millis() as u64, "reply scheduled");
            let handle = self.scheduler.after(delay, SessionEvent::ReplyDue(id));
            self.pending_replies.insert(id, handle);
        }

        true
    }

    pub fn show_profile(&mut self) {
        self.refresh_last_seen();
        self.surface.set_visible(Region::ProfileModal, true);
    }

    pub fn close_profile(&mut self) {
        self.surface.set_visible(Region::ProfileModal, false);
    }

    pub fn show_attachments(&mut self) {
        self.surface.set_visible(Region::AttachmentModal, true);
    }

    pub fn close_attachments(&mut self) {
        self.surface.set_visible(Region::AttachmentModal, false);
    }

    pub fn notify(&mut self, text: &str) {
        self.surface.set_text(Region::Notice, text);
        self.surface.set_visible(Region::Notice, true);
    }

    pub fn dismiss_notice(&mut self) {
        self.surface.set_visible(Region::Notice, false);
    }

    pub fn start_call(&mut self, kind: CallKind) {
        self.notify(&format!(
            "Starting {} call... (Feature coming soon)",
            kind.as_str()
        ));
    }

    pub fn more_options(&mut self) {
        self.notify("More options coming soon!");
    }

    pub fn block_user(&mut self) {
        info!(correspondent = %self.correspondent.id, "user blocked");
        self.notify("User blocked successfully");
    }

    pub fn report_user(&mut self) {
        info!(correspondent = %self.correspondent.id, "user reported");
        self.notify("User reported successfully");
    }

    /// Cancel every pending timer. The session ignores all further events.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let TypingState::Typing(handle) = std::mem::replace(&mut self.typing, TypingState::Idle) {
            handle.cancel();
        }
        if let Some(handle) = self.load_timer.take() {
            handle.cancel();
        }
        if let Some(handle) = self.presence_timer.take() {
            handle.cancel();
        }
        let pending = self.pending_replies.len();
        for (_, handle) in self.pending_replies.drain() {
            handle.cancel();
        }

        info!(
            correspondent = %self.correspondent.id,
            cancelled_replies = pending,
            "chat session closed"
        );
    }

    fn finish_loading(&mut self) {
        if self.loaded {
            return;
        }
        self.load_timer = None;

        let loaded = self.history.load(&self.correspondent.id, Utc::now());
        // Anything sent or received while the load was pending goes after the
        // stored history.
        let early = std::mem::replace(&mut self.log, loaded.log);
        let had_early = !early.is_empty();
        for message in early.into_messages() {
            self.log.push(message);
        }
        self.loaded = true;

        if loaded.failure.is_some() {
            self.notify(LOAD_FAILED_NOTICE);
        }
        if had_early {
            self.persist();
        }

        self.repaint();
        self.surface.set_visible(Region::MessageLoading, false);

        self.presence_timer = Some(
            self.scheduler
                .every(self.settings.presence_interval, SessionEvent::PresenceTick),
        );
        self.roll_presence();
        self.show_user_info();

        debug!(messages = self.log.len(), "history loaded");
    }

    fn typing_elapsed(&mut self, generation: u64) {
        if generation != self.typing_generation || !self.is_typing() {
            return;
        }
        self.typing = TypingState::Idle;
        debug!("typing stopped");
        self.show_presence();
    }

    /// Presence ticks own only the presence flag; while the user is typing the
    /// status text stays on "Typing..." and only the indicator changes.
    fn roll_presence(&mut self) {
        let online = self.source.roll_online(self.settings.online_probability);
        self.presence = if online {
            Presence::Online
        } else {
            Presence::Offline
        };
        debug!(presence = ?self.presence, "presence updated");

        self.surface.set_attribute(
            Region::StatusIndicator,
            "background-color",
            self.presence.color(),
        );
        if !self.is_typing() {
            self.surface
                .set_text(Region::StatusText, self.presence.label());
        }
    }

    fn show_presence(&mut self) {
        self.surface
            .set_text(Region::StatusText, self.presence.label());
        self.surface.set_attribute(
            Region::StatusIndicator,
            "background-color",
            self.presence.color(),
        );
    }

    fn deliver_reply(&mut self, id: u64) {
        if self.pending_replies.remove(&id).is_none() {
            return;
        }

        let idx = self.source.pick_reply(REPLY_POOL.len());
        self.log.push(Message::received(REPLY_POOL[idx], Utc::now()));
        debug!(reply_id = id, "reply delivered");

        self.persist();
        self.repaint();
    }

    fn persist(&mut self) {
        // Saving before the stored history is merged in would clobber it.
        if !self.loaded {
            return;
        }
        if let Err(e) = self.history.save(&self.correspondent.id, &self.log) {
            warn!(correspondent = %self.correspondent.id, error = %e, "Error saving chat history");
            self.notify(SAVE_FAILED_NOTICE);
        }
    }

    fn repaint(&mut self) {
        let blocks = render(
            &self.log,
            &self.correspondent,
            &Local::now(),
            &self.settings.time_format,
        );
        paint(&mut self.surface, blocks);
    }

    fn show_user_info(&mut self) {
        let c = &self.correspondent;
        self.surface.set_attribute(Region::HeaderAvatar, "src", &c.avatar_ref);
        self.surface.set_text(Region::HeaderName, &c.display_name);

        self.surface.set_attribute(Region::ModalAvatar, "src", &c.avatar_ref);
        self.surface.set_text(Region::ModalName, &c.display_name);
        self.surface.set_text(Region::ModalStatus, &c.status_line);
        self.surface.set_text(Region::ModalEmail, &c.contact_email);
        self.surface.set_text(Region::ModalPhone, &c.contact_phone);
        self.refresh_last_seen();
    }

    fn refresh_last_seen(&mut self) {
        let text = self
            .settings
            .time_format
            .last_seen(self.correspondent.last_seen_at, Utc::now());
        self.surface.set_text(Region::ModalLastSeen, &text);
    }
}
