use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedReceiver;

use palaver_core::{
    AvatarStore, ChatSession, ChatSummary, Config, GroupSummary, JpegCompressor, KvStore, Profile,
    ProfileTab, RandomSource, Region, ScreenModel, SessionEvent, SessionSettings, Upload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Profile,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Yes/no questions shown as a popup before a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Block,
    Report,
    Logout,
}

impl Confirm {
    pub fn question(&self) -> &'static str {
        match self {
            Confirm::Block => "Are you sure you want to block this user?",
            Confirm::Report => "Are you sure you want to report this user?",
            Confirm::Logout => "Are you sure you want to logout?",
        }
    }
}

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct LineInput {
    pub text: String,
    pub cursor: usize,
}

impl LineInput {
    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.text.remove(at);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        let at = self.byte_index();
        self.text.remove(at);
        true
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Profile screen
    pub profile: Profile,
    pub profile_tab: ProfileTab,
    pub search: LineInput,
    pub list_state: ListState,
    pub picture: String,
    pub show_avatar_input: bool,
    pub avatar_path: LineInput,

    // Popups
    pub alert: Option<String>,
    pub confirm: Option<Confirm>,

    // Chat screen
    pub message: LineInput,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub animation_frame: u8,
    pub session: Option<ChatSession<ScreenModel>>,
    pub session_rx: Option<UnboundedReceiver<SessionEvent>>,

    store: Arc<dyn KvStore>,
    avatars: AvatarStore,
    settings: SessionSettings,
}

impl App {
    pub fn new(config: &Config, store: Arc<dyn KvStore>, data_dir: &Path) -> Self {
        let avatars = AvatarStore::new(store.clone(), data_dir.join("avatars"));
        let picture = avatars.load_profile_picture();

        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Profile,
            input_mode: InputMode::Normal,

            profile: Profile::demo(),
            profile_tab: ProfileTab::default(),
            search: LineInput::default(),
            list_state,
            picture,
            show_avatar_input: false,
            avatar_path: LineInput::default(),

            alert: None,
            confirm: None,

            message: LineInput::default(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            session: None,
            session_rx: None,

            store,
            avatars,
            settings: config.session_settings(),
        }
    }

    // Profile lists (filtered by the search box)
    pub fn visible_chats(&self) -> Vec<&ChatSummary> {
        self.profile.search_chats(&self.search.text)
    }

    pub fn visible_groups(&self) -> Vec<&GroupSummary> {
        self.profile.search_groups(&self.search.text)
    }

    fn visible_len(&self) -> usize {
        match self.profile_tab {
            ProfileTab::Chats => self.visible_chats().len(),
            ProfileTab::Groups => self.visible_groups().len(),
        }
    }

    pub fn list_down(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn list_up(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(1)));
    }

    /// Keep the selection inside the (possibly shrunken) filtered list.
    pub fn reset_selection(&mut self) {
        let selected = if self.visible_len() == 0 { None } else { Some(0) };
        self.list_state.select(selected);
    }

    pub fn switch_tab(&mut self) {
        self.profile_tab = self.profile_tab.next();
        self.reset_selection();
    }

    pub fn open_selected(&mut self) {
        match self.profile_tab {
            ProfileTab::Chats => {
                let params = self
                    .list_state
                    .selected()
                    .and_then(|i| self.visible_chats().get(i).map(|c| c.page_params()));
                if let Some(params) = params {
                    self.open_chat(&params);
                }
            }
            ProfileTab::Groups => {
                self.alert = Some("Group chats coming soon!".to_string());
            }
        }
    }

    // Chat session lifecycle
    pub fn open_chat(&mut self, params: &HashMap<String, String>) {
        self.close_chat();

        let (session, rx) = ChatSession::start(
            params,
            self.store.clone(),
            ScreenModel::new(),
            Box::new(RandomSource::from_entropy()),
            self.settings.clone(),
        );
        self.session = Some(session);
        self.session_rx = Some(rx);
        self.message.clear();
        self.chat_scroll = 0;
        self.screen = Screen::Chat;
        self.input_mode = InputMode::Editing;
    }

    pub fn close_chat(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.shutdown();
        }
        self.session_rx = None;
        self.screen = Screen::Profile;
        self.input_mode = InputMode::Normal;
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        if let Some(session) = self.session.as_mut() {
            session.handle(event);
        }
    }

    pub fn keystroke(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.keystroke();
        }
    }

    pub fn send_message(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.send_message(&self.message.text) {
                self.message.clear();
            }
        }
    }

    pub fn upload_avatar(&mut self) {
        let path = PathBuf::from(self.avatar_path.text.trim());
        let upload = if self.avatar_path.text.trim().is_empty() {
            None
        } else {
            match Upload::from_path(&path) {
                Ok(upload) => Some(upload),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not read avatar file");
                    self.alert = Some(e.to_string());
                    return;
                }
            }
        };

        match self.avatars.save_profile_picture(upload.as_ref(), &JpegCompressor) {
            Ok(reference) => {
                self.picture = reference;
                self.show_avatar_input = false;
                self.avatar_path.clear();
            }
            Err(e) => self.alert = Some(e.to_string()),
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        let loading = self
            .session
            .as_ref()
            .is_some_and(|s| s.surface().is_visible(Region::MessageLoading));
        if loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.surface_mut().unpin(Region::Messages);
        }
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        if let Some(session) = self.session.as_mut() {
            use palaver_core::DisplaySurface;
            session.surface_mut().scroll_to_end(Region::Messages);
        }
    }
}

/// Next deferred event from the open chat session; pends forever without one.
pub async fn next_session_event(
    rx: &mut Option<UnboundedReceiver<SessionEvent>>,
) -> Option<SessionEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::MemoryKvStore;

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        (App::new(&Config::new(), store, dir.path()), dir)
    }

    #[test]
    fn test_line_input_utf8_editing() {
        let mut input = LineInput::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.left();
        input.left();
        input.insert('😊');
        assert_eq!(input.text, "hél😊lo");
        assert!(input.backspace());
        input.home();
        assert!(input.delete());
        assert_eq!(input.text, "éllo");
        assert!(!input.backspace());
    }

    #[test]
    fn test_search_narrows_selection() {
        let (mut app, _dir) = app();
        app.list_down();
        app.list_down();
        assert_eq!(app.list_state.selected(), Some(2));

        app.search.text = "bha".to_string();
        app.reset_selection();
        assert_eq!(app.visible_chats().len(), 1);
        assert_eq!(app.list_state.selected(), Some(0));

        app.search.text = "nobody".to_string();
        app.reset_selection();
        assert_eq!(app.list_state.selected(), None);
    }

    #[tokio::test]
    async fn test_open_and_close_chat() {
        let (mut app, _dir) = app();
        app.list_down();
        app.open_selected();

        assert_eq!(app.screen, Screen::Chat);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.correspondent().display_name, "Bhavani");

        app.close_chat();
        assert_eq!(app.screen, Screen::Profile);
        assert!(app.session.is_none());
        assert!(app.session_rx.is_none());
    }

    #[tokio::test]
    async fn test_blank_message_keeps_input() {
        let (mut app, _dir) = app();
        app.open_selected();
        app.message.text = "   ".to_string();
        app.send_message();
        assert_eq!(app.message.text, "   ");

        app.message.text = "hi".to_string();
        app.send_message();
        assert!(app.message.text.is_empty());
    }

    #[test]
    fn test_missing_avatar_file_alerts() {
        let (mut app, dir) = app();
        app.avatar_path.text = dir.path().join("nope.png").display().to_string();
        app.upload_avatar();
        assert!(app.alert.is_some());
        assert_eq!(app.picture, palaver_core::avatar::DEFAULT_PICTURE);
    }

    #[test]
    fn test_empty_avatar_path_is_no_file() {
        let (mut app, _dir) = app();
        app.upload_avatar();
        assert_eq!(app.alert.as_deref(), Some("No file selected"));
    }
}
