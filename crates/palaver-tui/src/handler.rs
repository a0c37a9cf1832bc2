use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use palaver_core::{CallKind, ProfileAction, Region};

use crate::app::{App, Confirm, InputMode, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Popups take the keyboard first (in order of priority)
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.alert = None;
        }
        return;
    }
    if let Some(confirm) = app.confirm {
        handle_confirm(app, confirm, key);
        return;
    }
    if app.show_avatar_input {
        handle_avatar_input(app, key);
        return;
    }
    if let Some(session) = app.session.as_mut() {
        if app.screen == Screen::Chat && session.surface().is_visible(Region::Notice) {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('x')) {
                session.dismiss_notice();
            }
            return;
        }
    }

    match (app.screen, app.input_mode) {
        (Screen::Profile, InputMode::Normal) => handle_profile_normal(app, key),
        (Screen::Profile, InputMode::Editing) => handle_search_editing(app, key),
        (Screen::Chat, InputMode::Normal) => handle_chat_normal(app, key),
        (Screen::Chat, InputMode::Editing) => handle_chat_editing(app, key),
    }
}

fn handle_confirm(app: &mut App, confirm: Confirm, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.confirm = None;
            match confirm {
                Confirm::Block => {
                    if let Some(session) = app.session.as_mut() {
                        session.block_user();
                    }
                }
                Confirm::Report => {
                    if let Some(session) = app.session.as_mut() {
                        session.report_user();
                    }
                }
                Confirm::Logout => app.should_quit = true,
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm = None,
        _ => {}
    }
}

fn handle_avatar_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_avatar_input = false;
            app.avatar_path.clear();
        }
        KeyCode::Enter => app.upload_avatar(),
        KeyCode::Char(c) => app.avatar_path.insert(c),
        KeyCode::Backspace => {
            app.avatar_path.backspace();
        }
        KeyCode::Delete => {
            app.avatar_path.delete();
        }
        KeyCode::Left => app.avatar_path.left(),
        KeyCode::Right => app.avatar_path.right(),
        KeyCode::Home => app.avatar_path.home(),
        KeyCode::End => app.avatar_path.end(),
        _ => {}
    }
}

fn handle_profile_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('L') => app.confirm = Some(Confirm::Logout),

        // Navigation
        KeyCode::Tab | KeyCode::BackTab => app.switch_tab(),
        KeyCode::Char('j') | KeyCode::Down => app.list_down(),
        KeyCode::Char('k') | KeyCode::Up => app.list_up(),
        KeyCode::Enter | KeyCode::Char('l') => app.open_selected(),

        KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Esc => {
            if !app.search.text.is_empty() {
                app.search.clear();
                app.reset_selection();
            }
        }
        KeyCode::Char('u') => app.show_avatar_input = true,
        KeyCode::Char('s') => app.alert = Some(ProfileAction::Settings.notice().to_string()),
        KeyCode::Char('P') => app.alert = Some(ProfileAction::Privacy.notice().to_string()),
        KeyCode::Char('n') => app.alert = Some(ProfileAction::NewGroup.notice().to_string()),
        _ => {}
    }
}

fn handle_search_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Down => app.list_down(),
        KeyCode::Up => app.list_up(),
        KeyCode::Char(c) => {
            app.search.insert(c);
            app.reset_selection();
        }
        KeyCode::Backspace => {
            if app.search.backspace() {
                app.reset_selection();
            }
        }
        KeyCode::Delete => {
            if app.search.delete() {
                app.reset_selection();
            }
        }
        KeyCode::Left => app.search.left(),
        KeyCode::Right => app.search.right(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    let Some(session) = app.session.as_mut() else {
        app.close_chat();
        return;
    };

    // Open modals keep the keyboard until closed
    if session.surface().is_visible(Region::ProfileModal) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('p')) {
            session.close_profile();
        }
        return;
    }
    if session.surface().is_visible(Region::AttachmentModal) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('a')) {
            session.close_attachments();
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_chat(),
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,

        KeyCode::Char('p') => session.show_profile(),
        KeyCode::Char('c') => session.start_call(CallKind::Voice),
        KeyCode::Char('v') => session.start_call(CallKind::Video),
        KeyCode::Char('m') => session.more_options(),
        KeyCode::Char('a') => session.show_attachments(),
        KeyCode::Char('b') => app.confirm = Some(Confirm::Block),
        KeyCode::Char('r') => app.confirm = Some(Confirm::Report),

        // Scrolling
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::PageUp => {
            for _ in 0..app.chat_height.max(1) {
                app.scroll_up();
            }
        }
        KeyCode::PageDown => {
            app.chat_scroll = app.chat_scroll.saturating_add(app.chat_height.max(1));
        }
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.send_message();
            app.scroll_to_bottom();
        }
        KeyCode::Char(c) => {
            app.message.insert(c);
            app.keystroke();
        }
        KeyCode::Backspace => {
            if app.message.backspace() {
                app.keystroke();
            }
        }
        KeyCode::Delete => {
            if app.message.delete() {
                app.keystroke();
            }
        }
        KeyCode::Left => app.message.left(),
        KeyCode::Right => app.message.right(),
        KeyCode::Home => app.message.home(),
        KeyCode::End => app.message.end(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match (app.screen, mouse.kind) {
        (Screen::Chat, MouseEventKind::ScrollUp) => app.scroll_up(),
        (Screen::Chat, MouseEventKind::ScrollDown) => app.scroll_down(),
        (Screen::Profile, MouseEventKind::ScrollUp) => app.list_up(),
        (Screen::Profile, MouseEventKind::ScrollDown) => app.list_down(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use palaver_core::{Config, KvStore, MemoryKvStore};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        (App::new(&Config::new(), store, dir.path()), dir)
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let (mut app, _dir) = app();
        app.input_mode = InputMode::Editing;
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_search_typing_filters_list() {
        let (mut app, _dir) = app();
        handle_event(&mut app, key(KeyCode::Char('/')));
        for c in "chan".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.search.text, "chan");
        assert_eq!(app.visible_chats().len(), 1);

        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);
        handle_event(&mut app, key(KeyCode::Esc));
        assert!(app.search.text.is_empty());
    }

    #[tokio::test]
    async fn test_chat_typing_and_send() {
        let (mut app, _dir) = app();
        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.input_mode, InputMode::Editing);

        for c in "hey".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }
        assert!(app.session.as_ref().unwrap().is_typing());

        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.message.text.is_empty());
        let log = app.session.as_ref().unwrap().log();
        assert_eq!(log.last().unwrap().text, "hey");
    }

    #[tokio::test]
    async fn test_block_requires_confirmation() {
        let (mut app, _dir) = app();
        handle_event(&mut app, key(KeyCode::Enter));
        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, key(KeyCode::Char('b')));
        assert_eq!(app.confirm, Some(Confirm::Block));
        handle_event(&mut app, key(KeyCode::Char('n')));
        assert!(app.confirm.is_none());
        let surface = app.session.as_ref().unwrap().surface();
        assert!(!surface.is_visible(Region::Notice));

        handle_event(&mut app, key(KeyCode::Char('b')));
        handle_event(&mut app, key(KeyCode::Char('y')));
        let surface = app.session.as_ref().unwrap().surface();
        assert!(surface.is_visible(Region::Notice));
        assert_eq!(surface.text(Region::Notice), Some("User blocked successfully"));

        handle_event(&mut app, key(KeyCode::Char('x')));
        let surface = app.session.as_ref().unwrap().surface();
        assert!(!surface.is_visible(Region::Notice));
    }

    #[tokio::test]
    async fn test_notice_swallows_other_keys() {
        let (mut app, _dir) = app();
        handle_event(&mut app, key(KeyCode::Enter));
        handle_event(&mut app, key(KeyCode::Esc));
        handle_event(&mut app, key(KeyCode::Char('m')));
        assert!(app.session.as_ref().unwrap().surface().is_visible(Region::Notice));

        handle_event(&mut app, key(KeyCode::Char('b')));
        assert!(app.confirm.is_none());
        handle_event(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.session.as_ref().unwrap().surface().is_visible(Region::Notice));
        assert_eq!(app.screen, Screen::Chat);
    }

    #[tokio::test]
    async fn test_attachment_modal_holds_keyboard() {
        let (mut app, _dir) = app();
        handle_event(&mut app, key(KeyCode::Enter));
        handle_event(&mut app, key(KeyCode::Esc));
        handle_event(&mut app, key(KeyCode::Char('a')));
        assert!(app.session.as_ref().unwrap().surface().is_visible(Region::AttachmentModal));

        handle_event(&mut app, key(KeyCode::Char('r')));
        assert!(app.confirm.is_none());

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.session.as_ref().unwrap().surface().is_visible(Region::AttachmentModal));
        assert_eq!(app.screen, Screen::Chat);
    }

    #[test]
    fn test_profile_placeholders_alert() {
        let (mut app, _dir) = app();
        handle_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.alert.as_deref(), Some("Settings page coming soon!"));
        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.alert.is_none());

        handle_event(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.alert.as_deref(), Some("Group creation coming soon!"));
    }

    #[tokio::test]
    async fn test_escape_leaves_chat() {
        let (mut app, _dir) = app();
        handle_event(&mut app, key(KeyCode::Enter));
        handle_event(&mut app, key(KeyCode::Esc));
        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Profile);
        assert!(app.session.is_none());
    }
}
