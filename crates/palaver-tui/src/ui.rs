use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
};

use palaver_core::{Block as ChatBlock, Direction, Fragment, MessageBlock, ProfileTab, Region, ScreenModel};

use crate::app::{App, InputMode, Screen};

/// Parse a `#rrggbb` attribute into a terminal color.
fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// A run of non-whitespace (possibly spanning text and link fragments) or a
/// run of whitespace.
#[derive(Debug)]
enum Token {
    Word(Vec<(String, bool)>),
    Space(String),
}

fn tokenize(body: &[Fragment]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word: Vec<(String, bool)> = Vec::new();

    for fragment in body {
        match fragment {
            Fragment::Link(url) => word.push((url.clone(), true)),
            Fragment::Text(text) => {
                let mut chunk = String::new();
                for c in text.chars() {
                    if c.is_whitespace() {
                        if !chunk.is_empty() {
                            word.push((std::mem::take(&mut chunk), false));
                        }
                        if !word.is_empty() {
                            tokens.push(Token::Word(std::mem::take(&mut word)));
                        }
                        match tokens.last_mut() {
                            Some(Token::Space(space)) => space.push(' '),
                            _ => tokens.push(Token::Space(" ".to_string())),
                        }
                    } else {
                        chunk.push(c);
                    }
                }
                if !chunk.is_empty() {
                    word.push((chunk, false));
                }
            }
        }
    }

    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

/// Word-wrap a message body, keeping links whole and styled. Whitespace
/// inside a line is kept as typed; it is dropped where a line breaks.
fn wrap_fragments(body: &[Fragment], width: usize) -> Vec<Vec<Span<'static>>> {
    let width = width.max(1);
    let link_style = Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::UNDERLINED);

    let mut lines: Vec<Vec<Span<'static>>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_len = 0;
    let mut pending_space = String::new();

    for token in tokenize(body) {
        let segments = match token {
            Token::Space(space) => {
                pending_space = space;
                continue;
            }
            Token::Word(segments) => segments,
        };

        let word_len: usize = segments.iter().map(|(s, _)| s.chars().count()).sum();
        let space_len = pending_space.chars().count();
        if current_len > 0 && current_len + space_len + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 && space_len > 0 {
            current.push(Span::raw(std::mem::take(&mut pending_space)));
            current_len += space_len;
        }
        pending_space.clear();

        for (segment, is_link) in segments {
            current_len += segment.chars().count();
            if is_link {
                current.push(Span::styled(segment, link_style));
            } else {
                current.push(Span::raw(segment));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn message_lines(msg: &MessageBlock, width: usize) -> Vec<Line<'static>> {
    let bubble_width = (width * 3 / 4).max(10).min(width.max(1));
    let time_style = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    match msg.direction {
        Direction::Sent => {
            for spans in wrap_fragments(&msg.body, bubble_width) {
                lines.push(
                    Line::from(spans)
                        .style(Style::default().fg(Color::White))
                        .alignment(Alignment::Right),
                );
            }
            lines.push(Line::from(Span::styled(msg.time.clone(), time_style)).alignment(Alignment::Right));
        }
        Direction::Received => {
            let initial = msg
                .avatar
                .as_ref()
                .and_then(|a| a.alt.chars().next())
                .unwrap_or('?');
            let avatar = Span::styled(
                format!("({}) ", initial),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            );
            for (i, mut spans) in wrap_fragments(&msg.body, bubble_width.saturating_sub(4))
                .into_iter()
                .enumerate()
            {
                let prefix = if i == 0 { avatar.clone() } else { Span::raw("    ") };
                spans.insert(0, prefix);
                lines.push(Line::from(spans));
            }
            lines.push(Line::from(vec![Span::raw("    "), Span::styled(msg.time.clone(), time_style)]));
        }
    }

    lines.push(Line::default());
    lines
}

fn chat_lines(blocks: &[ChatBlock], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            ChatBlock::DateSeparator { label } => {
                lines.push(
                    Line::from(Span::styled(
                        format!("── {} ──", label),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    ))
                    .alignment(Alignment::Center),
                );
                lines.push(Line::default());
            }
            ChatBlock::Message(msg) => lines.extend(message_lines(msg, width)),
        }
    }
    lines
}

/// Centered popup area, clamped to the frame.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Profile => render_profile_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if let Some(alert) = &app.alert {
        render_notice(frame, area, " Notice ", alert, "Enter to close");
    } else if let Some(confirm) = app.confirm {
        render_confirm(frame, area, confirm.question());
    } else if app.show_avatar_input {
        render_avatar_input(app, frame, area);
    } else if let Some(session) = &app.session {
        let surface = session.surface();
        if surface.is_visible(Region::Notice) {
            let text = surface.text(Region::Notice).unwrap_or_default();
            render_notice(frame, area, " Notice ", text, "x to dismiss");
        } else if surface.is_visible(Region::ProfileModal) {
            render_profile_modal(surface, frame, area);
        } else if surface.is_visible(Region::AttachmentModal) {
            render_attachment_modal(frame, area);
        }
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let location = match (&app.screen, &app.session) {
        (Screen::Chat, Some(session)) => format!(" / {}", session.correspondent().display_name),
        _ => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" Palaver ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(location, Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.screen, app.input_mode) {
        (Screen::Profile, InputMode::Normal) => " PROFILE ",
        (Screen::Profile, InputMode::Editing) => " SEARCH ",
        (Screen::Chat, InputMode::Normal) => " CHAT ",
        (Screen::Chat, InputMode::Editing) => " TYPE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: &[(&str, &str)] = match (app.screen, app.input_mode) {
        (Screen::Profile, InputMode::Normal) => &[
            ("j/k", "move"),
            ("Tab", "chats/groups"),
            ("Enter", "open"),
            ("/", "search"),
            ("u", "picture"),
            ("s", "settings"),
            ("P", "privacy"),
            ("n", "new group"),
            ("L", "logout"),
            ("q", "quit"),
        ],
        (Screen::Profile, InputMode::Editing) => &[("Enter/Esc", "done")],
        (Screen::Chat, InputMode::Normal) => &[
            ("i", "type"),
            ("p", "profile"),
            ("c/v", "call"),
            ("a", "attach"),
            ("m", "more"),
            ("b", "block"),
            ("r", "report"),
            ("j/k", "scroll"),
            ("G", "latest"),
            ("Esc", "back"),
        ],
        (Screen::Chat, InputMode::Editing) => &[("Enter", "send"), ("Esc", "commands")],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_profile_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [card_area, lists_area] = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(65),
    ])
    .areas(area);

    let profile = &app.profile;
    let label = Style::default().fg(Color::DarkGray);
    let card = vec![
        Line::from(Span::styled(
            profile.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!("@{}", profile.username), label)),
        Line::default(),
        Line::from(vec![Span::styled("Email  ", label), Span::raw(profile.email.clone())]),
        Line::from(vec![Span::styled("Phone  ", label), Span::raw(profile.phone.clone())]),
        Line::default(),
        Line::from(Span::styled(profile.bio.clone(), Style::default().add_modifier(Modifier::ITALIC))),
        Line::default(),
        Line::from(vec![Span::styled("Picture  ", label), Span::raw(app.picture.clone())]),
    ];
    let card = Paragraph::new(card)
        .block(Block::default().borders(Borders::ALL).title(" Profile "))
        .wrap(Wrap { trim: true });
    frame.render_widget(card, card_area);

    let [tabs_area, list_area, search_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(lists_area);

    let selected_tab = match app.profile_tab {
        ProfileTab::Chats => 0,
        ProfileTab::Groups => 1,
    };
    let tabs = Tabs::new(vec![ProfileTab::Chats.title(), ProfileTab::Groups.title()])
        .select(selected_tab)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, tabs_area);

    let items: Vec<ListItem> = match app.profile_tab {
        ProfileTab::Chats => app
            .visible_chats()
            .into_iter()
            .map(|chat| {
                let mut title = vec![
                    Span::styled(chat.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", chat.time), Style::default().fg(Color::DarkGray)),
                ];
                if chat.unread > 0 {
                    title.push(Span::styled(
                        format!("  ({})", chat.unread),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ));
                }
                ListItem::new(Text::from(vec![
                    Line::from(title),
                    Line::from(Span::styled(
                        format!("  {}", chat.last_message),
                        Style::default().fg(Color::Gray),
                    )),
                ]))
            })
            .collect(),
        ProfileTab::Groups => app
            .visible_groups()
            .into_iter()
            .map(|group| {
                ListItem::new(Line::from(vec![
                    Span::styled(group.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {} members", group.members),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect(),
    };

    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", app.profile_tab.title())))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.list_state);

    if empty {
        let inner = Rect::new(list_area.x + 2, list_area.y + 1, list_area.width.saturating_sub(4), 1);
        frame.render_widget(
            Paragraph::new(Span::styled("No matches", Style::default().fg(Color::DarkGray))),
            inner,
        );
    }

    let searching = app.input_mode == InputMode::Editing;
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if searching { Color::Yellow } else { Color::DarkGray }))
        .title(" Search ");
    let search_inner = search_block.inner(search_area);
    frame.render_widget(Paragraph::new(app.search.text.as_str()).block(search_block), search_area);
    if searching {
        let cursor_x = (app.search.cursor as u16).min(search_inner.width.saturating_sub(1));
        frame.set_cursor_position((search_inner.x + cursor_x, search_inner.y));
    }
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let surface = session.surface();

    let [top_area, messages_area, input_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Correspondent header: avatar, name, presence
    let name = surface.text(Region::HeaderName).unwrap_or_default();
    let avatar = surface.attribute(Region::HeaderAvatar, "src").unwrap_or_default();
    let status = surface.text(Region::StatusText).unwrap_or_default();
    let dot_color = surface
        .attribute(Region::StatusIndicator, "background-color")
        .and_then(parse_hex_color)
        .unwrap_or(Color::DarkGray);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", name), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("● ", Style::default().fg(dot_color)),
        Span::styled(status.to_string(), Style::default().fg(Color::Gray)),
        Span::styled(format!("  [{}]", avatar), Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, top_area);

    // Message history
    app.chat_height = messages_area.height.saturating_sub(2);
    app.chat_width = messages_area.width.saturating_sub(2);

    let mut lines = chat_lines(surface.children(Region::Messages), app.chat_width as usize);
    if surface.is_visible(Region::MessageLoading) {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Loading messages{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let max_scroll = (lines.len() as u16).saturating_sub(app.chat_height);
    if surface.is_scrolled_to_end(Region::Messages) {
        app.chat_scroll = max_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(max_scroll);
    }

    let messages = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .scroll((app.chat_scroll, 0));
    frame.render_widget(messages, messages_area);

    // Message input
    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Message ");
    let input_inner = input_block.inner(input_area);

    let input = if app.message.text.is_empty() && !editing {
        Paragraph::new(Span::styled("Type a message...", Style::default().fg(Color::DarkGray)))
    } else {
        // Keep the cursor in view on long input
        let skip = app.message.cursor.saturating_sub(input_inner.width.saturating_sub(1) as usize);
        Paragraph::new(app.message.text.chars().skip(skip).collect::<String>())
    };
    frame.render_widget(input.block(input_block), input_area);

    if editing {
        let visible_cursor = app.message.cursor.min(input_inner.width.saturating_sub(1) as usize);
        frame.set_cursor_position((input_inner.x + visible_cursor as u16, input_inner.y));
    }
}

fn render_notice(frame: &mut Frame, area: Rect, title: &str, text: &str, hint: &str) {
    let width = (text.chars().count() as u16 + 6).clamp(30, 60);
    let popup = popup_area(area, width, 6);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title.to_string());

    let body = Paragraph::new(vec![
        Line::from(text.to_string()),
        Line::default(),
        Line::from(Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))),
    ])
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(body, popup);
}

fn render_confirm(frame: &mut Frame, area: Rect, question: &str) {
    let popup = popup_area(area, 50, 6);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Confirm ");

    let body = Paragraph::new(vec![
        Line::from(question.to_string()),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" yes   "),
            Span::styled(" n ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" no"),
        ]),
    ])
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(body, popup);
}

fn render_avatar_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 60, 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Change Profile Picture ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let instructions = Paragraph::new("Path to a JPEG, PNG, GIF or WebP image (max 5MB).")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let skip = app.avatar_path.cursor.saturating_sub(input_area.width.saturating_sub(1) as usize);
    let shown: String = app.avatar_path.text.chars().skip(skip).collect();
    frame.render_widget(Paragraph::new(shown).style(Style::default().fg(Color::Cyan)), input_area);

    let cursor_x = app.avatar_path.cursor.min(input_area.width.saturating_sub(1) as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let status = Paragraph::new("Enter to upload, Esc to cancel").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, Rect::new(inner.x, inner.y + 4, inner.width, 1));
}

fn render_attachment_modal(frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 44, 6);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Attach ");

    let label = Style::default().fg(Color::DarkGray);
    let body = Paragraph::new(vec![
        Line::from("Sharing files is not available yet."),
        Line::default(),
        Line::from(Span::styled("a or Esc to close", label)),
    ])
    .block(block)
    .alignment(Alignment::Center);
    frame.render_widget(body, popup);
}

fn render_profile_modal(surface: &ScreenModel, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 50, 11);
    frame.render_widget(Clear, popup);

    let text = |region| surface.text(region).unwrap_or_default().to_string();
    let label = Style::default().fg(Color::DarkGray);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Contact Info ");

    let body = Paragraph::new(vec![
        Line::from(Span::styled(
            text(Region::ModalName),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            text(Region::ModalStatus),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
        Line::from(vec![Span::styled("Email      ", label), Span::raw(text(Region::ModalEmail))]),
        Line::from(vec![Span::styled("Phone      ", label), Span::raw(text(Region::ModalPhone))]),
        Line::from(vec![Span::styled("Last seen  ", label), Span::raw(text(Region::ModalLastSeen))]),
        Line::from(vec![
            Span::styled("Avatar     ", label),
            Span::raw(surface.attribute(Region::ModalAvatar, "src").unwrap_or_default().to_string()),
        ]),
        Line::default(),
        Line::from(Span::styled("p or Esc to close", label)),
    ])
    .block(block)
    .wrap(Wrap { trim: true });
    frame.render_widget(body, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &[Span]) -> String {
        line.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#2ecc71"), Some(Color::Rgb(0x2e, 0xcc, 0x71)));
        assert_eq!(parse_hex_color("#95a5a6"), Some(Color::Rgb(0x95, 0xa5, 0xa6)));
        assert_eq!(parse_hex_color("2ecc71"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn test_wrap_keeps_links_whole() {
        let body = vec![
            Fragment::Text("see ".to_string()),
            Fragment::Link("https://example.com/a/long/path".to_string()),
            Fragment::Text(" now".to_string()),
        ];
        let lines = wrap_fragments(&body, 12);
        let text: Vec<String> = lines.iter().map(|l| plain(l)).collect();
        assert_eq!(text, vec!["see", "https://example.com/a/long/path", "now"]);
        assert!(lines[1][0].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_wrap_keeps_punctuation_against_links() {
        let body = vec![
            Fragment::Text("(".to_string()),
            Fragment::Link("http://x.test".to_string()),
            Fragment::Text(") ok".to_string()),
        ];
        let lines = wrap_fragments(&body, 40);
        assert_eq!(lines.len(), 1);
        assert_eq!(plain(&lines[0]), "(http://x.test) ok");
    }

    #[test]
    fn test_wrap_preserves_inner_spacing() {
        let body = vec![Fragment::Text("a  b   c".to_string())];
        let lines = wrap_fragments(&body, 40);
        assert_eq!(plain(&lines[0]), "a  b   c");

        let lines = wrap_fragments(&body, 4);
        let text: Vec<String> = lines.iter().map(|l| plain(l)).collect();
        assert_eq!(text, vec!["a  b", "c"]);
    }

    #[test]
    fn test_wrap_empty_body_is_one_line() {
        assert_eq!(wrap_fragments(&[], 20).len(), 1);
    }
}
