//! Render pipeline: history log in, display blocks out.
//!
//! Rendering is a pure function of the log and the clock. Every pass rebuilds
//! the whole block list; there is no diffing.

use chrono::{DateTime, TimeZone};

use crate::correspondent::Correspondent;
use crate::format::{escape_html, fragments, fragments_to_markup, Fragment, TimeFormat};
use crate::message::{Direction, HistoryLog};
use crate::surface::{DisplaySurface, Region};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub direction: Direction,
    pub body: Vec<Fragment>,
    pub time: String,
    /// Only received messages carry the correspondent's avatar.
    pub avatar: Option<Avatar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    DateSeparator { label: String },
    Message(MessageBlock),
}

impl Block {
    /// HTML for surfaces that inject markup.
    pub fn to_markup(&self) -> String {
        match self {
            Block::DateSeparator { label } => {
                format!(r#"<div class="date-separator">{}</div>"#, escape_html(label))
            }
            Block::Message(msg) => {
                let avatar = msg
                    .avatar
                    .as_ref()
                    .map(|a| {
                        format!(
                            r#"<img src="{}" alt="{}" class="message-avatar">"#,
                            escape_html(&a.src),
                            escape_html(&a.alt)
                        )
                    })
                    .unwrap_or_default();
                format!(
                    r#"<div class="message {}">{}<div class="message-content"><p>{}</p><span class="time">{}</span></div></div>"#,
                    msg.direction.as_str(),
                    avatar,
                    fragments_to_markup(&msg.body),
                    escape_html(&msg.time)
                )
            }
        }
    }
}

/// Group the log by calendar day, relative to `now`'s timezone.
pub fn render<Tz: TimeZone>(
    log: &HistoryLog,
    correspondent: &Correspondent,
    now: &DateTime<Tz>,
    format: &TimeFormat,
) -> Vec<Block>
where
    Tz::Offset: std::fmt::Display,
{
    let tz = now.timezone();
    let today = now.date_naive();
    let mut blocks = Vec::with_capacity(log.len() + 4);
    let mut last_label: Option<String> = None;

    for message in log.iter() {
        let local = message.sent_at.with_timezone(&tz);
        let label = format.date_label(local.date_naive(), today);

        if last_label.as_deref() != Some(label.as_str()) {
            blocks.push(Block::DateSeparator {
                label: label.clone(),
            });
            last_label = Some(label);
        }

        let avatar = match message.direction {
            Direction::Received => Some(Avatar {
                src: correspondent.avatar_ref.clone(),
                alt: correspondent.display_name.clone(),
            }),
            Direction::Sent => None,
        };

        blocks.push(Block::Message(MessageBlock {
            direction: message.direction,
            body: fragments(&message.text),
            time: format.time(&local),
            avatar,
        }));
    }

    blocks
}

/// Replace the message region's children and scroll to the newest block.
pub fn paint<S: DisplaySurface + ?Sized>(surface: &mut S, blocks: Vec<Block>) {
    surface.clear_children(Region::Messages);
    for block in blocks {
        surface.append_block(Region::Messages, block);
    }
    surface.scroll_to_end(Region::Messages);
}
