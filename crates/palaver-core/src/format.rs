//! Message body formatting and time/date labels.

use std::fmt::Write;
use std::sync::OnceLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

const EMOJI: [(&str, &str); 3] = [(":)", "😊"), (":(", "😢"), (":D", "😃")];

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| Regex::new(r"https?://\S+").expect("valid URL regex"))
}

/// A piece of a formatted message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Plain text with emoji tokens already substituted. Not escaped.
    Text(String),
    /// A bare URL, exactly as typed.
    Link(String),
}

/// Split a raw message body into text and link fragments.
///
/// Emoji substitution only touches the text between URLs, so a URL such as
/// `http://x.test/:D` survives intact.
pub fn fragments(text: &str) -> Vec<Fragment> {
    let mut out = Vec::new();
    let mut last = 0;

    for m in url_regex().find_iter(text) {
        if m.start() > last {
            out.push(Fragment::Text(substitute_emoji(&text[last..m.start()])));
        }
        out.push(Fragment::Link(m.as_str().to_string()));
        last = m.end();
    }

    if last < text.len() {
        out.push(Fragment::Text(substitute_emoji(&text[last..])));
    }

    out
}

pub fn substitute_emoji(text: &str) -> String {
    EMOJI
        .iter()
        .fold(text.to_string(), |acc, (token, glyph)| acc.replace(token, glyph))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render fragments as safe HTML. Every user-controlled character is escaped,
/// links open in a new browsing context.
pub fn fragments_to_markup(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => out.push_str(&escape_html(text)),
            Fragment::Link(url) => {
                let url = escape_html(url);
                out.push_str(&format!(
                    r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
                ));
            }
        }
    }
    out
}

/// Linkify, substitute emoji, and escape a message body.
pub fn format_message_text(text: &str) -> String {
    fragments_to_markup(&fragments(text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clock {
    #[default]
    H24,
    H12,
}

pub const DEFAULT_DATE_PATTERN: &str = "%-m/%-d/%Y";

/// Whether chrono can format dates with `pattern`.
pub fn is_valid_date_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Locale conventions for timestamps and date separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    pub clock: Clock,
    /// strftime pattern for dates older than yesterday
    pub date_pattern: String,
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self {
            clock: Clock::H24,
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
        }
    }
}

impl TimeFormat {
    /// Hour:minute in the configured clock convention.
    pub fn time<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match self.clock {
            Clock::H24 => at.format("%H:%M").to_string(),
            Clock::H12 => at.format("%-I:%M %p").to_string(),
        }
    }

    /// Falls back to the default pattern when `date_pattern` is not a valid
    /// strftime pattern.
    pub fn date(&self, day: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", day.format(&self.date_pattern)).is_ok() {
            return out;
        }
        day.format(DEFAULT_DATE_PATTERN).to_string()
    }

    /// Separator label for `day` as seen on `today`.
    pub fn date_label(&self, day: NaiveDate, today: NaiveDate) -> String {
        if day == today {
            "Today".to_string()
        } else if Some(day) == today.pred_opt() {
            "Yesterday".to_string()
        } else {
            self.date(day)
        }
    }

    pub fn last_seen(&self, then: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let diff = now - then;
        if diff < Duration::minutes(1) {
            "Just now".to_string()
        } else if diff < Duration::hours(1) {
            format!("{} minutes ago", diff.num_minutes())
        } else if diff < Duration::days(1) {
            format!("{} hours ago", diff.num_hours())
        } else {
            self.date(then.date_naive())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_then_emoji_keeps_link_target() {
        let out = format_message_text("see :) http://x.test");
        assert_eq!(
            out,
            r#"see 😊 <a href="http://x.test" target="_blank" rel="noopener noreferrer">http://x.test</a>"#
        );
    }

    #[test]
    fn test_emoji_inside_url_untouched() {
        let frags = fragments("look http://x.test/:D now :D");
        assert_eq!(
            frags,
            vec![
                Fragment::Text("look ".to_string()),
                Fragment::Link("http://x.test/:D".to_string()),
                Fragment::Text(" now 😃".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_emoji_tokens() {
        assert_eq!(substitute_emoji(":) :( :D"), "😊 😢 😃");
    }

    #[test]
    fn test_plain_sentence_is_stable() {
        let text = "Meet me at the station at noon";
        let once = format_message_text(text);
        let twice = format_message_text(&once);
        assert_eq!(once, text);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_markup_is_escaped() {
        let out = format_message_text("<script>alert('x')</script> & more");
        assert_eq!(
            out,
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"
        );
    }

    #[test]
    fn test_url_attribute_cannot_break_out() {
        let out = format_message_text(r#"https://x.test/"onmouseover="bad"#);
        assert!(out.contains(r#"href="https://x.test/&quot;onmouseover=&quot;bad""#));
        assert!(!out.contains(r#"" onmouseover"#));
    }

    #[test]
    fn test_date_labels() {
        let fmt = TimeFormat::default();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(fmt.date_label(today, today), "Today");
        assert_eq!(
            fmt.date_label(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), today),
            "Yesterday"
        );
        assert_eq!(
            fmt.date_label(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), today),
            "10/16/2026"
        );
    }

    #[test]
    fn test_bad_date_pattern_falls_back() {
        assert!(is_valid_date_pattern("%Y-%m-%d"));
        assert!(!is_valid_date_pattern("%Q"));

        let fmt = TimeFormat {
            date_pattern: "%Q".to_string(),
            ..TimeFormat::default()
        };
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(fmt.date(day), "10/16/2026");

        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(fmt.last_seen(now - Duration::days(3), now), "10/16/2026");
    }

    #[test]
    fn test_time_clock_conventions() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 15, 7, 0).unwrap();
        let h24 = TimeFormat::default();
        let h12 = TimeFormat {
            clock: Clock::H12,
            ..TimeFormat::default()
        };
        assert_eq!(h24.time(&at), "15:07");
        assert_eq!(h12.time(&at), "3:07 PM");
    }

    #[test]
    fn test_last_seen_buckets() {
        let fmt = TimeFormat::default();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(fmt.last_seen(now - Duration::seconds(30), now), "Just now");
        assert_eq!(fmt.last_seen(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(fmt.last_seen(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(fmt.last_seen(now - Duration::days(4), now), "10/15/2026");
    }
}
