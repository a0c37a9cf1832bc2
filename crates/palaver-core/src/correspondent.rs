//! Session bootstrap: who is on the other end of the conversation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

pub const DEFAULT_ID: &str = "1";
pub const DEFAULT_NAME: &str = "Unknown User";
pub const DEFAULT_AVATAR: &str = "default-avatar.png";

/// The other party in a one-on-one conversation. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correspondent {
    pub id: String,
    pub display_name: String,
    pub avatar_ref: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub status_line: String,
    pub last_seen_at: DateTime<Utc>,
}

impl Correspondent {
    /// Build from page parameters (`id`, `user`, `image`). Missing or empty
    /// values fall back to fixed defaults; this never fails.
    pub fn from_params(params: &HashMap<String, String>, now: DateTime<Utc>) -> Self {
        let param = |key: &str, default: &str| {
            params
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            id: param("id", DEFAULT_ID),
            display_name: param("user", DEFAULT_NAME),
            avatar_ref: param("image", DEFAULT_AVATAR),
            contact_email: "user@example.com".to_string(),
            contact_phone: "+1 234 567 890".to_string(),
            status_line: "Hey there! I am using this chat app.".to_string(),
            last_seen_at: now,
        }
    }
}

/// Parse a URL query string (`?id=2&user=Ann%20B`) into a parameter map.
/// Later duplicates win.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_params_missing() {
        let now = Utc::now();
        let c = Correspondent::from_params(&HashMap::new(), now);
        assert_eq!(c.id, "1");
        assert_eq!(c.display_name, "Unknown User");
        assert_eq!(c.avatar_ref, "default-avatar.png");
        assert_eq!(c.last_seen_at, now);
    }

    #[test]
    fn test_params_override_defaults() {
        let params = parse_query("?id=2&user=Bhavani&image=pic1.png.jpg");
        let c = Correspondent::from_params(&params, Utc::now());
        assert_eq!(c.id, "2");
        assert_eq!(c.display_name, "Bhavani");
        assert_eq!(c.avatar_ref, "pic1.png.jpg");
    }

    #[test]
    fn test_empty_param_falls_back() {
        let params = parse_query("id=&user=Ann");
        let c = Correspondent::from_params(&params, Utc::now());
        assert_eq!(c.id, "1");
        assert_eq!(c.display_name, "Ann");
    }

    #[test]
    fn test_parse_query_decodes() {
        let params = parse_query("user=Ann%20Lee&note=a+b&bad=%zz&tail=%4&city=S%C3%A3o");
        assert_eq!(params["user"], "Ann Lee");
        assert_eq!(params["note"], "a b");
        assert_eq!(params["bad"], "%zz");
        assert_eq!(params["tail"], "%4");
        assert_eq!(params["city"], "São");
    }
}
