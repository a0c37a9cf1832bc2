//! The user's own profile screen: chat list, group list, and search.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: u32,
    pub name: String,
    pub last_message: String,
    pub time: String,
    pub image: String,
    pub unread: u32,
}

impl ChatSummary {
    /// Page parameters that open this conversation.
    pub fn page_params(&self) -> HashMap<String, String> {
        HashMap::from([
            ("id".to_string(), self.id.to_string()),
            ("user".to_string(), self.name.clone()),
            ("image".to_string(), self.image.clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: u32,
    pub name: String,
    pub members: u32,
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Chats,
    Groups,
}

impl ProfileTab {
    pub fn next(self) -> Self {
        match self {
            ProfileTab::Chats => ProfileTab::Groups,
            ProfileTab::Groups => ProfileTab::Chats,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProfileTab::Chats => "Chats",
            ProfileTab::Groups => "Groups",
        }
    }
}

/// Profile-screen actions that are not built yet; each answers with a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
    Settings,
    Privacy,
    NewGroup,
}

impl ProfileAction {
    pub fn notice(&self) -> &'static str {
        match self {
            ProfileAction::Settings => "Settings page coming soon!",
            ProfileAction::Privacy => "Privacy settings coming soon!",
            ProfileAction::NewGroup => "Group creation coming soon!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub picture: String,
    pub chats: Vec<ChatSummary>,
    pub groups: Vec<GroupSummary>,
}

impl Profile {
    /// Seed profile shown on first launch.
    pub fn demo() -> Self {
        let chat = |id, name: &str, last: &str, time: &str, image: &str, unread| ChatSummary {
            id,
            name: name.to_string(),
            last_message: last.to_string(),
            time: time.to_string(),
            image: image.to_string(),
            unread,
        };
        let group = |id, name: &str, members, image: &str| GroupSummary {
            id,
            name: name.to_string(),
            members,
            image: image.to_string(),
        };

        Self {
            name: "John Doe".to_string(),
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            phone: "+1 234 567 890".to_string(),
            bio: "Hey there! I'm using this chat app.".to_string(),
            picture: "pic1.png.jpg".to_string(),
            chats: vec![
                chat(1, "Prashanth", "Hello, how are you?", "12:30", "pic2.png.jpg", 2),
                chat(2, "Bhavani", "See you tomorrow!", "11:45", "pic1.png.jpg", 0),
                chat(3, "Chandu", "Thanks!", "10:15", "pic3.png.jpg", 1),
            ],
            groups: vec![
                group(1, "Family Group", 5, "group1.jpg"),
                group(2, "Work Team", 8, "group2.jpg"),
                group(3, "Friends Forever", 12, "group3.jpg"),
            ],
        }
    }

    /// Chats whose name or last message contains `query`, ignoring case.
    pub fn search_chats(&self, query: &str) -> Vec<&ChatSummary> {
        let query = query.to_lowercase();
        self.chats
            .iter()
            .filter(|chat| {
                chat.name.to_lowercase().contains(&query)
                    || chat.last_message.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Groups whose name contains `query`, ignoring case.
    pub fn search_groups(&self, query: &str) -> Vec<&GroupSummary> {
        let query = query.to_lowercase();
        self.groups
            .iter()
            .filter(|group| group.name.to_lowercase().contains(&query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let profile = Profile::demo();
        let names: Vec<&str> = profile.search_chats("").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Prashanth", "Bhavani", "Chandu"]);
        assert_eq!(profile.search_groups("").len(), 3);
    }

    #[test]
    fn test_chat_search_matches_name_or_message() {
        let profile = Profile::demo();
        let by_name = profile.search_chats("BHA");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Bhavani");

        let by_message = profile.search_chats("thanks");
        assert_eq!(by_message.len(), 1);
        assert_eq!(by_message[0].name, "Chandu");
    }

    #[test]
    fn test_group_search_ignores_member_count() {
        let profile = Profile::demo();
        assert_eq!(profile.search_groups("team")[0].name, "Work Team");
        assert!(profile.search_groups("12").is_empty());
    }

    #[test]
    fn test_page_params() {
        let profile = Profile::demo();
        let params = profile.chats[1].page_params();
        assert_eq!(params["id"], "2");
        assert_eq!(params["user"], "Bhavani");
        assert_eq!(params["image"], "pic1.png.jpg");
    }

    #[test]
    fn test_placeholder_action_notices() {
        assert_eq!(ProfileAction::Settings.notice(), "Settings page coming soon!");
        assert_eq!(ProfileAction::Privacy.notice(), "Privacy settings coming soon!");
        assert_eq!(ProfileAction::NewGroup.notice(), "Group creation coming soon!");
    }

    #[test]
    fn test_tab_cycles() {
        assert_eq!(ProfileTab::default().next(), ProfileTab::Groups);
        assert_eq!(ProfileTab::Groups.next(), ProfileTab::Chats);
    }
}
