//! The display surface the chat session writes to.
//!
//! The session never touches a concrete UI toolkit; it names regions and
//! pushes text, attributes and blocks through `DisplaySurface`. `ScreenModel`
//! is a retained implementation: the terminal client paints from it, and tests
//! inspect it directly.

use std::collections::{HashMap, HashSet};

use crate::render::Block;

/// Named UI regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    HeaderName,
    HeaderAvatar,
    StatusText,
    StatusIndicator,
    Messages,
    MessageLoading,
    MessageInput,
    Notice,
    ProfileModal,
    ModalName,
    ModalAvatar,
    ModalStatus,
    ModalEmail,
    ModalPhone,
    ModalLastSeen,
    AttachmentModal,
}

impl Region {
    /// Regions that start out hidden.
    fn hidden_by_default(&self) -> bool {
        matches!(
            self,
            Region::Notice | Region::ProfileModal | Region::AttachmentModal
        )
    }
}

pub trait DisplaySurface {
    fn set_text(&mut self, region: Region, text: &str);
    fn set_attribute(&mut self, region: Region, name: &str, value: &str);
    fn append_block(&mut self, region: Region, block: Block);
    fn clear_children(&mut self, region: Region);
    fn set_visible(&mut self, region: Region, visible: bool);
    fn scroll_to_end(&mut self, region: Region);
}

#[derive(Debug, Clone, Default)]
pub struct ScreenModel {
    texts: HashMap<Region, String>,
    attributes: HashMap<(Region, String), String>,
    children: HashMap<Region, Vec<Block>>,
    visibility: HashMap<Region, bool>,
    pinned_to_end: HashSet<Region>,
}

impl ScreenModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, region: Region) -> Option<&str> {
        self.texts.get(&region).map(String::as_str)
    }

    pub fn attribute(&self, region: Region, name: &str) -> Option<&str> {
        self.attributes
            .get(&(region, name.to_string()))
            .map(String::as_str)
    }

    pub fn children(&self, region: Region) -> &[Block] {
        self.children.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.visibility
            .get(&region)
            .copied()
            .unwrap_or(!region.hidden_by_default())
    }

    pub fn is_scrolled_to_end(&self, region: Region) -> bool {
        self.pinned_to_end.contains(&region)
    }

    /// The user scrolled away from the newest block.
    pub fn unpin(&mut self, region: Region) {
        self.pinned_to_end.remove(&region);
    }
}

impl DisplaySurface for ScreenModel {
    fn set_text(&mut self, region: Region, text: &str) {
        self.texts.insert(region, text.to_string());
    }

    fn set_attribute(&mut self, region: Region, name: &str, value: &str) {
        self.attributes
            .insert((region, name.to_string()), value.to_string());
    }

    fn append_block(&mut self, region: Region, block: Block) {
        self.children.entry(region).or_default().push(block);
    }

    fn clear_children(&mut self, region: Region) {
        self.children.remove(&region);
    }

    fn set_visible(&mut self, region: Region, visible: bool) {
        self.visibility.insert(region, visible);
    }

    fn scroll_to_end(&mut self, region: Region) {
        self.pinned_to_end.insert(region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_visibility() {
        let model = ScreenModel::new();
        assert!(model.is_visible(Region::Messages));
        assert!(model.is_visible(Region::MessageLoading));
        assert!(!model.is_visible(Region::Notice));
        assert!(!model.is_visible(Region::ProfileModal));
        assert!(!model.is_visible(Region::AttachmentModal));
    }

    #[test]
    fn test_children_append_and_clear() {
        let mut model = ScreenModel::new();
        model.append_block(Region::Messages, Block::DateSeparator { label: "Today".into() });
        model.append_block(Region::Messages, Block::DateSeparator { label: "Later".into() });
        assert_eq!(model.children(Region::Messages).len(), 2);

        model.clear_children(Region::Messages);
        assert!(model.children(Region::Messages).is_empty());
    }

    #[test]
    fn test_attributes_are_per_region() {
        let mut model = ScreenModel::new();
        model.set_attribute(Region::StatusIndicator, "background-color", "#2ecc71");
        assert_eq!(
            model.attribute(Region::StatusIndicator, "background-color"),
            Some("#2ecc71")
        );
        assert_eq!(model.attribute(Region::HeaderAvatar, "background-color"), None);
    }

    #[test]
    fn test_unpin_after_scroll() {
        let mut model = ScreenModel::new();
        model.scroll_to_end(Region::Messages);
        assert!(model.is_scrolled_to_end(Region::Messages));
        model.unpin(Region::Messages);
        assert!(!model.is_scrolled_to_end(Region::Messages));
    }
}
