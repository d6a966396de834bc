//! Display widgets
//!
//! A [`Layout`] owns the views of a screen; views are looked up by
//! [`ViewId`] and are cheap handles that can be cloned into callbacks.

use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    thread::{self, ThreadId},
};

use arc_swap::ArcSwap;

/// Identifier of a view inside a layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(pub u32);

impl ViewId {
    /// The text view that shows the combined fetch result
    pub const RESULT_TEXT: ViewId = ViewId(0x7f0b_0001);
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Default)]
struct TextState {
    text: String,
    writer: Option<ThreadId>,
}

/// Text display handle
#[derive(Clone, Debug)]
pub struct TextView {
    id: ViewId,
    state: Arc<ArcSwap<TextState>>,
}

impl TextView {
    pub fn new(id: ViewId) -> Self {
        Self {
            id,
            state: Arc::new(ArcSwap::from_pointee(TextState::default())),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.state.store(Arc::new(TextState {
            text: text.into(),
            writer: Some(thread::current().id()),
        }));
    }

    pub fn text(&self) -> String {
        self.state.load().text.clone()
    }

    /// Thread that last assigned the text, if any
    pub fn last_writer(&self) -> Option<ThreadId> {
        self.state.load().writer
    }
}

/// The inflated view tree of a screen
#[derive(Debug, Default)]
pub struct Layout {
    views: HashMap<ViewId, TextView>,
}

impl Layout {
    /// Layout of the main screen: a single result text view.
    pub fn inflate_main() -> Self {
        let mut layout = Self::default();
        layout.add(TextView::new(ViewId::RESULT_TEXT));
        layout
    }

    pub fn add(&mut self, view: TextView) {
        self.views.insert(view.id(), view);
    }

    pub fn find_view_by_id(&self, id: ViewId) -> Option<TextView> {
        self.views.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_view_by_id() {
        let layout = Layout::inflate_main();
        assert!(layout.find_view_by_id(ViewId::RESULT_TEXT).is_some());
        assert!(layout.find_view_by_id(ViewId(1)).is_none());
    }

    #[test]
    fn test_handles_share_text() {
        let layout = Layout::inflate_main();
        let a = layout.find_view_by_id(ViewId::RESULT_TEXT).unwrap();
        let b = layout.find_view_by_id(ViewId::RESULT_TEXT).unwrap();

        assert_eq!(a.text(), "");
        assert!(a.last_writer().is_none());

        b.set_text("12\n34");
        assert_eq!(a.text(), "12\n34");
        assert_eq!(a.last_writer(), Some(thread::current().id()));
    }

    #[test]
    fn test_view_id_display() {
        assert_eq!(ViewId::RESULT_TEXT.to_string(), "0x7f0b0001");
    }
}
