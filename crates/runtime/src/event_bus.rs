use serde::Serialize;

use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoticeId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    NotFound,
    CapabilityUnavailable,
}

/// A user-visible, dismissible message raised while handling one UI event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: NoticeId,
    pub frame_index: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Collects notices for the page to show.
///
/// Notices are recorded once and never re-raised; the page removes them with
/// `dismiss` or takes them all with `drain`.
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    notices: Vec<Notice>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, kind: NoticeKind, message: impl Into<String>) -> NoticeId {
        let id = NoticeId(self.next_id);
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
        id
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Notices raised during `frame`.
    pub fn in_frame(&self, frame: Frame) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| n.frame_index == frame.index)
    }

    /// Removes a notice. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, NoticeKind};
    use crate::frame::Frame;

    #[test]
    fn records_notices_with_frame_index() {
        let mut bus = EventBus::new();
        let f = Frame::new(2);
        bus.emit(f, NoticeKind::Info, "hello");
        assert_eq!(bus.notices().len(), 1);
        assert_eq!(bus.notices()[0].frame_index, 2);
        assert_eq!(bus.in_frame(f).count(), 1);
        assert_eq!(bus.in_frame(f.next()).count(), 0);
    }

    #[test]
    fn dismiss_removes_once() {
        let mut bus = EventBus::new();
        let a = bus.emit(Frame::new(0), NoticeKind::Info, "a");
        let b = bus.emit(Frame::new(0), NoticeKind::NotFound, "b");
        assert_ne!(a, b);
        assert!(bus.dismiss(a));
        assert!(!bus.dismiss(a));
        assert_eq!(bus.notices().len(), 1);
        assert_eq!(bus.notices()[0].id, b);
    }

    #[test]
    fn drain_clears_notices() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(0), NoticeKind::Info, "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.notices().is_empty());
    }
}
