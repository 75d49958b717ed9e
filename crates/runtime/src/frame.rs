/// One UI event's worth of work.
///
/// Every handler (filter change, click, hook request) runs to completion
/// inside a single frame; notices raised by it carry the frame index.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
}

impl Frame {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}
