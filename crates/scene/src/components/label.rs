/// Billboard text floating above an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Height above the entity's bounds top, in scene units.
    pub lift: f64,
}

impl Label {
    pub const DEFAULT_LIFT: f64 = 3.0;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lift: Self::DEFAULT_LIFT,
        }
    }
}
