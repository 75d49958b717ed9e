use foundation::handles::Handle;

/// A slot in the [`World`](crate::World); stale ids stop resolving once the
/// entity is despawned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub Handle);

impl EntityId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}
