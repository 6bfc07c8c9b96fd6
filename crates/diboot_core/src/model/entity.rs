//! Identity contract shared by every persisted entity.

/// Store-assigned primary key.
pub type EntityId = i64;

/// Parent id value that marks a root row in self-referencing tables.
pub const ROOT_PARENT_ID: EntityId = 0;

/// Minimal identity contract used by generic CRUD and relation helpers.
pub trait Entity {
    /// Returns the persisted identity, or `None` before first insert.
    fn id(&self) -> Option<EntityId>;

    /// Writes back the identity assigned by the store.
    fn set_id(&mut self, id: EntityId);

    /// Returns whether this entity has not been persisted yet.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}
