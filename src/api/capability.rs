// src/api/capability.rs

use super::RemoteResult;

/// Remote object with a display name.
pub trait Named {
    fn name(&self) -> RemoteResult<String>;
}

/// Remote object with a stable id assigned by the tool.
pub trait Identifiable {
    fn id(&self) -> RemoteResult<String>;
}

/// Remote object owning an ordered list of children.
///
/// Element order is the order the tool reports; callers rely on it for
/// traversal and for one-to-one restoration.
pub trait OrderedCollectionOwner {
    type Item;

    fn items(&self) -> RemoteResult<Vec<Self::Item>>;
}
