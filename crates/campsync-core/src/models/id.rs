use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity for a document entry, independent of its position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh random id (16 lowercase hex characters).
    pub fn generate() -> Self {
        Self(format!("{:016x}", rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entry that can be addressed by its [`EntityId`].
pub trait Identified {
    fn id(&self) -> &EntityId;
}

/// By-value list edits keyed on stable ids, for use inside document updaters.
///
/// Operations on an id that is not present leave the list unchanged.
pub trait EntityList<T: Identified>: Sized {
    fn find_by_id(&self, id: &str) -> Option<&T>;
    fn with_pushed(self, item: T) -> Self;
    fn without_id(self, id: &str) -> Self;
    fn with_updated(self, id: &str, update: impl FnOnce(T) -> T) -> Self;
    /// Move the entry to `index`, clamped to the end of the list.
    fn with_moved(self, id: &str, index: usize) -> Self;
}

impl<T: Identified> EntityList<T> for Vec<T> {
    fn find_by_id(&self, id: &str) -> Option<&T> {
        self.iter().find(|item| item.id().as_str() == id)
    }

    fn with_pushed(mut self, item: T) -> Self {
        self.push(item);
        self
    }

    fn without_id(mut self, id: &str) -> Self {
        self.retain(|item| item.id().as_str() != id);
        self
    }

    fn with_updated(mut self, id: &str, update: impl FnOnce(T) -> T) -> Self {
        if let Some(pos) = self.iter().position(|item| item.id().as_str() == id) {
            let item = self.remove(pos);
            self.insert(pos, update(item));
        }
        self
    }

    fn with_moved(mut self, id: &str, index: usize) -> Self {
        if let Some(pos) = self.iter().position(|item| item.id().as_str() == id) {
            let item = self.remove(pos);
            let target = index.min(self.len());
            self.insert(target, item);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: EntityId,
        text: &'static str,
    }

    impl Identified for Note {
        fn id(&self) -> &EntityId {
            &self.id
        }
    }

    fn notes() -> Vec<Note> {
        vec![
            Note { id: "a".into(), text: "first" },
            Note { id: "b".into(), text: "second" },
            Note { id: "c".into(), text: "third" },
        ]
    }

    fn ids(list: &[Note]) -> Vec<&str> {
        list.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_generate_is_hex_and_unique() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert_eq!(a.as_str().len(), 16);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_without_id_removes_only_target() {
        let list = notes().without_id("b");
        assert_eq!(ids(&list), vec!["a", "c"]);

        // Unknown id is a no-op
        let list = list.without_id("zzz");
        assert_eq!(ids(&list), vec!["a", "c"]);
    }

    #[test]
    fn test_with_updated_keeps_position() {
        let list = notes().with_updated("b", |mut n| {
            n.text = "edited";
            n
        });
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
        assert_eq!(list.find_by_id("b").map(|n| n.text), Some("edited"));
    }

    #[test]
    fn test_with_moved_clamps_index() {
        let list = notes().with_moved("a", 99);
        assert_eq!(ids(&list), vec!["b", "c", "a"]);

        let list = list.with_moved("a", 0);
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_edit_target_survives_removal_of_earlier_entry() {
        // Deleting an earlier entry must not retarget an edit addressed by id
        let list = notes().without_id("a").with_updated("c", |mut n| {
            n.text = "still third";
            n
        });
        assert_eq!(list.find_by_id("c").map(|n| n.text), Some("still third"));
        assert_eq!(list.find_by_id("b").map(|n| n.text), Some("second"));
    }
}
