//! Ordered, id-keyed collections inside a state slice.
//!
//! Every helper checks before it mutates: on error the collection is
//! exactly as it was.

use crate::error::DomainError;

/// An entity with a caller-supplied identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

pub fn contains<T: Identified>(items: &[T], id: &str) -> bool {
    items.iter().any(|item| item.id() == id)
}

/// Append `item`, rejecting an id that is already present.
pub fn insert_unique<T: Identified>(
    items: &mut Vec<T>,
    item: T,
    collection: &'static str,
) -> Result<(), DomainError> {
    if contains(items, item.id()) {
        return Err(DomainError::duplicate(collection, item.id()));
    }
    items.push(item);
    Ok(())
}

pub fn find_mut<'a, T: Identified>(
    items: &'a mut [T],
    id: &str,
    collection: &'static str,
) -> Result<&'a mut T, DomainError> {
    items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(|| DomainError::not_found(collection, id))
}

pub fn remove_by_id<T: Identified>(
    items: &mut Vec<T>,
    id: &str,
    collection: &'static str,
) -> Result<T, DomainError> {
    let position = items
        .iter()
        .position(|item| item.id() == id)
        .ok_or_else(|| DomainError::not_found(collection, id))?;
    Ok(items.remove(position))
}

/// Rebuild the collection from `order`.
///
/// The result holds exactly the listed ids that exist, in list order. Ids
/// not found are dropped, and so is every existing entry the list doesn't
/// mention. A repeated id is taken once, at its first position.
pub fn reorder_by_ids<T: Identified>(items: &mut Vec<T>, order: &[String]) {
    let mut source: Vec<Option<T>> = std::mem::take(items).into_iter().map(Some).collect();
    for id in order {
        let taken = source
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|item| item.id() == id))
            .and_then(Option::take);
        if let Some(item) = taken {
            items.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry(&'static str);

    impl Identified for Entry {
        fn id(&self) -> &str {
            self.0
        }
    }

    fn ids(items: &[Entry]) -> Vec<&str> {
        items.iter().map(|e| e.0).collect()
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicate_insert_leaves_collection_untouched() {
        let mut items = vec![Entry("a")];
        let err = insert_unique(&mut items, Entry("a"), "entries").unwrap_err();

        assert_eq!(err, DomainError::duplicate("entries", "a"));
        assert_eq!(ids(&items), vec!["a"]);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut items = vec![Entry("a"), Entry("b")];
        let err = remove_by_id(&mut items, "z", "entries").unwrap_err();

        assert_eq!(err, DomainError::not_found("entries", "z"));
        assert_eq!(ids(&items), vec!["a", "b"]);
    }

    #[test]
    fn reorder_drops_unmentioned_entries() {
        let mut items = vec![Entry("a"), Entry("b"), Entry("c")];
        reorder_by_ids(&mut items, &order(&["b", "a"]));
        assert_eq!(ids(&items), vec!["b", "a"]);
    }

    #[test]
    fn reorder_drops_unknown_ids() {
        let mut items = vec![Entry("a"), Entry("b")];
        reorder_by_ids(&mut items, &order(&["x", "b", "y"]));
        assert_eq!(ids(&items), vec!["b"]);
    }

    #[test]
    fn reorder_takes_repeated_id_once() {
        let mut items = vec![Entry("a"), Entry("b")];
        reorder_by_ids(&mut items, &order(&["a", "b", "a"]));
        assert_eq!(ids(&items), vec!["a", "b"]);
    }

    #[test]
    fn reorder_with_empty_list_empties_the_collection() {
        let mut items = vec![Entry("a")];
        reorder_by_ids(&mut items, &[]);
        assert!(items.is_empty());
    }
}
