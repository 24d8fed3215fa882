//! Named sets - ordered collections with unique names and unique values
//!
//! A `NamedSet` stores user-managed lists such as client credentials,
//! deployments and sandboxes. Two invariants hold at all times:
//! - no two items share a name (exact, case-sensitive comparison)
//! - no two items hold equal values, regardless of their names
//!
//! Items added without a name get one derived from the set's default name
//! pattern: `Client`, `Client (1)`, `Client (2)`, ...
//!
//! Renames go through the set (see [`NamedItemMut::try_set_name`]) so that a
//! colliding name can be vetoed and reverted before anyone observes it.

use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Pattern used when the owner does not supply one
pub const DEFAULT_NAME_PATTERN: &str = "NamedItem";

/// A value paired with a display name
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NamedItem<T> {
    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "Value")]
    value: T,
}

impl<T> NamedItem<T> {
    /// Create a free-standing item. Names are only checked once the item is
    /// inserted into a set.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_parts(self) -> (String, T) {
        (self.name, self.value)
    }

    fn set_name(&mut self, name: String) -> NameChanged {
        let previous = std::mem::replace(&mut self.name, name);
        NameChanged {
            previous,
            current: self.name.clone(),
        }
    }
}

/// Broadcast to rename subscribers after a rename has been accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChanged {
    pub previous: String,
    pub current: String,
}

/// Handle returned by [`NamedSet::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type RemovePredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type RenameListener = Box<dyn FnMut(&NameChanged) + Send>;

/// Insertion-ordered collection enforcing unique names and unique values
pub struct NamedSet<T> {
    items: Vec<NamedItem<T>>,
    default_name_pattern: String,
    remove_predicate: Option<RemovePredicate<T>>,
    listeners: Vec<(SubscriptionId, RenameListener)>,
    next_subscription: u64,
}

impl<T> NamedSet<T> {
    /// Create an empty set whose unnamed additions are named after `pattern`
    pub fn new(default_name_pattern: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            default_name_pattern: default_name_pattern.into(),
            remove_predicate: None,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn default_name_pattern(&self) -> &str {
        &self.default_name_pattern
    }

    /// Change the pattern used for future additions. Existing names are kept.
    pub fn set_default_name_pattern(&mut self, pattern: impl Into<String>) {
        self.default_name_pattern = pattern.into();
    }

    /// Install a policy deciding whether a value may be removed
    pub fn set_remove_predicate<F>(&mut self, predicate: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.remove_predicate = Some(Arc::new(predicate));
    }

    pub fn clear_remove_predicate(&mut self) {
        self.remove_predicate = None;
    }

    /// Register a listener for accepted renames
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&NameChanged) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedItem<T>> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&NamedItem<T>> {
        self.items.first()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| item.value())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    /// Index of the item with the given name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&NamedItem<T>> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn get_index(&self, index: usize) -> Option<&NamedItem<T>> {
        self.items.get(index)
    }

    /// Mutable handle to the named item; all edits are validated by the set
    pub fn get_mut(&mut self, name: &str) -> Option<NamedItemMut<'_, T>> {
        let index = self.position(name)?;
        Some(NamedItemMut { set: self, index })
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<NamedItemMut<'_, T>> {
        if index >= self.items.len() {
            return None;
        }
        Some(NamedItemMut { set: self, index })
    }

    /// Remove the named item, subject to the removal predicate
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(index) = self.position(name) else {
            return false;
        };

        if let Some(predicate) = &self.remove_predicate {
            if !predicate(&self.items[index].value) {
                return false;
            }
        }

        self.items.remove(index);
        true
    }

    /// Rename the item called `current`. Shorthand for
    /// `get_mut(current)?.try_set_name(new_name, true)`.
    pub fn rename(&mut self, current: &str, new_name: impl Into<String>) -> bool {
        match self.get_mut(current) {
            Some(mut item) => item.try_set_name(new_name, true),
            None => false,
        }
    }

    /// The next name `add` would give an item
    fn next_item_name(&self) -> String {
        let mut name = self.default_name_pattern.clone();
        let mut increment = 0;
        while self.contains_name(&name) {
            increment += 1;
            name = format!("{} ({})", self.default_name_pattern, increment);
        }
        name
    }

    fn apply_rename(&mut self, index: usize, name: String) -> bool {
        if self.items[index].name == name {
            return true;
        }
        if name.is_empty() {
            return false;
        }

        let change = self.items[index].set_name(name);

        let collides = self
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| i != index && item.name == change.current);
        if collides {
            // Silent revert, subscribers never see the rejected name
            self.items[index].set_name(change.previous);
            return false;
        }

        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
        true
    }
}

impl<T: PartialEq> NamedSet<T> {
    /// Build a set from existing items. Entries that would break the set's
    /// invariants are skipped with a warning.
    pub fn from_items(
        default_name_pattern: impl Into<String>,
        items: impl IntoIterator<Item = NamedItem<T>>,
    ) -> Self {
        let mut set = Self::new(default_name_pattern);
        for item in items {
            let (name, value) = item.into_parts();
            if !set.add_named(name.clone(), value) {
                tracing::warn!(name = %name, "Skipping entry with empty or duplicate name, or duplicate value");
            }
        }
        set
    }

    pub fn contains_value(&self, value: &T) -> bool {
        self.items.iter().any(|item| item.value == *value)
    }

    /// Find the item holding an equal value
    pub fn find_value(&self, value: &T) -> Option<&NamedItem<T>> {
        self.items.iter().find(|item| item.value == *value)
    }

    /// Append `value` under a generated name. Returns false (and leaves the
    /// set untouched) if an equal value is already present.
    pub fn add(&mut self, value: T) -> bool {
        let name = self.next_item_name();
        if self.contains_name(&name) || self.contains_value(&value) {
            return false;
        }

        self.items.push(NamedItem::new(name, value));
        true
    }

    /// Append `value` under an explicit name
    pub fn add_named(&mut self, name: impl Into<String>, value: T) -> bool {
        let name = name.into();
        if name.is_empty() || self.contains_name(&name) || self.contains_value(&value) {
            return false;
        }

        self.items.push(NamedItem::new(name, value));
        true
    }
}

impl<T: PartialEq + Default> NamedSet<T> {
    /// Append a default value. Usually succeeds once, until the added item
    /// has its value replaced.
    pub fn add_default(&mut self) -> bool {
        self.add(T::default())
    }
}

/// Mutable access to one item of a [`NamedSet`]
pub struct NamedItemMut<'a, T> {
    set: &'a mut NamedSet<T>,
    index: usize,
}

impl<T> NamedItemMut<'_, T> {
    pub fn name(&self) -> &str {
        self.set.items[self.index].name()
    }

    pub fn value(&self) -> &T {
        self.set.items[self.index].value()
    }

    /// Set the item's name.
    ///
    /// With `notify` the owning set is consulted: an empty name or one held by
    /// another item is rejected and the previous name stays in place.
    /// Accepted changes reach the set's rename subscribers.
    ///
    /// Without `notify` the name is written as given and nobody is told; the
    /// caller vouches for it.
    pub fn try_set_name(&mut self, name: impl Into<String>, notify: bool) -> bool {
        let name = name.into();
        if !notify {
            self.set.items[self.index].set_name(name);
            return true;
        }
        self.set.apply_rename(self.index, name)
    }
}

impl<T: PartialEq> NamedItemMut<'_, T> {
    /// Replace the value unless another item already holds an equal one
    pub fn replace_value(&mut self, value: T) -> bool {
        let taken = self
            .set
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| i != self.index && item.value == value);
        if taken {
            return false;
        }

        self.set.items[self.index].value = value;
        true
    }
}

impl<T> Default for NamedSet<T> {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PATTERN)
    }
}

// Subscribers belong to whoever registered them, so clones start without any.
impl<T: Clone> Clone for NamedSet<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            default_name_pattern: self.default_name_pattern.clone(),
            remove_predicate: self.remove_predicate.clone(),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for NamedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedSet")
            .field("items", &self.items)
            .field("default_name_pattern", &self.default_name_pattern)
            .field("has_remove_predicate", &self.remove_predicate.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T: PartialEq> PartialEq for NamedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl<'a, T> IntoIterator for &'a NamedSet<T> {
    type Item = &'a NamedItem<T>;
    type IntoIter = std::slice::Iter<'a, NamedItem<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for NamedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

// The pattern is not part of the array; owners re-apply theirs after loading.
impl<'de, T: DeserializeOwned + PartialEq> Deserialize<'de> for NamedSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items: Vec<NamedItem<T>> = Vec::deserialize(deserializer)?;
        Ok(Self::from_items(DEFAULT_NAME_PATTERN, items))
    }
}
