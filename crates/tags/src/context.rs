//! Immutable tag contexts and their builder.

use crate::scope;
use crate::tag::{Tag, TagKey, TagValue};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::{Arc, LazyLock};

static EMPTY: LazyLock<TagContext> = LazyLock::new(|| TagContext(Arc::new(BTreeMap::new())));

/// An immutable set of tags with unique keys.
///
/// Cloning shares the underlying map. Equality is set equality over the
/// key/value pairs; iteration is in key order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagContext(Arc<BTreeMap<TagKey, TagValue>>);

impl TagContext {
    /// The shared empty context.
    #[must_use]
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the context has no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a tag value by key name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.0.iter())
    }

    /// Collect the tags as owned pairs.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.iter()
            .map(|(key, value)| Tag::new(key.clone(), value.clone()))
            .collect()
    }

    /// Start a builder seeded with this context's tags.
    #[must_use]
    pub fn to_builder(&self) -> TagContextBuilder {
        TagContextBuilder::from_context(self)
    }
}

impl Default for TagContext {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Tag> for TagContext {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let tags = iter.into_iter().map(|tag| (tag.key, tag.value)).collect();
        Self(Arc::new(tags))
    }
}

/// Iterator over the tags of a [`TagContext`].
#[derive(Debug, Clone)]
pub struct Iter<'a>(btree_map::Iter<'a, TagKey, TagValue>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a TagKey, &'a TagValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a TagContext {
    type Item = (&'a TagKey, &'a TagValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds [`TagContext`] snapshots from a base set plus edits.
///
/// `build` copies the current state, so a builder can keep being edited
/// after a snapshot was taken without affecting that snapshot.
#[derive(Debug, Clone, Default)]
pub struct TagContextBuilder {
    tags: BTreeMap<TagKey, TagValue>,
}

impl TagContextBuilder {
    /// Start from an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the tags of `base`.
    #[must_use]
    pub fn from_context(base: &TagContext) -> Self {
        Self {
            tags: (*base.0).clone(),
        }
    }

    /// Start from the ambient tag context of the calling strand.
    #[must_use]
    pub fn from_current() -> Self {
        Self::from_context(&scope::current())
    }

    /// Insert a tag, overwriting any existing value for `key`.
    #[must_use]
    pub fn put(mut self, key: TagKey, value: TagValue) -> Self {
        self.tags.insert(key, value);
        self
    }

    /// Remove the tag for `key`; a no-op when absent.
    #[must_use]
    pub fn remove(mut self, key: &str) -> Self {
        self.tags.remove(key);
        self
    }

    /// Snapshot the current state as an immutable context.
    #[must_use]
    pub fn build(&self) -> TagContext {
        TagContext(Arc::new(self.tags.clone()))
    }
}
