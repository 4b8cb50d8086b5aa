//! Module: executor::group::index
//! Responsibility: per-attribute deduplication of grouping values into buckets.
//! Does not own: combination of buckets into groups or output ordering.
//! Boundary: built once per stage run from the group-key children, then
//! consumed read-only by the group former.

use crate::{
    db::{
        Uid,
        query::{GroupKeyChild, GroupKeySource},
        uid::sort_dedup,
    },
    obs::sink::{self, MetricsEvent},
    value::{Value, marshal_text},
};
use std::collections::HashMap;
use tracing::debug;

///
/// BucketEntry
///
/// One distinct value of one grouping attribute and the entities holding it.
/// `uids` follow discovery order until the index is sealed.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(in crate::db) struct BucketEntry {
    value: Value,
    uids: Vec<Uid>,
}

impl BucketEntry {
    #[must_use]
    pub(in crate::db) const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub(in crate::db) fn uids(&self) -> &[Uid] {
        &self.uids
    }
}

///
/// ValueBucket
///
/// All distinct values seen for one grouping attribute, keyed by canonical
/// string form. Entry order is insertion order and carries no meaning.
///

#[derive(Clone, Debug)]
pub(in crate::db) struct ValueBucket {
    attr: String,
    entries: Vec<BucketEntry>,
    by_key: HashMap<String, usize>,
}

impl ValueBucket {
    fn new(attr: &str) -> Self {
        Self {
            attr: attr.to_string(),
            entries: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    #[must_use]
    pub(in crate::db) fn attr(&self) -> &str {
        &self.attr
    }

    #[must_use]
    pub(in crate::db) fn entries(&self) -> &[BucketEntry] {
        &self.entries
    }

    fn insert(&mut self, key: String, value: &Value, uid: Uid) {
        if let Some(&slot) = self.by_key.get(&key) {
            let uids = &mut self.entries[slot].uids;
            if uids.last() != Some(&uid) {
                uids.push(uid);
            }
            return;
        }

        self.by_key.insert(key, self.entries.len());
        self.entries.push(BucketEntry {
            value: value.clone(),
            uids: vec![uid],
        });
    }
}

///
/// GroupAttributeIndex
///
/// Ordered buckets, one per grouping attribute in first-seen order.
/// That order is the key order of every group formed from this index.
///

#[derive(Clone, Debug, Default)]
pub(in crate::db) struct GroupAttributeIndex {
    buckets: Vec<ValueBucket>,
}

impl GroupAttributeIndex {
    #[must_use]
    pub(in crate::db) const fn new() -> Self {
        Self {
            buckets: Vec::new(),
        }
    }

    /// Build and seal the index from a subtree's grouping children.
    #[must_use]
    pub(in crate::db) fn from_children<'a>(
        children: impl IntoIterator<Item = &'a GroupKeyChild>,
    ) -> Self {
        let mut index = Self::new();
        for child in children {
            index.add_child(child);
        }
        index.seal();

        index
    }

    #[must_use]
    pub(in crate::db) fn buckets(&self) -> &[ValueBucket] {
        &self.buckets
    }

    #[must_use]
    pub(in crate::db) const fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Record that entity `uid` holds `value` for `attr`.
    ///
    /// Identifier values are keyed by `uid` itself, so each referencing entity
    /// gets its own entry. Other values are keyed by their text marshaling;
    /// values that cannot be marshaled are skipped.
    pub(in crate::db) fn add_value(&mut self, attr: &str, value: &Value, uid: Uid) {
        let key = if value.is_uid() {
            uid.to_string()
        } else {
            match marshal_text(value) {
                Ok(text) => text,
                Err(err) => {
                    debug!(attr, uid, error = %err, "group key value skipped");
                    sink::record(MetricsEvent::IndexValueSkipped {
                        attr,
                        tag: value.tag(),
                    });
                    return;
                }
            }
        };

        self.bucket_mut(attr).insert(key, value, uid);
    }

    fn add_child(&mut self, child: &GroupKeyChild) {
        match &child.source {
            GroupKeySource::Uids(matrix) => {
                for (row, parent) in matrix.iter().zip(&child.src_uids) {
                    for target in row {
                        self.add_value(&child.attr, &Value::Uid(*target), *parent);
                    }
                }
            }
            GroupKeySource::Values(values) => {
                for (value, parent) in values.iter().zip(&child.src_uids) {
                    self.add_value(&child.attr, value, *parent);
                }
            }
        }
    }

    // Most inserts hit the attribute added last, so search from the back.
    fn bucket_mut(&mut self, attr: &str) -> &mut ValueBucket {
        let slot = match self.buckets.iter().rposition(|bucket| bucket.attr == attr) {
            Some(slot) => slot,
            None => {
                self.buckets.push(ValueBucket::new(attr));
                self.buckets.len() - 1
            }
        };

        &mut self.buckets[slot]
    }

    /// Sort and dedup every entry's member list so it can be intersected.
    pub(in crate::db) fn seal(&mut self) {
        for entry in self.buckets.iter_mut().flat_map(|b| b.entries.iter_mut()) {
            sort_dedup(&mut entry.uids);
        }
    }
}

///
/// TESTS
///
