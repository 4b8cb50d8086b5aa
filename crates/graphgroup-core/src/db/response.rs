use crate::{db::Uid, value::Value};
use serde::Serialize;

///
/// GroupPair
///
/// One labelled value: a grouping key `(attribute, value)` or an aggregate
/// `(label, value)`.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupPair {
    pub attr: String,
    pub key: Value,
}

impl GroupPair {
    #[must_use]
    pub fn new(attr: impl Into<String>, key: Value) -> Self {
        Self {
            attr: attr.into(),
            key,
        }
    }
}

///
/// GroupResult
///
/// One grouped output row.
/// `keys` follow attribute discovery order; `uids` are ascending and unique.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupResult {
    pub keys: Vec<GroupPair>,
    pub aggregates: Vec<GroupPair>,
    pub uids: Vec<Uid>,
}

impl GroupResult {
    #[must_use]
    pub const fn new(keys: Vec<GroupPair>, uids: Vec<Uid>) -> Self {
        Self {
            keys,
            aggregates: Vec::new(),
            uids,
        }
    }

    /// Look up one grouping key value by attribute.
    #[must_use]
    pub fn key(&self, attr: &str) -> Option<&Value> {
        self.keys.iter().find(|pair| pair.attr == attr).map(|pair| &pair.key)
    }

    /// Look up one aggregate value by label.
    #[must_use]
    pub fn aggregate(&self, label: &str) -> Option<&Value> {
        self.aggregates
            .iter()
            .find(|pair| pair.attr == label)
            .map(|pair| &pair.key)
    }
}

///
/// GroupResults
///
/// Ordered grouped output attached back onto the originating subtree.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct GroupResults {
    pub groups: Vec<GroupResult>,
}

impl GroupResults {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupResult> {
        self.groups.iter()
    }
}

impl<'a> IntoIterator for &'a GroupResults {
    type Item = &'a GroupResult;
    type IntoIter = std::slice::Iter<'a, GroupResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
