//! Cluster-scoped object keys.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::token;

/// API group + kind, rendered as `Kind` (core group) or `Kind.group`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { group: group.into(), kind: kind.into() }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

impl FromStr for GroupKind {
    type Err = TokenError;

    /// Accepts the unescaped `Kind` / `Kind.group` form (e.g. from a CLI flag).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, group) = s.split_once('.').unwrap_or((s, ""));
        if kind.is_empty() {
            return Err(TokenError::EmptyKind);
        }
        Ok(GroupKind::new(group, kind))
    }
}

/// Identity of an object across clusters. `namespace` is empty for cluster-scoped objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterObjectKey {
    pub cluster: String,
    pub group_kind: GroupKind,
    pub namespace: String,
    pub name: String,
}

pub type ClusterObjectKeySet = BTreeSet<ClusterObjectKey>;

impl ClusterObjectKey {
    pub fn new(
        cluster: impl Into<String>,
        group_kind: GroupKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self { cluster: cluster.into(), group_kind, namespace: namespace.into(), name: name.into() }
    }

    /// Reference token as seen from `local_cluster`; the cluster segment is
    /// dropped when the key lives there.
    pub fn as_ref_for(&self, local_cluster: &str) -> String {
        token::encode(self, self.cluster != local_cluster)
    }

    /// Parse a reference token; tokens without a cluster segment belong to `local_cluster`.
    pub fn parse(local_cluster: &str, raw: &str) -> Result<Self, TokenError> {
        token::decode(local_cluster, raw)
    }
}

impl fmt::Display for ClusterObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&token::encode(self, true))
    }
}

/// Keep only keys of the given group kinds; an empty filter keeps everything.
pub fn filter_by_group_kinds(keys: ClusterObjectKeySet, kinds: &[GroupKind]) -> ClusterObjectKeySet {
    if kinds.is_empty() {
        return keys;
    }
    keys.into_iter().filter(|k| kinds.contains(&k.group_kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_kind_renders_like_kubectl() {
        assert_eq!(GroupKind::new("", "Pod").to_string(), "Pod");
        assert_eq!(GroupKind::new("apps", "Deployment").to_string(), "Deployment.apps");
        assert_eq!("Deployment.apps".parse::<GroupKind>().unwrap(), GroupKind::new("apps", "Deployment"));
        assert_eq!("Foo.example.io".parse::<GroupKind>().unwrap(), GroupKind::new("example.io", "Foo"));
        assert!(".apps".parse::<GroupKind>().is_err());
    }

    #[test]
    fn filter_keeps_requested_kinds() {
        let foo = ClusterObjectKey::new("a", GroupKind::new("", "Foo"), "ns", "f");
        let bar = ClusterObjectKey::new("a", GroupKind::new("x.io", "Bar"), "ns", "b");
        let set: ClusterObjectKeySet = [foo.clone(), bar.clone()].into_iter().collect();
        assert_eq!(filter_by_group_kinds(set.clone(), &[]).len(), 2);
        let only = filter_by_group_kinds(set, &[GroupKind::new("x.io", "Bar")]);
        assert_eq!(only.into_iter().collect::<Vec<_>>(), vec![bar]);
    }
}
