//! Kinship owners: ownership between objects that may live in different clusters.
//!
//! Owners in the same cluster and namespace are recorded as native controller
//! references. Every other owner is recorded as a reference token in a
//! comma-separated annotation (see [`ClusterObjectKey::as_ref_for`]).
//!
//! Nothing here is synchronized: callers serialize writes per object.

#![forbid(unsafe_code)]

mod error;
mod key;
mod object;
mod token;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use error::{ObjectError, TokenError};
pub use key::{filter_by_group_kinds, ClusterObjectKey, ClusterObjectKeySet, GroupKind};
pub use object::{split_api_version, ClusterObject, ObjectData, Owner};

/// Annotation used when nothing else is configured.
pub const DEFAULT_OWNER_ANNOTATION: &str = "resources.gardener.cloud/owners";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnersConfig {
    /// Annotation key holding the foreign owner list.
    pub annotation_key: String,
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self { annotation_key: DEFAULT_OWNER_ANNOTATION.to_string() }
    }
}

impl OwnersConfig {
    /// Honors `KINSHIP_OWNER_ANNOTATION` when set and non-empty.
    pub fn from_env() -> Self {
        std::env::var("KINSHIP_OWNER_ANNOTATION")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(|k| Self { annotation_key: k.trim().to_string() })
            .unwrap_or_default()
    }
}

/// Owner bookkeeping bound to one annotation key.
#[derive(Debug, Clone)]
pub struct Owners {
    key: String,
}

impl Default for Owners {
    fn default() -> Self { Self::new(OwnersConfig::default()) }
}

impl Owners {
    pub fn new(config: OwnersConfig) -> Self {
        Self { key: config.annotation_key }
    }

    pub fn annotation_key(&self) -> &str { &self.key }

    /// Foreign reference tokens currently recorded on `obj`, trimmed, empties dropped.
    pub fn annotated_owners(&self, obj: &(impl ObjectData + ?Sized)) -> Vec<String> {
        let raw = obj.annotations().and_then(|m| m.get(&self.key)).map(String::as_str).unwrap_or("");
        raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
    }

    fn is_native(obj: &(impl ObjectData + ?Sized), local_cluster: &str, owner: &ClusterObjectKey) -> bool {
        owner.cluster == local_cluster && owner.namespace == obj.namespace().unwrap_or("")
    }

    fn write_list(&self, obj: &mut (impl ObjectData + ?Sized), refs: &[String]) -> bool {
        if refs.is_empty() {
            obj.remove_annotation(&self.key)
        } else {
            obj.set_annotation(&self.key, &refs.join(","))
        }
    }

    /// Record `owner` on `obj`. Returns whether anything changed.
    pub fn add_owner(
        &self,
        obj: &mut (impl ObjectData + ?Sized),
        local_cluster: &str,
        owner: &(impl Owner + ?Sized),
    ) -> bool {
        let key = owner.cluster_key();
        let changed = if Self::is_native(&*obj, local_cluster, &key) {
            match owner.owner_reference() {
                Some(r) => set_owner_reference(&mut *obj, r),
                None => {
                    warn!(owner = %key, "owner has no uid; cannot set controller reference");
                    false
                }
            }
        } else {
            let token = key.as_ref_for(local_cluster);
            let mut refs = self.annotated_owners(&*obj);
            if refs.iter().any(|r| *r == token) {
                false
            } else {
                refs.push(token);
                self.write_list(&mut *obj, &refs)
            }
        };
        if changed {
            counter!("owners_changed", 1u64);
            debug!(owner = %key, "owner added");
        }
        changed
    }

    /// Drop `owner` from `obj`. Returns whether a reference was removed.
    pub fn remove_owner(
        &self,
        obj: &mut (impl ObjectData + ?Sized),
        local_cluster: &str,
        owner: &(impl Owner + ?Sized),
    ) -> bool {
        let key = owner.cluster_key();
        let changed = if Self::is_native(&*obj, local_cluster, &key) {
            let Some(uid) = owner.owner_reference().map(|r| r.uid) else {
                return false;
            };
            let refs = obj.owner_references();
            let kept: Vec<OwnerReference> = refs.iter().filter(|r| r.uid != uid).cloned().collect();
            if kept.len() == refs.len() {
                false
            } else {
                obj.set_owner_references(kept);
                true
            }
        } else {
            let token = key.as_ref_for(local_cluster);
            let refs = self.annotated_owners(&*obj);
            let kept: Vec<String> = refs.iter().filter(|r| **r != token).cloned().collect();
            if kept.len() == refs.len() {
                false
            } else {
                self.write_list(&mut *obj, &kept);
                true
            }
        };
        if changed {
            counter!("owners_changed", 1u64);
            debug!(owner = %key, "owner removed");
        }
        changed
    }

    /// All owners of `obj`, optionally restricted to `kinds`.
    ///
    /// Native references are keyed with `local_cluster` and the object's
    /// namespace. Tokens that fail to parse are skipped.
    pub fn owners(&self, obj: &(impl ObjectData + ?Sized), local_cluster: &str, kinds: &[GroupKind]) -> ClusterObjectKeySet {
        let namespace = obj.namespace().unwrap_or("");
        let mut out = ClusterObjectKeySet::new();
        for r in obj.owner_references() {
            let (group, _) = split_api_version(&r.api_version);
            out.insert(ClusterObjectKey::new(local_cluster, GroupKind::new(group, r.kind.clone()), namespace, r.name.clone()));
        }
        for raw in self.annotated_owners(obj) {
            match ClusterObjectKey::parse(local_cluster, &raw) {
                Ok(k) => {
                    out.insert(k);
                }
                Err(e) => debug!(token = %raw, error = %e, "skipping malformed owner reference"),
            }
        }
        filter_by_group_kinds(out, kinds)
    }
}

/// Insert or update the reference with the same uid.
fn set_owner_reference(obj: &mut (impl ObjectData + ?Sized), r: OwnerReference) -> bool {
    let mut refs = obj.owner_references().to_vec();
    match refs.iter_mut().find(|x| x.uid == r.uid) {
        Some(existing) if *existing == r => return false,
        Some(existing) => *existing = r,
        None => refs.push(r),
    }
    obj.set_owner_references(refs);
    true
}
