//! Object model seams: metadata access and owner identity.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::core::{DynamicObject, GroupVersionKind};

use crate::error::ObjectError;
use crate::key::{ClusterObjectKey, ClusterObjectKeySet, GroupKind};
use crate::Owners;

/// Metadata accessors the ownership bookkeeping needs from an object.
pub trait ObjectData {
    fn namespace(&self) -> Option<&str>;
    fn annotations(&self) -> Option<&BTreeMap<String, String>>;
    /// Returns whether the stored value changed.
    fn set_annotation(&mut self, key: &str, value: &str) -> bool;
    /// Returns whether the key was present.
    fn remove_annotation(&mut self, key: &str) -> bool;
    fn owner_references(&self) -> &[OwnerReference];
    fn set_owner_references(&mut self, refs: Vec<OwnerReference>);
}

impl ObjectData for ObjectMeta {
    fn namespace(&self) -> Option<&str> { self.namespace.as_deref() }

    fn annotations(&self) -> Option<&BTreeMap<String, String>> { self.annotations.as_ref() }

    fn set_annotation(&mut self, key: &str, value: &str) -> bool {
        let map = self.annotations.get_or_insert_with(BTreeMap::new);
        if map.get(key).map(String::as_str) == Some(value) {
            return false;
        }
        map.insert(key.to_string(), value.to_string());
        true
    }

    fn remove_annotation(&mut self, key: &str) -> bool {
        let removed = self.annotations.as_mut().map(|m| m.remove(key).is_some()).unwrap_or(false);
        if self.annotations.as_ref().is_some_and(|m| m.is_empty()) {
            self.annotations = None;
        }
        removed
    }

    fn owner_references(&self) -> &[OwnerReference] { self.owner_references.as_deref().unwrap_or(&[]) }

    fn set_owner_references(&mut self, refs: Vec<OwnerReference>) {
        self.owner_references = if refs.is_empty() { None } else { Some(refs) };
    }
}

impl ObjectData for DynamicObject {
    fn namespace(&self) -> Option<&str> { self.metadata.namespace() }
    fn annotations(&self) -> Option<&BTreeMap<String, String>> { self.metadata.annotations() }
    fn set_annotation(&mut self, key: &str, value: &str) -> bool { self.metadata.set_annotation(key, value) }
    fn remove_annotation(&mut self, key: &str) -> bool { self.metadata.remove_annotation(key) }
    fn owner_references(&self) -> &[OwnerReference] { self.metadata.owner_references() }
    fn set_owner_references(&mut self, refs: Vec<OwnerReference>) { self.metadata.set_owner_references(refs) }
}

/// Something that can own other objects.
pub trait Owner {
    fn cluster_key(&self) -> ClusterObjectKey;
    /// Controller reference for same-cluster ownership; `None` without a uid.
    fn owner_reference(&self) -> Option<OwnerReference>;
}

/// Split an `apiVersion` into `(group, version)`; the core group is empty.
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    api_version.split_once('/').unwrap_or(("", api_version))
}

/// A dynamic object bound to the cluster it lives in.
#[derive(Debug, Clone)]
pub struct ClusterObject {
    pub cluster: String,
    pub gvk: GroupVersionKind,
    pub object: DynamicObject,
}

impl ClusterObject {
    pub fn new(cluster: impl Into<String>, gvk: GroupVersionKind, object: DynamicObject) -> Self {
        Self { cluster: cluster.into(), gvk, object }
    }

    /// Take the GVK from the object's own `apiVersion`/`kind`.
    pub fn from_object(cluster: impl Into<String>, object: DynamicObject) -> Result<Self, ObjectError> {
        let types = object.types.as_ref().ok_or(ObjectError::MissingTypeMeta)?;
        if types.kind.is_empty() || types.api_version.is_empty() {
            return Err(ObjectError::MissingTypeMeta);
        }
        if object.metadata.name.as_deref().unwrap_or("").is_empty() {
            return Err(ObjectError::MissingName);
        }
        let (group, version) = split_api_version(&types.api_version);
        let gvk = GroupVersionKind::gvk(group, version, &types.kind);
        Ok(Self::new(cluster, gvk, object))
    }

    pub fn group_kind(&self) -> GroupKind { GroupKind::new(self.gvk.group.clone(), self.gvk.kind.clone()) }

    pub fn add_owner(&mut self, owners: &Owners, owner: &dyn Owner) -> bool {
        owners.add_owner(&mut self.object.metadata, &self.cluster, owner)
    }

    pub fn remove_owner(&mut self, owners: &Owners, owner: &dyn Owner) -> bool {
        owners.remove_owner(&mut self.object.metadata, &self.cluster, owner)
    }

    pub fn owners(&self, owners: &Owners, kinds: &[GroupKind]) -> ClusterObjectKeySet {
        owners.owners(&self.object.metadata, &self.cluster, kinds)
    }
}

impl Owner for ClusterObject {
    fn cluster_key(&self) -> ClusterObjectKey {
        ClusterObjectKey::new(
            self.cluster.clone(),
            self.group_kind(),
            self.object.metadata.namespace.clone().unwrap_or_default(),
            self.object.metadata.name.clone().unwrap_or_default(),
        )
    }

    fn owner_reference(&self) -> Option<OwnerReference> {
        Some(OwnerReference {
            api_version: self.gvk.api_version(),
            kind: self.gvk.kind.clone(),
            name: self.object.metadata.name.clone()?,
            uid: self.object.metadata.uid.clone()?,
            controller: Some(true),
            block_owner_deletion: Some(true),
        })
    }
}
