#![forbid(unsafe_code)]

use kinship_owners::{ClusterObject, ClusterObjectKey, GroupKind, ObjectData, Owners, DEFAULT_OWNER_ANNOTATION};
use kube::core::DynamicObject;

fn obj(cluster: &str, api_version: &str, kind: &str, ns: &str, name: &str, uid: &str) -> ClusterObject {
    let raw: DynamicObject = serde_json::from_value(serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "name": name, "namespace": ns, "uid": uid },
    }))
    .unwrap();
    ClusterObject::from_object(cluster, raw).unwrap()
}

fn annotation(o: &ClusterObject) -> Option<String> {
    o.object.annotations().and_then(|m| m.get(DEFAULT_OWNER_ANNOTATION)).cloned()
}

#[test]
fn foreign_owner_is_annotated_once() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    let p = obj("b", "v1", "Foo", "ns", "p1", "uid-p");

    assert!(o.add_owner(&owners, &p));
    assert_eq!(annotation(&o).as_deref(), Some("b/Foo/ns/p1"));
    assert!(!o.add_owner(&owners, &p));
    assert_eq!(annotation(&o).as_deref(), Some("b/Foo/ns/p1"));

    let found = o.owners(&owners, &[]);
    assert_eq!(found.len(), 1);
    assert!(found.contains(&ClusterObjectKey::new("b", GroupKind::new("", "Foo"), "ns", "p1")));
}

#[test]
fn foreign_add_then_remove_restores_annotation() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    let other = obj("c", "x.io/v1", "Bar", "ns", "q", "uid-q");
    let p = obj("b", "v1", "Foo", "ns", "p1", "uid-p");

    assert!(o.add_owner(&owners, &other));
    let before = annotation(&o);
    assert!(o.add_owner(&owners, &p));
    assert_eq!(annotation(&o).as_deref(), Some("c/Bar.x.io/ns/q,b/Foo/ns/p1"));
    assert!(o.remove_owner(&owners, &p));
    assert_eq!(annotation(&o), before);
    assert!(!o.remove_owner(&owners, &p));

    assert!(o.remove_owner(&owners, &other));
    assert_eq!(annotation(&o), None);
    assert!(o.object.metadata.annotations.is_none());
}

#[test]
fn same_cluster_other_namespace_uses_relative_token() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    let p = obj("a", "apps/v1", "Deployment", "other", "d", "uid-d");

    assert!(o.add_owner(&owners, &p));
    assert_eq!(annotation(&o).as_deref(), Some("Deployment.apps/other/d"));
    assert!(o.object.metadata.owner_references.is_none());
    let found: Vec<_> = o.owners(&owners, &[]).into_iter().collect();
    assert_eq!(found, vec![ClusterObjectKey::new("a", GroupKind::new("apps", "Deployment"), "other", "d")]);
}

#[test]
fn same_cluster_and_namespace_uses_controller_reference() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    let p = obj("a", "apps/v1", "Deployment", "ns", "d", "uid-d");

    assert!(o.add_owner(&owners, &p));
    assert!(!o.add_owner(&owners, &p));
    assert_eq!(annotation(&o), None);
    let refs = o.object.owner_references();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].uid, "uid-d");
    assert_eq!(refs[0].api_version, "apps/v1");
    assert_eq!(refs[0].controller, Some(true));

    let found: Vec<_> = o.owners(&owners, &[]).into_iter().collect();
    assert_eq!(found, vec![ClusterObjectKey::new("a", GroupKind::new("apps", "Deployment"), "ns", "d")]);
}

#[test]
fn native_remove_keeps_other_references() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    let d1 = obj("a", "apps/v1", "Deployment", "ns", "d1", "uid-1");
    let d2 = obj("a", "apps/v1", "Deployment", "ns", "d2", "uid-2");

    assert!(o.add_owner(&owners, &d1));
    assert!(o.add_owner(&owners, &d2));
    assert!(o.remove_owner(&owners, &d1));
    let refs = o.object.owner_references();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].uid, "uid-2");
    assert!(!o.remove_owner(&owners, &d1));
}

#[test]
fn owners_merges_both_representations_and_filters_by_kind() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    assert!(o.add_owner(&owners, &obj("a", "apps/v1", "Deployment", "ns", "d", "uid-d")));
    assert!(o.add_owner(&owners, &obj("b", "v1", "Foo", "ns", "p1", "uid-p")));

    assert_eq!(o.owners(&owners, &[]).len(), 2);
    let deployments = o.owners(&owners, &[GroupKind::new("apps", "Deployment")]);
    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments.iter().next().map(|k| k.cluster.as_str()), Some("a"));
}

#[test]
fn malformed_tokens_do_not_break_enumeration() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    o.object.set_annotation(DEFAULT_OWNER_ANNOTATION, "garbage, b/Foo/ns/p1 ,x/y/z/w/v,b/Foo/ns/p1");
    let found: Vec<_> = o.owners(&owners, &[]).into_iter().collect();
    assert_eq!(found, vec![ClusterObjectKey::new("b", GroupKind::new("", "Foo"), "ns", "p1")]);
}

#[test]
fn whitespace_in_stored_list_still_deduplicates() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    o.object.set_annotation(DEFAULT_OWNER_ANNOTATION, "  b/Foo/ns/p1  ");
    assert!(!o.add_owner(&owners, &obj("b", "v1", "Foo", "ns", "p1", "uid-p")));
}

#[test]
fn unicode_whitespace_in_owner_identity_round_trips() {
    let owners = Owners::default();
    let mut o = obj("a", "v1", "ConfigMap", "ns", "o", "uid-o");
    let p = obj("\u{2003}b", "v1", "Foo", "ns", "p1\u{a0}", "uid-p");

    assert!(o.add_owner(&owners, &p));
    assert!(!o.add_owner(&owners, &p));
    assert_eq!(owners.annotated_owners(&o.object).len(), 1);

    let found: Vec<_> = o.owners(&owners, &[]).into_iter().collect();
    assert_eq!(found, vec![ClusterObjectKey::new("\u{2003}b", GroupKind::new("", "Foo"), "ns", "p1\u{a0}")]);

    assert!(o.remove_owner(&owners, &p));
    assert_eq!(annotation(&o), None);
}
