//! Foreign owner reference tokens.
//!
//! Layout: `cluster/GroupKind/namespace/name`, or `GroupKind/namespace/name`
//! for owners in the local cluster. `GroupKind` is `Kind` or `Kind.group`.
//! Segments percent-escape the UTF-8 bytes of `%`, `/`, `,`, any Unicode
//! whitespace and control characters; the kind additionally escapes `.`.
//! Tokens therefore never contain the list separator, survive trimming, and
//! always split back into the same segments.

#![forbid(unsafe_code)]

use crate::error::TokenError;
use crate::key::{ClusterObjectKey, GroupKind};

fn escape(seg: &str, extra: &[char]) -> String {
    let mut out = String::with_capacity(seg.len());
    for ch in seg.chars() {
        let reserved = matches!(ch, '%' | '/' | ',') || ch.is_whitespace() || ch.is_control();
        if reserved || extra.contains(&ch) {
            let mut buf = [0u8; 4];
            for b in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", b));
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn unescape(seg: &str) -> Result<String, TokenError> {
    let bad = || TokenError::BadEscape(seg.to_string());
    let bytes = seg.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = seg.get(i + 1..i + 3).ok_or_else(bad)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(bad());
            }
            out.push(u8::from_str_radix(hex, 16).map_err(|_| bad())?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| bad())
}

fn encode_group_kind(gk: &GroupKind) -> String {
    let kind = escape(&gk.kind, &['.']);
    if gk.group.is_empty() {
        kind
    } else {
        format!("{}.{}", kind, escape(&gk.group, &[]))
    }
}

fn decode_group_kind(seg: &str) -> Result<GroupKind, TokenError> {
    let (kind, group) = seg.split_once('.').unwrap_or((seg, ""));
    let kind = unescape(kind)?;
    if kind.is_empty() {
        return Err(TokenError::EmptyKind);
    }
    Ok(GroupKind { group: unescape(group)?, kind })
}

pub(crate) fn encode(key: &ClusterObjectKey, with_cluster: bool) -> String {
    let tail = format!(
        "{}/{}/{}",
        encode_group_kind(&key.group_kind),
        escape(&key.namespace, &[]),
        escape(&key.name, &[])
    );
    if with_cluster {
        format!("{}/{}", escape(&key.cluster, &[]), tail)
    } else {
        tail
    }
}

pub(crate) fn decode(local_cluster: &str, raw: &str) -> Result<ClusterObjectKey, TokenError> {
    let parts: Vec<&str> = raw.split('/').collect();
    let (cluster, gk, ns, name) = match parts.as_slice() {
        [gk, ns, name] => (local_cluster.to_string(), *gk, *ns, *name),
        [cluster, gk, ns, name] => {
            let cluster = unescape(cluster)?;
            if cluster.is_empty() {
                return Err(TokenError::EmptyCluster);
            }
            (cluster, *gk, *ns, *name)
        }
        other => return Err(TokenError::Segments(other.len())),
    };
    let name = unescape(name)?;
    if name.is_empty() {
        return Err(TokenError::EmptyName);
    }
    Ok(ClusterObjectKey { cluster, group_kind: decode_group_kind(gk)?, namespace: unescape(ns)?, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(cluster: &str, group: &str, kind: &str, ns: &str, name: &str) -> ClusterObjectKey {
        ClusterObjectKey::new(cluster, GroupKind::new(group, kind), ns, name)
    }

    #[test]
    fn plain_foreign_token() {
        let k = key("b", "", "Foo", "ns", "p1");
        assert_eq!(k.as_ref_for("a"), "b/Foo/ns/p1");
        assert_eq!(ClusterObjectKey::parse("a", "b/Foo/ns/p1").unwrap(), k);
    }

    #[test]
    fn local_cluster_is_implied() {
        let k = key("a", "apps", "Deployment", "other", "d");
        assert_eq!(k.as_ref_for("a"), "Deployment.apps/other/d");
        assert_eq!(ClusterObjectKey::parse("a", "Deployment.apps/other/d").unwrap(), k);
    }

    #[test]
    fn cluster_scoped_owner_has_empty_namespace() {
        let k = key("b", "", "Node", "", "n1");
        assert_eq!(k.as_ref_for("a"), "b/Node//n1");
        assert_eq!(ClusterObjectKey::parse("a", "b/Node//n1").unwrap(), k);
    }

    #[test]
    fn delimiters_are_escaped() {
        let k = key("c,1", "ex.io", "We.ird", "n s", "a/b%");
        let t = k.as_ref_for("a");
        assert!(!t.contains(','));
        assert!(!t.contains(' '));
        assert_eq!(t, "c%2C1/We%2Eird.ex.io/n%20s/a%2Fb%25");
        assert_eq!(ClusterObjectKey::parse("a", &t).unwrap(), k);
    }

    #[test]
    fn non_ascii_passes_through() {
        let k = key("zürich", "", "Foo", "ns", "ünï");
        assert_eq!(ClusterObjectKey::parse("x", &k.as_ref_for("x")).unwrap(), k);
    }

    #[test]
    fn unicode_whitespace_is_escaped_bytewise() {
        let k = key("\u{2003}b", "", "Foo", "ns", "p1\u{a0}");
        let t = k.as_ref_for("a");
        assert_eq!(t, "%E2%80%83b/Foo/ns/p1%C2%A0");
        assert_eq!(t.trim(), t);
        assert_eq!(ClusterObjectKey::parse("a", &t).unwrap(), k);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(ClusterObjectKey::parse("a", "Foo/ns"), Err(TokenError::Segments(2)));
        assert_eq!(ClusterObjectKey::parse("a", "a/b/c/d/e"), Err(TokenError::Segments(5)));
        assert_eq!(ClusterObjectKey::parse("a", "/Foo/ns/p"), Err(TokenError::EmptyCluster));
        assert_eq!(ClusterObjectKey::parse("a", "b/.g/ns/p"), Err(TokenError::EmptyKind));
        assert_eq!(ClusterObjectKey::parse("a", "b/Foo/ns/"), Err(TokenError::EmptyName));
        assert!(matches!(ClusterObjectKey::parse("a", "b/Foo/ns/p%2"), Err(TokenError::BadEscape(_))));
        assert!(matches!(ClusterObjectKey::parse("a", "b/Foo/ns/p%+1"), Err(TokenError::BadEscape(_))));
    }
}
