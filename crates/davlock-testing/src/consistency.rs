//! Structural invariants of the stored lock model.

use anyhow::Result;
use anyhow::bail;
use davlock::inmemory::StoreSnapshot;
use davlock::paths::slash_clean;

/// Whether `name` is `ancestor` itself or lies beneath it.
fn at_or_beneath(name: &str, ancestor: &str) -> bool {
    if name == ancestor || ancestor == "/" {
        return true;
    }
    name.len() > ancestor.len() && name.starts_with(ancestor) && name.as_bytes()[ancestor.len()] == b'/'
}

/// Assert every structural invariant of the lock model.
///
/// 1. If any node exists, the root "/" exists and its refcount equals the
///    number of locked nodes.
/// 2. Every node name is clean and begins with "/", and the stored `name`
///    and `root` fields agree with the key.
/// 3. Every refcount is strictly positive.
/// 4. Every refcount equals the number of locked nodes at or beneath the
///    node.
/// 5. Every locked node is reachable via its token.
/// 6. Every token points at an existing locked node.
/// 7. Every expiry-index entry names an existing, unheld, finite-duration
///    node, and its score equals the node's stored expiry.
pub fn check_consistent(snapshot: &StoreSnapshot) -> Result<()> {
    if !snapshot.nodes.is_empty() {
        let Some(root) = snapshot.nodes.get("/") else {
            bail!("nodes exist but none is at the root \"/\"");
        };
        let locked = snapshot.tokens.len() as i64;
        if root.ref_count != locked {
            bail!("root refcount is {} but {} nodes are locked", root.ref_count, locked);
        }
    }

    for (name, node) in &snapshot.nodes {
        if node.name != *name {
            bail!("node at {name:?} stores name {:?}", node.name);
        }
        if node.root != *name {
            bail!("node at {name:?} stores root {:?}", node.root);
        }
        if !name.starts_with('/') {
            bail!("node name {name:?} does not start with \"/\"");
        }
        if *name != slash_clean(name) {
            bail!("node name {name:?} is not clean");
        }
        if node.ref_count <= 0 {
            bail!("node at {name:?} has non-positive refcount {}", node.ref_count);
        }

        let locked_at_or_beneath = snapshot
            .nodes
            .iter()
            .filter(|(other, other_node)| other_node.token.is_some() && at_or_beneath(other, name))
            .count() as i64;
        if node.ref_count != locked_at_or_beneath {
            bail!(
                "node at {name:?} has refcount {} but {} locked nodes at or beneath it",
                node.ref_count,
                locked_at_or_beneath
            );
        }

        if let Some(token) = &node.token {
            match snapshot.tokens.get(token) {
                Some(pointed) if pointed == name => {}
                Some(pointed) => bail!("token {token:?} of node {name:?} points at {pointed:?}"),
                None => bail!("node at {name:?} has token {token:?} with no reverse pointer"),
            }
        }
    }

    for (token, name) in &snapshot.tokens {
        let Some(node) = snapshot.nodes.get(name) else {
            bail!("token {token:?} points at missing node {name:?}");
        };
        if node.token.as_deref() != Some(token) {
            bail!("token {token:?} points at node {name:?} which stores token {:?}", node.token);
        }
    }

    for (name, score) in &snapshot.expiry {
        let Some(node) = snapshot.nodes.get(name) else {
            bail!("expiry index names missing node {name:?}");
        };
        if node.held {
            bail!("expiry index contains held node {name:?}");
        }
        match node.duration {
            Some(duration) if duration >= 0 => {}
            other => bail!("expiry index contains node {name:?} with duration {other:?}"),
        }
        if node.expiry != Some(*score) {
            bail!(
                "expiry index scores {name:?} at {score} but the node stores {:?}",
                node.expiry
            );
        }
    }

    Ok(())
}
