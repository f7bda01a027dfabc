//! Tree ordering for check template nodes.
//!
//! Nodes are stored flat with a parent link and a sibling `position`. The
//! engine walks them depth-first, siblings by `(position, id)`. Nodes that
//! are not reachable from a root (dangling parent, or a parent cycle left
//! behind by a broken write path) are skipped rather than looped over.

use std::collections::{HashMap, HashSet};

use crate::entities::CheckNode;

/// Return `nodes` in depth-first pre-order.
#[must_use]
pub fn tree_order(nodes: Vec<CheckNode>) -> Vec<CheckNode> {
    let mut children: HashMap<Option<String>, Vec<CheckNode>> = HashMap::new();
    let known: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();

    for node in nodes {
        let parent = node.parent_id.clone().filter(|p| known.contains(p));
        if node.parent_id.is_some() && parent.is_none() {
            // Parent is not part of this version.
            continue;
        }
        children.entry(parent).or_default().push(node);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    }

    let mut ordered = Vec::with_capacity(known.len());
    let mut visited = HashSet::new();
    let mut stack: Vec<CheckNode> = children.remove(&None).unwrap_or_default();
    stack.reverse();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.id.clone()) {
            continue;
        }
        if let Some(mut kids) = children.remove(&Some(node.id.clone())) {
            kids.reverse();
            stack.extend(kids);
        }
        ordered.push(node);
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{NodeKind, Severity};
    use pretty_assertions::assert_eq;

    fn node(id: &str, parent: Option<&str>, position: i64) -> CheckNode {
        CheckNode {
            id: id.into(),
            version_id: "ver-1".into(),
            parent_id: parent.map(String::from),
            position,
            kind: NodeKind::Item,
            title: id.into(),
            severity: Severity::Info,
            check: None,
        }
    }

    fn ids(nodes: &[CheckNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn depth_first_by_position() {
        let nodes = vec![
            node("b", None, 2),
            node("a2", Some("a"), 1),
            node("a", None, 1),
            node("a1", Some("a"), 0),
            node("a1x", Some("a1"), 0),
        ];
        let ordered = tree_order(nodes);
        assert_eq!(ids(&ordered), vec!["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn ties_break_on_id() {
        let ordered = tree_order(vec![node("z", None, 0), node("m", None, 0)]);
        assert_eq!(ids(&ordered), vec!["m", "z"]);
    }

    #[test]
    fn unreachable_nodes_are_skipped() {
        let nodes = vec![
            node("root", None, 0),
            node("orphan", Some("missing"), 0),
            node("c1", Some("c2"), 0),
            node("c2", Some("c1"), 0),
        ];
        let ordered = tree_order(nodes);
        assert_eq!(ids(&ordered), vec!["root"]);
    }
}
