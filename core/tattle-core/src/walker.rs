//! Bounded breadth-first traversal over the accessibility tree.
//!
//! External UI trees can be arbitrarily large or pathological; the node
//! ceiling bounds total work, which also makes aliased (cyclic) structures
//! safe to walk without cycle detection.

use std::collections::VecDeque;

use crate::ax::{AccessibilityBridge, AxNode};

/// Visits up to `max_nodes` elements breadth-first starting at `root`.
/// `visit` returns `false` to stop early. Sibling order is whatever the
/// bridge's child enumeration returns.
pub fn walk_until(
    ax: &dyn AccessibilityBridge,
    root: AxNode,
    max_nodes: usize,
    mut visit: impl FnMut(AxNode) -> bool,
) {
    let mut queue: VecDeque<AxNode> = VecDeque::with_capacity(256);
    queue.push_back(root);
    let mut seen = 0usize;

    while let Some(current) = queue.pop_front() {
        if seen >= max_nodes {
            return;
        }
        seen += 1;

        if !visit(current) {
            return;
        }

        queue.extend(ax.children(current));
    }
}

/// First element (breadth-first) satisfying `predicate`, within the ceiling.
pub fn find_first(
    ax: &dyn AccessibilityBridge,
    root: AxNode,
    max_nodes: usize,
    mut predicate: impl FnMut(AxNode) -> bool,
) -> Option<AxNode> {
    let mut found = None;
    walk_until(ax, root, max_nodes, |node| {
        if predicate(node) {
            found = Some(node);
            false
        } else {
            true
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ax::AxValue;
    use crate::testkit::FakeAx;

    fn wide_tree(fanout: usize, depth: usize) -> (FakeAx, AxNode) {
        let mut ax = FakeAx::trusted();
        let root = ax.add_node(&[]);
        let mut level = vec![root];
        for _ in 0..depth {
            let mut next = Vec::new();
            for &parent in &level {
                for _ in 0..fanout {
                    let child = ax.add_node(&[]);
                    ax.add_child(parent, child);
                    next.push(child);
                }
            }
            level = next;
        }
        (ax, root)
    }

    #[test]
    fn visits_at_most_max_nodes() {
        let (ax, root) = wide_tree(10, 4);
        let mut visited = 0usize;
        walk_until(&ax, root, 37, |_| {
            visited += 1;
            true
        });
        assert_eq!(visited, 37);
    }

    #[test]
    fn stops_early_when_visit_returns_false() {
        let (ax, root) = wide_tree(3, 3);
        let mut visited = 0usize;
        walk_until(&ax, root, 10_000, |_| {
            visited += 1;
            visited < 5
        });
        assert_eq!(visited, 5);
    }

    #[test]
    fn traversal_is_level_order() {
        let mut ax = FakeAx::trusted();
        let root = ax.add_node(&[("AXTitle", AxValue::Str("root".into()))]);
        let a = ax.add_node(&[("AXTitle", AxValue::Str("a".into()))]);
        let b = ax.add_node(&[("AXTitle", AxValue::Str("b".into()))]);
        let a1 = ax.add_node(&[("AXTitle", AxValue::Str("a1".into()))]);
        ax.add_child(root, a);
        ax.add_child(root, b);
        ax.add_child(a, a1);

        let mut order = Vec::new();
        walk_until(&ax, root, 100, |node| {
            order.push(crate::ax::title_of(&ax, node).unwrap());
            true
        });
        assert_eq!(order, ["root", "a", "b", "a1"]);
    }

    #[test]
    fn find_first_returns_none_when_ceiling_hit() {
        let (ax, root) = wide_tree(10, 4);
        let found = find_first(&ax, root, 5, |_| false);
        assert!(found.is_none());
    }
}
