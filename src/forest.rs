//! Link-cut forest: a collection of rooted trees maintained dynamically,
//! with amortized logarithmic link, cut, connectivity and path-aggregate
//! operations. Preferred paths are encoded in the splay trees of
//! [`crate::splay`], stitched together by lazy path-parent references.

use crate::splay::{Idx, PrettyIdx as I, Splays, EMPTY};

pub type NodeHandle = usize;

/// Interface of a link-cut forest. Nodes carry an immutable label and a
/// numeric payload aggregated (summed) over paths.
pub trait LinkCutForest {
    /// New forest with no nodes.
    fn new() -> Self;
    /// Create an isolated node with the given label and payload. Handles
    /// increase from 0 and are never reused.
    fn create_node(&mut self, value: i64, data: f64) -> NodeHandle;
    /// Label given at creation.
    fn value(&self, u: NodeHandle) -> i64;
    /// Current payload of u.
    fn data(&mut self, u: NodeHandle) -> f64;
    /// Replace the payload of u.
    fn set_data(&mut self, u: NodeHandle, data: f64);
    /// Hang the tree rooted at child below parent. Returns false if child is
    /// not the root of its tree, or if both already share a tree (a second
    /// connection would close a cycle).
    fn link(&mut self, child: NodeHandle, parent: NodeHandle) -> bool;
    /// Remove the edge between u and its parent. Returns false if u is the
    /// root of its tree.
    fn cut(&mut self, u: NodeHandle) -> bool;
    /// Root of the tree containing u.
    fn find_root(&mut self, u: NodeHandle) -> NodeHandle;
    /// Make u the root of its tree.
    fn reroot(&mut self, u: NodeHandle);
    /// Are u and v in the same tree?
    fn are_connected(&mut self, u: NodeHandle, v: NodeHandle) -> bool {
        self.find_root(u) == self.find_root(v)
    }
    /// Lowest common ancestor of u and v. None if they are in different
    /// trees.
    fn lca(&mut self, u: NodeHandle, v: NodeHandle) -> Option<NodeHandle>;
    /// Sum of payloads on the path from u to v, 0.0 if they are in
    /// different trees.
    fn path_query(&mut self, u: NodeHandle, v: NodeHandle) -> f64;
    /// Spread delta additively over the nodes of the path from u to v, so
    /// that `path_query(u, v)` grows by exactly delta. Overlapping updates
    /// compose linearly. No-op if u and v are in different trees.
    fn path_update(&mut self, u: NodeHandle, v: NodeHandle, delta: f64);
    /// The nodes of the path from u to v, in order. Empty if u and v are in
    /// different trees.
    fn path_nodes(&mut self, u: NodeHandle, v: NodeHandle) -> Vec<NodeHandle>;
}

/// Splay-backed link-cut forest.
#[derive(Debug)]
pub struct LCF {
    s: Splays,
    /// Caller-supplied labels, indexed by node.
    values: Vec<i64>,
}

impl LCF {
    fn check(&self, u: NodeHandle) {
        assert!(u < self.values.len(), "unknown node {u}");
    }

    /// Materialize the path from the represented root down to v as v's own
    /// auxiliary tree. Returns the topmost node at which the walk entered
    /// the root-side preferred path, which is the LCA of v with the
    /// previously accessed node.
    fn access(&mut self, v: Idx) -> Idx {
        self.s.splay(v);
        self.s.detach_right(v);
        let mut last = v;
        let mut u = v;
        loop {
            let w = self.s.path_parent(u);
            if w == EMPTY {
                break;
            }
            self.s.splay(w);
            self.s.detach_right(w);
            self.s.attach_right(w, u);
            last = w;
            u = w;
        }
        self.s.splay(v);
        log::trace!("access({v}) entered the topmost path at {}", I(last));
        last
    }

    /// Make v the represented root by lazily reversing its root path.
    fn evert(&mut self, v: Idx) {
        self.access(v);
        self.s.reverse(v);
    }

    fn root_idx(&mut self, u: Idx) -> Idx {
        self.access(u);
        let r = self.s.leftmost(u);
        self.s.splay(r);
        r
    }

    /// Check structural and aggregate invariants of the whole forest.
    pub fn assert_consistent(&self) {
        self.s.assert_consistent();
    }
}

impl LinkCutForest for LCF {
    fn new() -> Self {
        Self {
            s: Splays::new(0),
            values: Vec::new(),
        }
    }

    fn create_node(&mut self, value: i64, data: f64) -> NodeHandle {
        let u = self.s.create(data);
        debug_assert_eq!(u, self.values.len());
        self.values.push(value);
        u
    }

    fn value(&self, u: NodeHandle) -> i64 {
        self.check(u);
        self.values[u]
    }

    fn data(&mut self, u: NodeHandle) -> f64 {
        self.check(u);
        // Flush pending additions sitting above u in its auxiliary tree.
        self.s.splay(u);
        self.s.data(u)
    }

    fn set_data(&mut self, u: NodeHandle, data: f64) {
        self.check(u);
        self.s.splay(u);
        self.s.set_data(u, data);
    }

    fn link(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        self.check(child);
        self.check(parent);
        if self.root_idx(child) == self.root_idx(parent) {
            log::trace!("link({child}, {parent}) refused: same tree");
            return false;
        }
        self.access(child);
        if self.s.left(child) != EMPTY {
            log::trace!("link({child}, {parent}) refused: {child} is not a root");
            return false;
        }
        self.access(parent);
        self.s.set_path_parent(child, parent);
        true
    }

    fn cut(&mut self, u: NodeHandle) -> bool {
        self.check(u);
        self.access(u);
        // After access, u's left subtree is exactly the path above it.
        self.s.detach_left(u) != EMPTY
    }

    fn find_root(&mut self, u: NodeHandle) -> NodeHandle {
        self.check(u);
        self.root_idx(u)
    }

    fn reroot(&mut self, u: NodeHandle) {
        self.check(u);
        self.evert(u);
    }

    fn lca(&mut self, u: NodeHandle, v: NodeHandle) -> Option<NodeHandle> {
        self.check(u);
        self.check(v);
        let ru = self.root_idx(u);
        let lca = self.access(v);
        let rv = self.s.leftmost(v);
        self.s.splay(rv);
        (ru == rv).then_some(lca)
    }

    fn path_query(&mut self, u: NodeHandle, v: NodeHandle) -> f64 {
        self.check(u);
        self.check(v);
        let r = self.root_idx(u);
        if r != self.root_idx(v) {
            return 0.0;
        }
        self.evert(u);
        self.access(v);
        let agg = self.s.tree_agg(v);
        // Path operations must not change the represented root.
        self.evert(r);
        agg
    }

    fn path_update(&mut self, u: NodeHandle, v: NodeHandle, delta: f64) {
        self.check(u);
        self.check(v);
        let r = self.root_idx(u);
        if r != self.root_idx(v) {
            return;
        }
        self.evert(u);
        self.access(v);
        let len = self.s.tree_size(v);
        self.s.add_to_all(v, delta / len as f64);
        self.evert(r);
    }

    fn path_nodes(&mut self, u: NodeHandle, v: NodeHandle) -> Vec<NodeHandle> {
        self.check(u);
        self.check(v);
        let r = self.root_idx(u);
        if r != self.root_idx(v) {
            return Vec::new();
        }
        self.evert(u);
        self.access(v);
        let mut out = Vec::with_capacity(self.s.tree_size(v));
        self.s.in_order(v, &mut out);
        self.evert(r);
        out
    }
}
