use std::fmt::{Debug, Display, Formatter};

use debug_tree::{add_branch_to, add_leaf_to, AsTree, TreeBuilder};
use derivative::Derivative;

pub type Idx = usize;

/// Sentinel for an absent node reference.
pub const EMPTY: Idx = usize::MAX;

fn node_fmt(u: &Idx, f: &mut Formatter) -> std::fmt::Result {
    if *u == EMPTY {
        write!(f, "∅")
    } else {
        write!(f, "{u}")
    }
}
fn node2_fmt([u, v]: &[Idx; 2], f: &mut Formatter) -> std::fmt::Result {
    write!(f, "[")?;
    node_fmt(u, f)?;
    write!(f, ", ")?;
    node_fmt(v, f)?;
    write!(f, "]")
}

/// Used to pretty print a Idx, outputting ∅ if it is EMPTY.
pub struct PrettyIdx(pub Idx);

impl Display for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        node_fmt(&self.0, f)
    }
}

impl Debug for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

use PrettyIdx as I;

#[derive(Derivative)]
#[derivative(Debug)]
struct Node {
    #[derivative(Debug(format_with = "node_fmt"))]
    parent: Idx,
    /// Set only while this node is the root of its auxiliary tree; points to
    /// the node its preferred path hangs off of. At most one of `parent` and
    /// `path_parent` is non-EMPTY.
    #[derivative(Debug(format_with = "node_fmt"))]
    path_parent: Idx,
    /// Left and right child
    #[derivative(Debug(format_with = "node2_fmt"))]
    child: [Idx; 2],
    /// This node's children and orientation should be flipped.
    reversed: bool,
    /// Addition still owed to both children's subtrees. This node's own
    /// `data` and `agg` are already current.
    pending_add: f64,
    /// Payload for this node
    data: f64,
    /// Sum of `data` over this node's subtree
    agg: f64,
    size: usize,
}

impl Node {
    fn new(data: f64) -> Self {
        Self {
            parent: EMPTY,
            path_parent: EMPTY,
            child: [EMPTY; 2],
            reversed: false,
            pending_add: 0.0,
            agg: data,
            data,
            size: 1,
        }
    }
}

/// Arena of splay trees, one per preferred path.
pub struct Splays {
    nodes: Vec<Node>,
}

impl Debug for Splays {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        let _b = builder.add_branch("Splays");
        for u in 0..self.nodes.len() {
            if self.nodes[u].parent == EMPTY {
                self.tree_inorder_dbg(u, &builder);
            }
        }
        writeln!(f, "{}", builder.string())
    }
}

impl Splays {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    fn tree_inorder_dbg<T: AsTree>(&self, u: Idx, tree: &T) {
        let nu = &self.nodes[u];
        if nu.parent == EMPTY && nu.path_parent != EMPTY {
            add_leaf_to!(*tree, "hangs off {}", nu.path_parent);
        }
        if nu.child[0] != EMPTY {
            add_branch_to!(*tree, "left child of {u}");
            self.tree_inorder_dbg(nu.child[0], tree);
        }
        add_branch_to!(*tree, "[{u}] {nu:?}");
        if nu.child[1] != EMPTY {
            self.tree_inorder_dbg(nu.child[1], tree);
        }
    }

    /// Create a new node as its own singleton tree. Indices increase from 0.
    pub fn create(&mut self, data: f64) -> Idx {
        let u = self.nodes.len();
        self.nodes.push(Node::new(data));
        u
    }

    /// Number of nodes in all trees.
    pub fn total_size(&self) -> usize {
        self.nodes.len()
    }

    fn size(&self, u: Idx) -> usize {
        if u == EMPTY {
            0
        } else {
            self.nodes[u].size
        }
    }

    fn agg(&self, u: Idx) -> f64 {
        if u == EMPTY {
            0.0
        } else {
            self.nodes[u].agg
        }
    }

    /// Raw payload. Only exact once pending additions above u were pushed,
    /// so splay u first.
    pub fn data(&self, u: Idx) -> f64 {
        self.nodes[u].data
    }

    /// Replace the payload of an auxiliary root.
    pub fn set_data(&mut self, u: Idx, data: f64) {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.nodes[u].data = data;
        self.pull_up(u);
    }

    /// Aggregate of the whole tree rooted at u. u must be an auxiliary root.
    pub fn tree_agg(&self, u: Idx) -> f64 {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.nodes[u].agg
    }

    /// Size of the whole tree rooted at u. u must be an auxiliary root.
    pub fn tree_size(&self, u: Idx) -> usize {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.nodes[u].size
    }

    pub fn path_parent(&self, u: Idx) -> Idx {
        self.nodes[u].path_parent
    }

    /// Hang the auxiliary root u off w via the lazy path-parent reference.
    pub fn set_path_parent(&mut self, u: Idx, w: Idx) {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.nodes[u].path_parent = w;
    }

    /// Left child of u, with u's lazy tags pushed first.
    pub fn left(&mut self, u: Idx) -> Idx {
        self.push_down(u);
        self.nodes[u].child[0]
    }

    /// First node of the tree containing the auxiliary root u, in path order.
    pub fn leftmost(&mut self, mut u: Idx) -> Idx {
        loop {
            let l = self.left(u);
            if l == EMPTY {
                return u;
            }
            u = l;
        }
    }

    fn direction(&self, p: Idx, u: Idx) -> usize {
        (self.nodes[p].child[1] == u) as usize
    }

    fn set_child(&mut self, p: Idx, c: Idx, d: usize) {
        self.nodes[p].child[d] = c;
        if c != EMPTY {
            self.nodes[c].parent = p;
        }
    }

    // Call when children changed. Children's agg/size are exact even with
    // pending tags below them, so no push is needed here.
    fn pull_up(&mut self, u: Idx) {
        let [l, r] = self.nodes[u].child;
        self.nodes[u].size = self.size(l) + 1 + self.size(r);
        self.nodes[u].agg = self.nodes[u].data + self.agg(l) + self.agg(r);
    }

    fn apply_add(&mut self, u: Idx, delta: f64) {
        let n = &mut self.nodes[u];
        n.data += delta;
        n.agg += delta * n.size as f64;
        n.pending_add += delta;
    }

    /// Resolve u's lazy tags onto its children. Must run before any child
    /// pointer of u is read or descended into.
    pub fn push_down(&mut self, u: Idx) {
        if self.nodes[u].reversed {
            self.nodes[u].reversed = false;
            self.nodes[u].child.swap(0, 1);
            for c in self.nodes[u].child {
                if c != EMPTY {
                    self.nodes[c].reversed ^= true;
                }
            }
        }
        let add = self.nodes[u].pending_add;
        if add != 0.0 {
            self.nodes[u].pending_add = 0.0;
            for c in self.nodes[u].child {
                if c != EMPTY {
                    self.apply_add(c, add);
                }
            }
        }
    }

    /// Single rotation of u above its parent, preserving in-order sequence.
    /// Tags of u and its parent must already be pushed.
    fn rotate(&mut self, u: Idx) {
        let p = self.nodes[u].parent;
        debug_assert_ne!(p, EMPTY, "rotating the root of an auxiliary tree");
        let g = self.nodes[p].parent;
        let d = self.direction(p, u);
        let mid = self.nodes[u].child[1 - d];
        self.set_child(p, mid, d);
        self.set_child(u, p, 1 - d);
        self.nodes[u].parent = g;
        if g != EMPTY {
            let gd = self.direction(g, p);
            self.nodes[g].child[gd] = u;
        } else {
            // u took over as auxiliary root, the path parent moves with it
            let pp = std::mem::replace(&mut self.nodes[p].path_parent, EMPTY);
            self.nodes[u].path_parent = pp;
        }
        self.pull_up(p);
        self.pull_up(u);
    }

    /// Rotate u to the root of its auxiliary tree. Afterwards u's agg is
    /// exact for the whole tree and u carries no pending tags.
    pub fn splay(&mut self, u: Idx) {
        debug_assert_ne!(u, EMPTY);
        // Resolve pending tags along the root-to-u path before restructuring.
        let mut path = vec![u];
        let mut p = u;
        while self.nodes[p].parent != EMPTY {
            p = self.nodes[p].parent;
            path.push(p);
        }
        for v in path.into_iter().rev() {
            self.push_down(v);
        }
        while self.nodes[u].parent != EMPTY {
            let p = self.nodes[u].parent;
            let g = self.nodes[p].parent;
            if g != EMPTY {
                if (self.nodes[g].child[0] == p) == (self.nodes[p].child[0] == u) {
                    self.rotate(p); // zig-zig
                } else {
                    self.rotate(u); // zig-zag
                }
            }
            self.rotate(u);
        }
    }

    /// Split off the right subtree of the auxiliary root u as its own
    /// auxiliary tree, kept reachable through its path-parent reference.
    pub fn detach_right(&mut self, u: Idx) {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.push_down(u);
        let r = self.nodes[u].child[1];
        if r != EMPTY {
            log::trace!("detach_right({u}): {r} now hangs off {u}");
            self.nodes[u].child[1] = EMPTY;
            self.nodes[r].parent = EMPTY;
            self.nodes[r].path_parent = u;
            self.pull_up(u);
        }
    }

    /// Adopt the auxiliary root v as the right child of the auxiliary root u.
    pub fn attach_right(&mut self, u: Idx, v: Idx) {
        debug_assert_eq!(self.nodes[u].child[1], EMPTY);
        debug_assert_eq!(self.nodes[v].parent, EMPTY);
        self.nodes[u].child[1] = v;
        self.nodes[v].parent = u;
        self.nodes[v].path_parent = EMPTY;
        self.pull_up(u);
    }

    /// Sever the left subtree of the auxiliary root u entirely: no path
    /// parent is kept, the two trees no longer know of each other.
    /// Returns the detached root, or EMPTY if there was no left subtree.
    pub fn detach_left(&mut self, u: Idx) -> Idx {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.push_down(u);
        let l = self.nodes[u].child[0];
        if l != EMPTY {
            log::trace!("detach_left({u}): severed {l}");
            self.nodes[u].child[0] = EMPTY;
            self.nodes[l].parent = EMPTY;
            self.pull_up(u);
        }
        l
    }

    /// Reverse the whole tree rooted at the auxiliary root u, lazily.
    pub fn reverse(&mut self, u: Idx) {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.nodes[u].reversed ^= true;
    }

    /// Add delta to every payload in the tree rooted at the auxiliary root u,
    /// lazily below u.
    pub fn add_to_all(&mut self, u: Idx, delta: f64) {
        debug_assert_eq!(self.nodes[u].parent, EMPTY);
        self.apply_add(u, delta);
    }

    /// In-order traversal of the tree rooted at u, resolving lazy tags on
    /// the way down.
    pub fn in_order(&mut self, u: Idx, out: &mut Vec<Idx>) {
        if u == EMPTY {
            return;
        }
        self.push_down(u);
        let [l, r] = self.nodes[u].child;
        self.in_order(l, out);
        out.push(u);
        self.in_order(r, out);
    }

    /// Check structural and aggregate invariants of every node. Test helper.
    pub fn assert_consistent(&self) {
        for u in 0..self.nodes.len() {
            let n = &self.nodes[u];
            if n.parent != EMPTY {
                assert_eq!(
                    n.path_parent,
                    EMPTY,
                    "{u} has both a parent ({}) and a path parent ({})",
                    I(n.parent),
                    I(n.path_parent)
                );
                assert!(
                    self.nodes[n.parent].child.contains(&u),
                    "{u} is not a child of its parent {}",
                    n.parent
                );
            }
            let [l, r] = n.child;
            for c in [l, r] {
                if c != EMPTY {
                    assert_eq!(self.nodes[c].parent, u, "child {c} does not point back to {u}");
                }
            }
            assert_eq!(n.size, self.size(l) + 1 + self.size(r), "size of {u} is stale");
            // Children still owe themselves n.pending_add per node.
            let expected = n.data
                + self.agg(l)
                + self.agg(r)
                + n.pending_add * (self.size(l) + self.size(r)) as f64;
            assert!(
                (n.agg - expected).abs() < 1e-6,
                "agg of {u} is {} but its subtree sums to {expected}",
                n.agg
            );
        }
    }
}
