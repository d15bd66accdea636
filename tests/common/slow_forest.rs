use link_cut_forest::{LinkCutForest, NodeHandle};

const EMPTY: usize = usize::MAX;

/// Reference model backed by plain parent pointers. Every operation walks
/// ancestor chains and takes linear time.
#[derive(Debug)]
pub struct SlowForest {
    parent: Vec<usize>,
    data: Vec<f64>,
    values: Vec<i64>,
}

impl SlowForest {
    /// u and its ancestors, up to and including the root.
    fn chain(&self, u: NodeHandle) -> Vec<NodeHandle> {
        let mut path = vec![u];
        let mut cur = u;
        while self.parent[cur] != EMPTY {
            cur = self.parent[cur];
            path.push(cur);
        }
        path
    }

    /// Path from u to v in order, plus the position of their lca on it.
    /// None if they are in different trees.
    fn path(&self, u: NodeHandle, v: NodeHandle) -> Option<(Vec<NodeHandle>, usize)> {
        let cu = self.chain(u);
        let cv = self.chain(v);
        if cu.last() != cv.last() {
            return None;
        }
        // Peel the shared root-side tail, keeping the lca itself.
        let (mut i, mut j) = (cu.len(), cv.len());
        while i > 0 && j > 0 && cu[i - 1] == cv[j - 1] {
            i -= 1;
            j -= 1;
        }
        let mut path = cu[..=i].to_vec();
        path.extend(cv[..j].iter().rev().copied());
        Some((path, i))
    }
}

impl LinkCutForest for SlowForest {
    fn new() -> Self {
        Self {
            parent: Vec::new(),
            data: Vec::new(),
            values: Vec::new(),
        }
    }

    fn create_node(&mut self, value: i64, data: f64) -> NodeHandle {
        self.parent.push(EMPTY);
        self.data.push(data);
        self.values.push(value);
        self.parent.len() - 1
    }

    fn value(&self, u: NodeHandle) -> i64 {
        self.values[u]
    }

    fn data(&mut self, u: NodeHandle) -> f64 {
        self.data[u]
    }

    fn set_data(&mut self, u: NodeHandle, data: f64) {
        self.data[u] = data;
    }

    fn link(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        if self.parent[child] != EMPTY || self.find_root(child) == self.find_root(parent) {
            return false;
        }
        self.parent[child] = parent;
        true
    }

    fn cut(&mut self, u: NodeHandle) -> bool {
        if self.parent[u] == EMPTY {
            false
        } else {
            self.parent[u] = EMPTY;
            true
        }
    }

    fn find_root(&mut self, u: NodeHandle) -> NodeHandle {
        *self.chain(u).last().unwrap()
    }

    fn reroot(&mut self, u: NodeHandle) {
        let mut prev = EMPTY;
        let mut cur = u;
        while cur != EMPTY {
            let next = self.parent[cur];
            self.parent[cur] = prev;
            prev = cur;
            cur = next;
        }
    }

    fn lca(&mut self, u: NodeHandle, v: NodeHandle) -> Option<NodeHandle> {
        self.path(u, v).map(|(p, i)| p[i])
    }

    fn path_query(&mut self, u: NodeHandle, v: NodeHandle) -> f64 {
        self.path(u, v)
            .map_or(0.0, |(p, _)| p.iter().map(|&w| self.data[w]).sum())
    }

    fn path_update(&mut self, u: NodeHandle, v: NodeHandle, delta: f64) {
        if let Some((p, _)) = self.path(u, v) {
            let share = delta / p.len() as f64;
            for w in p {
                self.data[w] += share;
            }
        }
    }

    fn path_nodes(&mut self, u: NodeHandle, v: NodeHandle) -> Vec<NodeHandle> {
        self.path(u, v).map(|(p, _)| p).unwrap_or_default()
    }
}
