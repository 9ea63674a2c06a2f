/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! Rooted spanning trees over a [`Graph`].
//!
//! A spanning tree is a view on the graph: it stores a set of arc ids
//! together with the parent and depth of every vertex when the arcs
//! are considered undirected and the tree is hung from its root. The
//! costs and fluxes of the arcs are owned by the graph.
//!
//! # Example
//!
//! ```
//! use rs_transport::graph::Graph;
//! use rs_transport::tree::{Direction, SpanningTree};
//!
//! let mut g = Graph::<i64>::new(3).unwrap();
//! let a = g.add_arc(0, 1, 1).unwrap();
//! let b = g.add_arc(0, 2, 1).unwrap();
//! let c = g.add_arc(1, 2, 1).unwrap();
//!
//! let tree = SpanningTree::from_arcs(&g, 0, vec![a, b]).unwrap();
//! assert_eq!(tree.depth(2), 1);
//!
//! let cycle = tree.fundamental_cycle(&g, c).unwrap();
//! assert_eq!(cycle.apex(), 0);
//! assert_eq!(
//!     cycle.arcs(),
//!     &[(c, Direction::Forward), (b, Direction::Backward), (a, Direction::Forward)]
//! );
//! ```

use crate::graph::{ArcId, Graph, VertexId};

use std::collections::VecDeque;
use std::error;
use std::fmt;

/// Violation of the tree structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The arcs do not form a spanning tree.
    NotATree { msg: String },
    /// The candidate arc does not close a proper cycle with the tree.
    DegenerateCycle { arc: ArcId },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            NotATree { msg } => write!(fmt, "not a spanning tree: {}", msg),
            DegenerateCycle { arc } => write!(fmt, "arc {} does not induce a fundamental cycle", arc),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

fn not_a_tree(msg: String) -> Error {
    Error::NotATree { msg }
}

/// Traversal direction of an arc on a cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    /// The arc is traversed from `beg` to `end`; its flux grows with the circulation.
    Forward,
    /// The arc is traversed from `end` to `beg`; its flux shrinks with the circulation.
    Backward,
}

/// The cycle closed by a non-tree arc.
///
/// The first arc is the inserted arc itself, traversed forward. It is
/// followed by the tree path from its head up to the apex and then down
/// to its tail, so the arcs appear in circulation order.
#[derive(Clone, Debug)]
pub struct Cycle {
    arcs: Vec<(ArcId, Direction)>,
    apex: VertexId,
    // number of arcs between the head of the inserted arc and the apex
    head_len: usize,
}

impl Cycle {
    pub fn arcs(&self) -> &[(ArcId, Direction)] {
        &self.arcs
    }

    /// The lowest common ancestor of the end points of the inserted arc.
    pub fn apex(&self) -> VertexId {
        self.apex
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// The arc that closed the cycle.
    pub fn entering(&self) -> ArcId {
        self.arcs[0].0
    }

    /// The tree arcs of the cycle in circulation order starting at the apex.
    ///
    /// This is the path down to the tail of the inserted arc followed
    /// by the path from its head up to the apex.
    pub fn from_apex(&self) -> impl Iterator<Item = (ArcId, Direction)> + '_ {
        let (head, tail) = self.arcs[1..].split_at(self.head_len);
        tail.iter().chain(head.iter()).copied()
    }
}

/// A spanning tree hung from a root vertex.
#[derive(Clone, Debug)]
pub struct SpanningTree {
    root: VertexId,
    parent_nodes: Vec<VertexId>, // the root is its own parent
    parent_arcs: Vec<Option<ArcId>>,
    depths: Vec<usize>,
    // The tree arcs incident to each vertex together with their other end point.
    incident: Vec<Vec<(ArcId, VertexId)>>,
    in_tree: Vec<bool>,
}

impl SpanningTree {
    /// Build the tree given by `arcs` rooted at `root`.
    ///
    /// The arcs are considered undirected. Parents and depths are
    /// assigned by a breadth-first walk from the root which visits the
    /// arcs incident to a vertex in the order in which they are given,
    /// so the result is reproducible.
    ///
    /// Fails with [`Error::NotATree`] unless the arcs connect all
    /// vertices of `g` without a cycle.
    pub fn from_arcs<F, I>(g: &Graph<F>, root: VertexId, arcs: I) -> Result<Self>
    where
        I: IntoIterator<Item = ArcId>,
    {
        let n = g.num_vertices();
        if root >= n {
            return Err(not_a_tree(format!("invalid root {} (must be in 0..{})", root, n)));
        }

        let mut tree = SpanningTree {
            root,
            parent_nodes: vec![root; n],
            parent_arcs: vec![None; n],
            depths: vec![0; n],
            incident: vec![vec![]; n],
            in_tree: vec![false; g.num_arcs()],
        };

        let mut narcs = 0;
        for a in arcs {
            if a >= g.num_arcs() {
                return Err(not_a_tree(format!("unknown arc {}", a)));
            }
            if tree.in_tree[a] {
                return Err(not_a_tree(format!("arc {} given twice", a)));
            }
            let arc = g.arc_by_id(a);
            tree.in_tree[a] = true;
            tree.incident[arc.beg].push((a, arc.end));
            tree.incident[arc.end].push((a, arc.beg));
            narcs += 1;
        }

        if narcs + 1 != n {
            return Err(not_a_tree(format!(
                "got {} arcs, a tree on {} vertices has {}",
                narcs,
                n,
                n - 1
            )));
        }

        let mut seen = vec![false; n];
        let mut queue = VecDeque::new();
        seen[root] = true;
        queue.push_back(root);
        let mut nvisited = 0;
        while let Some(u) = queue.pop_front() {
            nvisited += 1;
            for &(a, v) in &tree.incident[u] {
                if Some(a) == tree.parent_arcs[u] {
                    continue;
                }
                if seen[v] {
                    return Err(not_a_tree(format!("arc {} closes a cycle", a)));
                }
                seen[v] = true;
                tree.parent_nodes[v] = u;
                tree.parent_arcs[v] = Some(a);
                tree.depths[v] = tree.depths[u] + 1;
                queue.push_back(v);
            }
        }

        if nvisited != n {
            return Err(not_a_tree(format!(
                "only {} of {} vertices are connected to the root {}",
                nvisited, n, root
            )));
        }

        Ok(tree)
    }

    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn num_vertices(&self) -> usize {
        self.parent_nodes.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.num_vertices() - 1
    }

    /// The parent of `u`, or `None` for the root.
    pub fn parent(&self, u: VertexId) -> Option<VertexId> {
        if u == self.root {
            None
        } else {
            Some(self.parent_nodes[u])
        }
    }

    /// The tree arc between `u` and its parent, or `None` for the root.
    pub fn parent_arc(&self, u: VertexId) -> Option<ArcId> {
        self.parent_arcs[u]
    }

    pub fn depth(&self, u: VertexId) -> usize {
        self.depths[u]
    }

    /// Whether `a` is a tree arc.
    pub fn contains(&self, a: ArcId) -> bool {
        self.in_tree.get(a).copied().unwrap_or(false)
    }

    /// The tree arcs in ascending order.
    pub fn arc_ids(&self) -> impl Iterator<Item = ArcId> + '_ {
        self.in_tree
            .iter()
            .enumerate()
            .filter_map(|(a, &t)| if t { Some(a) } else { None })
    }

    /// The vertices in breadth-first order from the root.
    ///
    /// Every vertex appears after its parent.
    pub fn traversal(&self) -> Vec<VertexId> {
        let mut order = Vec::with_capacity(self.num_vertices());
        order.push(self.root);
        let mut i = 0;
        while i < order.len() {
            let u = order[i];
            for &(a, v) in &self.incident[u] {
                if Some(a) != self.parent_arcs[u] {
                    order.push(v);
                }
            }
            i += 1;
        }
        order
    }

    // The parent arc of a non-root vertex.
    fn up(&self, u: VertexId) -> Result<ArcId> {
        self.parent_arcs[u].ok_or_else(|| not_a_tree(format!("vertex {} has no parent arc", u)))
    }

    /// Return the cycle closed by adding the non-tree arc `a` to the tree.
    ///
    /// The deeper end point is lifted to the depth of the other one,
    /// then both are lifted simultaneously until they meet in the apex.
    /// Fails with [`Error::DegenerateCycle`] if `a` is a loop or a tree
    /// arc.
    pub fn fundamental_cycle<F>(&self, g: &Graph<F>, a: ArcId) -> Result<Cycle> {
        if a >= g.num_arcs() || self.contains(a) {
            return Err(Error::DegenerateCycle { arc: a });
        }
        let arc = g.arc_by_id(a);
        if arc.beg == arc.end {
            return Err(Error::DegenerateCycle { arc: a });
        }

        // The path from the head of `a` upwards is traversed towards the
        // apex, the path from the tail of `a` upwards is traversed away
        // from it.
        let mut head_side = vec![];
        let mut tail_side = vec![];
        let mut l = arc.beg;
        let mut r = arc.end;

        while self.depths[l] > self.depths[r] {
            let e = self.up(l)?;
            tail_side.push((e, descend(g.arc_by_id(e).end == l)));
            l = self.parent_nodes[l];
        }
        while self.depths[r] > self.depths[l] {
            let e = self.up(r)?;
            head_side.push((e, descend(g.arc_by_id(e).beg == r)));
            r = self.parent_nodes[r];
        }
        while l != r {
            let e = self.up(l)?;
            tail_side.push((e, descend(g.arc_by_id(e).end == l)));
            l = self.parent_nodes[l];

            let e = self.up(r)?;
            head_side.push((e, descend(g.arc_by_id(e).beg == r)));
            r = self.parent_nodes[r];
        }

        let head_len = head_side.len();
        let mut arcs = Vec::with_capacity(1 + head_side.len() + tail_side.len());
        arcs.push((a, Direction::Forward));
        arcs.extend(head_side);
        arcs.extend(tail_side.into_iter().rev());

        Ok(Cycle { arcs, apex: l, head_len })
    }

    // Whether `u` lies in the subtree of `x`.
    fn is_below(&self, mut u: VertexId, x: VertexId) -> bool {
        while self.depths[u] > self.depths[x] {
            u = self.parent_nodes[u];
        }
        u == x
    }

    /// Replace the tree arc `leaving` by the non-tree arc `entering`.
    ///
    /// Removing `leaving` detaches the subtree below it. That subtree
    /// is re-hung from the end point of `entering` it contains, and the
    /// parents and depths of its vertices are recomputed. The rest of
    /// the tree is untouched.
    pub fn pivot<F>(&mut self, g: &Graph<F>, entering: ArcId, leaving: ArcId) -> Result<()> {
        if !self.contains(leaving) {
            return Err(not_a_tree(format!("leaving arc {} is not a tree arc", leaving)));
        }
        if entering >= g.num_arcs() || self.contains(entering) {
            return Err(not_a_tree(format!("entering arc {} is not a non-tree arc", entering)));
        }

        let out = g.arc_by_id(leaving);
        let x = if self.parent_arcs[out.end] == Some(leaving) {
            out.end
        } else {
            out.beg
        };

        let arc = g.arc_by_id(entering);
        let (q, p) = if self.is_below(arc.beg, x) {
            (arc.beg, arc.end)
        } else {
            (arc.end, arc.beg)
        };
        if !self.is_below(q, x) || self.is_below(p, x) {
            return Err(not_a_tree(format!(
                "arc {} does not reconnect the subtree detached by arc {}",
                entering, leaving
            )));
        }

        self.incident[out.beg].retain(|&(e, _)| e != leaving);
        self.incident[out.end].retain(|&(e, _)| e != leaving);
        self.incident[arc.beg].push((entering, arc.end));
        self.incident[arc.end].push((entering, arc.beg));
        if self.in_tree.len() < g.num_arcs() {
            self.in_tree.resize(g.num_arcs(), false);
        }
        self.in_tree[leaving] = false;
        self.in_tree[entering] = true;

        self.parent_nodes[q] = p;
        self.parent_arcs[q] = Some(entering);
        self.depths[q] = self.depths[p] + 1;

        let mut queue = VecDeque::new();
        queue.push_back(q);
        while let Some(u) = queue.pop_front() {
            for &(a, v) in &self.incident[u] {
                if Some(a) == self.parent_arcs[u] {
                    continue;
                }
                self.parent_nodes[v] = u;
                self.parent_arcs[v] = Some(a);
                self.depths[v] = self.depths[u] + 1;
                queue.push_back(v);
            }
        }

        Ok(())
    }

    /// Verify parents and depths against a tree rebuilt from scratch.
    pub fn check<F>(&self, g: &Graph<F>) -> Result<()> {
        let fresh = SpanningTree::from_arcs(g, self.root, self.arc_ids())?;
        for u in 0..self.num_vertices() {
            if fresh.parent_nodes[u] != self.parent_nodes[u]
                || fresh.parent_arcs[u] != self.parent_arcs[u]
                || fresh.depths[u] != self.depths[u]
            {
                return Err(not_a_tree(format!(
                    "vertex {} has parent {} (depth {}), expected {} (depth {})",
                    u, self.parent_nodes[u], self.depths[u], fresh.parent_nodes[u], fresh.depths[u]
                )));
            }
        }
        Ok(())
    }
}

fn descend(forward: bool) -> Direction {
    if forward {
        Direction::Forward
    } else {
        Direction::Backward
    }
}
