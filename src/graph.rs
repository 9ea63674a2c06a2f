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

//! A directed network with per-vertex and per-arc numeric properties.
//!
//! Vertices are numbered densely `0..n` and are created once when the
//! network is sized. Arcs get sequential ids in insertion order. The
//! only adjacency index kept is the list of outgoing arcs of each
//! vertex.
//!
//! # Example
//!
//! ```
//! use rs_transport::graph::Graph;
//!
//! let mut g = Graph::<i64>::new(3).unwrap();
//! let a = g.add_arc(0, 1, 4).unwrap();
//! let b = g.add_arc(1, 2, 2).unwrap();
//! g.set_demand(0, -1).unwrap();
//! g.set_demand(2, 1).unwrap();
//!
//! assert_eq!(g.num_arcs(), 2);
//! assert_eq!(g.out_arcs(1).collect::<Vec<_>>(), vec![b]);
//! assert_eq!(g.arc(0, 1).unwrap().id, a);
//! ```

use num_traits::NumAssign;

use std::error;
use std::fmt;
use std::slice::Iter as SliceIter;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Index of a vertex.
pub type VertexId = usize;

/// Index of an arc.
pub type ArcId = usize;

/// Misuse of the graph model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A graph must have at least one vertex.
    InvalidSize(usize),
    /// A vertex id is not in `0..n`.
    UnknownVertex { vertex: VertexId, num_vertices: usize },
    /// There is no arc between the two vertices.
    ArcNotFound { beg: VertexId, end: VertexId },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            InvalidSize(n) => write!(fmt, "invalid number of vertices: {} (must be > 0)", n),
            UnknownVertex { vertex, num_vertices } => {
                write!(fmt, "unknown vertex {} (must be in 0..{})", vertex, num_vertices)
            }
            ArcNotFound { beg, end } => write!(fmt, "no arc ({},{}) in graph", beg, end),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A vertex of the network.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Vertex<F> {
    pub id: VertexId,
    /// Negative for a supply vertex, positive for a demand vertex.
    pub demand: F,
    /// The dual price, maintained by the simplex.
    pub potential: F,
}

/// A directed arc of the network.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Arc<F> {
    pub id: ArcId,
    pub beg: VertexId,
    pub end: VertexId,
    pub cost: F,
    pub flux: F,
    /// Whether the arc has been added to bootstrap a feasible basis.
    pub artificial: bool,
}

/// A directed network with out-adjacency lists.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Graph<F> {
    vertices: Vec<Vertex<F>>,
    arcs: Vec<Arc<F>>,
    // The outgoing arcs of each vertex in insertion order.
    outs: Vec<Vec<ArcId>>,
}

/// Iterator over the outgoing arcs of a vertex.
///
/// The iterator can be cloned to restart the sequence.
#[derive(Clone)]
pub struct OutArcs<'a>(SliceIter<'a, ArcId>);

impl<'a> Iterator for OutArcs<'a> {
    type Item = ArcId;

    fn next(&mut self) -> Option<ArcId> {
        self.0.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> ExactSizeIterator for OutArcs<'a> {}

impl<F> Graph<F>
where
    F: NumAssign + Copy,
{
    /// Create a network with `n` vertices, zero demands and no arcs.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidSize(n));
        }
        Ok(Graph {
            vertices: (0..n)
                .map(|id| Vertex {
                    id,
                    demand: F::zero(),
                    potential: F::zero(),
                })
                .collect(),
            arcs: vec![],
            outs: vec![vec![]; n],
        })
    }

    /// Append the arc `(beg, end)` and return its id.
    pub fn add_arc(&mut self, beg: VertexId, end: VertexId, cost: F) -> Result<ArcId> {
        self.push_arc(beg, end, cost, false)
    }

    /// Append an artificial arc `(beg, end)` and return its id.
    pub fn add_artificial_arc(&mut self, beg: VertexId, end: VertexId, cost: F) -> Result<ArcId> {
        self.push_arc(beg, end, cost, true)
    }

    fn push_arc(&mut self, beg: VertexId, end: VertexId, cost: F, artificial: bool) -> Result<ArcId> {
        self.check_vertex(beg)?;
        self.check_vertex(end)?;
        let id = self.arcs.len();
        self.arcs.push(Arc {
            id,
            beg,
            end,
            cost,
            flux: F::zero(),
            artificial,
        });
        self.outs[beg].push(id);
        Ok(id)
    }

    /// Remove all artificial arcs.
    ///
    /// The remaining arcs keep their relative order and are renumbered
    /// consecutively. If all artificial arcs have been added after the
    /// real arcs, the ids of the real arcs do not change.
    pub fn remove_artificial_arcs(&mut self) {
        if self.arcs.iter().all(|a| !a.artificial) {
            return;
        }
        self.arcs.retain(|a| !a.artificial);
        for outs in &mut self.outs {
            outs.clear();
        }
        for (id, a) in self.arcs.iter_mut().enumerate() {
            a.id = id;
            self.outs[a.beg].push(id);
        }
    }

    pub fn set_demand(&mut self, u: VertexId, demand: F) -> Result<()> {
        self.check_vertex(u)?;
        self.vertices[u].demand = demand;
        Ok(())
    }

    pub fn set_potential(&mut self, u: VertexId, potential: F) {
        self.vertices[u].potential = potential;
    }

    pub fn set_flux(&mut self, a: ArcId, flux: F) {
        self.arcs[a].flux = flux;
    }

    pub fn set_cost(&mut self, a: ArcId, cost: F) {
        self.arcs[a].cost = cost;
    }

    /// Set the flux of every arc to zero.
    pub fn reset_flux(&mut self) {
        for a in &mut self.arcs {
            a.flux = F::zero();
        }
    }

    /// The flux entering `u` minus the flux leaving `u`.
    ///
    /// For a feasible flow this equals the demand of `u`.
    pub fn net_inflow(&self, u: VertexId) -> F {
        let mut inflow = F::zero();
        for a in &self.arcs {
            if a.end == u {
                inflow += a.flux;
            }
            if a.beg == u {
                inflow -= a.flux;
            }
        }
        inflow
    }

    /// The cost of the current flow on all non-artificial arcs.
    pub fn total_cost(&self) -> F {
        let mut value = F::zero();
        for a in self.arcs.iter().filter(|a| !a.artificial && !a.flux.is_zero()) {
            value += a.cost * a.flux;
        }
        value
    }
}

impl<F> Graph<F> {
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    fn check_vertex(&self, u: VertexId) -> Result<()> {
        if u < self.vertices.len() {
            Ok(())
        } else {
            Err(Error::UnknownVertex {
                vertex: u,
                num_vertices: self.vertices.len(),
            })
        }
    }

    pub fn vertex(&self, u: VertexId) -> &Vertex<F> {
        &self.vertices[u]
    }

    pub fn vertices(&self) -> SliceIter<Vertex<F>> {
        self.vertices.iter()
    }

    pub fn arc_by_id(&self, a: ArcId) -> &Arc<F> {
        &self.arcs[a]
    }

    pub fn arcs(&self) -> SliceIter<Arc<F>> {
        self.arcs.iter()
    }

    /// The outgoing arcs of `u` in insertion order.
    ///
    /// # Panics
    ///
    /// If `u` is not a vertex of the graph.
    pub fn out_arcs(&self, u: VertexId) -> OutArcs {
        OutArcs(self.outs[u].iter())
    }

    /// Return the first arc from `beg` to `end`, if there is one.
    pub fn find_arc(&self, beg: VertexId, end: VertexId) -> Option<ArcId> {
        self.outs
            .get(beg)?
            .iter()
            .copied()
            .find(|&a| self.arcs[a].end == end)
    }

    /// Return the first arc from `beg` to `end`.
    pub fn arc(&self, beg: VertexId, end: VertexId) -> Result<&Arc<F>> {
        self.check_vertex(beg)?;
        self.check_vertex(end)?;
        self.find_arc(beg, end)
            .map(|a| &self.arcs[a])
            .ok_or(Error::ArcNotFound { beg, end })
    }
}

impl<F> fmt::Display for Graph<F>
where
    F: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        writeln!(f, "vertices: {}", self.vertices.len())?;
        for u in &self.vertices {
            writeln!(f, "  {} demand={}", u.id, u.demand)?;
        }
        writeln!(f, "arcs: {}", self.arcs.len())?;
        for a in &self.arcs {
            write!(f, "  {}: {} -> {} cost={} flux={}", a.id, a.beg, a.end, a.cost, a.flux)?;
            if a.artificial {
                write!(f, " (artificial)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, Graph};

    fn diamond() -> Graph<i64> {
        let mut g = Graph::new(4).unwrap();
        g.add_arc(0, 1, 2).unwrap();
        g.add_arc(0, 2, 3).unwrap();
        g.add_arc(1, 3, 1).unwrap();
        g.add_arc(2, 3, 1).unwrap();
        g.add_arc(0, 1, 7).unwrap();
        g
    }

    #[test]
    fn test_new() {
        assert_eq!(Graph::<i64>::new(0).unwrap_err(), Error::InvalidSize(0));

        let g = Graph::<i64>::new(3).unwrap();
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_arcs(), 0);
        assert!(g.vertices().all(|u| u.demand == 0 && u.potential == 0));
        assert_eq!(g.vertices().map(|u| u.id).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_add_arc() {
        let mut g = diamond();
        assert_eq!(g.num_arcs(), 5);
        assert_eq!(
            g.add_arc(0, 4, 1).unwrap_err(),
            Error::UnknownVertex {
                vertex: 4,
                num_vertices: 4
            }
        );
        assert_eq!(
            g.add_arc(9, 0, 1).unwrap_err(),
            Error::UnknownVertex {
                vertex: 9,
                num_vertices: 4
            }
        );
        assert_eq!(g.num_arcs(), 5);
        assert_eq!(g.add_arc(3, 0, 1).unwrap(), 5);
    }

    #[test]
    fn test_out_arcs() {
        let g = diamond();
        let outs = g.out_arcs(0);
        assert_eq!(outs.len(), 3);
        assert_eq!(outs.clone().collect::<Vec<_>>(), vec![0, 1, 4]);
        // restarting yields the same sequence
        assert_eq!(outs.collect::<Vec<_>>(), vec![0, 1, 4]);
        assert_eq!(g.out_arcs(3).count(), 0);
        for u in 0..g.num_vertices() {
            assert!(g.out_arcs(u).all(|a| g.arc_by_id(a).beg == u));
        }
    }

    #[test]
    fn test_arc_lookup() {
        let g = diamond();
        // parallel arcs: the first one wins
        let a = g.arc(0, 1).unwrap();
        assert_eq!((a.id, a.cost), (0, 2));
        assert_eq!(g.find_arc(2, 3), Some(3));
        assert_eq!(g.find_arc(3, 2), None);
        assert_eq!(g.arc(3, 2).unwrap_err(), Error::ArcNotFound { beg: 3, end: 2 });
        assert!(matches!(g.arc(5, 2), Err(Error::UnknownVertex { .. })));
    }

    #[test]
    fn test_properties() {
        let mut g = diamond();
        g.set_demand(0, -3).unwrap();
        g.set_demand(3, 3).unwrap();
        assert!(g.set_demand(4, 1).is_err());
        g.set_flux(0, 3);
        g.set_flux(2, 3);
        g.set_cost(2, 5);

        assert_eq!(g.net_inflow(0), -3);
        assert_eq!(g.net_inflow(1), 0);
        assert_eq!(g.net_inflow(3), 3);
        assert_eq!(g.total_cost(), 3 * 2 + 3 * 5);

        g.reset_flux();
        assert!(g.arcs().all(|a| a.flux == 0));
        assert_eq!(g.total_cost(), 0);
    }

    #[test]
    fn test_remove_artificial() {
        let mut g = diamond();
        let a = g.add_artificial_arc(0, 3, 1).unwrap();
        g.set_flux(a, 2);
        assert!(g.arc_by_id(a).artificial);
        // artificial arcs are not part of the objective
        assert_eq!(g.total_cost(), 0);
        assert_eq!(g.out_arcs(0).collect::<Vec<_>>(), vec![0, 1, 4, 5]);

        g.remove_artificial_arcs();
        assert_eq!(g.num_arcs(), 5);
        assert_eq!(g.out_arcs(0).collect::<Vec<_>>(), vec![0, 1, 4]);
        assert!(g.arcs().enumerate().all(|(i, a)| a.id == i && !a.artificial));
    }

    #[test]
    fn test_display() {
        let mut g = Graph::<i64>::new(2).unwrap();
        g.set_demand(0, -1).unwrap();
        g.set_demand(1, 1).unwrap();
        g.add_arc(0, 1, 3).unwrap();
        g.add_artificial_arc(1, 0, 1).unwrap();
        assert_eq!(
            g.to_string(),
            "vertices: 2
  0 demand=-1
  1 demand=1
arcs: 2
  0: 0 -> 1 cost=3 flux=0
  1: 1 -> 0 cost=1 flux=0 (artificial)
"
        );
    }

    #[cfg(feature = "serialize")]
    mod serialize {
        use super::diamond;
        use crate::graph::Graph;
        use serde_json;

        #[test]
        fn test_serde() {
            let g = diamond();
            let serialized = serde_json::to_string(&g).unwrap();
            let h: Graph<i64> = serde_json::from_str(&serialized).unwrap();

            assert_eq!(g.num_vertices(), h.num_vertices());
            assert_eq!(g.arcs().collect::<Vec<_>>(), h.arcs().collect::<Vec<_>>());
            assert_eq!(h.out_arcs(0).collect::<Vec<_>>(), vec![0, 1, 4]);
        }
    }
}
