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

//! A primal network simplex implementation for uncapacitated networks.
//!
//! The algorithm works in two phases. Phase 1 starts from a star
//! shaped basis tree around the root vertex. Every star arc is a real
//! arc if the graph has one, otherwise an artificial arc of cost 1.
//! With all real arcs costed 0, minimizing the flow on the artificial
//! arcs yields a feasible basis, or proves infeasibility. Phase 2
//! pivots this basis to optimality with respect to the real costs.
//!
//! # Example
//!
//! ```
//! use rs_transport::graph::Graph;
//! use rs_transport::mcf::{NetworkSimplex, SolutionState};
//!
//! let mut g = Graph::<i64>::new(3).unwrap();
//! g.add_arc(0, 1, 2).unwrap();
//! g.add_arc(1, 2, 2).unwrap();
//! g.add_arc(0, 2, 5).unwrap();
//! g.set_demand(0, -3).unwrap();
//! g.set_demand(2, 3).unwrap();
//!
//! let mut spx = NetworkSimplex::new(&mut g, 0);
//! assert_eq!(spx.solve().unwrap(), SolutionState::Optimal);
//! assert_eq!(spx.value(), 12);
//! assert_eq!(spx.flux(0), 3);
//! ```

use super::{Error, Result, SolutionState};
use crate::graph::{ArcId, Graph, VertexId};
use crate::tree::{self, Direction, SpanningTree};

use log::{debug, info, trace};
use num_traits::{NumAssign, Signed};
use std::fmt::Debug;

/// The default pivot limit is this factor times the number of arcs and vertices.
pub const PIVOT_LIMIT_FACTOR: usize = 100;

/// Rule for selecting the entering arc.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pricing {
    /// The eligible arc with the smallest id.
    FirstEligible,
    /// The arc with the most negative reduced cost (Dantzig's rule).
    Dantzig,
    /// The most negative arc of the first block of arcs containing an eligible arc.
    Block,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Feasibility,
    Optimality,
}

/// A primal network simplex algorithm.
pub struct NetworkSimplex<'a, F> {
    graph: &'a mut Graph<F>,
    root: VertexId,
    tree: Option<SpanningTree>,

    pub pricing: Pricing,
    block_size: usize,
    /// The (reduced cost) value to be considered zero. Defaults to `F::zero()`.
    pub zero: F,
    /// The maximal number of pivots over both phases.
    ///
    /// If `None` (the default) the limit is
    /// `PIVOT_LIMIT_FACTOR * (m + n)`.
    pub max_pivots: Option<usize>,
    pivot_limit: usize,

    niter: usize,
    nphase1: usize,
    ndegenerate: usize,
    solution_state: SolutionState,
}

impl<'a, F> NetworkSimplex<'a, F>
where
    F: NumAssign + Signed + PartialOrd + Copy + Debug,
{
    /// Create a solver for the demands stored in `g`.
    ///
    /// The basis trees are rooted at `root`. The artificial arcs of
    /// phase 1 are appended to `g` and stay there while the solver
    /// lives; they never carry flow in a solution.
    pub fn new(g: &'a mut Graph<F>, root: VertexId) -> Self {
        NetworkSimplex {
            graph: g,
            root,
            tree: None,

            pricing: Pricing::FirstEligible,
            block_size: 0,
            zero: F::zero(),
            max_pivots: None,
            pivot_limit: 0,

            niter: 0,
            nphase1: 0,
            ndegenerate: 0,
            solution_state: SolutionState::Unknown,
        }
    }

    pub fn as_graph(&self) -> &Graph<F> {
        &*self.graph
    }

    /// The current basis tree.
    pub fn tree(&self) -> Option<&SpanningTree> {
        self.tree.as_ref()
    }

    /// Return the solution state of the latest computation.
    pub fn solution_state(&self) -> SolutionState {
        self.solution_state
    }

    /// The total number of pivots of the latest computation.
    pub fn num_iterations(&self) -> usize {
        self.niter
    }

    /// The number of pivots spent in phase 1.
    pub fn num_phase1_iterations(&self) -> usize {
        self.nphase1
    }

    /// The number of pivots that did not change the flow.
    pub fn num_degenerate_pivots(&self) -> usize {
        self.ndegenerate
    }

    /// Return the value of the latest computed flow.
    pub fn value(&self) -> F {
        self.graph.total_cost()
    }

    /// The flux of an arc.
    pub fn flux(&self, a: ArcId) -> F {
        self.graph.arc_by_id(a).flux
    }

    /// The reduced cost of an arc w.r.t. the current vertex potentials.
    pub fn reduced_cost(&self, a: ArcId) -> F {
        let arc = self.graph.arc_by_id(a);
        arc.cost - (self.graph.vertex(arc.beg).potential - self.graph.vertex(arc.end).potential)
    }

    /// Solve the min-cost-flow problem.
    ///
    /// Infeasibility and unboundedness are regular outcomes reported as
    /// [`SolutionState`]. An error is returned if the pivot limit is
    /// exceeded or the basis becomes corrupted.
    pub fn solve(&mut self) -> Result<SolutionState> {
        self.niter = 0;
        self.nphase1 = 0;
        self.ndegenerate = 0;
        self.tree = None;
        self.solution_state = SolutionState::Unknown;

        self.graph.remove_artificial_arcs();
        self.graph.reset_flux();

        let n = self.graph.num_vertices();
        if self.root >= n {
            return Err(Error::Graph(crate::graph::Error::UnknownVertex {
                vertex: self.root,
                num_vertices: n,
            }));
        }

        debug!(
            "Network simplex on {} vertices and {} arcs, root {}",
            n,
            self.graph.num_arcs(),
            self.root
        );

        // demands must be balanced, that's the only way to be feasible
        let mut total = F::zero();
        for u in self.graph.vertices() {
            total += u.demand;
        }
        if total.abs() > self.zero {
            info!("Demands do not sum up to zero (excess {:?})", total);
            self.solution_state = SolutionState::Infeasible;
            return Ok(self.solution_state);
        }

        self.pivot_limit = self
            .max_pivots
            .unwrap_or(PIVOT_LIMIT_FACTOR * (self.graph.num_arcs() + n));
        self.initialize_pricing();

        let state = self.phase1()?;
        if state != SolutionState::Optimal {
            self.solution_state = state;
            return Ok(state);
        }

        let tree = self.tree.take().ok_or_else(|| tree::Error::NotATree {
            msg: "no basis after phase 1".to_string(),
        })?;
        let state = self.run_phase(tree, Phase::Optimality)?;
        info!(
            "Phase 2 finished: {:?} after {} pivots ({} degenerate), value {:?}",
            state,
            self.niter - self.nphase1,
            self.ndegenerate,
            self.value()
        );

        self.solution_state = state;
        Ok(state)
    }

    fn initialize_pricing(&mut self) {
        if let Pricing::Block = self.pricing {
            self.block_size = ((self.graph.num_arcs() as f64).sqrt() * 0.5).round() as usize;
            self.block_size = self.block_size.max(10);
        }
    }

    /// Compute a feasible basis.
    ///
    /// Returns `Optimal` if a feasible basis has been found. The basis
    /// tree is stored in any case and the real costs are restored.
    fn phase1(&mut self) -> Result<SolutionState> {
        let n = self.graph.num_vertices();
        let m = self.graph.num_arcs();

        let costs: Vec<F> = self.graph.arcs().map(|a| a.cost).collect();
        for a in 0..m {
            self.graph.set_cost(a, F::zero());
        }

        // The star around the root. Each arc is oriented such that
        // it carries the (absolute) demand of its vertex.
        let mut star = Vec::with_capacity(n.saturating_sub(1));
        for v in 0..n {
            if v == self.root {
                continue;
            }
            let b = self.graph.vertex(v).demand;
            let (s, t) = if b >= F::zero() { (self.root, v) } else { (v, self.root) };
            let a = match self.graph.find_arc(s, t) {
                Some(a) => a,
                None => self.graph.add_artificial_arc(s, t, F::one())?,
            };
            self.graph.set_flux(a, b.abs());
            star.push(a);
        }

        debug!("Phase 1 with {} artificial arcs", self.graph.num_arcs() - m);

        let result = SpanningTree::from_arcs(self.as_graph(), self.root, star)
            .map_err(Error::from)
            .and_then(|tree| self.run_phase(tree, Phase::Feasibility));

        // the real costs are needed even if phase 1 failed
        for (a, c) in costs.into_iter().enumerate() {
            self.graph.set_cost(a, c);
        }
        let state = result?;

        // The objective of phase 1 is the flux on the artificial arcs.
        let mut infeasibility = F::zero();
        for a in m..self.graph.num_arcs() {
            infeasibility += self.graph.arc_by_id(a).flux;
            self.graph.set_cost(a, F::zero());
        }

        info!(
            "Phase 1 finished: {:?} after {} pivots, infeasibility {:?}",
            state, self.nphase1, infeasibility
        );

        if state != SolutionState::Optimal || infeasibility > self.zero {
            return Ok(SolutionState::Infeasible);
        }

        Ok(SolutionState::Optimal)
    }

    // Run the pivot loop on `tree` and keep the final tree.
    fn run_phase(&mut self, mut tree: SpanningTree, phase: Phase) -> Result<SolutionState> {
        let result = self.pivot_loop(&mut tree, phase);
        self.tree = Some(tree);
        result
    }

    fn pivot_loop(&mut self, tree: &mut SpanningTree, phase: Phase) -> Result<SolutionState> {
        loop {
            self.update_potentials(tree);

            let entering = match self.find_entering_arc(tree, phase) {
                Some(a) => a,
                None => return Ok(SolutionState::Optimal),
            };

            if self.niter >= self.pivot_limit {
                return Err(Error::PivotLimitExceeded {
                    limit: self.pivot_limit,
                });
            }
            self.niter += 1;
            if phase == Phase::Feasibility {
                self.nphase1 += 1;
            }

            // a loop with negative cost can carry arbitrary flow
            let arc = self.graph.arc_by_id(entering);
            if arc.beg == arc.end {
                return Ok(SolutionState::Unbounded);
            }

            let cycle = tree.fundamental_cycle(self.as_graph(), entering)?;

            // The leaving arc is the last blocking arc when the cycle is
            // traversed from the apex, which keeps the tree strongly
            // feasible. Backward arcs block by their flux, artificial
            // arcs must not carry flow in phase 2.
            let mut leaving = None;
            let mut theta = F::zero();
            for (a, dir) in cycle.from_apex() {
                let arc = self.graph.arc_by_id(a);
                let residual = match dir {
                    Direction::Backward => arc.flux,
                    Direction::Forward if phase == Phase::Optimality && arc.artificial => F::zero(),
                    Direction::Forward => continue,
                };
                if leaving.is_none() || residual <= theta {
                    leaving = Some(a);
                    theta = residual;
                }
            }

            let leaving = match leaving {
                Some(a) => a,
                None => return Ok(SolutionState::Unbounded),
            };

            trace!(
                "{:?} pivot {}: entering {}, leaving {}, theta {:?}, cycle length {}",
                phase,
                self.niter,
                entering,
                leaving,
                theta,
                cycle.len()
            );

            if theta <= self.zero {
                self.ndegenerate += 1;
            }
            if !theta.is_zero() {
                for &(a, dir) in cycle.arcs() {
                    let flux = self.graph.arc_by_id(a).flux;
                    match dir {
                        Direction::Forward => self.graph.set_flux(a, flux + theta),
                        Direction::Backward => self.graph.set_flux(a, flux - theta),
                    }
                }
            }

            tree.pivot(self.as_graph(), entering, leaving)?;
        }
    }

    /// Recompute the potentials such that all tree arcs have reduced cost 0.
    fn update_potentials(&mut self, tree: &SpanningTree) {
        self.graph.set_potential(tree.root(), F::zero());
        for u in tree.traversal() {
            if let (Some(p), Some(a)) = (tree.parent(u), tree.parent_arc(u)) {
                let arc = self.graph.arc_by_id(a);
                let potential = self.graph.vertex(p).potential;
                let potential = if arc.beg == p {
                    potential - arc.cost
                } else {
                    potential + arc.cost
                };
                self.graph.set_potential(u, potential);
            }
        }
    }

    // The reduced cost of `a` if it may enter the basis.
    fn eligible_cost(&self, tree: &SpanningTree, phase: Phase, a: ArcId) -> Option<F> {
        if tree.contains(a) || (phase == Phase::Optimality && self.graph.arc_by_id(a).artificial) {
            return None;
        }
        let c = self.reduced_cost(a);
        if c < -self.zero {
            Some(c)
        } else {
            None
        }
    }

    fn find_entering_arc(&self, tree: &SpanningTree, phase: Phase) -> Option<ArcId> {
        let m = self.graph.num_arcs();
        match self.pricing {
            Pricing::FirstEligible => (0..m).find(|&a| self.eligible_cost(tree, phase, a).is_some()),
            Pricing::Dantzig => self.most_negative(tree, phase, 0, m),
            Pricing::Block => {
                let mut beg = 0;
                while beg < m {
                    let end = (beg + self.block_size).min(m);
                    if let Some(a) = self.most_negative(tree, phase, beg, end) {
                        return Some(a);
                    }
                    beg = end;
                }
                None
            }
        }
    }

    // The eligible arc in `beg..end` with the most negative reduced
    // cost. Ties are broken by the smaller id.
    fn most_negative(&self, tree: &SpanningTree, phase: Phase, beg: ArcId, end: ArcId) -> Option<ArcId> {
        let mut min_cost = F::zero();
        let mut min_arc = None;
        for a in beg..end {
            if let Some(c) = self.eligible_cost(tree, phase, a) {
                if min_arc.is_none() || c < min_cost {
                    min_cost = c;
                    min_arc = Some(a);
                }
            }
        }
        min_arc
    }
}

/// Solve a min-cost-flow problem with a network simplex algorithm.
///
/// The demands are taken from `g`, the basis is rooted at `root`. The
/// function returns the objective value and the flux of each arc if
/// the problem has an optimal solution. The flux is also stored in `g`.
pub fn network_simplex<F>(g: &mut Graph<F>, root: VertexId) -> Result<Option<(F, Vec<F>)>>
where
    F: NumAssign + Signed + PartialOrd + Copy + Debug,
{
    let state = NetworkSimplex::new(g, root).solve()?;
    g.remove_artificial_arcs();
    if state == SolutionState::Optimal {
        Ok(Some((g.total_cost(), g.arcs().map(|a| a.flux).collect())))
    } else {
        Ok(None)
    }
}
