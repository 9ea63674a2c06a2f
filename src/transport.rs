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

//! Single-commodity transportation problems.
//!
//! A transportation problem asks for the cheapest way to ship a fixed
//! quantity from a producer to a consumer through a network of
//! uncapacitated arcs.
//!
//! # Example
//!
//! ```
//! use rs_transport::transport::{format::Instance, Transport};
//!
//! let t = Transport::load(Instance {
//!     num_vertices: 3,
//!     producer: 0,
//!     consumer: 2,
//!     quantity: 2,
//!     arcs: vec![(0, 1, 1), (1, 2, 1), (0, 2, 3)],
//! })
//! .unwrap();
//!
//! let solution = t.solve().unwrap();
//! assert_eq!(solution.cost, 4);
//! assert_eq!(solution.flux(2), 0);
//! ```

pub mod format;

use self::format::Instance;
use crate::graph::{self, Arc, ArcId, Graph, VertexId};
use crate::mcf::{self, NetworkSimplex, Pricing, SolutionState};

use log::info;
use num_traits::{NumAssign, Signed, Zero};
use std::error;
use std::fmt::{self, Debug, Display};
use std::io::Read;
use std::str::FromStr;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Error when loading or solving a transportation problem.
#[derive(Debug)]
pub enum Error {
    /// The instance is inconsistent.
    InvalidInstance(String),
    Graph(graph::Error),
    /// The instance could not be read.
    Format(format::Error),
    /// The quantity cannot be shipped from the producer to the consumer.
    Infeasible,
    /// There is a cycle of negative cost.
    Unbounded,
    /// The solver failed.
    Solver(mcf::Error),
}

impl From<graph::Error> for Error {
    fn from(err: graph::Error) -> Self {
        Error::Graph(err)
    }
}

impl From<format::Error> for Error {
    fn from(err: format::Error) -> Self {
        Error::Format(err)
    }
}

impl From<mcf::Error> for Error {
    fn from(err: mcf::Error) -> Self {
        Error::Solver(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            InvalidInstance(msg) => write!(fmt, "invalid instance: {}", msg),
            Graph(err) => write!(fmt, "invalid network: {}", err),
            Format(err) => fmt::Display::fmt(err, fmt),
            Infeasible => write!(fmt, "problem is infeasible"),
            Unbounded => write!(fmt, "problem is unbounded"),
            Solver(err) => write!(fmt, "solver failed: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Graph(err) => Some(err),
            Error::Format(err) => Some(err),
            Error::Solver(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// An optimal flow.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Solution<F> {
    /// All arcs of the network in input order with their final flux.
    pub arcs: Vec<Arc<F>>,
    /// The total cost of the flow.
    pub cost: F,
    /// The number of pivots needed.
    pub iterations: usize,
}

impl<F> Solution<F>
where
    F: Zero + Copy,
{
    /// Return the flux on the arc with id `a`.
    ///
    /// # Panics
    ///
    /// If `a` is not an arc of the network.
    pub fn flux(&self, a: ArcId) -> F {
        self.arcs[a].flux
    }

    /// Return the arcs with non-zero flux.
    pub fn used_arcs(&self) -> impl Iterator<Item = &Arc<F>> + '_ {
        self.arcs.iter().filter(|a| !a.flux.is_zero())
    }
}

/// A transportation problem.
#[derive(Clone, Debug)]
pub struct Transport<F> {
    graph: Graph<F>,
    producer: VertexId,
    consumer: VertexId,
    quantity: F,
    pricing: Pricing,
}

impl<F> Transport<F>
where
    F: NumAssign + Signed + PartialOrd + Copy + Debug,
{
    /// Build the network of an instance.
    ///
    /// The producer gets demand `-quantity`, the consumer `+quantity`.
    pub fn load(instance: Instance<F>) -> Result<Self> {
        let n = instance.num_vertices;
        if instance.producer >= n {
            return Err(Error::InvalidInstance(format!(
                "producer {} is not a vertex (must be in 0..{})",
                instance.producer, n
            )));
        }
        if instance.consumer >= n {
            return Err(Error::InvalidInstance(format!(
                "consumer {} is not a vertex (must be in 0..{})",
                instance.consumer, n
            )));
        }
        if instance.quantity < F::zero() {
            return Err(Error::InvalidInstance(format!(
                "negative quantity {:?}",
                instance.quantity
            )));
        }

        let mut graph = Graph::new(n)?;
        for &(u, v, c) in &instance.arcs {
            graph.add_arc(u, v, c)?;
        }
        // nothing to ship if producer and consumer coincide
        if instance.producer != instance.consumer {
            graph.set_demand(instance.producer, -instance.quantity)?;
            graph.set_demand(instance.consumer, instance.quantity)?;
        }

        Ok(Transport {
            graph,
            producer: instance.producer,
            consumer: instance.consumer,
            quantity: instance.quantity,
            pricing: Pricing::FirstEligible,
        })
    }

    pub fn from_reader<R>(r: R) -> Result<Self>
    where
        R: Read,
        F: FromStr,
        F::Err: Display,
    {
        Transport::load(format::read(r)?)
    }

    pub fn from_file(filename: &str) -> Result<Self>
    where
        F: FromStr,
        F::Err: Display,
    {
        Transport::load(format::read_from_file(filename)?)
    }

    /// Use the given pricing rule for solving.
    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn graph(&self) -> &Graph<F> {
        &self.graph
    }

    pub fn producer(&self) -> VertexId {
        self.producer
    }

    pub fn consumer(&self) -> VertexId {
        self.consumer
    }

    pub fn quantity(&self) -> F {
        self.quantity
    }

    /// Compute a cheapest flow.
    ///
    /// The network itself is not modified, so solving again gives the
    /// same result.
    pub fn solve(&self) -> Result<Solution<F>> {
        let mut g = self.graph.clone();

        let (state, iterations) = {
            let mut spx = NetworkSimplex::new(&mut g, self.producer);
            spx.pricing = self.pricing;
            let state = spx.solve()?;
            (state, spx.num_iterations())
        };

        match state {
            SolutionState::Optimal => {
                g.remove_artificial_arcs();
                let cost = g.total_cost();
                info!("Optimal transport of cost {:?} after {} pivots", cost, iterations);
                Ok(Solution {
                    arcs: g.arcs().cloned().collect(),
                    cost,
                    iterations,
                })
            }
            SolutionState::Unbounded => Err(Error::Unbounded),
            SolutionState::Infeasible | SolutionState::Unknown => Err(Error::Infeasible),
        }
    }
}

impl<F> fmt::Display for Transport<F>
where
    F: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        writeln!(
            f,
            "producer: {}, consumer: {}, quantity: {}",
            self.producer, self.consumer, self.quantity
        )?;
        write!(f, "{}", self.graph)
    }
}
