// Copyright (c) 2015-2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//#![forbid(unsafe_code)]

//! Single-commodity transportation problems solved by a primal network
//! simplex algorithm.
//!
//! The crate consists of a small network model ([`graph`]), rooted
//! spanning trees with fundamental cycles ([`tree`]), the two-phase
//! network simplex itself ([`mcf`]) and the transportation problem on
//! top of it ([`transport`]).

// # Data structures

pub mod graph;
pub use self::graph::{ArcId, Graph, VertexId};

pub mod tree;
pub use self::tree::SpanningTree;

// # Algorithms

pub mod mcf;
pub use self::mcf::{network_simplex, NetworkSimplex, Pricing, SolutionState};

pub mod transport;
pub use self::transport::{Solution, Transport};
