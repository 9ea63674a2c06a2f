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

//! Minimum Cost Flow algorithms.

pub mod simplex;
pub use simplex::{network_simplex, NetworkSimplex, Pricing};

use crate::{graph, tree};
use std::error;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolutionState {
    /// Unknown state, the problem has not been solved, yet
    Unknown,
    /// The problem has been solved to optimality
    Optimal,
    /// The problem is infeasible
    Infeasible,
    /// The problem is unbounded
    Unbounded,
}

/// Fatal failure of the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pivot limit has been reached before optimality.
    PivotLimitExceeded { limit: usize },
    /// The graph has been used incorrectly.
    Graph(graph::Error),
    /// The basis tree has been corrupted.
    Tree(tree::Error),
}

impl From<graph::Error> for Error {
    fn from(err: graph::Error) -> Self {
        Error::Graph(err)
    }
}

impl From<tree::Error> for Error {
    fn from(err: tree::Error) -> Self {
        Error::Tree(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            PivotLimitExceeded { limit } => write!(fmt, "pivot limit of {} exceeded", limit),
            Graph(err) => err.fmt(fmt),
            Tree(err) => write!(fmt, "internal error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Graph(err) => Some(err),
            Error::Tree(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
