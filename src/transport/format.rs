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

//! Reading and writing transportation instances.
//!
//! An instance file starts with a header line
//!
//! ```text
//! <node_count> <producer> <consumer> <quantity>
//! ```
//!
//! followed by one line `<source> <target> <cost>` per arc. Vertices
//! are numbered from 0. Empty lines and lines starting with `c` are
//! comments.
//!
//! A solution file contains a line `s <cost>` and one line
//! `f <source> <target> <flux>` for each arc with non-zero flux.

use super::Solution;
use crate::graph::VertexId;

use num_traits::Zero;
use std::error;
use std::fmt::{self, Display};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::str::{FromStr, SplitWhitespace};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Error when reading an instance or solution file.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Format { line: usize, msg: String },
    Data { line: usize, msg: String },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            Io(err) => err.fmt(fmt),
            Format { line, msg } => write!(fmt, "Format error on line {}: {}", line, msg),
            Data { line, msg } => write!(fmt, "Data error on line {}: {}", line, msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A parsed transportation instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Instance<F> {
    pub num_vertices: usize,
    pub producer: VertexId,
    pub consumer: VertexId,
    /// The amount to be shipped from the producer to the consumer.
    pub quantity: F,
    /// The arcs as `(source, target, cost)`.
    pub arcs: Vec<(VertexId, VertexId, F)>,
}

struct InstanceReader<R: Read> {
    io: BufReader<R>,
    line: String,
    line_number: usize,
}

impl<R: Read> InstanceReader<R> {
    fn new(reader: R) -> Self {
        InstanceReader {
            io: BufReader::new(reader),
            line: String::new(),
            line_number: 0,
        }
    }

    // Return the tokens of the next non-comment line.
    fn read_line(&mut self) -> Result<Option<Tokens>> {
        let line = &mut self.line;
        loop {
            line.clear();
            if self.io.read_line(line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            match line.trim_start().chars().next() {
                None | Some('c') => continue,
                Some(_) => {
                    return Ok(Some(Tokens {
                        it: line.split_whitespace(),
                        line: self.line_number,
                    }))
                }
            }
        }
    }
}

/// Iterates over the tokens in a line.
struct Tokens<'a> {
    it: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn str(&mut self) -> Result<&'a str> {
        self.it.next().ok_or_else(|| Error::Format {
            line: self.line,
            msg: "expected token".to_string(),
        })
    }

    fn number<T>(&mut self) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let line = self.line;
        self.it
            .next()
            .ok_or_else(|| Error::Format {
                line,
                msg: "expected number".to_string(),
            })?
            .parse()
            .map_err(|e| Error::Format {
                line,
                msg: format!("{}", e),
            })
    }

    // Ensures that there is no next token.
    fn end(&mut self) -> Result<()> {
        if let Some(s) = self.it.next() {
            Err(Error::Format {
                line: self.line,
                msg: format!("unexpected token at end of line: {}", s),
            })
        } else {
            Ok(())
        }
    }
}

/// Read an instance.
///
/// Arc end points must be in `0..node_count`; loops are allowed.
/// The producer and consumer are not validated here.
pub fn read<R, F>(r: R) -> Result<Instance<F>>
where
    R: Read,
    F: FromStr,
    F::Err: Display,
{
    let mut reader = InstanceReader::new(r);

    let mut header = reader.read_line()?.ok_or_else(|| Error::Format {
        line: 0,
        msg: "missing header line".to_string(),
    })?;
    let num_vertices: usize = header.number()?;
    let producer = header.number()?;
    let consumer = header.number()?;
    let quantity = header.number()?;
    header.end()?;

    let mut arcs = vec![];
    while let Some(mut toks) = reader.read_line()? {
        let u: usize = toks.number()?;
        let v: usize = toks.number()?;
        let c: F = toks.number()?;
        toks.end()?;

        if u >= num_vertices {
            return Err(Error::Data {
                line: toks.line,
                msg: format!("invalid source vertex {} (must be in 0..{})", u, num_vertices),
            });
        }
        if v >= num_vertices {
            return Err(Error::Data {
                line: toks.line,
                msg: format!("invalid target vertex {} (must be in 0..{})", v, num_vertices),
            });
        }
        arcs.push((u, v, c));
    }

    Ok(Instance {
        num_vertices,
        producer,
        consumer,
        quantity,
        arcs,
    })
}

pub fn read_from_file<F>(filename: &str) -> Result<Instance<F>>
where
    F: FromStr,
    F::Err: Display,
{
    read(std::fs::File::open(filename)?)
}

/// Write an instance.
pub fn write<W, F>(mut w: W, instance: &Instance<F>) -> io::Result<()>
where
    W: Write,
    F: Display,
{
    writeln!(
        w,
        "{} {} {} {}",
        instance.num_vertices, instance.producer, instance.consumer, instance.quantity
    )?;
    for (u, v, c) in &instance.arcs {
        writeln!(w, "{} {} {}", u, v, c)?;
    }
    Ok(())
}

/// Write a solution.
pub fn write_solution<W, F>(mut w: W, solution: &Solution<F>) -> io::Result<()>
where
    W: Write,
    F: Display + Zero + Copy,
{
    writeln!(w, "s {}", solution.cost)?;
    for a in solution.used_arcs() {
        writeln!(w, "f {} {} {}", a.beg, a.end, a.flux)?;
    }
    Ok(())
}

/// Read a solution.
///
/// Returns the cost and the arcs with their flux as `(source, target, flux)`.
pub fn read_solution<R, F>(r: R) -> Result<(F, Vec<(VertexId, VertexId, F)>)>
where
    R: Read,
    F: FromStr,
    F::Err: Display,
{
    let mut reader = InstanceReader::new(r);
    let mut flows = vec![];
    let mut cost = None;

    while let Some(mut toks) = reader.read_line()? {
        match toks.str()? {
            "f" => flows.push((toks.number()?, toks.number()?, toks.number()?)),
            "s" => {
                if cost.is_some() {
                    return Err(Error::Format {
                        line: toks.line,
                        msg: "the solution value must be specified exactly once".to_string(),
                    });
                }
                cost = Some(toks.number()?);
            }
            d => {
                return Err(Error::Format {
                    line: toks.line,
                    msg: format!("unexpected line, expected 's' or 'f', got '{}'", d),
                })
            }
        }
        toks.end()?;
    }

    Ok((
        cost.ok_or_else(|| Error::Format {
            line: reader.line_number,
            msg: "missing solution value".to_string(),
        })?,
        flows,
    ))
}

pub fn read_solution_from_file<F>(filename: &str) -> Result<(F, Vec<(VertexId, VertexId, F)>)>
where
    F: FromStr,
    F::Err: Display,
{
    read_solution(std::fs::File::open(filename)?)
}

#[cfg(test)]
mod tests {
    use super::{read, read_solution, write, write_solution, Error, Instance};
    use crate::graph::Arc;
    use crate::transport::Solution;
    use std::io::Cursor;

    #[test]
    fn parse_instance() {
        let file = "c a small instance

5 0 4 1
0 1 9
0 3 10
  c indented comment
1 2 7
1 3 4
1 4 5

2 4 9
3 1 4
3 4 9
";
        let instance = read::<_, i64>(Cursor::new(file)).unwrap();
        assert_eq!(instance.num_vertices, 5);
        assert_eq!(instance.producer, 0);
        assert_eq!(instance.consumer, 4);
        assert_eq!(instance.quantity, 1);
        assert_eq!(
            instance.arcs,
            vec![
                (0, 1, 9),
                (0, 3, 10),
                (1, 2, 7),
                (1, 3, 4),
                (1, 4, 5),
                (2, 4, 9),
                (3, 1, 4),
                (3, 4, 9)
            ]
        );
    }

    #[test]
    fn parse_loop() {
        let instance = read::<_, i64>(Cursor::new("3 0 2 1\n0 1 1\n2 2 4\n1 2 1\n")).unwrap();
        assert_eq!(instance.arcs, vec![(0, 1, 1), (2, 2, 4), (1, 2, 1)]);
    }

    #[test]
    fn parse_floating_point() {
        let instance = read::<_, f64>(Cursor::new("2 0 1 1.5\n0 1 0.25\n")).unwrap();
        assert_eq!(instance.quantity, 1.5);
        assert_eq!(instance.arcs, vec![(0, 1, 0.25)]);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(read::<_, i64>(Cursor::new("")), Err(Error::Format { line: 0, .. })));
        assert!(matches!(
            read::<_, i64>(Cursor::new("c only a comment\n")),
            Err(Error::Format { .. })
        ));
        assert!(matches!(
            read::<_, i64>(Cursor::new("3 0 2\n")),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            read::<_, i64>(Cursor::new("3 0 2 1 7\n")),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            read::<_, i64>(Cursor::new("3 0 2 1\n0 1\n")),
            Err(Error::Format { line: 2, .. })
        ));
        assert!(matches!(
            read::<_, i64>(Cursor::new("3 0 2 1\n0 1 x\n")),
            Err(Error::Format { line: 2, .. })
        ));
        assert!(matches!(
            read::<_, i64>(Cursor::new("3 0 2 1\n0 1 1\n\n1 3 1\n")),
            Err(Error::Data { line: 4, .. })
        ));
        // negative ids are not numbers of the id type
        assert!(matches!(
            read::<_, i64>(Cursor::new("3 0 2 1\n-1 2 1\n")),
            Err(Error::Format { line: 2, .. })
        ));
    }

    #[test]
    fn write_instance() {
        let instance = Instance {
            num_vertices: 3,
            producer: 0,
            consumer: 2,
            quantity: 4,
            arcs: vec![(0, 1, 2), (1, 2, 3), (0, 2, 7)],
        };
        let mut buf = Cursor::new(Vec::new());
        write(&mut buf, &instance).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert_eq!(text, "3 0 2 4\n0 1 2\n1 2 3\n0 2 7\n");
        assert_eq!(read::<_, i64>(Cursor::new(text)).unwrap(), instance);
    }

    #[test]
    fn write_solution_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let arc = |id, beg, end, cost, flux| Arc {
            id,
            beg,
            end,
            cost,
            flux,
            artificial: false,
        };
        let solution = Solution {
            arcs: vec![arc(0, 0, 1, 2, 4), arc(1, 0, 2, 7, 0), arc(2, 1, 2, 3, 4)],
            cost: 20,
            iterations: 2,
        };

        let mut buf = Cursor::new(Vec::new());
        write_solution(&mut buf, &solution)?;
        let text = String::from_utf8(buf.into_inner())?;
        assert_eq!(text, "s 20\nf 0 1 4\nf 1 2 4\n");

        let (cost, flows) = read_solution::<_, i64>(Cursor::new(text))?;
        assert_eq!(cost, 20);
        assert_eq!(flows, vec![(0, 1, 4), (1, 2, 4)]);

        Ok(())
    }

    #[test]
    fn read_solution_errors() {
        assert!(read_solution::<_, i64>(Cursor::new("f 0 1 2\n")).is_err());
        assert!(read_solution::<_, i64>(Cursor::new("s 1\ns 2\n")).is_err());
        assert!(read_solution::<_, i64>(Cursor::new("s 1\nx 0 1 2\n")).is_err());
    }
}
