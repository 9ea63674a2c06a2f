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

use rs_transport::mcf::Pricing;
use rs_transport::transport::{format, Transport};

use std::error::Error;
use std::io::Write;
use std::result::Result;

use log::debug;
use rustop::opts;
use time::OffsetDateTime;

struct Options {
    file: String,
    verbose: bool,
    output: Option<String>,
    pricing: Pricing,
}

fn run(opts: &Options) -> Result<(), Box<dyn Error>> {
    let tstart = OffsetDateTime::now_utc();
    let transport = Transport::<i64>::from_file(&opts.file)?.with_pricing(opts.pricing);
    let tend = OffsetDateTime::now_utc();

    println!("Instance            : {}", opts.file);
    println!("Read Time (seconds) : {}", (tend - tstart).as_seconds_f64());
    println!("Number of nodes     : {}", transport.graph().num_vertices());
    println!("Number of arcs      : {}", transport.graph().num_arcs());
    println!("Producer            : {}", transport.producer());
    println!("Consumer            : {}", transport.consumer());
    println!("Quantity            : {}", transport.quantity());

    if opts.verbose {
        println!();
        print!("{}", transport);
    }

    let tstart = OffsetDateTime::now_utc();
    let solution = transport.solve()?;
    let tend = OffsetDateTime::now_utc();
    let soltime = (tend - tstart).as_seconds_f64();

    println!();
    println!("Value               : {}", solution.cost);
    println!("Time (seconds)      : {:.2}", soltime);
    println!("Iterations (total)  : {}", solution.iterations);

    if opts.verbose {
        println!();
        for a in &solution.arcs {
            println!("flux({} -> {}) = {}", a.beg, a.end, a.flux);
        }
    }

    if let Some(ref output) = opts.output {
        println!();
        println!("Write solution to   : {}", output);
        let f = &mut std::fs::File::create(output)?;
        writeln!(f, "c Solved with a primal network simplex")?;
        writeln!(f, "c instance            : {}", opts.file)?;
        writeln!(f, "c solution time       : {:.2} seconds", soltime)?;
        writeln!(f, "c number of iterations: {}", solution.iterations)?;
        format::write_solution(f, &solution)?;
    } else {
        println!();
        format::write_solution(std::io::stdout().lock(), &solution)?;
    }

    Ok(())
}

fn main() {
    let (args, _) = opts! {
        synopsis "Solve a transportation problem with a network simplex algorithm.";
        param file:String, desc:"Instance file name";
        opt verbose:bool, short:'v', desc:"Print the network and the flux of every arc";
        opt output:Option<String>, short:'o', desc:"Write the solution to this file";
        opt dantzig:bool, desc:"Dantzig's rule pricing (most negative)";
        opt block:bool, desc:"Block pricing";
    }
    .parse_or_exit();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let pricing = if args.dantzig {
        Pricing::Dantzig
    } else if args.block {
        Pricing::Block
    } else {
        Pricing::FirstEligible
    };
    debug!("Using {:?} pricing", pricing);

    let opts = Options {
        file: args.file,
        verbose: args.verbose,
        output: args.output,
        pricing,
    };

    if let Err(err) = run(&opts) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
