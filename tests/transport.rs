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

use std::collections::HashMap;
use std::error::Error;
use std::fs::read_dir;
use std::io::Cursor;
use std::path::Path;

use rs_transport::mcf::Pricing;
use rs_transport::transport::{self, format, Solution, Transport};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

type Flows = Vec<(usize, usize, i64)>;

fn sorted_flows(solution: &Solution<i64>) -> Flows {
    let mut flows: Flows = solution.used_arcs().map(|a| (a.beg, a.end, a.flux)).collect();
    flows.sort();
    flows
}

fn check_conservation(t: &Transport<i64>, solution: &Solution<i64>) {
    let g = t.graph();
    let mut inflow = vec![0; g.num_vertices()];
    for a in &solution.arcs {
        assert!(a.flux >= 0);
        assert!(!a.artificial);
        inflow[a.end] += a.flux;
        inflow[a.beg] -= a.flux;
    }
    for u in g.vertices() {
        assert_eq!(inflow[u.id], u.demand, "conservation violated at vertex {}", u.id);
    }
    assert_eq!(
        solution.cost,
        solution.arcs.iter().map(|a| a.cost * a.flux).sum::<i64>()
    );
}

#[test]
fn test_instances() -> Result<(), Box<dyn Error>> {
    let mut solutions = HashMap::new();

    for entry in read_dir(Path::new("tests/transport"))? {
        let entry = entry?;
        if entry.path().extension().map(|ext| ext == "sol").unwrap_or(false) {
            let (value, mut flows) = format::read_solution_from_file::<i64>(&entry.path().to_string_lossy())?;
            flows.sort();
            if let Some(file_stem) = entry.path().file_stem().map(|s| s.to_string_lossy().to_string()) {
                solutions.insert(file_stem, (value, flows));
            }
        }
    }

    let mut ninstances = 0;
    for entry in read_dir(Path::new("tests/transport"))? {
        let entry = entry?;
        if entry.path().extension().map(|ext| ext == "dat").unwrap_or(false) {
            let t = Transport::<i64>::from_file(&entry.path().to_string_lossy())?;

            for &pricing in &[Pricing::FirstEligible, Pricing::Dantzig, Pricing::Block] {
                let solution = t.clone().with_pricing(pricing).solve()?;
                check_conservation(&t, &solution);

                if let Some((value, flows)) = entry
                    .path()
                    .file_name()
                    .and_then(|s| solutions.get(s.to_string_lossy().as_ref()))
                {
                    assert_eq!(*value, solution.cost, "{:?} with {:?}", entry.path(), pricing);
                    assert_eq!(*flows, sorted_flows(&solution), "{:?} with {:?}", entry.path(), pricing);
                } else {
                    panic!("Can't find solution file for {:?}", entry.path());
                }
            }
            ninstances += 1;
        }
    }
    assert_eq!(ninstances, 3);

    Ok(())
}

#[test]
fn test_idempotence() -> Result<(), Box<dyn Error>> {
    let t = Transport::<i64>::from_file("tests/transport/chain.dat")?;
    let first = t.solve()?;
    let second = t.solve()?;
    assert_eq!(first, second);

    // the written solution reads back the same
    let mut buf = Cursor::new(Vec::new());
    format::write_solution(&mut buf, &first)?;
    let (value, mut flows) = format::read_solution::<_, i64>(Cursor::new(buf.into_inner()))?;
    flows.sort();
    assert_eq!(value, first.cost);
    assert_eq!(flows, sorted_flows(&first));

    Ok(())
}

#[test]
fn test_scaled_quantity() -> Result<(), Box<dyn Error>> {
    let mut instance = format::read_from_file::<i64>("tests/transport/known.dat")?;
    for q in 0..5 {
        instance.quantity = q;
        let solution = Transport::load(instance.clone())?.solve()?;
        assert_eq!(solution.cost, 14 * q);
        if q == 0 {
            assert_eq!(solution.used_arcs().count(), 0);
        }
    }
    Ok(())
}

#[test]
fn test_disconnected() -> Result<(), Box<dyn Error>> {
    let mut instance = format::read_from_file::<i64>("tests/transport/detached.dat")?;
    instance.consumer = 6;
    let t = Transport::load(instance.clone())?;
    assert!(matches!(t.solve(), Err(transport::Error::Infeasible)));

    instance.quantity = 0;
    let solution = Transport::load(instance)?.solve()?;
    assert_eq!(solution.cost, 0);
    assert!(solution.arcs.iter().all(|a| a.flux == 0));

    Ok(())
}

// Shortest path distances from `s` (Bellman-Ford).
fn distances(n: usize, arcs: &[(usize, usize, i64)], s: usize) -> Vec<Option<i64>> {
    let mut dist = vec![None; n];
    dist[s] = Some(0);
    for _ in 0..n {
        for &(u, v, c) in arcs {
            if let Some(d) = dist[u] {
                if dist[v].map(|e| d + c < e).unwrap_or(true) {
                    dist[v] = Some(d + c);
                }
            }
        }
    }
    dist
}

#[test]
fn test_random_instances() -> Result<(), Box<dyn Error>> {
    let mut rng = Xoshiro256StarStar::seed_from_u64(4_242_424);

    for _ in 0..200 {
        let n = rng.gen_range(1..25);
        let m = rng.gen_range(0..4 * n);
        let mut arcs = Vec::with_capacity(m);
        for _ in 0..m {
            let u = rng.gen_range(0..n);
            let v = rng.gen_range(0..n);
            if u != v {
                arcs.push((u, v, rng.gen_range(0..20)));
            }
        }

        let producer = rng.gen_range(0..n);
        let consumer = rng.gen_range(0..n);
        let quantity = rng.gen_range(0..10);
        let instance = format::Instance {
            num_vertices: n,
            producer,
            consumer,
            quantity,
            arcs: arcs.clone(),
        };

        let pricing = match rng.gen_range(0..3) {
            0 => Pricing::FirstEligible,
            1 => Pricing::Dantzig,
            _ => Pricing::Block,
        };
        let t = Transport::load(instance)?.with_pricing(pricing);
        let dist = distances(n, &arcs, producer);

        match (t.solve(), dist[consumer]) {
            (Ok(solution), Some(d)) => {
                check_conservation(&t, &solution);
                if producer == consumer {
                    assert_eq!(solution.cost, 0);
                } else {
                    assert_eq!(solution.cost, quantity * d, "{:?} pricing", pricing);
                }
            }
            (Ok(solution), None) => {
                assert_eq!(quantity, 0);
                assert_eq!(solution.cost, 0);
            }
            (Err(transport::Error::Infeasible), None) => assert!(quantity > 0),
            (result, d) => panic!("unexpected result {:?} (distance {:?})", result, d),
        }
    }

    Ok(())
}
