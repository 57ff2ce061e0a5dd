#[macro_use]
extern crate log;

use std::{io, path};

use crate::sat::dimacs;
use crate::sat::formula::{Value, Var};
use crate::sat::solver::Solver;
use crate::sat::Stats;

pub mod sat;


pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));


pub struct RunOptions {
    pub enumerate: bool,
    pub in_path: path::PathBuf,
}


/// Parses the input, solves it and prints the outcome to stdout; with
/// `enumerate` set, keeps blocking found models until the formula becomes
/// unsatisfiable.
pub fn run(options: &RunOptions) -> io::Result<()> {
    let mut solver = Solver::new();
    let n_vars = dimacs::parse_file(&options.in_path, &mut solver)?;

    info!("|  Number of variables:  {:12}  |", solver.number_of_vars());
    info!("|  Number of clauses:    {:12}  |", solver.number_of_clauses());

    loop {
        let start = time::precise_time_s();
        let sat = solver.solve();
        let elapsed = time::precise_time_s() - start;

        print_stats(&solver.stats(), elapsed);
        println!(
            "{} (in {:.6} s, {})",
            if sat { "SATISFIABLE" } else { "UNSATISFIABLE" },
            elapsed,
            VERSION
        );

        if !sat {
            return Ok(());
        }

        print_model(&solver, n_vars);
        assert!(
            dimacs::validate_model_file(&options.in_path, &solver.model())?,
            "SELF-CHECK FAILED"
        );

        if !options.enumerate {
            return Ok(());
        }
        solver.block_model();
    }
}

fn print_model(solver: &Solver, n_vars: usize) {
    for index in 0..n_vars {
        match solver.value_of(Var::from_index(index)) {
            Value::True => print!("{} ", index + 1),
            Value::False => print!("-{} ", index + 1),
            Value::Undef => print!("!!{}!! ", index + 1),
        }
    }
    println!("0");
}

fn print_stats(stats: &Stats, cpu_time: f64) {
    info!("decisions             : {:<12}   ({:.0} /sec)", stats.decisions, (stats.decisions as f64) / cpu_time);
    info!("conflicts             : {:<12}   ({:.0} /sec)", stats.conflicts, (stats.conflicts as f64) / cpu_time);
    info!("propagations          : {:<12}   ({:.0} /sec)", stats.propagations, (stats.propagations as f64) / cpu_time);
    info!("learnt clauses        : {:<12}", stats.learnt_clauses);
    info!("CPU time              : {} s", cpu_time);
}
