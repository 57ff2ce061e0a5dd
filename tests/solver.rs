use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Write;
use std::rc::Rc;

use flate2::write::GzEncoder;
use flate2::Compression;

use cdcl_sat::sat::dimacs;
use cdcl_sat::sat::formula::Lit;
use cdcl_sat::sat::solver::Solver;


fn solver_from(text: &str) -> (Solver, usize) {
    let mut solver = Solver::new();
    let n_vars = dimacs::parse(&mut text.as_bytes(), &mut solver).expect("parse failed");
    (solver, n_vars)
}

fn model_of(solver: &Solver) -> Vec<i32> {
    solver.model().iter().map(|lit| lit.to_dimacs()).collect()
}

fn enumerate_models(text: &str) -> Vec<Vec<i32>> {
    let (mut solver, _) = solver_from(text);
    let mut models = Vec::new();
    while solver.solve() {
        models.push(model_of(&solver));
        assert!(models.len() <= 64, "enumeration does not converge");
        solver.block_model();
    }
    models
}


#[test]
fn single_unit_is_sat() {
    let (mut solver, _) = solver_from("p cnf 1 1\n1 0\n");
    assert!(solver.solve());
    assert_eq!(model_of(&solver), vec![1]);
}

#[test]
fn contradictory_units_are_unsat() {
    let (mut solver, _) = solver_from("p cnf 1 2\n1 0\n-1 0\n");
    assert!(!solver.solve());
}

#[test]
fn chain_formula_is_sat_and_sound() {
    let text = "p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n";
    let (mut solver, _) = solver_from(text);
    assert!(solver.solve());

    let ok = dimacs::validate_model(&mut text.as_bytes(), &solver.model()).unwrap();
    assert!(ok, "model {:?} violates a clause", model_of(&solver));
}

#[test]
fn all_sign_combinations_are_unsat() {
    let (mut solver, _) = solver_from("p cnf 2 4\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n");
    assert!(!solver.solve());

    let stats = solver.stats();
    assert!(stats.conflicts > 0);
    assert!(stats.decisions > 0);
    assert!(stats.propagations > 0);
}

#[test]
fn empty_clause_is_unsat() {
    let (mut solver, _) = solver_from("p cnf 0 1\n0\n");
    assert!(!solver.solve());
}

#[test]
fn decisions_are_false_first_in_id_order() {
    let (mut solver, _) = solver_from("p cnf 2 1\n1 2 0\n");
    assert!(solver.solve());
    // Deciding x1 = false makes the clause unit on x2.
    assert_eq!(model_of(&solver), vec![-1, 2]);
}

#[test]
fn tautological_clause_is_kept_and_sat() {
    let (mut solver, _) = solver_from("p cnf 1 1\n1 -1 0\n");
    assert_eq!(solver.number_of_clauses(), 1);
    assert!(solver.solve());
}

#[test]
fn duplicate_literals_are_removed() {
    let mut solver = Solver::new();
    solver.new_var();
    solver.new_var();
    solver.add_clause(&[
        Lit::from_dimacs(1),
        Lit::from_dimacs(2),
        Lit::from_dimacs(1),
        Lit::from_dimacs(2),
    ]);

    assert_eq!(solver.number_of_clauses(), 1);
    assert!(solver.solve());
}

#[test]
fn comments_are_skipped_everywhere() {
    let text = "c problem description\nc more text\np cnf 2 2\nc between clauses\n1 2 0\nc and again\n-1 2 0\n";
    let (mut solver, n_vars) = solver_from(text);
    assert_eq!(n_vars, 2);
    assert!(solver.solve());
    assert!(dimacs::validate_model(&mut text.as_bytes(), &solver.model()).unwrap());
}

#[test]
fn enumeration_finds_every_model_once() {
    let models = enumerate_models("p cnf 2 1\n1 2 0\n");

    let expected: HashSet<Vec<i32>> =
        vec![vec![-1, 2], vec![1, -2], vec![1, 2]].into_iter().collect();
    let found: HashSet<Vec<i32>> = models.iter().cloned().collect();
    assert_eq!(models.len(), 3, "duplicated or missing model in {:?}", models);
    assert_eq!(found, expected);
}

#[test]
fn enumeration_over_free_variables_counts_all_assignments() {
    let models = enumerate_models("p cnf 2 0\n");
    assert_eq!(models.len(), 4);
    assert_eq!(models.iter().collect::<HashSet<_>>().len(), 4);
}

#[test]
fn enumeration_with_single_variable() {
    // The blocking clause degenerates to a unit here.
    assert_eq!(enumerate_models("p cnf 1 1\n1 0\n"), vec![vec![1]]);
    assert_eq!(enumerate_models("p cnf 1 0\n").len(), 2);
}

#[test]
fn root_units_are_propagated_at_level_one() {
    let mut solver = Solver::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    solver.set_enqueue_hook(Box::new(move |lit, level| {
        sink.borrow_mut().push((lit, level));
    }));

    let text = "p cnf 3 3\n1 0\n-1 2 0\n-2 3 0\n";
    dimacs::parse(&mut text.as_bytes(), &mut solver).unwrap();
    assert!(solver.solve());

    assert_eq!(*events.borrow(), vec![(1, 1), (2, 1), (3, 1)]);
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn first_uip_clause_is_asserting_after_backtrack() {
    // Deciding ¬x1 then ¬x2 forces x3 and x4 and runs (¬3 ∨ ¬4) into a
    // conflict whose only level-3 implication-graph cut point is x3. The
    // learnt clause (¬3 ∨ 1) therefore asserts ¬x3 right after backtracking
    // to level 2, where x1 is the sole remaining lower-level literal.
    let mut solver = Solver::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    solver.set_enqueue_hook(Box::new(move |lit, level| {
        sink.borrow_mut().push((lit, level));
    }));

    let text = "p cnf 4 3\n1 2 3 0\n1 -3 4 0\n-3 -4 0\n";
    dimacs::parse(&mut text.as_bytes(), &mut solver).unwrap();
    assert!(solver.solve());

    assert_eq!(
        *events.borrow(),
        vec![
            (-1, 2), // decision
            (-2, 3), // decision
            (3, 3),  // forced by (1 ∨ 2 ∨ 3)
            (4, 3),  // forced by (1 ∨ ¬3 ∨ 4), conflicts with (¬3 ∨ ¬4)
            (-3, 2), // asserting literal of the learnt clause
            (2, 2),  // forced by (1 ∨ 2 ∨ 3) again
            (-4, 3), // decision
        ]
    );
    assert_eq!(model_of(&solver), vec![-1, 2, -3, -4]);
    assert_eq!(solver.stats().conflicts, 1);
    assert_eq!(solver.stats().learnt_clauses, 1);
}

#[test]
fn learnt_unit_jumps_back_to_root() {
    // Deciding ¬x1 forces both x2 and ¬x2, so analysis learns the unit x1:
    // the solver must return to the root level and keep going from there.
    let mut solver = Solver::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    solver.set_enqueue_hook(Box::new(move |lit, level| {
        sink.borrow_mut().push((lit, level));
    }));

    let text = "p cnf 2 3\n1 2 0\n1 -2 0\n-1 2 0\n";
    dimacs::parse(&mut text.as_bytes(), &mut solver).unwrap();
    assert!(solver.solve());

    let events = events.borrow();
    // The first decision ¬x1 forces x2 and ¬x2, and the learnt unit x1 lands
    // on the root level.
    assert_eq!(events[0], (-1, 2));
    assert!(events.contains(&(1, 1)));
    assert_eq!(model_of(&solver), vec![1, 2]);
}

#[test]
fn validate_model_rejects_violating_assignment() {
    let text = "p cnf 2 2\n1 0\n2 0\n";
    let model = vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)];
    assert!(!dimacs::validate_model(&mut text.as_bytes(), &model).unwrap());
}

#[test]
fn parse_rejects_missing_header() {
    let mut solver = Solver::new();
    let err = dimacs::parse(&mut "1 2 0\n".as_bytes(), &mut solver).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("header"), "unexpected message: {}", err);
}

#[test]
fn parse_rejects_out_of_range_literal() {
    let mut solver = Solver::new();
    let err = dimacs::parse(&mut "p cnf 2 1\n3 0\n".as_bytes(), &mut solver).unwrap_err();
    assert!(err.to_string().contains("out of range"), "unexpected message: {}", err);
}

#[test]
fn parse_rejects_unterminated_clause() {
    let mut solver = Solver::new();
    let err = dimacs::parse(&mut "p cnf 2 1\n1 2\n".as_bytes(), &mut solver).unwrap_err();
    assert!(err.to_string().contains("terminated"), "unexpected message: {}", err);
}

#[test]
fn parse_file_reads_gzipped_input() {
    let tmp = tempfile::Builder::new()
        .suffix(".cnf.gz")
        .tempfile()
        .expect("temp file");
    {
        let mut encoder = GzEncoder::new(tmp.as_file(), Compression::default());
        encoder.write_all(b"p cnf 2 2\n1 2 0\n-1 2 0\n").unwrap();
        encoder.finish().unwrap();
    }

    let mut solver = Solver::new();
    let n_vars = dimacs::parse_file(tmp.path(), &mut solver).expect("gz parse failed");
    assert_eq!(n_vars, 2);
    assert!(solver.solve());
}

#[test]
fn parse_file_reports_missing_file() {
    let mut solver = Solver::new();
    assert!(dimacs::parse_file("no-such-file.cnf", &mut solver).is_err());
}
