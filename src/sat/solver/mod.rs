use crate::sat::formula::clause::{ClauseDb, ClauseRef};
use crate::sat::formula::{Lit, Value, Var, VarHeap};
use crate::sat::Stats;
use self::assignment::Assignment;
use self::conflict::{AnalyzeContext, Conflict};
use self::watches::Watches;

pub use self::assignment::ROOT_LEVEL;

mod assignment;
mod conflict;
mod watches;


/// A CDCL solver instance: clause arena, trail, watch index and decision
/// queue, all owned together.
pub struct Solver {
    db: ClauseDb,
    assigns: Assignment,
    watches: Watches,
    order: VarHeap, // unassigned variables, smallest id first
    analyze: AnalyzeContext,
    empty_clause: bool,
    decisions: u64,
    conflicts: u64,
    learnt_clauses: u64,
}

impl Solver {
    pub fn new() -> Solver {
        Solver {
            db: ClauseDb::new(),
            assigns: Assignment::new(),
            watches: Watches::new(),
            order: VarHeap::new(),
            analyze: AnalyzeContext::new(),
            empty_clause: false,
            decisions: 0,
            conflicts: 0,
            learnt_clauses: 0,
        }
    }

    #[inline]
    pub fn number_of_vars(&self) -> usize {
        self.assigns.number_of_vars()
    }

    #[inline]
    pub fn number_of_clauses(&self) -> usize {
        self.db.len()
    }

    pub fn new_var(&mut self) -> Var {
        let v = self.assigns.new_var();
        self.watches.init_var(v);
        self.analyze.init_var(v);
        self.order.insert(v);
        v
    }

    /// Adds a clause, normalizing it (sort + dedup) first. An empty clause
    /// marks the whole formula unsatisfiable; a unit is enqueued directly and
    /// propagated by the next solve() call.
    pub fn add_clause(&mut self, clause: &[Lit]) {
        let mut lits = clause.to_vec();
        lits.sort();
        lits.dedup();

        match lits.len() {
            0 => {
                self.empty_clause = true;
            }
            1 => {
                self.add_unit(lits[0]);
            }
            _ => {
                self.attach_clause(lits.into_boxed_slice());
            }
        }
    }

    fn add_unit(&mut self, lit: Lit) {
        if self.assigns.is_falsified(lit) {
            self.empty_clause = true;
        } else if !self.assigns.is_satisfied(lit) {
            self.assigns.assign_lit(lit, None);
        }
    }

    fn attach_clause(&mut self, lits: Box<[Lit]>) -> ClauseRef {
        let cr = self.db.add(lits);
        self.watches.watch_clause(self.db.view(cr), cr);
        cr
    }

    /// Pops the heap minimum until an unassigned variable turns up; variables
    /// that got assigned while queued are simply discarded.
    fn select_var(&mut self) -> Option<Var> {
        while let Some(v) = self.order.pop() {
            if self.assigns.is_undef(v) {
                return Some(v);
            }
        }
        None
    }

    pub fn propagate(&mut self) -> Option<ClauseRef> {
        self.watches.propagate(&mut self.db, &mut self.assigns)
    }

    pub fn backtrack(&mut self, level: usize) {
        let order = &mut self.order;
        self.assigns.rewind_to_level(level, |v| {
            order.insert(v);
        });
    }

    /// The CDCL search loop: propagate to quiescence, then either resolve the
    /// conflict or open a new decision level on the smallest unassigned
    /// variable, trying FALSE first. Returns true iff a model was found.
    pub fn solve(&mut self) -> bool {
        if self.empty_clause {
            return false;
        }
        loop {
            if let Some(confl) = self.propagate() {
                self.conflicts += 1;
                if self.assigns.current_level() == ROOT_LEVEL {
                    return false;
                }
                match self.analyze.analyze(&self.db, &self.assigns, confl) {
                    Conflict::Unit(lit) => {
                        trace!("learnt unit {:?}", lit);
                        self.backtrack(ROOT_LEVEL);
                        debug_assert!(self.assigns.is_undef(lit.var()));
                        self.assigns.assign_lit(lit, None);
                    }

                    Conflict::Learned(level, lits) => {
                        trace!("learnt {:?}, backtracking to level {}", lits, level);
                        self.backtrack(level);
                        debug_assert!(self.assigns.is_undef(lits[0].var()));
                        debug_assert!(lits[1..].iter().all(|&lit| self.assigns.is_falsified(lit)));
                        let asserting = lits[0];
                        let cr = self.attach_clause(lits.into_boxed_slice());
                        self.learnt_clauses += 1;
                        self.assigns.assign_lit(asserting, Some(cr));
                    }
                }
            } else {
                debug_assert!(self.watches_consistent());
                match self.select_var() {
                    None => {
                        debug_assert!(self.model_satisfies_db());
                        return true;
                    }

                    Some(v) => {
                        self.decisions += 1;
                        self.assigns.new_level();
                        self.assigns.assign_lit(v.neg_lit(), None);
                    }
                }
            }
        }
    }

    /// Blocks the current model by adding its negation, then rewinds the
    /// propagation cursor so that the next solve() call refutes the model and
    /// searches on.
    pub fn block_model(&mut self) {
        let lits: Vec<Lit> = (0..self.number_of_vars())
            .map(Var::from_index)
            .filter(|&v| !self.assigns.is_undef(v))
            .map(|v| v.lit(self.assigns.value_of(v) == Value::True))
            .collect();

        match lits.len() {
            0 => {
                self.empty_clause = true;
            }
            1 => {
                // A unit blocker cannot be enqueued while its negation is
                // still assigned above the root.
                if self.assigns.current_level() > ROOT_LEVEL {
                    self.backtrack(ROOT_LEVEL);
                }
                self.add_unit(lits[0]);
            }
            _ => {
                self.attach_clause(lits.into_boxed_slice());
                self.assigns.requeue_all();
            }
        }
    }

    #[inline]
    pub fn value_of(&self, v: Var) -> Value {
        self.assigns.value_of(v)
    }

    /// The literals satisfied by the current model, one per assigned variable.
    pub fn model(&self) -> Vec<Lit> {
        (0..self.number_of_vars())
            .map(Var::from_index)
            .filter_map(|v| match self.assigns.value_of(v) {
                Value::Undef => None,
                Value::True => Some(v.pos_lit()),
                Value::False => Some(v.neg_lit()),
            })
            .collect()
    }

    /// Registers a purely observational callback fired on every trail append
    /// with the literal (as a signed DIMACS integer) and its decision level.
    pub fn set_enqueue_hook(&mut self, hook: Box<dyn FnMut(i32, usize)>) {
        self.assigns.set_enqueue_hook(hook);
    }

    pub fn stats(&self) -> Stats {
        Stats {
            decisions: self.decisions,
            conflicts: self.conflicts,
            propagations: self.watches.propagations,
            learnt_clauses: self.learnt_clauses,
        }
    }

    fn watches_consistent(&self) -> bool {
        self.db.refs().all(|cr| {
            let c = self.db.view(cr);
            self.watches.is_watching(c[0], cr)
                && self.watches.is_watching(c[1], cr)
                && (!self.assigns.is_falsified(c[0]) || !self.assigns.is_falsified(c[1]))
        })
    }

    fn model_satisfies_db(&self) -> bool {
        self.db.refs().all(|cr| {
            self.db
                .view(cr)
                .lits()
                .iter()
                .any(|&lit| self.assigns.is_satisfied(lit))
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn lits(ids: &[i32]) -> Vec<Lit> {
        ids.iter().map(|&id| Lit::from_dimacs(id)).collect()
    }

    #[test]
    fn test_analyze_learns_first_uip() {
        let mut solver = Solver::new();
        for _ in 0..4 {
            solver.new_var();
        }
        solver.add_clause(&lits(&[1, 2, 3]));
        solver.add_clause(&lits(&[1, -3, 4]));
        solver.add_clause(&lits(&[-3, -4]));

        // ¬x1 at level 2, ¬x2 at level 3; propagation forces x3 and x4 and
        // runs into (¬3 ∨ ¬4). The first UIP is x3.
        solver.assigns.new_level();
        solver.assigns.assign_lit(Lit::from_dimacs(-1), None);
        assert!(solver.propagate().is_none());
        solver.assigns.new_level();
        solver.assigns.assign_lit(Lit::from_dimacs(-2), None);
        let confl = solver.propagate().expect("conflict");

        match solver.analyze.analyze(&solver.db, &solver.assigns, confl) {
            Conflict::Learned(level, learnt) => {
                assert_eq!(level, 2);
                assert_eq!(learnt, lits(&[-3, 1]));
                // Exactly one literal from the conflict level, in front.
                let current: Vec<&Lit> = learnt
                    .iter()
                    .filter(|lit| solver.assigns.level(lit.var()) == 3)
                    .collect();
                assert_eq!(current, vec![&learnt[0]]);
            }
            _ => panic!("expected a learnt clause"),
        }
    }

    #[test]
    fn test_analyze_learns_unit() {
        let mut solver = Solver::new();
        for _ in 0..2 {
            solver.new_var();
        }
        solver.add_clause(&lits(&[1, 2]));
        solver.add_clause(&lits(&[1, -2]));

        solver.assigns.new_level();
        solver.assigns.assign_lit(Lit::from_dimacs(-1), None);
        let confl = solver.propagate().expect("conflict");

        match solver.analyze.analyze(&solver.db, &solver.assigns, confl) {
            Conflict::Unit(lit) => assert_eq!(lit, Lit::from_dimacs(1)),
            _ => panic!("expected a learnt unit"),
        }
    }
}
