use crate::sat::formula::clause::{ClauseDb, ClauseRef};
use crate::sat::formula::{Lit, Var, VarMap};
use super::assignment::{Assignment, ROOT_LEVEL};


/// Outcome of first-UIP conflict analysis.
pub enum Conflict {
    /// The learnt clause is a unit; backtrack to ROOT_LEVEL and assert it.
    Unit(Lit),
    /// Learnt clause together with its backtrack level. The asserting literal
    /// sits at position 0, a literal from the backtrack level at position 1.
    Learned(usize, Vec<Lit>),
}


pub struct AnalyzeContext {
    seen: VarMap<bool>,
}

impl AnalyzeContext {
    pub fn new() -> AnalyzeContext {
        AnalyzeContext { seen: VarMap::new() }
    }

    pub fn init_var(&mut self, v: Var) {
        self.seen.insert(&v, false);
    }

    // Description:
    //   Walks the implication graph backwards from the conflicting clause,
    //   resolving on current-level literals until only the first UIP remains.
    //
    //   Pre-conditions:
    //     * Current decision level is above ROOT_LEVEL.
    //     * The `seen` map is all-false.
    //
    //   Post-conditions:
    //     * learnt[0] is the asserting literal.
    //     * If learnt.len() > 1 then learnt[1] carries the greatest decision
    //       level of the remaining literals.
    //     * The `seen` map is all-false again.
    pub fn analyze(&mut self, db: &ClauseDb, assigns: &Assignment, confl0: ClauseRef) -> Conflict {
        debug_assert!(assigns.current_level() > ROOT_LEVEL);

        let mut learnt = Vec::new();
        let trail = assigns.trail();
        let mut index = trail.len();
        let mut to_resolve = 0;
        let mut confl = confl0;

        loop {
            // Position 0 of a reason clause is the literal it propagated,
            // which is the UIP candidate just resolved away.
            let base = if confl == confl0 { 0 } else { 1 };
            for &q in &db.view(confl).lits()[base..] {
                let v = q.var();
                if !self.seen[&v] && assigns.level(v) > ROOT_LEVEL {
                    self.seen[&v] = true;
                    if assigns.level(v) >= assigns.current_level() {
                        to_resolve += 1;
                    } else {
                        learnt.push(q);
                    }
                }
            }

            // The next marked literal down the trail is the UIP candidate.
            let uip = {
                loop {
                    index -= 1;
                    if self.seen[&trail[index].var()] {
                        break;
                    }
                }
                trail[index]
            };
            self.seen[&uip.var()] = false;
            to_resolve -= 1;

            if to_resolve == 0 {
                learnt.insert(0, !uip);
                break;
            }
            confl = assigns.cause(uip.var()).unwrap();
        }

        for &lit in learnt.iter() {
            self.seen[&lit.var()] = false;
        }

        if learnt.len() == 1 {
            Conflict::Unit(learnt[0])
        } else {
            // The second watch must carry the deepest remaining level so the
            // clause is asserting right after backtracking there.
            let mut max_i = 1;
            let mut max_level = assigns.level(learnt[1].var());
            for i in 2..learnt.len() {
                let level = assigns.level(learnt[i].var());
                if level > max_level {
                    max_i = i;
                    max_level = level;
                }
            }
            learnt.swap(1, max_i);
            Conflict::Learned(max_level, learnt)
        }
    }
}
