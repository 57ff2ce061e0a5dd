use std::mem;

use crate::sat::formula::clause::{Clause, ClauseDb, ClauseRef};
use crate::sat::formula::{Lit, LitVec, Var};
use super::assignment::Assignment;


/// For every literal, the clauses currently holding it in a watched position.
pub struct Watches {
    lines: LitVec<Vec<ClauseRef>>,
    pub propagations: u64,
}

impl Watches {
    pub fn new() -> Watches {
        Watches {
            lines: LitVec::new(),
            propagations: 0,
        }
    }

    pub fn init_var(&mut self, v: Var) {
        self.lines.init(v.pos_lit());
        self.lines.init(v.neg_lit());
    }

    pub fn watch_clause(&mut self, c: &Clause, cr: ClauseRef) {
        debug_assert!(c.len() > 1);
        self.lines[c[0]].push(cr);
        self.lines[c[1]].push(cr);
    }

    pub fn is_watching(&self, lit: Lit, cr: ClauseRef) -> bool {
        self.lines[lit].iter().any(|&watcher| watcher == cr)
    }

    // Description:
    //   Propagates all enqueued facts in trail order. On a conflict the rest
    //   of the queue is abandoned and the conflicting clause is returned.
    //
    //   Post-conditions:
    //     * the propagation queue is empty, even if there was a conflict.
    pub fn propagate(&mut self, db: &mut ClauseDb, assigns: &mut Assignment) -> Option<ClauseRef> {
        let mut conflict = None;
        while let Some(lit) = assigns.dequeue() {
            self.propagations += 1;
            conflict = self.propagate_lit(lit, db, assigns);
            if conflict.is_some() {
                break;
            }
        }
        conflict
    }

    fn propagate_lit(&mut self, x: Lit, db: &mut ClauseDb, assigns: &mut Assignment) -> Option<ClauseRef> {
        let fx = !x;
        let mut ws = mem::replace(&mut self.lines[fx], Vec::new());
        let mut end = ws.len();
        let mut conflict = None;

        let mut i = 0;
        while i < end {
            let cr = ws[i];
            let c = db.edit(cr);

            // Make c[1] the freshly falsified watch.
            if c[0] == fx {
                c.swap(0, 1);
            }
            debug_assert_eq!(c[1], fx);

            if assigns.is_satisfied(c[0]) {
                i += 1;
                continue;
            }

            // Look for a replacement watch among the tail literals.
            if let Some(k) = (2..c.len()).find(|&k| !assigns.is_falsified(c[k])) {
                c.swap(1, k);
                let w = c[1];
                self.lines[w].push(cr);
                end -= 1;
                // Re-examine the element swapped into position i.
                ws.swap(i, end);
                continue;
            }

            if assigns.is_falsified(c[0]) {
                debug_assert!(c.lits().iter().all(|&lit| assigns.is_falsified(lit)));
                assigns.dequeue_all();
                conflict = Some(cr);
                break;
            }

            // Clause is unit under the current assignment.
            let unit = c[0];
            assigns.assign_lit(unit, Some(cr));
            i += 1;
        }

        ws.truncate(end);
        self.lines[fx] = ws;
        conflict
    }
}
