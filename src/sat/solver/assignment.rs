use crate::sat::formula::clause::ClauseRef;
use crate::sat::formula::{Lit, Value, Var};


/// Decision level of assignments forced before any decision. Level 0 is never
/// used: `level_size[0] = 0` is a permanent sentinel and the first decision
/// opens level 2, so root-level units sit at level 1 on the trail.
pub const ROOT_LEVEL: usize = 1;


struct VarLine {
    value: Value,
    level: usize,
    cause: Option<ClauseRef>,
}


/// The trail of assigned literals together with the per-variable model,
/// assignment level and reason clause.
pub struct Assignment {
    lines: Vec<VarLine>,
    trail: Vec<Lit>,
    level_size: Vec<usize>,
    qhead: usize,
    on_enqueue: Option<Box<dyn FnMut(i32, usize)>>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment {
            lines: Vec::new(),
            trail: Vec::new(),
            level_size: vec![0],
            qhead: 0,
            on_enqueue: None,
        }
    }

    pub fn new_var(&mut self) -> Var {
        self.lines.push(VarLine {
            value: Value::Undef,
            level: 0,
            cause: None,
        });
        Var::from_index(self.lines.len() - 1)
    }

    #[inline]
    pub fn number_of_vars(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn current_level(&self) -> usize {
        self.level_size.len()
    }

    #[inline]
    pub fn new_level(&mut self) {
        self.level_size.push(self.trail.len());
    }

    #[inline]
    pub fn value_of(&self, v: Var) -> Value {
        self.lines[v.index()].value
    }

    #[inline]
    pub fn is_undef(&self, v: Var) -> bool {
        self.lines[v.index()].value == Value::Undef
    }

    #[inline]
    pub fn is_satisfied(&self, lit: Lit) -> bool {
        self.lines[lit.var().index()].value == lit.value()
    }

    #[inline]
    pub fn is_falsified(&self, lit: Lit) -> bool {
        self.lines[lit.var().index()].value == (!lit).value()
    }

    #[inline]
    pub fn level(&self, v: Var) -> usize {
        self.lines[v.index()].level
    }

    #[inline]
    pub fn cause(&self, v: Var) -> Option<ClauseRef> {
        self.lines[v.index()].cause
    }

    /// Appends a literal to the trail and records its level and reason. The
    /// literal must not be falsified; afterwards it is satisfied.
    pub fn assign_lit(&mut self, lit: Lit, cause: Option<ClauseRef>) {
        debug_assert!(!self.is_falsified(lit));
        let level = self.level_size.len();
        {
            let line = &mut self.lines[lit.var().index()];
            line.value = lit.value();
            line.level = level;
            line.cause = cause;
        }
        self.trail.push(lit);
        if let Some(hook) = self.on_enqueue.as_mut() {
            hook(lit.to_dimacs(), level);
        }
    }

    #[inline]
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    #[inline]
    pub fn dequeue(&mut self) -> Option<Lit> {
        if self.qhead < self.trail.len() {
            let lit = self.trail[self.qhead];
            self.qhead += 1;
            Some(lit)
        } else {
            None
        }
    }

    #[inline]
    pub fn dequeue_all(&mut self) {
        self.qhead = self.trail.len();
    }

    /// Rewinds the propagation cursor to the bottom of the trail, so that the
    /// next propagation pass revisits every assignment.
    #[inline]
    pub fn requeue_all(&mut self) {
        self.qhead = 0;
    }

    /// Unwinds the trail down to `target`, resetting each popped variable and
    /// reporting it to `f` so the caller can requeue it for decisions.
    pub fn rewind_to_level<F: FnMut(Var)>(&mut self, target: usize, mut f: F) {
        debug_assert!(target >= ROOT_LEVEL && target < self.current_level());
        let bottom = self.level_size[target];
        while self.trail.len() > bottom {
            let lit = self.trail.pop().unwrap();
            let line = &mut self.lines[lit.var().index()];
            line.value = Value::Undef;
            line.cause = None;
            f(lit.var());
        }
        self.level_size.truncate(target);
        self.qhead = self.trail.len();
    }

    pub fn set_enqueue_hook(&mut self, hook: Box<dyn FnMut(i32, usize)>) {
        self.on_enqueue = Some(hook);
    }
}
