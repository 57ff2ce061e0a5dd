use std::{fmt, ops};
use super::Lit;


/// A disjunction of literals. Positions 0 and 1 are the watched positions;
/// propagation may permute literals freely as long as the watches stay at the
/// front.
pub struct Clause {
    lits: Box<[Lit]>,
}

impl Clause {
    #[inline]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    #[inline]
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.lits.swap(i, j);
    }
}

impl ops::Index<usize> for Clause {
    type Output = Lit;

    #[inline]
    fn index(&self, index: usize) -> &Lit {
        self.lits.index(index)
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        let mut first = true;
        for lit in self.lits.iter() {
            if first {
                first = false;
            } else {
                write!(f, " ∨ ")?;
            }
            write!(f, "{:?}", lit)?;
        }
        write!(f, ")")
    }
}


/// Stable handle into the clause database.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct ClauseRef(usize);


/// Append-only clause arena; refs stay valid for the solver's lifetime.
pub struct ClauseDb {
    clauses: Vec<Clause>,
}

impl ClauseDb {
    pub fn new() -> ClauseDb {
        ClauseDb { clauses: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn add(&mut self, lits: Box<[Lit]>) -> ClauseRef {
        debug_assert!(lits.len() > 1);
        self.clauses.push(Clause { lits });
        ClauseRef(self.clauses.len() - 1)
    }

    #[inline]
    pub fn view(&self, ClauseRef(index): ClauseRef) -> &Clause {
        &self.clauses[index]
    }

    #[inline]
    pub fn edit(&mut self, ClauseRef(index): ClauseRef) -> &mut Clause {
        &mut self.clauses[index]
    }

    pub fn refs(&self) -> impl Iterator<Item = ClauseRef> {
        (0..self.clauses.len()).map(ClauseRef)
    }
}
