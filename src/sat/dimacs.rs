// DIMACS CNF reader in the shape of the original frontend: the whole input is
// pulled into memory and consumed by a character cursor.
use std::collections::HashSet;
use std::{fs, io, path, str};

use flate2::read::GzDecoder;

use crate::sat::formula::Lit;
use crate::sat::solver::Solver;


fn parse_error(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}


/// Loads a DIMACS CNF file into the solver; `.gz` files are decompressed on
/// the fly. Returns the number of variables declared in the header.
pub fn parse_file<P: AsRef<path::Path>>(path: P, solver: &mut Solver) -> io::Result<usize> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        parse(&mut GzDecoder::new(file), solver)
    } else {
        parse(&mut io::BufReader::new(file), solver)
    }
}

pub fn parse<R: io::Read>(stream: &mut R, solver: &mut Solver) -> io::Result<usize> {
    let mut text = String::new();
    stream.read_to_string(&mut text)?;

    let mut parser = DimacsParser::new(&text);
    let (n_vars, n_clauses) = parser.header()?;
    for _ in 0..n_vars {
        solver.new_var();
    }
    for _ in 0..n_clauses {
        let clause = parser.clause(n_vars)?;
        let lits: Vec<Lit> = clause.iter().map(|&lit| Lit::from_dimacs(lit)).collect();
        solver.add_clause(&lits);
    }
    Ok(n_vars)
}


/// Replays every clause of a DIMACS formula against a model; true iff each
/// clause contains a satisfied literal.
pub fn validate_model_file<P: AsRef<path::Path>>(path: P, model: &[Lit]) -> io::Result<bool> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        validate_model(&mut GzDecoder::new(file), model)
    } else {
        validate_model(&mut io::BufReader::new(file), model)
    }
}

pub fn validate_model<R: io::Read>(stream: &mut R, model: &[Lit]) -> io::Result<bool> {
    let mut text = String::new();
    stream.read_to_string(&mut text)?;

    let assigned: HashSet<i32> = model.iter().map(|lit| lit.to_dimacs()).collect();

    let mut parser = DimacsParser::new(&text);
    let (n_vars, n_clauses) = parser.header()?;
    for _ in 0..n_clauses {
        let clause = parser.clause(n_vars)?;
        if !clause.iter().any(|lit| assigned.contains(lit)) {
            return Ok(false);
        }
    }
    Ok(true)
}


struct DimacsParser<'p> {
    chars: str::Chars<'p>,
    cur: Option<char>,
}

impl<'p> DimacsParser<'p> {
    fn new(text: &'p str) -> DimacsParser<'p> {
        let mut chars = text.chars();
        let cur = chars.next();
        DimacsParser { chars, cur }
    }

    fn header(&mut self) -> io::Result<(usize, usize)> {
        self.skip_comments();
        self.consume("p cnf")?;
        let n_vars = self.next_uint()?;
        let n_clauses = self.next_uint()?;
        Ok((n_vars, n_clauses))
    }

    fn clause(&mut self, n_vars: usize) -> io::Result<Vec<i32>> {
        self.skip_comments();
        let mut lits = Vec::new();
        loop {
            let lit = self.next_int()?;
            if lit == 0 {
                return Ok(lits);
            }
            if lit.abs() as usize > n_vars {
                return Err(parse_error(format!("literal {} out of range", lit)));
            }
            lits.push(lit);
        }
    }


    #[inline]
    fn advance(&mut self) {
        self.cur = self.chars.next();
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.cur {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    /// Skips whitespace and whole comment lines until the next token.
    fn skip_comments(&mut self) {
        loop {
            self.skip_whitespace();
            match self.cur {
                Some('c') => loop {
                    match self.cur {
                        None | Some('\r') | Some('\n') => break,
                        _ => self.advance(),
                    }
                },
                _ => return,
            }
        }
    }

    fn consume(&mut self, token: &str) -> io::Result<()> {
        for expected in token.chars() {
            match self.cur {
                Some(c) if c == expected => self.advance(),
                _ => {
                    return Err(parse_error(format!(
                        "invalid or missing DIMACS header, expected '{}'",
                        token
                    )));
                }
            }
        }
        Ok(())
    }

    fn next_int(&mut self) -> io::Result<i32> {
        self.skip_whitespace();
        let negative = match self.cur {
            Some('-') => {
                self.advance();
                true
            }
            Some('+') => {
                self.advance();
                false
            }
            _ => false,
        };

        let mut value: i64 = 0;
        let mut digits = 0;
        while let Some(d) = self.cur.and_then(|c| c.to_digit(10)) {
            value = value * 10 + i64::from(d);
            digits += 1;
            if value > i64::from(i32::max_value()) {
                return Err(parse_error("literal too large".to_string()));
            }
            self.advance();
        }

        if digits == 0 {
            return Err(match self.cur {
                Some(c) => parse_error(format!("expected integer, found '{}'", c)),
                None => parse_error("unexpected end of input, clause not terminated by 0".to_string()),
            });
        }
        Ok(if negative { -(value as i32) } else { value as i32 })
    }

    fn next_uint(&mut self) -> io::Result<usize> {
        let value = self.next_int()?;
        if value < 0 {
            return Err(parse_error(format!("expected unsigned integer, found {}", value)));
        }
        Ok(value as usize)
    }
}
