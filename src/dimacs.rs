//! DIMACS CNF output.
//!
//! ```text
//! c 1 A
//! c 2 B
//! c 3 __temp__0
//! p cnf 3 4
//! -3 1 2 0
//! 3 -1 0
//! 3 -2 0
//! 3 0
//! ```
//!
//! Every variable gets a `c <index> <name>` comment line, so that the output is
//! self-describing and auxiliary variables can be told apart by name.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::clause::Cnf;

/// Writes `cnf` in DIMACS format.
pub fn write_dimacs<W: Write>(cnf: &Cnf, mut out: W) -> io::Result<()> {
    for (var, name) in cnf.registry().iter() {
        writeln!(out, "c {} {}", var.id(), name)?;
    }
    writeln!(out, "p cnf {} {}", cnf.num_vars(), cnf.num_clauses())?;
    for clause in cnf.clauses() {
        for lit in clause.iter() {
            write!(out, "{} ", lit.to_dimacs())?;
        }
        writeln!(out, "0")?;
    }
    out.flush()
}

impl Cnf {
    /// Renders the CNF in DIMACS format.
    pub fn to_dimacs_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec<u8> cannot fail.
        let _ = write_dimacs(self, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Saves the CNF to a DIMACS file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        write_dimacs(self, BufWriter::new(file))
    }
}
