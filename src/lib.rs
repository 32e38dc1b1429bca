//! This crate indexes course registrations in a red-black tree and answers
//! a small batch query language over them.
//!
//! ## Red-Black Tree
//!
//! A red-black tree is a Binary Search Tree (BST) where every node carries
//! one extra bit, its color, either red or black. The colors are kept
//! so that:
//!
//! 1. The root is black.
//! 2. No red node has a red child.
//! 3. Every path from a node down to a missing child passes through the
//!    same number of black nodes (its "black height").
//!
//! Together these bound the longest root-to-leaf path at twice the shortest,
//! so the height of the tree stays `O(lg N)`. After an insert the new node is
//! red and may sit under a red parent (a "double red"). If the parent's
//! sibling is black the violation is fixed by one or two rotations plus a
//! recoloring and the fixup stops. If it is red, the grandparent, parent and
//! sibling swap colors and the check moves two levels up.
//!
//! ## Course Index
//!
//! Records are keyed by `(student ID, subject)`. Besides the tree there are
//! two secondary indices, by student and by subject, which let a
//! [`Session`] answer:
//!
//! - `I`: insert a registration, or refresh the timestamp of an existing one,
//!   reporting its depth.
//! - `L`: list a student's subjects with their node colors.
//! - `C`: count a subject's students and sum their depths.
//! - `M`: the K earliest applicants for a subject.
//!
//! [`run`] reads a whole batch (a query count followed by that many queries)
//! and writes one line per answered query.
//!
//! ```
//! use course_index::{run, Session};
//!
//! let input = "3\nI 1 Algo Kim 3 010 100\nI 2 Algo Lee 3 010 50\nM Algo 1\n";
//! let mut output = Vec::new();
//! run(input.as_bytes(), &mut output, &mut Session::new()).unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap(), "0 0\n1 0\n2 R\n");
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

use std::io::{BufRead, Write};

use log::{error, info, warn};

pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod record;
pub mod session;
pub mod tree;


pub use config::Config;
pub use error::{Error, Result};
pub use query::{Query, QueryReader};
pub use record::{Color, Key, Record, Registration};
pub use session::{Response, Session};
pub use tree::Tree;

/// Printed in place of an answer when a query trips over a broken index invariant.
pub const INVARIANT_VIOLATION_MESSAGE: &str = "Algorithm error! You must solve this problem.";

/// What happened over one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Queries consumed, including skipped ones. Equals the header count on success.
    pub queries: usize,
    /// Queries with an unknown opcode. These produce no output line.
    pub skipped: usize,
    /// Queries answered with [`INVARIANT_VIOLATION_MESSAGE`].
    pub invariant_violations: usize,
}

/// Runs a whole batch: reads the query count and then that many queries from `input`, writing
/// one line per answered query to `output`. Each query is answered as soon as it has been read,
/// and nothing past the last counted query is read at all.
///
/// Unknown opcodes are skipped with a warning. Invariant violations are reported on `output`
/// and the batch carries on. Malformed or missing input stops the batch with an error, since
/// the token stream can't be resynchronised.
pub fn run<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    session: &mut Session,
) -> Result<Summary> {
    let mut reader = QueryReader::new(input);
    let expected = reader.header()?;
    info!("running {} queries", expected);

    let mut summary = Summary::default();
    while summary.queries < expected {
        let query = match reader.next_query() {
            Ok(Some(query)) => query,
            Ok(None) => {
                return Err(Error::Truncated {
                    expected,
                    processed: summary.queries,
                })
            }
            Err(Error::UnknownOpcode(opcode)) => {
                warn!(
                    "skipping query {} with unknown opcode {:?}",
                    summary.queries + 1,
                    opcode
                );
                summary.queries += 1;
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        summary.queries += 1;

        match session.execute(query) {
            Ok(response) => writeln!(output, "{}", response)?,
            Err(e) if e.is_invariant_violation() => {
                error!("query {}: {}", summary.queries, e);
                summary.invariant_violations += 1;
                writeln!(output, "{}", INVARIANT_VIOLATION_MESSAGE)?;
            }
            Err(e) => return Err(e),
        }
    }
    output.flush()?;

    info!(
        "finished {} queries: {} records from {} students in {} subjects, {} skipped, {} \
         invariant violations",
        summary.queries,
        session.len(),
        session.indices().students(),
        session.indices().subjects(),
        summary.skipped,
        summary.invariant_violations
    );
    Ok(summary)
}
