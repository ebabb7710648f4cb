//! Public evaluation contract.

use crate::dfa::{Automaton, Cursor};
use crate::engine::Walker;
use crate::path::{self, PathError};
use crate::record::Record;

/// A compiled query plus the reusable state to run it.
///
/// Compile once, run against any number of records. Internal buffers (the
/// descent stack) are reused across runs; each run starts from a clean
/// cursor and fresh carry state, so evaluation is idempotent. An evaluator
/// is single-threaded; independent evaluators over independent records can
/// run in parallel freely.
///
/// # Example
///
/// ```
/// use skippath::{Evaluator, Records};
///
/// let mut eval = Evaluator::new("$.items[0:2]").unwrap();
/// let records = Records::lines(b"{\"items\":[1,2,3]}\n{\"items\":[4]}\n");
///
/// let counts: Vec<u64> = records.iter().map(|r| eval.run(&r)).collect();
/// assert_eq!(counts, vec![2, 1]);
/// ```
pub struct Evaluator {
    automaton: Automaton,
    cursor: Cursor,
}

impl Evaluator {
    /// Compile `query` into an evaluator.
    pub fn new(query: &str) -> Result<Self, PathError> {
        Ok(Evaluator {
            automaton: path::compile(query)?,
            cursor: Cursor::new(),
        })
    }

    /// Evaluator over an already-compiled automaton.
    pub fn from_automaton(automaton: Automaton) -> Self {
        Evaluator {
            automaton,
            cursor: Cursor::new(),
        }
    }

    /// The compiled automaton backing this evaluator.
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Number of matches in `record`.
    pub fn run(&mut self, record: &Record<'_>) -> u64 {
        self.run_padded(record.padded_bytes())
    }

    /// Number of matches in a raw padded buffer.
    ///
    /// `record` must satisfy the input contract: its length is a multiple
    /// of 64 and the tail is padded with a byte that is none of
    /// `{ } [ ] : , " \`. A buffer with a non-conforming length is not
    /// touched and yields zero matches.
    pub fn run_padded(&mut self, record: &[u8]) -> u64 {
        if record.len() % 64 != 0 {
            return 0;
        }
        self.cursor.reset();
        Walker::new(record, &self.automaton, &mut self.cursor).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Records;

    #[test]
    fn test_reuse_across_records() {
        let mut eval = Evaluator::new("$.k").unwrap();
        let a = Records::single(br#"{"k":1}"#);
        let b = Records::single(br#"{"j":1}"#);
        assert_eq!(eval.run(&a.get(0).unwrap()), 1);
        assert_eq!(eval.run(&b.get(0).unwrap()), 0);
        assert_eq!(eval.run(&a.get(0).unwrap()), 1);
    }

    #[test]
    fn test_runs_are_idempotent() {
        let mut eval = Evaluator::new("$.arr[1:4]").unwrap();
        let records = Records::single(br#"{"arr":[10,20,30,40,50]}"#);
        let record = records.get(0).unwrap();
        let first = eval.run(&record);
        let second = eval.run(&record);
        assert_eq!(first, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unpadded_length_yields_zero() {
        let mut eval = Evaluator::new("$.k").unwrap();
        assert_eq!(eval.run_padded(br#"{"k":1}"#), 0);
    }

    #[test]
    fn test_bad_query_fails_loudly() {
        assert!(Evaluator::new("k").is_err());
        assert!(Evaluator::new("$.a[b]").is_err());
    }
}
