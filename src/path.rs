//! Compiler from JSONPath strings to query automata.
//!
//! Supported syntax:
//! - `$` - the record root
//! - `.foo` - field access
//! - `[2]` - array index
//! - `[2:5]` - array slice
//! - `[2:]` - open-ended slice
//! - `[]` - every element
//!
//! Each segment emits one or two automaton states. A dotted key inside the
//! path becomes a keyed transition expecting an object (or an array when a
//! bracket follows); a trailing key expects a primitive and leads to an
//! accepting state. Bracket segments attach their element range to the
//! current state and, when the path continues, share that state with the
//! following key segment.
//!
//! Malformed paths are rejected outright rather than compiled into automata
//! that silently match nothing.

#[cfg(not(test))]
use alloc::format;
#[cfg(not(test))]
use alloc::string::String;

use core::fmt;

use crate::dfa::{Automaton, StateId, ValueClass, START};

/// Error produced when a path fails to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub message: String,
    pub position: usize,
}

impl PathError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        PathError {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path error at position {}: {}",
            self.position, self.message
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PathError {}

/// Compile `path` into an [`Automaton`].
///
/// # Example
///
/// ```
/// let automaton = skippath::compile("$.store.book[0:3]").unwrap();
/// assert!(automaton.len() > 1);
///
/// assert!(skippath::compile("store.book").is_err());
/// ```
pub fn compile(path: &str) -> Result<Automaton, PathError> {
    Compiler::new(path).run()
}

/// Parsed bracket contents.
struct Bracket {
    range: Option<(i64, i64)>,
}

struct Compiler<'a> {
    input: &'a [u8],
    pos: usize,
    automaton: Automaton,
    state: StateId,
}

impl<'a> Compiler<'a> {
    fn new(path: &'a str) -> Self {
        Compiler {
            input: path.as_bytes(),
            pos: 0,
            automaton: Automaton::new(),
            state: START,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn run(mut self) -> Result<Automaton, PathError> {
        match self.bump() {
            Some(b'$') => {}
            _ => return Err(PathError::new("path must start with '$'", 0)),
        }
        while let Some(b) = self.bump() {
            match b {
                b'.' => self.key_segment()?,
                b'[' => {
                    // Root-level bracket: enter the outermost array.
                    self.automaton.update_transition(
                        self.state,
                        false,
                        ValueClass::None,
                        ValueClass::Array,
                        None,
                        self.state + 1,
                    );
                    self.state += 1;
                    self.bracket_segment()?;
                }
                _ => {
                    return Err(PathError::new(
                        format!("expected '.' or '[', found '{}'", b as char),
                        self.pos - 1,
                    ))
                }
            }
        }
        Ok(self.automaton)
    }

    /// One `.key` segment; the leading dot is already consumed.
    fn key_segment(&mut self) -> Result<(), PathError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'.' | b'[' => break,
                b']' => return Err(PathError::new("unexpected ']' in key", self.pos)),
                _ => self.pos += 1,
            }
        }
        if self.pos == start {
            return Err(PathError::new("empty key segment", start));
        }
        let key = &self.input[start..self.pos];

        match self.peek() {
            Some(b'[') => {
                self.pos += 1;
                // The key leads to an array value; a second state consumes
                // the bracket itself via the no-key transition.
                self.automaton.update_transition(
                    self.state,
                    false,
                    ValueClass::Array,
                    ValueClass::None,
                    Some(key),
                    self.state + 1,
                );
                self.automaton.update_transition(
                    self.state + 1,
                    false,
                    ValueClass::None,
                    ValueClass::None,
                    None,
                    self.state + 2,
                );
                self.state += 2;
                self.bracket_segment()
            }
            Some(b'.') => {
                self.pos += 1;
                self.automaton.update_transition(
                    self.state,
                    false,
                    ValueClass::Object,
                    ValueClass::None,
                    Some(key),
                    self.state + 1,
                );
                self.state += 1;
                self.key_segment()
            }
            Some(b) => Err(PathError::new(
                format!("expected '.' or '[', found '{}'", b as char),
                self.pos,
            )),
            None => {
                // Trailing key: the match is the attribute's value.
                self.automaton.update_transition(
                    self.state,
                    false,
                    ValueClass::Primitive,
                    ValueClass::None,
                    Some(key),
                    self.state + 1,
                );
                self.automaton.update_transition(
                    self.state + 1,
                    true,
                    ValueClass::None,
                    ValueClass::None,
                    None,
                    self.state + 1,
                );
                Ok(())
            }
        }
    }

    /// Bracket contents up to and including `]`; the `[` is consumed.
    fn bracket_segment(&mut self) -> Result<(), PathError> {
        let bracket = self.parse_bracket()?;
        if let Some((start, end)) = bracket.range {
            self.automaton.set_range(self.state, start, end);
        }
        match self.bump() {
            Some(b'.') => {
                // The following key segment shares this state: it carries
                // both the in-array expectation and the key lookup.
                self.automaton.update_transition(
                    self.state,
                    false,
                    ValueClass::None,
                    ValueClass::Object,
                    None,
                    self.state + 1,
                );
                self.key_segment()
            }
            Some(b'[') => {
                self.automaton.update_transition(
                    self.state,
                    false,
                    ValueClass::None,
                    ValueClass::Array,
                    None,
                    self.state + 1,
                );
                self.state += 1;
                self.bracket_segment()
            }
            Some(b) => Err(PathError::new(
                format!("expected '.' or '[', found '{}'", b as char),
                self.pos - 1,
            )),
            None => {
                // Trailing bracket: each in-range element is a match.
                self.automaton.update_transition(
                    self.state,
                    true,
                    ValueClass::None,
                    ValueClass::Primitive,
                    None,
                    self.state,
                );
                Ok(())
            }
        }
    }

    fn parse_bracket(&mut self) -> Result<Bracket, PathError> {
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Bracket { range: None });
        }
        let start = self.parse_number()?.unwrap_or(0);
        match self.bump() {
            Some(b']') => Ok(Bracket {
                range: Some((start, start + 1)),
            }),
            Some(b':') => {
                let end = self.parse_number()?.unwrap_or(i64::MAX);
                match self.bump() {
                    Some(b']') => Ok(Bracket {
                        range: Some((start, end)),
                    }),
                    Some(b) => Err(PathError::new(
                        format!("expected ']', found '{}'", b as char),
                        self.pos - 1,
                    )),
                    None => Err(PathError::new("unterminated bracket", self.pos)),
                }
            }
            Some(b) => Err(PathError::new(
                format!("expected digit, ':' or ']', found '{}'", b as char),
                self.pos - 1,
            )),
            None => Err(PathError::new("unterminated bracket", self.pos)),
        }
    }

    /// Run of decimal digits; `None` when the next byte is not a digit.
    fn parse_number(&mut self) -> Result<Option<i64>, PathError> {
        let start = self.pos;
        let mut value: i64 = 0;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as i64))
                .ok_or_else(|| PathError::new("index out of range", start))?;
            self.pos += 1;
        }
        if self.pos == start {
            if self.at_end() {
                return Err(PathError::new("unterminated bracket", self.pos));
            }
            return Ok(None);
        }
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::{IndexRange, UNMATCHED};

    #[test]
    fn test_single_key() {
        let a = compile("$.b").unwrap();
        assert_eq!(a.expected_in_object(START), ValueClass::Primitive);
        assert_eq!(a.next_state_for_key(START, b"b"), 2);
        assert!(a.is_accepting(2));
        assert!(!a.is_accepting(START));
    }

    #[test]
    fn test_chained_keys() {
        let a = compile("$.a.b.c").unwrap();
        assert_eq!(a.expected_in_object(START), ValueClass::Object);
        assert_eq!(a.next_state_for_key(START, b"a"), 2);
        assert_eq!(a.expected_in_object(2), ValueClass::Object);
        assert_eq!(a.next_state_for_key(2, b"b"), 3);
        assert_eq!(a.expected_in_object(3), ValueClass::Primitive);
        assert_eq!(a.next_state_for_key(3, b"c"), 4);
        assert!(a.is_accepting(4));
    }

    #[test]
    fn test_key_then_slice() {
        let a = compile("$.arr[1:4]").unwrap();
        assert_eq!(a.expected_in_object(START), ValueClass::Array);
        assert_eq!(a.next_state_for_key(START, b"arr"), 2);
        assert_eq!(a.next_state_no_key(2), 3);
        assert_eq!(a.index_range(3), Some(IndexRange { start: 1, end: 4 }));
        assert_eq!(a.expected_in_array(3), ValueClass::Primitive);
        assert!(a.is_accepting(3));
    }

    #[test]
    fn test_single_index_is_unit_range() {
        let a = compile("$.arr[2]").unwrap();
        assert_eq!(a.index_range(3), Some(IndexRange { start: 2, end: 3 }));
    }

    #[test]
    fn test_open_ended_slice() {
        let a = compile("$.arr[2:]").unwrap();
        assert_eq!(
            a.index_range(3),
            Some(IndexRange {
                start: 2,
                end: i64::MAX
            })
        );
    }

    #[test]
    fn test_iterate_all_has_no_range() {
        let a = compile("$.arr[]").unwrap();
        assert_eq!(a.index_range(3), None);
        assert!(a.is_accepting(3));
        assert_eq!(a.expected_in_array(3), ValueClass::Primitive);
    }

    #[test]
    fn test_bracket_then_key_shares_state() {
        let a = compile("$.arr[1].k").unwrap();
        assert_eq!(a.index_range(3), Some(IndexRange { start: 1, end: 2 }));
        // State 3 answers both questions.
        assert_eq!(a.expected_in_array(3), ValueClass::Object);
        assert_eq!(a.expected_in_object(3), ValueClass::Primitive);
        assert_eq!(a.next_state_for_key(3, b"k"), 4);
        assert!(a.is_accepting(4));
    }

    #[test]
    fn test_root_bracket() {
        let a = compile("$[0]").unwrap();
        assert_eq!(a.expected_in_array(START), ValueClass::Array);
        assert_eq!(a.next_state_no_key(START), 2);
        assert_eq!(a.index_range(2), Some(IndexRange { start: 0, end: 1 }));
        assert!(a.is_accepting(2));
    }

    #[test]
    fn test_nested_brackets() {
        let a = compile("$.a[0][1]").unwrap();
        assert_eq!(a.next_state_for_key(START, b"a"), 2);
        assert_eq!(a.next_state_no_key(2), 3);
        assert_eq!(a.index_range(3), Some(IndexRange { start: 0, end: 1 }));
        assert_eq!(a.expected_in_array(3), ValueClass::Array);
        assert_eq!(a.next_state_no_key(3), 4);
        assert_eq!(a.index_range(4), Some(IndexRange { start: 1, end: 2 }));
        assert!(a.is_accepting(4));
    }

    #[test]
    fn test_bare_root() {
        let a = compile("$").unwrap();
        assert_eq!(a.expected_in_object(START), ValueClass::None);
        assert_eq!(a.expected_in_array(START), ValueClass::None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(compile("a.b").is_err());
        assert!(compile("$a").is_err());
        assert!(compile("$.").is_err());
        assert!(compile("$..a").is_err());
        assert!(compile("$.a[").is_err());
        assert!(compile("$.a[x]").is_err());
        assert!(compile("$.a[1:2").is_err());
        assert!(compile("$.a[-1]").is_err());
        assert!(compile("$.a]").is_err());
    }

    #[test]
    fn test_error_reports_position() {
        let err = compile("$.a[x]").unwrap_err();
        assert_eq!(err.position, 4);
        assert!(err.message.contains("digit"));
    }

    #[test]
    fn test_unmatched_key() {
        let a = compile("$.a.b").unwrap();
        assert_eq!(a.next_state_for_key(START, b"nope"), UNMATCHED);
    }
}
