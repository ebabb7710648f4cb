//! # Skippath
//!
//! Streaming JSONPath evaluation over raw JSON bytes.
//!
//! Instead of parsing a record into a tree and walking it, this crate answers
//! simple path queries by *skipping*: a bit-parallel structural index marks
//! the positions of `{ } [ ] : , "` outside string literals in 64-byte
//! windows, and a compiled query automaton drives a recursive descent that
//! jumps over every object, array, and primitive that cannot match.
//!
//! ## Quick Start
//!
//! ```
//! use skippath::{Evaluator, Records};
//!
//! let records = Records::single(br#"{"user":{"lang":"en"},"id":7}"#);
//! let mut eval = Evaluator::new("$.user.lang").unwrap();
//!
//! let record = records.get(0).unwrap();
//! assert_eq!(eval.run(&record), 1);
//! ```
//!
//! ## Query Syntax
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `$.foo` | Access field "foo" of an object |
//! | `$.foo.bar` | Chained field access |
//! | `$.foo[2]` | Access third element of an array |
//! | `$.foo[2:5]` | Elements 2, 3, and 4 |
//! | `$.foo[2:]` | Elements from index 2 to the end |
//! | `$.foo[]` | Every element |
//!
//! Filters, wildcard keys, descendant operators, and negative indices are not
//! supported.
//!
//! ## Input Contract
//!
//! Records are evaluated from byte buffers whose length is a multiple of 64,
//! padded with a non-structural filler byte; [`Records`] produces conforming
//! buffers from arbitrary input. The evaluator never validates the JSON it
//! reads: malformed records terminate with some match count, nothing more.
//!
//! ## Features
//!
//! - `std` (default) - runtime SIMD feature detection; without it each target
//!   falls back to its baseline kernel
//! - `serde` - serialization support for compiled query automata

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

pub mod dfa;
mod engine;
mod evaluator;
pub mod index;
pub mod interval;
pub mod path;
pub mod record;

pub use dfa::Automaton;
pub use evaluator::Evaluator;
pub use path::{compile, PathError};
pub use record::{Record, Records};
