//! ABNF/SABNF grammar compiler.
//!
//! Compiles grammar text into per-rule opcode tables for a
//! recursive-descent parser runtime:
//!
//! 1. [`input::analyze`] catalogs lines and validates characters.
//! 2. [`parse::syntax`] and [`parse::semantic`] parse the grammar and
//!    translate it into [`Opcode`] tables.
//! 3. [`reduce::reduce`] removes redundant opcodes.
//! 4. [`analysis::analyze`] classifies rules and rejects left-recursive,
//!    infinite and cyclic ones.
//!
//! [`Compiler`] runs the whole pipeline; the result is a [`Grammar`],
//! which can be emitted as Rust source with [`Grammar::to_rust_source`].
//!
//! ```
//! use sabnf::Grammar;
//!
//! let grammar = Grammar::from_abnf("list = item *(\",\" item)\nitem = 1*%d48-57\n").unwrap();
//! assert_eq!(grammar.dependencies_of("list"), Some(vec!["item"]));
//! ```

pub mod analysis;
mod compile;
mod emit;
mod engine;
mod error;
pub mod input;
pub mod parse;
pub mod reduce;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;

pub use emit::GrammarSummary;
pub use error::SabnfError;
pub use types::{
    AttributeError, AttributeErrorKind, CompileError, Compiler, Diagnostic, Grammar, Opcode, Rule,
    Udt,
};

#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
