mod diagnostic;
mod error;
mod grammar;
mod opcode;
mod rule;

pub use diagnostic::Diagnostic;
pub use error::{AttributeError, AttributeErrorKind, CompileError};
pub use grammar::{Compiler, Grammar};
pub use opcode::Opcode;
pub use rule::{Rule, Udt};
