//! oprex compiles a readable, indentation-structured pattern notation into a
//! single regular expression targeting an extended regex dialect: Unicode
//! properties and named characters, possessive and lazy quantifiers, atomic
//! groups, lookaround, named captures, backreferences, and subroutine calls.
//!
//! The pipeline is an indentation-aware tokenizer, a recursive-descent
//! parser threading a stack of copy-on-push symbol tables, and a post-parse
//! validator for backreference and subroutine-call targets. Compilation is
//! pure text-to-text; the produced pattern is never executed here.

pub mod language;
pub mod parsing;
pub mod problem;

pub use parsing::compile;
