//! C++-like source parser
//!
//! This module extracts reflectable shapes from header and implementation
//! files without building a full syntax tree:
//! - [`lexer`]: Tokenization (source text → tokens, brace depth, scope stack)
//! - [`keywords`]: Reserved-word dispatch table
//! - [`parse`]: [`parse::Parser`] core, shared skipping and generic capture
//! - [`declarations`]: File scope
//! - [`structs`]: Struct/class/union bodies
//! - [`enums`]: Enum bodies
//! - [`ast`]: Parsed shapes handed to the code generator
//!
//! # Supported subset
//!
//! Namespaces, struct/class/union and enum definitions (nested, generic,
//! specialized), data members with pointers/references/arrays, and free
//! function/variable declarations. Method bodies, initializers and
//! expressions are skipped by brace and paren balancing, never parsed.
//!
//! # Parser Implementation
//!
//! Hand-written single-pass recursive descent with a small lookahead queue.
//! No external parser generator dependencies.

pub mod ast;
pub mod declarations;
pub mod enums;
pub mod keywords;
pub mod lexer;
pub mod parse;
pub mod structs;
