//! The grammar description language: lexicon, AST and the recursive descent parser.
//!
//! ```text
//! grammar Calc {
//!     expr : lhs=term (('+' | '-') term)* ;
//!     term : number=/[0-9]+/ | '(' expr ')' ;
//! }
//! ```

pub mod ast;
pub mod display;
pub mod error;
pub mod lexicon;
pub mod literal;
pub mod parser;
pub mod visit;

pub use ast::{
    CodeSegment, Component, Element, Grammar, Production, RegexSet, Rule, Suffix, Terminal,
    TerminalId, Terminals,
};
pub use error::Error;
pub use parser::{parse_grammar, parse_grammar_with_tokens};
pub use visit::Visitor;
