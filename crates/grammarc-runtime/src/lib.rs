pub mod error;
pub mod lexer;
pub mod rules;
pub mod source;
pub mod span;
pub mod token;

use std::rc::Rc;

pub use error::Error;
pub use lexer::Lexer;
pub use rules::{LexerCompiler, Pattern, RuleSpec, RuleTable, DEFAULT_MODE};
pub use source::{Position, Source};
pub use span::{Span, Spanned};
pub use token::{Token, TokenSet, Value};

pub type RcString = Rc<str>;

/// Scans all of `input`, returning every token set in order.
pub fn tokenize(table: &Rc<RuleTable>, input: &str) -> Result<Vec<Vec<Token>>, Error> {
    let mut lexer = table.create_lexer(input)?;
    lexer.tokens().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_skips_ignored_text() {
        let mut compiler = LexerCompiler::new("calc");
        compiler
            .add_rule(RuleSpec::regex("number", "[0-9]+"))
            .add_rule(RuleSpec::literal("+", "+"))
            .add_rule(RuleSpec::regex("ws", r"\s+").ignore());
        let table = Rc::new(compiler.compile().unwrap());

        let sets = tokenize(&table, "1 + 22").unwrap();
        let texts: Vec<_> = sets.iter().map(|set| set[0].text()).collect();
        assert_eq!(texts, ["1", "+", "22"]);

        let err = tokenize(&table, "1 - 2").unwrap_err();
        assert_eq!(err.to_string(), "Invalid token '-' at 1:3");
    }
}
