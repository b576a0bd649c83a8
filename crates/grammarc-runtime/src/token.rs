use std::rc::Rc;

use crate::{
    source::{Position, Source},
    span::Span,
    RcString,
};

/// The decoded payload of a token.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Value {
    /// The token was produced during lookahead, decoding was skipped.
    Unevaluated,
    Text(RcString),
    Integer(u64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Token {
    rule: RcString,
    span: Span,
    value: Value,
    source: Rc<Source>,
}

impl Token {
    pub(crate) fn new(rule: RcString, span: Span, value: Value, source: Rc<Source>) -> Token {
        Self {
            rule,
            span,
            value,
            source,
        }
    }
    pub fn rule(&self) -> &str {
        &self.rule
    }
    pub fn offset(&self) -> u32 {
        self.span.start
    }
    pub fn span(&self) -> Span {
        self.span
    }
    pub fn len(&self) -> u32 {
        self.span.len()
    }
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
    pub fn text(&self) -> &str {
        self.span.as_str(self.source.text())
    }
    pub fn value(&self) -> &Value {
        &self.value
    }
    pub fn source(&self) -> &Rc<Source> {
        &self.source
    }
    /// Computed from the source on demand, never stored.
    pub fn position(&self) -> Position {
        self.source.position(self.span.start)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("rule", &self.rule)
            .field("span", &self.span)
            .field("text", &self.text())
            .field("value", &self.value)
            .finish()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule
            && self.span == other.span
            && self.value == other.value
            && Rc::ptr_eq(&self.source, &other.source)
    }
}

/// Every interpretation of the input at the lexer's current position.
#[derive(Clone, PartialEq, Debug)]
pub enum TokenSet {
    /// One token per rule that tied for the longest match, never empty.
    Tokens(Vec<Token>),
    Eof,
    /// No rule matched, only reported by lookahead.
    Invalid,
}

impl TokenSet {
    pub fn tokens(&self) -> &[Token] {
        match self {
            TokenSet::Tokens(tokens) => tokens,
            TokenSet::Eof | TokenSet::Invalid => &[],
        }
    }
    pub fn first(&self) -> Option<&Token> {
        self.tokens().first()
    }
    pub fn is_eof(&self) -> bool {
        matches!(self, TokenSet::Eof)
    }
    pub fn find(&self, rule: &str) -> Option<&Token> {
        self.tokens().iter().find(|token| token.rule() == rule)
    }
    pub fn contains(&self, rule: &str) -> bool {
        self.find(rule).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(source: &Rc<Source>, rule: &str, start: u32, end: u32) -> Token {
        Token::new(
            rule.into(),
            Span::new(start, end),
            Value::Unevaluated,
            source.clone(),
        )
    }

    #[test]
    fn token_reads_text_and_position_from_source() {
        let source = Rc::new(Source::new("a\n  bc"));
        let token = token(&source, "ident", 4, 6);
        assert_eq!(token.text(), "bc");
        assert_eq!(token.len(), 2);
        assert_eq!(token.position(), Position::new(2, 3));
    }

    #[test]
    fn token_set_lookup() {
        let source = Rc::new(Source::new("return"));
        let set = TokenSet::Tokens(vec![
            token(&source, "ident", 0, 6),
            token(&source, "return", 0, 6),
        ]);
        assert!(set.contains("return"));
        assert_eq!(set.find("ident").map(Token::rule), Some("ident"));
        assert!(!set.contains("number"));
        assert!(TokenSet::Eof.tokens().is_empty());
        assert!(TokenSet::Invalid.first().is_none());
    }
}
