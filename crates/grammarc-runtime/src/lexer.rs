use std::rc::Rc;

use crate::{
    error::Error,
    rules::{Rule, RuleTable, DEFAULT_MODE},
    source::{Position, Source},
    span::Span,
    token::{Token, TokenSet, Value},
    RcString,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Scan {
    /// Regular advance, decode callbacks run.
    Evaluate,
    /// Speculative advance, no decoding and unmatched input is not an error.
    Lookahead,
}

/// Everything [`Lexer::peek`] has to put back.
#[derive(Clone)]
struct LexerState {
    offset: u32,
    prev_end: u32,
    current: TokenSet,
    modes: Vec<RcString>,
}

/// A longest-match scanner over a [`RuleTable`] with a stack of lexical modes.
///
/// The lexer always holds the token set at its current position. Mode changes take effect on the
/// next advance, so a parser switches modes *before* consuming the delimiter that opens or closes
/// a sub-language.
pub struct Lexer {
    table: Rc<RuleTable>,
    source: Rc<Source>,
    /// Where the next scan starts, the end of the current token set.
    offset: u32,
    /// End of the most recently consumed token.
    prev_end: u32,
    modes: Vec<RcString>,
    current: TokenSet,
    /// Every evaluated token set, once [`Lexer::record`] was called.
    recorded: Option<Vec<Vec<Token>>>,
}

impl Lexer {
    pub fn new(table: Rc<RuleTable>, input: &str) -> Result<Lexer, Error> {
        let mut lexer = Lexer {
            table,
            source: Rc::new(Source::new(input)),
            offset: 0,
            prev_end: 0,
            modes: vec![DEFAULT_MODE.into()],
            current: TokenSet::Eof,
            recorded: None,
        };
        lexer.advance(Scan::Evaluate)?;
        Ok(lexer)
    }

    pub fn table(&self) -> &Rc<RuleTable> {
        &self.table
    }

    pub fn source(&self) -> &Rc<Source> {
        &self.source
    }

    pub fn substring(&self, start: u32, end: u32) -> &str {
        self.source.substring(start, end)
    }

    pub fn prev_end(&self) -> u32 {
        self.prev_end
    }

    /// Start of the current token set, or the end of input.
    pub fn current_offset(&self) -> u32 {
        self.current.first().map_or(self.offset, Token::offset)
    }

    pub fn current(&self) -> &TokenSet {
        &self.current
    }

    pub fn current_tokens(&self) -> &[Token] {
        self.current.tokens()
    }

    pub fn token(&self) -> Option<&Token> {
        self.current.first()
    }

    pub fn is_eof(&self) -> bool {
        self.current.is_eof()
    }

    pub fn mode(&self) -> &str {
        self.modes.last().map_or(DEFAULT_MODE, |mode| &**mode)
    }

    pub fn push_mode(&mut self, mode: &str) {
        if !self.table.has_mode(mode) {
            log::warn!("Entering mode '{mode}' which has no rules");
        }
        log::debug!("Push mode '{mode}' at {}", self.offset);
        self.modes.push(mode.into());
    }

    /// The base mode is never popped, the stack stays non-empty.
    pub fn pop_mode(&mut self) -> Option<RcString> {
        if self.modes.len() == 1 {
            log::warn!("Attempted to pop the base mode '{}'", self.mode());
            return None;
        }
        let mode = self.modes.pop();
        log::debug!("Pop mode {mode:?} at {}", self.offset);
        mode
    }

    /// Starts keeping every token set scanned from here on, the current one included.
    pub fn record(&mut self) {
        let current = self.current.tokens();
        let recorded = self.recorded.get_or_insert_with(Vec::new);
        if !current.is_empty() {
            recorded.push(current.to_vec());
        }
    }

    pub fn take_recorded(&mut self) -> Vec<Vec<Token>> {
        self.recorded.take().unwrap_or_default()
    }

    pub fn next(&mut self) -> Result<(), Error> {
        if let Some(token) = self.current.first() {
            self.prev_end = token.span().end;
        }
        self.advance(Scan::Evaluate)
    }

    /// Whether there is another token set after the current one.
    pub fn has_next(&mut self) -> Result<bool, Error> {
        if self.is_eof() {
            return Ok(false);
        }
        Ok(matches!(self.peek(1)?, TokenSet::Tokens(_)))
    }

    /// The token set `count` advances ahead, the lexer state is left untouched.
    pub fn peek(&mut self, count: u32) -> Result<TokenSet, Error> {
        let mut sets = self.lookahead(count)?;
        Ok(sets.pop().unwrap_or_else(|| self.current.clone()))
    }

    /// The token set at each of the next `count` positions.
    fn lookahead(&mut self, count: u32) -> Result<Vec<TokenSet>, Error> {
        let state = self.save();
        let mut sets = Vec::with_capacity(count as usize);
        let mut result = Ok(());

        for _ in 0..count {
            if let TokenSet::Tokens(_) = self.current {
                if let Err(err) = self.advance(Scan::Lookahead) {
                    result = Err(err);
                    break;
                }
            }
            sets.push(self.current.clone());
        }

        self.restore(state);
        result.map(|()| sets)
    }

    fn save(&self) -> LexerState {
        LexerState {
            offset: self.offset,
            prev_end: self.prev_end,
            current: self.current.clone(),
            modes: self.modes.clone(),
        }
    }

    fn restore(&mut self, state: LexerState) {
        let LexerState {
            offset,
            prev_end,
            current,
            modes,
        } = state;

        self.offset = offset;
        self.prev_end = prev_end;
        self.current = current;
        self.modes = modes;
    }

    fn position(&self, offset: u32) -> Position {
        self.source.position(offset)
    }

    fn advance(&mut self, scan: Scan) -> Result<(), Error> {
        let table = self.table.clone();
        let source = self.source.clone();

        loop {
            if self.offset == source.len() {
                self.current = TokenSet::Eof;
                return Ok(());
            }

            let rest = &source.text()[self.offset as usize..];

            let mut max_len = 0;
            let mut candidates: Vec<&Rule> = Vec::new();
            for rule in table.rules_in_mode(self.mode()) {
                let Some(len) = rule.match_len(rest) else {
                    continue;
                };
                if len > max_len {
                    max_len = len;
                    candidates.clear();
                    candidates.push(rule);
                } else if len == max_len {
                    candidates.push(rule);
                }
            }

            if candidates.is_empty() {
                return match scan {
                    Scan::Lookahead => {
                        self.current = TokenSet::Invalid;
                        Ok(())
                    }
                    Scan::Evaluate => Err(Error::InvalidToken {
                        found: rest.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
                        position: self.position(self.offset),
                    }),
                };
            }

            let span = Span::new(self.offset, self.offset + max_len);
            let text = span.as_str(source.text());

            let ignored = candidates.iter().filter(|rule| rule.ignore).count();
            if ignored != 0 && ignored != candidates.len() {
                return Err(Error::AmbiguousIgnore {
                    text: text.to_owned(),
                    rules: candidates.iter().map(|rule| rule.name.clone()).collect(),
                    position: self.position(span.start),
                });
            }

            if ignored != 0 {
                self.offset = span.end;
                continue;
            }

            let mut tokens = Vec::with_capacity(candidates.len());
            for rule in candidates {
                let value = match (scan, rule.decode) {
                    (Scan::Lookahead, _) => Value::Unevaluated,
                    (Scan::Evaluate, None) => Value::Text(text.into()),
                    (Scan::Evaluate, Some(decode)) => {
                        decode(text).map_err(|message| Error::Decode {
                            rule: rule.name.clone(),
                            text: text.to_owned(),
                            message,
                            position: self.position(span.start),
                        })?
                    }
                };
                tokens.push(Token::new(rule.name.clone(), span, value, source.clone()));
            }

            if scan == Scan::Evaluate {
                log::trace!("{:?} {span} {text:?}", tokens.iter().map(Token::rule).collect::<Vec<_>>());
                if let Some(recorded) = &mut self.recorded {
                    recorded.push(tokens.clone());
                }
            }

            self.offset = span.end;
            self.current = TokenSet::Tokens(tokens);
            return Ok(());
        }
    }

    /// The first token of the current set tagged with `rule`.
    pub fn matches(&self, rule: &str) -> Option<&Token> {
        self.current.find(rule)
    }

    pub fn matches_any(&self, rules: &[&str]) -> bool {
        rules.iter().any(|rule| self.current.contains(rule))
    }

    /// Checks that the current set holds `rules[0]` and the set `i` positions ahead holds `rules[i]`.
    /// Returns the matching current token, nothing is consumed.
    pub fn matches_seq(&mut self, rules: &[&str]) -> Result<Option<Token>, Error> {
        let Some((first, rest)) = rules.split_first() else {
            return Ok(None);
        };
        let Some(token) = self.current.find(first).cloned() else {
            return Ok(None);
        };
        if rest.is_empty() {
            return Ok(Some(token));
        }

        let sets = self.lookahead(rest.len() as u32)?;
        let all = rest.iter().zip(&sets).all(|(rule, set)| set.contains(rule));

        Ok(all.then_some(token))
    }

    pub fn consume(&mut self, rule: &str) -> Result<Token, Error> {
        self.consume_any(&[rule])
    }

    pub fn try_consume(&mut self, rule: &str) -> Result<Option<Token>, Error> {
        self.try_consume_any(&[rule])
    }

    pub fn consume_any(&mut self, rules: &[&str]) -> Result<Token, Error> {
        match self.try_consume_any(rules)? {
            Some(token) => Ok(token),
            None => Err(self.unexpected(rules)),
        }
    }

    /// Advances if exactly one token of the current set is tagged with one of `rules`.
    pub fn try_consume_any(&mut self, rules: &[&str]) -> Result<Option<Token>, Error> {
        let token = {
            let alternatives: Vec<&Token> = rules
                .iter()
                .flat_map(|&rule| {
                    self.current
                        .tokens()
                        .iter()
                        .filter(move |token| token.rule() == rule)
                })
                .collect();

            match alternatives.as_slice() {
                [] => return Ok(None),
                [one] => (*one).clone(),
                many => {
                    return Err(Error::AmbiguousAlternative {
                        text: many[0].text().to_owned(),
                        rules: many.iter().map(|token| token.rule().into()).collect(),
                        position: many[0].position(),
                    })
                }
            }
        };

        self.next()?;
        Ok(Some(token))
    }

    /// Describes the current position as a mismatch against `expected`.
    pub fn unexpected(&self, expected: &[&str]) -> Error {
        let expected = expected.iter().map(|&name| name.to_owned()).collect();
        match &self.current {
            TokenSet::Tokens(tokens) => {
                let token = &tokens[0];
                Error::UnexpectedToken {
                    expected,
                    rule: token.rule().into(),
                    text: token.text().to_owned(),
                    position: token.position(),
                }
            }
            TokenSet::Eof => Error::UnexpectedEof {
                expected,
                position: self.position(self.source.len()),
            },
            TokenSet::Invalid => Error::InvalidToken {
                found: self
                    .source
                    .char_at(self.offset)
                    .unwrap_or(char::REPLACEMENT_CHARACTER),
                position: self.position(self.offset),
            },
        }
    }

    /// Iterates over the remaining token sets, consuming them.
    pub fn tokens(&mut self) -> TokenSets<'_> {
        TokenSets {
            lexer: self,
            pending: None,
            done: false,
        }
    }
}

pub struct TokenSets<'a> {
    lexer: &'a mut Lexer,
    pending: Option<Error>,
    done: bool,
}

impl Iterator for TokenSets<'_> {
    type Item = Result<Vec<Token>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(err) = self.pending.take() {
            self.done = true;
            return Some(Err(err));
        }
        if self.lexer.is_eof() {
            self.done = true;
            return None;
        }

        let set = self.lexer.current_tokens().to_vec();
        if let Err(err) = self.lexer.next() {
            self.pending = Some(err);
        }
        Some(Ok(set))
    }
}
