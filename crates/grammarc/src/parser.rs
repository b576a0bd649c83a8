use grammarc_runtime::{Lexer, Position, RcString, Span, Token, Value};
use regex::RegexBuilder;

use crate::{
    ast::{
        CodeSegment, Component, Element, Grammar, Production, RegexSet, Rule, Suffix, Terminal,
        TerminalId, Terminals,
    },
    error::Error,
    lexicon::{
        self, CODE_MODE, GRAMMAR, IDENT, NUMBER, REGEX_CHAR, REGEX_ESCAPE, REGEX_GROUP_OPEN,
        REGEX_INLINE_FLAGS, REGEX_MODE, REGEX_REPEAT, STRING,
    },
};

/// Tokens that end a rule.
const RULE_FOLLOW: &[&str] = &["|", ";", ")"];

const ELEMENT_START: &[&str] = &[IDENT, NUMBER, STRING, "/", "(", "(?=", "(?!", "~"];

pub struct Parser {
    lexer: Lexer,
    terminals: Terminals,
}

impl Parser {
    pub fn new(src: &str) -> Result<Parser, Error> {
        let lexer = Lexer::new(lexicon::table()?, src)?;
        Ok(Parser {
            lexer,
            terminals: Terminals::new(),
        })
    }

    fn position(&self, offset: u32) -> Position {
        self.lexer.source().position(offset)
    }

    fn start(&self) -> u32 {
        self.lexer.current_offset()
    }

    /// From `start` to the end of the last consumed token.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.lexer.prev_end().max(start))
    }

    fn unexpected(&self, expected: &[&str]) -> Error {
        self.lexer.unexpected(expected).into()
    }
}

pub fn parse_grammar(src: &str) -> Result<Grammar, Error> {
    let mut p = Parser::new(src)?;
    grammar(&mut p)
}

/// Also returns every token set the parser consumed, in all three modes.
pub fn parse_grammar_with_tokens(src: &str) -> Result<(Grammar, Vec<Vec<Token>>), Error> {
    let mut p = Parser::new(src)?;
    p.lexer.record();
    let grammar = grammar(&mut p)?;
    Ok((grammar, p.lexer.take_recorded()))
}

// 'grammar' ident '{' production* '}'
fn grammar(p: &mut Parser) -> Result<Grammar, Error> {
    let start = p.start();
    p.lexer.consume(GRAMMAR)?;
    let name = p.lexer.consume(IDENT)?;
    p.lexer.consume("{")?;

    let mut productions = Vec::new();
    while p.lexer.matches(IDENT).is_some() {
        productions.push(production(p)?);
    }

    if p.lexer.matches("}").is_none() {
        return Err(p.unexpected(&[IDENT, "}"]));
    }
    p.lexer.consume("}")?;

    if !p.lexer.is_eof() {
        return Err(p.unexpected(&["end of input"]));
    }

    Ok(Grammar {
        span: p.span_from(start),
        name: name.text().into(),
        productions,
        terminals: std::mem::take(&mut p.terminals),
    })
}

// ident ':' rule_list ';'
fn production(p: &mut Parser) -> Result<Production, Error> {
    let start = p.start();
    let name: RcString = p.lexer.consume(IDENT)?.text().into();
    p.lexer.consume(":")?;
    let rules = rule_list(p)?;
    p.lexer.consume(";")?;

    log::debug!("Parsed production '{name}' with {} alternatives", rules.len());

    Ok(Production {
        span: p.span_from(start),
        name,
        rules,
    })
}

// rule ('|' rule)*
fn rule_list(p: &mut Parser) -> Result<Vec<Rule>, Error> {
    let mut rules = vec![rule(p)?];
    while p.lexer.try_consume("|")?.is_some() {
        rules.push(rule(p)?);
    }
    Ok(rules)
}

// component*
fn rule(p: &mut Parser) -> Result<Rule, Error> {
    let start = p.start();
    let mut components = Vec::new();
    // at the end of input `component` fails, so this always terminates
    while !p.lexer.matches_any(RULE_FOLLOW) {
        components.push(component(p)?);
    }
    Ok(Rule {
        span: p.span_from(start),
        components,
    })
}

// code? ('?' code?)? (ident '=')? element suffix* code?
fn component(p: &mut Parser) -> Result<Component, Error> {
    let start = p.start();

    let mut predicate = None;
    let mut prefix_code = None;
    if p.lexer.matches("{").is_some() {
        let code = code_segment(p)?;
        if p.lexer.try_consume("?")?.is_some() {
            predicate = Some(code);
            if p.lexer.matches("{").is_some() {
                prefix_code = Some(code_segment(p)?);
            }
        } else {
            prefix_code = Some(code);
        }
    }

    // a bare identifier is a terminal, only the following '=' makes it a label
    let mut label = None;
    if p.lexer.matches_seq(&[IDENT, "="])?.is_some() {
        label = Some(p.lexer.consume(IDENT)?.text().into());
        p.lexer.consume("=")?;
    }

    let element = element(p)?;

    let mut suffixes = Vec::new();
    while let Some(suffix) = suffix(p)? {
        suffixes.push(suffix);
    }

    let mut postfix_code = None;
    if p.lexer.matches("{").is_some() {
        postfix_code = Some(code_segment(p)?);
    }

    Ok(Component {
        span: p.span_from(start),
        label,
        predicate,
        prefix_code,
        element,
        suffixes,
        postfix_code,
    })
}

// '~' element | '(' rule_list ')' | '(?=' rule_list ')' | '(?!' rule_list ')' | terminal
fn element(p: &mut Parser) -> Result<Element, Error> {
    if p.lexer.try_consume("~")?.is_some() {
        return Ok(Element::Negate(Box::new(element(p)?)));
    }

    if let Some(open) = p.lexer.try_consume_any(&["(", "(?=", "(?!"])? {
        let rules = rule_list(p)?;
        p.lexer.consume(")")?;
        return Ok(match open.rule() {
            "(?=" => Element::ForwardAssertion(rules),
            "(?!" => Element::NegativeAssertion(rules),
            _ => Element::Compound(rules),
        });
    }

    terminal(p).map(Element::Terminal)
}

// ident | number | string | regex
fn terminal(p: &mut Parser) -> Result<TerminalId, Error> {
    let terminal = if let Some(token) = p.lexer.try_consume(IDENT)? {
        Terminal::Ident(token.text().into())
    } else if let Some(token) = p.lexer.try_consume(NUMBER)? {
        Terminal::Number(token.value().as_integer().unwrap_or_default())
    } else if let Some(token) = p.lexer.try_consume(STRING)? {
        Terminal::String(decoded_text(&token))
    } else if p.lexer.matches("/").is_some() {
        Terminal::Set(regex(p)?)
    } else {
        return Err(p.unexpected(ELEMENT_START));
    };

    Ok(p.terminals.intern(terminal))
}

fn decoded_text(token: &Token) -> RcString {
    match token.value() {
        Value::Text(text) => text.clone(),
        _ => token.text().into(),
    }
}

// '*' | '+' | '?' | '{' number (',' number?)? '}'
fn suffix(p: &mut Parser) -> Result<Option<Suffix>, Error> {
    if let Some(token) = p.lexer.try_consume_any(&["*", "+", "?"])? {
        return Ok(Some(match token.rule() {
            "*" => Suffix::ZeroOrMore,
            "+" => Suffix::OneOrMore,
            _ => Suffix::Optional,
        }));
    }

    // any other '{' opens a code segment
    if p.lexer.matches_seq(&["{", NUMBER])?.is_none() {
        return Ok(None);
    }

    let open = p.lexer.consume("{")?;
    let number = |token: Token| token.value().as_integer().unwrap_or_default();

    let lower = number(p.lexer.consume(NUMBER)?);
    let upper = if p.lexer.try_consume(",")?.is_some() {
        p.lexer.try_consume(NUMBER)?.map(number)
    } else {
        Some(lower)
    };
    p.lexer.consume("}")?;

    if let Some(upper) = upper {
        if lower > upper {
            return Err(Error::InvalidRange {
                lower,
                upper,
                position: open.position(),
            });
        }
    }

    Ok(Some(Suffix::range(lower, upper)))
}

// '{' (code_token | '{' ... '}')* '}'
fn code_segment(p: &mut Parser) -> Result<CodeSegment, Error> {
    let open = p.start();
    p.lexer.push_mode(CODE_MODE);
    p.lexer.consume("{")?;
    let start = p.lexer.prev_end();

    // strings and comments are single tokens so their braces never show up here
    let mut depth = 0u32;
    loop {
        if p.lexer.is_eof() {
            return Err(p.unexpected(&["}"]));
        }
        if p.lexer.matches("{").is_some() {
            depth += 1;
        } else if p.lexer.matches("}").is_some() {
            if depth == 0 {
                break;
            }
            depth -= 1;
        }
        p.lexer.next()?;
    }

    let end = p.start();
    p.lexer.pop_mode();
    p.lexer.consume("}")?;

    Ok(CodeSegment {
        span: p.span_from(open),
        text: p.lexer.substring(start, end).into(),
    })
}

// '/' regex_disjunction '/' flags?
fn regex(p: &mut Parser) -> Result<RegexSet, Error> {
    let open = p.start();
    p.lexer.push_mode(REGEX_MODE);
    p.lexer.consume("/")?;
    let start = p.lexer.prev_end();

    regex_disjunction(p)?;

    if p.lexer.matches("/").is_none() {
        return Err(p.unexpected(&["/"]));
    }
    let end = p.start();
    p.lexer.pop_mode();
    p.lexer.consume("/")?;

    let source: RcString = p.lexer.substring(start, end).into();

    let mut builder = RegexBuilder::new(&source);
    let mut flags: RcString = "".into();
    if let Some(token) = p.lexer.matches(IDENT) {
        // flags only count when they touch the closing slash
        if token.offset() == p.lexer.prev_end() {
            let token = p.lexer.consume(IDENT)?;
            for (i, flag) in token.text().char_indices() {
                match flag {
                    'i' => builder.case_insensitive(true),
                    'm' => builder.multi_line(true),
                    's' => builder.dot_matches_new_line(true),
                    'x' => builder.ignore_whitespace(true),
                    'U' => builder.swap_greed(true),
                    _ => {
                        return Err(Error::InvalidRegexFlag {
                            flag,
                            position: p.position(token.offset() + i as u32),
                        })
                    }
                };
            }
            flags = token.text().into();
        }
    }

    let regex = builder.build().map_err(|err| Error::InvalidRegex {
        source: source.to_string(),
        message: err.to_string(),
        position: p.position(open),
    })?;

    Ok(RegexSet {
        source,
        flags,
        regex,
    })
}

// regex_alternative ('|' regex_alternative)*
fn regex_disjunction(p: &mut Parser) -> Result<(), Error> {
    regex_alternative(p)?;
    while p.lexer.try_consume("|")?.is_some() {
        regex_alternative(p)?;
    }
    Ok(())
}

// regex_term*
fn regex_alternative(p: &mut Parser) -> Result<(), Error> {
    while !p.lexer.is_eof() && !p.lexer.matches_any(&["|", ")", "/"]) {
        regex_term(p)?;
    }
    Ok(())
}

// '^' | '$' | inline_flags | lookaround | regex_atom regex_quantifier?
fn regex_term(p: &mut Parser) -> Result<(), Error> {
    if p.lexer
        .try_consume_any(&["^", "$", REGEX_INLINE_FLAGS])?
        .is_some()
    {
        return Ok(());
    }

    if p.lexer
        .try_consume_any(&["(?=", "(?!", "(?<=", "(?<!"])?
        .is_some()
    {
        regex_disjunction(p)?;
        p.lexer.consume(")")?;
        return Ok(());
    }

    regex_atom(p)?;
    regex_quantifier(p)
}

// ('*' | '+' | '?' | repeat) '?'?
fn regex_quantifier(p: &mut Parser) -> Result<(), Error> {
    if p.lexer
        .try_consume_any(&["*", "+", "?", REGEX_REPEAT])?
        .is_some()
    {
        // lazy
        p.lexer.try_consume("?")?;
    }
    Ok(())
}

// char | escape | '.' | '-' | ']' | regex_class | ('(' | group_open) regex_disjunction ')'
fn regex_atom(p: &mut Parser) -> Result<(), Error> {
    if p.lexer
        .try_consume_any(&[REGEX_CHAR, REGEX_ESCAPE, ".", "-", "]"])?
        .is_some()
    {
        return Ok(());
    }

    if p.lexer.matches_any(&["[", "[^"]) {
        return regex_class(p);
    }

    if p.lexer.try_consume_any(&["(", REGEX_GROUP_OPEN])?.is_some() {
        regex_disjunction(p)?;
        p.lexer.consume(")")?;
        return Ok(());
    }

    Err(p.unexpected(&[REGEX_CHAR, REGEX_ESCAPE, ".", "[", "("]))
}

// ('[' | '[^') ']'? (regex_class | class_atom)* ']'
fn regex_class(p: &mut Parser) -> Result<(), Error> {
    p.lexer.consume_any(&["[", "[^"])?;
    // a leading ']' is a literal
    p.lexer.try_consume("]")?;

    // every other token, '/' included, is a class member
    while p.lexer.matches("]").is_none() {
        if p.lexer.is_eof() {
            return Err(p.unexpected(&["]"]));
        }
        if p.lexer.matches_any(&["[", "[^"]) {
            regex_class(p)?;
        } else {
            p.lexer.next()?;
        }
    }

    p.lexer.consume("]")?;
    Ok(())
}
