use std::{collections::HashMap, ops::Index};

use cranelift_entity::{entity_impl, PrimaryMap};
use grammarc_runtime::{RcString, Span};
use regex::Regex;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(u32);
entity_impl!(TerminalId, "terminal");

#[derive(Clone, Debug)]
pub struct Grammar {
    pub span: Span,
    pub name: RcString,
    pub productions: Vec<Production>,
    pub terminals: Terminals,
}

impl Grammar {
    pub fn production(&self, name: &str) -> Option<&Production> {
        self.productions.iter().find(|p| &*p.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct Production {
    pub span: Span,
    pub name: RcString,
    /// One per `|` alternative.
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub span: Span,
    pub components: Vec<Component>,
}

#[derive(Clone, Debug)]
pub struct Component {
    pub span: Span,
    pub label: Option<RcString>,
    /// Code followed by `?`.
    pub predicate: Option<CodeSegment>,
    pub prefix_code: Option<CodeSegment>,
    pub element: Element,
    pub suffixes: Vec<Suffix>,
    pub postfix_code: Option<CodeSegment>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Element {
    Terminal(TerminalId),
    /// `( ... )`
    Compound(Vec<Rule>),
    /// `(?= ... )`
    ForwardAssertion(Vec<Rule>),
    /// `(?! ... )`
    NegativeAssertion(Vec<Rule>),
    /// `~element`, matches nothing where `element` would match
    Negate(Box<Element>),
}

#[derive(Clone, Debug)]
pub struct RegexSet {
    /// Text between the delimiting slashes.
    pub source: RcString,
    pub flags: RcString,
    pub regex: Regex,
}

impl PartialEq for RegexSet {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl Eq for RegexSet {}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Terminal {
    /// Reference to a production or an external token.
    Ident(RcString),
    String(RcString),
    Number(u64),
    Set(RegexSet),
}

/// What makes two terminals the same terminal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum TerminalKey {
    Ident(RcString),
    String(RcString),
    Number(u64),
    Set { source: RcString, flags: RcString },
}

impl Terminal {
    fn key(&self) -> TerminalKey {
        match self {
            Terminal::Ident(name) => TerminalKey::Ident(name.clone()),
            Terminal::String(value) => TerminalKey::String(value.clone()),
            Terminal::Number(value) => TerminalKey::Number(*value),
            Terminal::Set(set) => TerminalKey::Set {
                source: set.source.clone(),
                flags: set.flags.clone(),
            },
        }
    }
    pub fn kind_name(&self) -> &'static str {
        match self {
            Terminal::Ident(_) => "ident",
            Terminal::String(_) => "string",
            Terminal::Number(_) => "number",
            Terminal::Set(_) => "set",
        }
    }
}

/// Arena of canonical terminals, equal terminals always get the same [`TerminalId`].
#[derive(Clone, Default, Debug)]
pub struct Terminals {
    map: PrimaryMap<TerminalId, Terminal>,
    cache: HashMap<TerminalKey, TerminalId>,
}

impl Terminals {
    pub fn new() -> Terminals {
        Self::default()
    }
    pub fn intern(&mut self, terminal: Terminal) -> TerminalId {
        let key = terminal.key();
        if let Some(&id) = self.cache.get(&key) {
            return id;
        }
        let id = self.map.push(terminal);
        self.cache.insert(key, id);
        id
    }
    pub fn get(&self, id: TerminalId) -> Option<&Terminal> {
        self.map.get(id)
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (TerminalId, &Terminal)> {
        self.map.iter()
    }
}

impl Index<TerminalId> for Terminals {
    type Output = Terminal;
    fn index(&self, index: TerminalId) -> &Self::Output {
        &self.map[index]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Suffix {
    ZeroOrMore,
    OneOrMore,
    Optional,
    Range { lower: u64, upper: Option<u64> },
}

impl Suffix {
    /// Bounds with a named form are always returned as that form.
    pub fn range(lower: u64, upper: Option<u64>) -> Suffix {
        match (lower, upper) {
            (0, None) => Suffix::ZeroOrMore,
            (1, None) => Suffix::OneOrMore,
            (0, Some(1)) => Suffix::Optional,
            (lower, upper) => Suffix::Range { lower, upper },
        }
    }
    pub fn bounds(self) -> (u64, Option<u64>) {
        match self {
            Suffix::ZeroOrMore => (0, None),
            Suffix::OneOrMore => (1, None),
            Suffix::Optional => (0, Some(1)),
            Suffix::Range { lower, upper } => (lower, upper),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CodeSegment {
    /// Covers the braces, the text does not.
    pub span: Span,
    pub text: RcString,
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Rule {}

/// Structural equality, spans are ignored.
impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        fn code(a: &Option<CodeSegment>) -> Option<&str> {
            a.as_ref().map(|code| &*code.text)
        }

        self.label == other.label
            && code(&self.predicate) == code(&other.predicate)
            && code(&self.prefix_code) == code(&other.prefix_code)
            && self.element == other.element
            && self.suffixes == other.suffixes
            && code(&self.postfix_code) == code(&other.postfix_code)
    }
}

impl Eq for Component {}
