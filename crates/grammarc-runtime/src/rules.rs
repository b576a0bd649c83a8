use std::{borrow::Cow, collections::HashMap, rc::Rc};

use regex::bytes::{Regex, RegexBuilder};

use crate::{error::Error, lexer::Lexer, token::Value, RcString};

pub const DEFAULT_MODE: &str = "default";

/// Converts the matched text of a rule into its token value.
pub type DecodeFn = fn(&str) -> Result<Value, Cow<'static, str>>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Pattern {
    /// Matched verbatim, regex metacharacters have no meaning.
    Literal(RcString),
    Regex(RcString),
}

/// A rule as declared, before compilation.
#[derive(Clone, Debug)]
pub struct RuleSpec {
    name: RcString,
    pattern: Pattern,
    mode: RcString,
    ignore: bool,
    decode: Option<DecodeFn>,
}

impl RuleSpec {
    pub fn new(name: &str, pattern: Pattern) -> RuleSpec {
        Self {
            name: name.into(),
            pattern,
            mode: DEFAULT_MODE.into(),
            ignore: false,
            decode: None,
        }
    }
    pub fn literal(name: &str, text: &str) -> RuleSpec {
        Self::new(name, Pattern::Literal(text.into()))
    }
    pub fn regex(name: &str, pattern: &str) -> RuleSpec {
        Self::new(name, Pattern::Regex(pattern.into()))
    }
    pub fn mode(mut self, mode: &str) -> RuleSpec {
        self.mode = mode.into();
        self
    }
    /// Matches of this rule are skipped and never become tokens.
    pub fn ignore(mut self) -> RuleSpec {
        self.ignore = true;
        self
    }
    pub fn decode(mut self, decode: DecodeFn) -> RuleSpec {
        self.decode = Some(decode);
        self
    }
}

pub struct Rule {
    pub(crate) name: RcString,
    pub(crate) regex: Regex,
    pub(crate) mode: RcString,
    pub(crate) ignore: bool,
    pub(crate) literal: bool,
    pub(crate) decode: Option<DecodeFn>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn mode(&self) -> &str {
        &self.mode
    }
    pub fn is_ignore(&self) -> bool {
        self.ignore
    }
    pub fn is_literal(&self) -> bool {
        self.literal
    }
    /// Length of the match at the very start of `input`, empty matches don't count.
    ///
    /// Without unicode a pattern may stop inside a multibyte character, the match is then cut back
    /// to the last character boundary.
    pub(crate) fn match_len(&self, input: &str) -> Option<u32> {
        let found = self.regex.find(input.as_bytes())?;
        debug_assert_eq!(found.start(), 0, "Rule patterns are anchored");
        let mut len = found.end();
        while !input.is_char_boundary(len) {
            len -= 1;
        }
        match len {
            0 => None,
            len => Some(len as u32),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("regex", &self.regex.as_str())
            .field("mode", &self.mode)
            .field("ignore", &self.ignore)
            .field("literal", &self.literal)
            .finish()
    }
}

/// Collects rule declarations and compiles them into an immutable [`RuleTable`].
pub struct LexerCompiler {
    name: RcString,
    unicode: bool,
    specs: Vec<RuleSpec>,
}

impl LexerCompiler {
    pub fn new(name: &str) -> LexerCompiler {
        Self {
            name: name.into(),
            unicode: true,
            specs: Vec::new(),
        }
    }
    pub fn unicode(mut self, unicode: bool) -> LexerCompiler {
        self.unicode = unicode;
        self
    }
    pub fn add_rule(&mut self, spec: RuleSpec) -> &mut LexerCompiler {
        self.specs.push(spec);
        self
    }
    pub fn compile(self) -> Result<RuleTable, Error> {
        let mut rules = Vec::with_capacity(self.specs.len());
        let mut modes: HashMap<RcString, Vec<u32>> = HashMap::new();
        let mut literals: HashMap<(RcString, RcString), RcString> = HashMap::new();

        for spec in self.specs {
            let RuleSpec {
                name,
                pattern,
                mode,
                ignore,
                decode,
            } = spec;

            let (source, literal) = match &pattern {
                Pattern::Literal(text) => {
                    let key = (mode.clone(), text.clone());
                    if let Some(previous) = literals.insert(key, name.clone()) {
                        return Err(Error::DuplicateLiteral {
                            mode,
                            literal: text.clone(),
                            rules: [previous, name],
                        });
                    }
                    (regex::escape(text), true)
                }
                Pattern::Regex(source) => (source.to_string(), false),
            };

            // the pattern may only ever match at the current offset
            let regex = RegexBuilder::new(&format!("^(?:{source})"))
                .unicode(self.unicode)
                .build()
                .map_err(|err| Error::InvalidPattern {
                    rule: name.clone(),
                    message: err.to_string(),
                })?;

            let index: u32 = rules.len().try_into().unwrap_or(u32::MAX);
            modes.entry(mode.clone()).or_default().push(index);
            rules.push(Rule {
                name,
                regex,
                mode,
                ignore,
                literal,
                decode,
            });
        }

        log::debug!(
            "Compiled lexer '{}' with {} rules in {} modes",
            self.name,
            rules.len(),
            modes.len()
        );

        Ok(RuleTable {
            name: self.name,
            rules,
            modes,
        })
    }
}

pub struct RuleTable {
    name: RcString,
    rules: Vec<Rule>,
    modes: HashMap<RcString, Vec<u32>>,
}

impl RuleTable {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes.contains_key(mode)
    }
    /// Rules of one mode in declaration order.
    pub fn rules_in_mode<'a>(&'a self, mode: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.modes
            .get(mode)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&index| &self.rules[index as usize])
    }
    pub fn create_lexer(self: &Rc<Self>, input: &str) -> Result<Lexer, Error> {
        Lexer::new(self.clone(), input)
    }
}
