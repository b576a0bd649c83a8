use std::fmt::{Display, Formatter, Result, Write};

use crate::{
    ast::{CodeSegment, Component, Element, Grammar, Rule, Suffix, Terminal},
    literal::display_string,
};

/// Prints a grammar back as grammar text that parses to an equal tree.
pub struct GrammarDisplay<'a>(&'a Grammar);

pub struct TerminalDisplay<'a>(&'a Terminal);

impl Grammar {
    pub fn display(&self) -> GrammarDisplay<'_> {
        GrammarDisplay(self)
    }
}

impl Terminal {
    pub fn display(&self) -> TerminalDisplay<'_> {
        TerminalDisplay(self)
    }
}

impl Display for TerminalDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.0 {
            Terminal::Ident(name) => f.write_str(name),
            Terminal::String(value) => display_string(f, value),
            Terminal::Number(value) => write!(f, "{value}"),
            Terminal::Set(set) => write!(f, "/{}/{}", set.source, set.flags),
        }
    }
}

impl Display for Suffix {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            Suffix::ZeroOrMore => f.write_char('*'),
            Suffix::OneOrMore => f.write_char('+'),
            Suffix::Optional => f.write_char('?'),
            Suffix::Range { lower, upper: None } => write!(f, "{{{lower},}}"),
            Suffix::Range {
                lower,
                upper: Some(upper),
            } if lower == upper => write!(f, "{{{lower}}}"),
            Suffix::Range {
                lower,
                upper: Some(upper),
            } => write!(f, "{{{lower},{upper}}}"),
        }
    }
}

impl Display for CodeSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{{{}}}", self.text)
    }
}

fn rules(f: &mut Formatter<'_>, grammar: &Grammar, rules: &[Rule]) -> Result {
    for (i, rule) in rules.iter().enumerate() {
        if i != 0 {
            f.write_str(" |")?;
        }
        for component in &rule.components {
            f.write_char(' ')?;
            self::component(f, grammar, component)?;
        }
    }
    Ok(())
}

fn component(f: &mut Formatter<'_>, grammar: &Grammar, component: &Component) -> Result {
    if let Some(code) = &component.predicate {
        write!(f, "{code}? ")?;
    }
    if let Some(code) = &component.prefix_code {
        write!(f, "{code} ")?;
    }
    if let Some(label) = &component.label {
        write!(f, "{label}=")?;
    }
    element(f, grammar, &component.element)?;
    for suffix in &component.suffixes {
        write!(f, "{suffix}")?;
    }
    if let Some(code) = &component.postfix_code {
        write!(f, " {code}")?;
    }
    Ok(())
}

fn element(f: &mut Formatter<'_>, grammar: &Grammar, element: &Element) -> Result {
    let (open, inner) = match element {
        Element::Terminal(id) => return write!(f, "{}", grammar.terminals[*id].display()),
        Element::Negate(inner) => {
            f.write_char('~')?;
            return self::element(f, grammar, inner);
        }
        Element::Compound(rules) => ("(", rules),
        Element::ForwardAssertion(rules) => ("(?=", rules),
        Element::NegativeAssertion(rules) => ("(?!", rules),
    };
    f.write_str(open)?;
    rules(f, grammar, inner)?;
    f.write_str(" )")
}

impl Display for GrammarDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let grammar = self.0;
        writeln!(f, "grammar {} {{", grammar.name)?;
        for production in &grammar.productions {
            write!(f, "    {} :", production.name)?;
            rules(f, grammar, &production.rules)?;
            writeln!(f, " ;")?;
        }
        f.write_char('}')
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_grammar;

    #[test]
    fn display_parses_back() {
        let src = r#"grammar T {
            a : l = x* 'q\n' | { p }? {pre} ~(b | 12{2,}) (?= /[a-z]+/i ) y{3} {post} ;
            b : (?! "x" ) z{1,4} | ;
        }"#;
        let grammar = parse_grammar(src).unwrap();
        let printed = grammar.display().to_string();
        let reparsed = parse_grammar(&printed).unwrap();

        assert_eq!(grammar.name, reparsed.name);
        assert_eq!(grammar.productions.len(), reparsed.productions.len());
        for (a, b) in grammar.productions.iter().zip(&reparsed.productions) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.rules, b.rules, "{printed}");
        }
        assert_eq!(grammar.terminals.len(), reparsed.terminals.len());
        // printing is stable
        assert_eq!(reparsed.display().to_string(), printed);
    }

    #[test]
    fn display_layout() {
        let grammar = parse_grammar("grammar G { a : \"x\" \"y\" ; }").unwrap();
        assert_eq!(
            grammar.display().to_string(),
            "grammar G {\n    a : \"x\" \"y\" ;\n}"
        );
    }
}
