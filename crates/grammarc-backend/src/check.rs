use std::collections::HashMap;

use grammarc::{
    visit::{walk_component, Visitor},
    Component, Grammar, Terminal, TerminalId,
};
use grammarc_runtime::Span;

use crate::error::ErrorAccumulator;

pub fn check_duplicate_productions(grammar: &Grammar, err: &ErrorAccumulator) {
    let mut defined: HashMap<&str, Span> = HashMap::new();
    for production in &grammar.productions {
        if defined.insert(&production.name, production.span).is_some() {
            err.error(
                production.span,
                format_args!("Production '{}' is defined more than once", production.name),
            );
        }
    }
}

/// Identifiers that name no production are reported as warnings, they may refer to tokens the
/// generated parser receives from elsewhere.
pub fn check_references(grammar: &Grammar, err: &ErrorAccumulator) {
    let mut check = ReferenceCheck {
        grammar,
        span: grammar.span,
        err,
    };
    check.visit_grammar(grammar);
}

struct ReferenceCheck<'a> {
    grammar: &'a Grammar,
    /// Innermost component being visited.
    span: Span,
    err: &'a ErrorAccumulator,
}

impl Visitor for ReferenceCheck<'_> {
    fn visit_component(&mut self, grammar: &Grammar, component: &Component) {
        let outer = std::mem::replace(&mut self.span, component.span);
        walk_component(self, grammar, component);
        self.span = outer;
    }
    fn visit_terminal(&mut self, _id: TerminalId, terminal: &Terminal) {
        if let Terminal::Ident(name) = terminal {
            if self.grammar.production(name).is_none() {
                self.err.warning(
                    self.span,
                    format_args!("'{name}' does not name a production"),
                );
            }
        }
    }
}
