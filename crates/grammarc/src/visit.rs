//! Depth-first traversal of a [`Grammar`].
//!
//! Every `visit_*` method defaults to walking into the node's children, so an implementation
//! overrides only what it cares about and calls the matching `walk_*` function to keep descending.

use crate::ast::{
    CodeSegment, Component, Element, Grammar, Production, Rule, Suffix, Terminal, TerminalId,
};

pub trait Visitor {
    fn visit_grammar(&mut self, grammar: &Grammar) {
        walk_grammar(self, grammar);
    }
    fn visit_production(&mut self, grammar: &Grammar, production: &Production) {
        walk_production(self, grammar, production);
    }
    fn visit_rule(&mut self, grammar: &Grammar, rule: &Rule) {
        walk_rule(self, grammar, rule);
    }
    fn visit_component(&mut self, grammar: &Grammar, component: &Component) {
        walk_component(self, grammar, component);
    }
    fn visit_element(&mut self, grammar: &Grammar, element: &Element) {
        walk_element(self, grammar, element);
    }
    fn visit_terminal(&mut self, _id: TerminalId, _terminal: &Terminal) {}
    fn visit_suffix(&mut self, _suffix: Suffix) {}
    fn visit_code(&mut self, _code: &CodeSegment) {}
}

pub fn walk_grammar<V: Visitor + ?Sized>(v: &mut V, grammar: &Grammar) {
    for production in &grammar.productions {
        v.visit_production(grammar, production);
    }
}

pub fn walk_production<V: Visitor + ?Sized>(
    v: &mut V,
    grammar: &Grammar,
    production: &Production,
) {
    for rule in &production.rules {
        v.visit_rule(grammar, rule);
    }
}

pub fn walk_rule<V: Visitor + ?Sized>(v: &mut V, grammar: &Grammar, rule: &Rule) {
    for component in &rule.components {
        v.visit_component(grammar, component);
    }
}

/// Children are visited in source order.
pub fn walk_component<V: Visitor + ?Sized>(
    v: &mut V,
    grammar: &Grammar,
    component: &Component,
) {
    if let Some(code) = &component.predicate {
        v.visit_code(code);
    }
    if let Some(code) = &component.prefix_code {
        v.visit_code(code);
    }
    v.visit_element(grammar, &component.element);
    for &suffix in &component.suffixes {
        v.visit_suffix(suffix);
    }
    if let Some(code) = &component.postfix_code {
        v.visit_code(code);
    }
}

pub fn walk_element<V: Visitor + ?Sized>(v: &mut V, grammar: &Grammar, element: &Element) {
    match element {
        Element::Terminal(id) => v.visit_terminal(*id, &grammar.terminals[*id]),
        Element::Compound(rules)
        | Element::ForwardAssertion(rules)
        | Element::NegativeAssertion(rules) => {
            for rule in rules {
                v.visit_rule(grammar, rule);
            }
        }
        Element::Negate(inner) => v.visit_element(grammar, inner),
    }
}
