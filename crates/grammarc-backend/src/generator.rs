use cranelift_entity::EntitySet;
use grammarc::{
    visit::{walk_production, Visitor},
    Grammar, Production, Terminal, TerminalId,
};
use grammarc_runtime::RcString;

/// What a code generating backend needs from a grammar: every distinct terminal and every
/// production name, both in the order they first appear.
pub struct Generator {
    seen: EntitySet<TerminalId>,
    terminals: Vec<TerminalId>,
    productions: Vec<RcString>,
}

impl Generator {
    pub fn new(grammar: &Grammar) -> Generator {
        let mut this = Generator {
            seen: EntitySet::new(),
            terminals: Vec::new(),
            productions: Vec::new(),
        };
        this.visit_grammar(grammar);
        log::debug!(
            "Grammar '{}' has {} productions and {} distinct terminals",
            grammar.name,
            this.productions.len(),
            this.terminals.len()
        );
        this
    }
    pub fn terminals(&self) -> &[TerminalId] {
        &self.terminals
    }
    pub fn productions(&self) -> &[RcString] {
        &self.productions
    }
    pub fn iter_terminals<'a>(
        &'a self,
        grammar: &'a Grammar,
    ) -> impl Iterator<Item = (TerminalId, &'a Terminal)> + 'a {
        self.terminals.iter().map(|&id| (id, &grammar.terminals[id]))
    }
}

impl Visitor for Generator {
    fn visit_production(&mut self, grammar: &Grammar, production: &Production) {
        self.productions.push(production.name.clone());
        walk_production(self, grammar, production);
    }
    fn visit_terminal(&mut self, id: TerminalId, _terminal: &Terminal) {
        // canonical terminals share an id, so identity is all that is needed
        if !self.seen.contains(id) {
            self.seen.insert(id);
            self.terminals.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use grammarc::parse_grammar;

    use super::*;

    #[test]
    fn terminals_are_collected_once_in_encounter_order() {
        let grammar = parse_grammar(
            r#"grammar G {
                b : "x" a ("x" | /y/)* ;
                a : 'x' b ~a 1 ;
            }"#,
        )
        .unwrap();
        let generator = Generator::new(&grammar);

        let terminals: Vec<String> = generator
            .iter_terminals(&grammar)
            .map(|(_, terminal)| terminal.display().to_string())
            .collect();
        assert_eq!(terminals, ["\"x\"", "a", "/y/", "b", "1"]);

        let productions: Vec<&str> = generator.productions().iter().map(|p| &**p).collect();
        assert_eq!(productions, ["b", "a"]);
    }

    #[test]
    fn empty_grammar() {
        let grammar = parse_grammar("grammar Empty {}").unwrap();
        let generator = Generator::new(&grammar);
        assert!(generator.terminals().is_empty());
        assert!(generator.productions().is_empty());
    }
}
