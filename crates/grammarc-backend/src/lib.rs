pub mod check;
pub mod error;
pub mod generator;

use error::ErrorAccumulator;
use generator::Generator;
use grammarc::Grammar;

pub struct Compiled {
    pub grammar: Grammar,
    pub generator: Generator,
}

/// Runs the checks over a parsed grammar, their diagnostics land in `err`.
pub fn compile(grammar: Grammar, err: &ErrorAccumulator) -> Compiled {
    check::check_duplicate_productions(&grammar, err);
    check::check_references(&grammar, err);

    let generator = Generator::new(&grammar);
    Compiled { grammar, generator }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_collects_and_checks() {
        let grammar = grammarc::parse_grammar("grammar G { a : b* ; a : 'x' ; }").unwrap();
        let err = ErrorAccumulator::new();
        let compiled = compile(grammar, &err);
        assert_eq!(compiled.generator.productions().len(), 2);
        assert_eq!(compiled.generator.terminals().len(), 2);
        // duplicate 'a' and the missing 'b'
        assert_eq!(err.get().len(), 2);
        assert!(err.has_errors());
    }
}
