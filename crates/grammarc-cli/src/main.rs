use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use grammarc_backend::{error::ErrorAccumulator, Compiled};
use grammarc_runtime::{Source, Token};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorReporting {
    On,
    Off,
}

#[derive(Debug)]
struct Options {
    tokens: bool,
    ast: bool,
    terminals: bool,
    productions: bool,
    errors: ErrorReporting,
    path: PathBuf,
}

impl Options {
    fn parse<'a>(args: impl IntoIterator<Item = &'a str>) -> anyhow::Result<Options> {
        let mut tokens = false;
        let mut ast = false;
        let mut terminals = false;
        let mut productions = false;
        let mut errors = ErrorReporting::On;

        let mut files = Vec::new();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            match arg {
                "--tokens" => tokens = true,
                "--ast" => ast = true,
                "--terminals" => terminals = true,
                "--productions" => productions = true,
                "--errors" => match iter.next() {
                    Some("on") => errors = ErrorReporting::On,
                    Some("off") => errors = ErrorReporting::Off,
                    Some(other) => bail!("Unexpected argument to --errors: '{other}'"),
                    None => bail!("Expected 'on' or 'off' after --errors"),
                },
                _ if arg.starts_with("--") => bail!("Unknown flag '{arg}'"),
                _ => files.push(arg),
            }
        }

        let path = match files.as_slice() {
            [] => bail!("No file provided"),
            [path] => PathBuf::from(path),
            _ => bail!("Only one file may be provided"),
        };

        Ok(Options {
            tokens,
            ast,
            terminals,
            productions,
            errors,
            path,
        })
    }
}

fn main() {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_owned());
    let level = log::LevelFilter::from_str(&level).unwrap_or(log::LevelFilter::Warn);

    if let Err(err) = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    ) {
        eprintln!("Failed to initialize logging: {err}");
    }

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

/// `Ok(false)` when the grammar failed to compile, the diagnostics are already printed.
fn run() -> anyhow::Result<bool> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let options = Options::parse(args.iter().map(String::as_str))?;

    let src = std::fs::read_to_string(&options.path)
        .with_context(|| format!("Failed to read `{}`", options.path.display()))?;
    let file = options.path.display();

    let (grammar, tokens) = match grammarc::parse_grammar_with_tokens(&src) {
        Ok(ok) => ok,
        Err(err) => {
            if options.errors == ErrorReporting::On {
                match err.position() {
                    Some(position) => eprintln!("{file}:{position} {err}"),
                    None => eprintln!("{file}: {err}"),
                }
            }
            return Ok(false);
        }
    };

    let err = ErrorAccumulator::new();
    let Compiled { grammar, generator } = grammarc_backend::compile(grammar, &err);

    if options.errors == ErrorReporting::On {
        let source = Source::new(src.as_str());
        eprint!("{}", err.render(&file.to_string(), &source));
    }

    if options.tokens {
        for set in &tokens {
            println!("{}", display_token_set(set));
        }
    }

    if options.ast {
        println!("{}", grammar.display());
    }

    if options.terminals {
        for (id, terminal) in generator.iter_terminals(&grammar) {
            println!("{id} {} {}", terminal.kind_name(), terminal.display());
        }
    }

    if options.productions {
        for name in generator.productions() {
            println!("{name}");
        }
    }

    Ok(!err.has_errors())
}

fn display_token_set(set: &[Token]) -> String {
    let Some(first) = set.first() else {
        return String::new();
    };
    let rules = set.iter().map(Token::rule).collect::<Vec<_>>().join("|");
    format!("{} {rules} {:?}", first.position(), first.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_path() {
        let options =
            Options::parse(["--tokens", "g.gr", "--errors", "off", "--productions"]).unwrap();
        assert!(options.tokens);
        assert!(!options.ast);
        assert!(options.productions);
        assert_eq!(options.errors, ErrorReporting::Off);
        assert_eq!(options.path, PathBuf::from("g.gr"));
    }

    #[test]
    fn bad_arguments() {
        let message = |args: &[&str]| Options::parse(args.iter().copied()).unwrap_err().to_string();
        assert_eq!(message(&[]), "No file provided");
        assert_eq!(message(&["a", "b"]), "Only one file may be provided");
        assert_eq!(message(&["--errors", "eager", "a"]), "Unexpected argument to --errors: 'eager'");
        assert_eq!(message(&["--dot", "a"]), "Unknown flag '--dot'");
    }

    #[test]
    fn token_sets_print_every_rule() {
        let (_, tokens) = grammarc::parse_grammar_with_tokens("grammar G {\n}").unwrap();
        let lines: Vec<_> = tokens.iter().map(|set| display_token_set(set)).collect();
        assert_eq!(lines, ["1:1 grammar|ident \"grammar\"", "1:9 ident \"G\"", "1:11 { \"{\"", "2:1 } \"}\""]);
    }
}
