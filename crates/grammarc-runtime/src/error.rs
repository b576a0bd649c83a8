use std::{borrow::Cow, fmt::Display};

use crate::{source::Position, RcString};

/// Failures of lexer construction, scanning and token consumption. All of them are fatal.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// A rule's pattern was rejected by the regex engine.
    InvalidPattern { rule: RcString, message: String },
    /// Two literal rules of one mode would always tie.
    DuplicateLiteral {
        mode: RcString,
        literal: RcString,
        rules: [RcString; 2],
    },
    /// No rule of the active mode matches.
    InvalidToken { found: char, position: Position },
    /// Rules that tie for the longest match disagree on whether to ignore it.
    AmbiguousIgnore {
        text: String,
        rules: Vec<RcString>,
        position: Position,
    },
    /// A decode callback rejected the matched text.
    Decode {
        rule: RcString,
        text: String,
        message: Cow<'static, str>,
        position: Position,
    },
    UnexpectedToken {
        expected: Vec<String>,
        rule: RcString,
        text: String,
        position: Position,
    },
    UnexpectedEof {
        expected: Vec<String>,
        position: Position,
    },
    /// More than one of the requested rules matched the current token set.
    AmbiguousAlternative {
        text: String,
        rules: Vec<RcString>,
        position: Position,
    },
}

impl Error {
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::InvalidPattern { .. } | Error::DuplicateLiteral { .. } => None,
            Error::InvalidToken { position, .. }
            | Error::AmbiguousIgnore { position, .. }
            | Error::Decode { position, .. }
            | Error::UnexpectedToken { position, .. }
            | Error::UnexpectedEof { position, .. }
            | Error::AmbiguousAlternative { position, .. } => Some(*position),
        }
    }
}

struct Expected<'a>(&'a [String]);

impl Display for Expected<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            [] => f.write_str("nothing"),
            [one] => write!(f, "'{one}'"),
            [many @ ..] => {
                f.write_str("one of ")?;
                for (i, name) in many.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{name}'")?;
                }
                Ok(())
            }
        }
    }
}

struct RuleList<'a>(&'a [RcString]);

impl Display for RuleList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidPattern { rule, message } => {
                write!(f, "Invalid pattern for rule '{rule}': {message}")
            }
            Error::DuplicateLiteral {
                mode,
                literal,
                rules: [a, b],
            } => write!(
                f,
                "Rules '{a}' and '{b}' both match the literal {literal:?} in mode '{mode}'"
            ),
            Error::InvalidToken { found, position } => {
                write!(f, "Invalid token {found:?} at {position}")
            }
            Error::AmbiguousIgnore {
                text,
                rules,
                position,
            } => write!(
                f,
                "Ambiguous ignore vs non-ignore match {text:?} at {position} (rules {})",
                RuleList(rules)
            ),
            Error::Decode {
                rule,
                text,
                message,
                position,
            } => write!(f, "Invalid {rule} {text:?} at {position}: {message}"),
            Error::UnexpectedToken {
                expected,
                rule,
                text,
                position,
            } => write!(
                f,
                "Unexpected token at {position}. Expected {} found: '{text}' ({rule})",
                Expected(expected)
            ),
            Error::UnexpectedEof { expected, position } => write!(
                f,
                "Unexpected end of input at {position}. Expected {}",
                Expected(expected)
            ),
            Error::AmbiguousAlternative {
                text,
                rules,
                position,
            } => write!(
                f,
                "Ambiguous token '{text}' at {position} matches {}",
                RuleList(rules)
            ),
        }
    }
}

impl std::error::Error for Error {}
