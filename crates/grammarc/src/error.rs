use std::fmt::Display;

use grammarc_runtime::Position;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Error {
    Lex(grammarc_runtime::Error),
    /// The regex engine rejected the text between the slashes.
    InvalidRegex {
        source: String,
        message: String,
        position: Position,
    },
    InvalidRegexFlag { flag: char, position: Position },
    /// `{m,n}` with `m > n`
    InvalidRange {
        lower: u64,
        upper: u64,
        position: Position,
    },
}

impl Error {
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Lex(err) => err.position(),
            Error::InvalidRegex { position, .. }
            | Error::InvalidRegexFlag { position, .. }
            | Error::InvalidRange { position, .. } => Some(*position),
        }
    }
}

impl From<grammarc_runtime::Error> for Error {
    fn from(value: grammarc_runtime::Error) -> Self {
        Error::Lex(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Lex(err) => err.fmt(f),
            Error::InvalidRegex {
                source,
                message,
                position,
            } => write!(f, "Invalid regex /{source}/ at {position}: {message}"),
            Error::InvalidRegexFlag { flag, position } => {
                write!(f, "Unknown regex flag {flag:?} at {position}")
            }
            Error::InvalidRange {
                lower,
                upper,
                position,
            } => write!(
                f,
                "Invalid repetition range {{{lower},{upper}}} at {position}, lower bound exceeds upper"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(err) => Some(err),
            _ => None,
        }
    }
}
