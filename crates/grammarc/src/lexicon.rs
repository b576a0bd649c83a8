//! Token rules of the grammar description language.
//!
//! Three modes share one [`RuleTable`]: the top level syntax, the inside of a `/regex/` literal and
//! the inside of a `{ code }` block. The parser switches between them.

use std::rc::Rc;

use grammarc_runtime::{Error, LexerCompiler, RuleSpec, RuleTable};

use crate::literal::{decode_number, decode_string};

pub const REGEX_MODE: &str = "regex";
pub const CODE_MODE: &str = "code";

pub const IDENT: &str = "ident";
pub const NUMBER: &str = "number";
pub const STRING: &str = "string";
pub const GRAMMAR: &str = "grammar";

/// Any single character of a regex that has no special meaning.
pub const REGEX_CHAR: &str = "regex_char";
pub const REGEX_ESCAPE: &str = "regex_escape";
/// `{m}`, `{m,}` or `{m,n}` after a regex atom.
pub const REGEX_REPEAT: &str = "regex_repeat";
/// `(?i)` and friends, no quantifier allowed.
pub const REGEX_INLINE_FLAGS: &str = "regex_inline_flags";
/// `(?i:`, `(?:` and `(?<name>` all open a group that captures or not.
pub const REGEX_GROUP_OPEN: &str = "regex_group_open";

pub const CODE_TEXT: &str = "code_text";
pub const CODE_STRING: &str = "code_string";
pub const CODE_COMMENT: &str = "code_comment";
/// A quote that opens no string or char literal, `'a` lifetimes for example.
pub const CODE_QUOTE: &str = "code_quote";

const PUNCTUATION: &[&str] = &[
    "{", "}", "(", ")", "(?=", "(?!", "|", ":", ";", "=", "~", "?", "*", "+", ",", "/",
];

const REGEX_PUNCTUATION: &[&str] = &[
    "/", "|", "(", ")", "(?=", "(?!", "(?<=", "(?<!", "[", "[^", "]", "-", "*", "+", "?", "^",
    "$", ".",
];

pub fn compile() -> Result<RuleTable, Error> {
    let mut compiler = LexerCompiler::new("grammar");

    compiler
        .add_rule(RuleSpec::regex("whitespace", r"\s+").ignore())
        .add_rule(RuleSpec::regex("line_comment", r"//[^\n]*").ignore())
        .add_rule(RuleSpec::regex("block_comment", r"/\*(?s:.*?)\*/").ignore())
        .add_rule(RuleSpec::literal(GRAMMAR, "grammar"))
        .add_rule(RuleSpec::regex(IDENT, "[a-zA-Z_][a-zA-Z0-9_]*"))
        .add_rule(RuleSpec::regex(NUMBER, "[0-9]+").decode(decode_number))
        .add_rule(
            RuleSpec::regex(STRING, r#""(?:[^"\\]|\\(?s:.))*"|'(?:[^'\\]|\\(?s:.))*'"#)
                .decode(decode_string),
        );
    for &punct in PUNCTUATION {
        compiler.add_rule(RuleSpec::literal(punct, punct));
    }

    for &punct in REGEX_PUNCTUATION {
        compiler.add_rule(RuleSpec::literal(punct, punct).mode(REGEX_MODE));
    }
    compiler
        .add_rule(
            RuleSpec::regex(
                REGEX_ESCAPE,
                r"\\(?:x[0-9a-fA-F]{2}|x\{[0-9a-fA-F]+\}|u[0-9a-fA-F]{4}|u\{[0-9a-fA-F]+\}|[pP]\{[^}]*\}|(?s:.))",
            )
            .mode(REGEX_MODE),
        )
        .add_rule(RuleSpec::regex(REGEX_REPEAT, r"\{[0-9]+(?:,[0-9]*)?\}").mode(REGEX_MODE))
        .add_rule(RuleSpec::regex(REGEX_INLINE_FLAGS, r"\(\?[a-zA-Z-]+\)").mode(REGEX_MODE))
        .add_rule(
            RuleSpec::regex(REGEX_GROUP_OPEN, r"\(\?(?:[a-zA-Z-]*:|P?<[a-zA-Z_][a-zA-Z0-9_]*>)")
                .mode(REGEX_MODE),
        )
        .add_rule(RuleSpec::regex(REGEX_CHAR, r"[^\\/|()\[\]\-*+?^$.]").mode(REGEX_MODE));

    compiler
        .add_rule(RuleSpec::literal("{", "{").mode(CODE_MODE))
        .add_rule(RuleSpec::literal("}", "}").mode(CODE_MODE))
        .add_rule(RuleSpec::literal("/", "/").mode(CODE_MODE))
        .add_rule(RuleSpec::regex(CODE_TEXT, r#"[^{}"'/]+"#).mode(CODE_MODE))
        .add_rule(
            RuleSpec::regex(
                CODE_STRING,
                r#""(?:[^"\\]|\\(?s:.))*"|'(?:[^'\\\n]|\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]+\}|.))'"#,
            )
            .mode(CODE_MODE),
        )
        .add_rule(RuleSpec::regex(CODE_QUOTE, r#"["']"#).mode(CODE_MODE))
        .add_rule(RuleSpec::regex(CODE_COMMENT, r"//[^\n]*|/\*(?s:.*?)\*/").mode(CODE_MODE));

    compiler.compile()
}

thread_local! {
    static TABLE: Result<Rc<RuleTable>, Error> = compile().map(Rc::new);
}

/// The shared rule table, compiled once per thread.
pub fn table() -> Result<Rc<RuleTable>, Error> {
    TABLE.with(Clone::clone)
}
