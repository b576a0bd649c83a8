use std::{borrow::Cow, cell::RefCell, fmt::Display};

use grammarc_runtime::{Source, Span, Spanned};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: Cow<'static, str>,
}

/// Collects diagnostics that do not stop compilation.
#[derive(Default)]
pub struct ErrorAccumulator {
    errors: RefCell<Vec<Spanned<Diagnostic>>>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
    fn push(&self, span: Span, severity: Severity, message: Cow<'static, str>) {
        log::debug!("{severity} at {span}: {message}");
        self.errors
            .borrow_mut()
            .push(Spanned::new(Diagnostic { severity, message }, span));
    }
    pub fn error_static(&self, span: Span, err: &'static str) {
        self.push(span, Severity::Error, err.into());
    }
    pub fn error(&self, span: Span, err: impl ToString) {
        self.push(span, Severity::Error, err.to_string().into());
    }
    pub fn warning(&self, span: Span, warning: impl ToString) {
        self.push(span, Severity::Warning, warning.to_string().into());
    }
    pub fn get(&self) -> std::cell::Ref<Vec<Spanned<Diagnostic>>> {
        self.errors.borrow()
    }
    pub fn has_errors(&self) -> bool {
        self.errors
            .borrow()
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }
    pub fn clear(&self) {
        self.errors.borrow_mut().clear();
    }
    /// One `path:line:column severity: message` line per diagnostic, in the order they were reported.
    pub fn render(&self, path: &str, source: &Source) -> String {
        let mut out = String::new();
        for diagnostic in self.get().iter() {
            let position = source.position(diagnostic.span.start);
            out.push_str(&format!(
                "{path}:{position} {}: {}\n",
                diagnostic.severity, diagnostic.message
            ));
        }
        out
    }
}
