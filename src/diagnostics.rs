//! Unified, `miette`-based diagnostics for the deflang front end.
//!
//! Every failure the parser or the rewrite engine can produce is a [`DeflangError`].
//! Errors are fatal: the first one aborts the current `parse` or `rewrite` call.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for message-only errors** (no line, no source).
//!   - `err_msg!(Internal, "unreachable tree shape")`
//!
//! - **Use `err_ctx!` when the line is known**, optionally with a source and span.
//!   - `err_ctx!(Validation, "expected a valid name", line)`
//!   - `err_ctx!(Parse, "unmatched parentheses", line, &src, span)`
//!   - `err_ctx!(Parse, "unmatched parentheses", line, &src, span, help)`
//!
//! Pass `src` by reference; the macro clones the `Arc` internally.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

/// Byte range in the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covering the whole of 1-based line `line`, excluding the newline.
    pub fn of_line(source: &str, line: usize) -> Option<Self> {
        let mut start = 0;
        for (index, text) in source.split('\n').enumerate() {
            if index + 1 == line {
                return Some(Self::new(start, start + text.len()));
            }
            start += text.len() + 1;
        }
        None
    }

    fn len(&self) -> usize {
        if self.end > self.start {
            self.end - self.start
        } else {
            1
        }
    }
}

/// Type-safe error classification corresponding to the `DeflangError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Lexical, delimiter and arg-entry shape errors raised while parsing.
    Parse,
    /// Shape errors raised by the `def` expansion.
    Validation,
    /// A rewrite handler broke the closure invariant of its variant.
    Structural,
    /// Reading input failed.
    Io,
    /// Unreachable tree shapes.
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::Validation => "Validation",
            ErrorType::Structural => "Structural",
            ErrorType::Io => "Io",
            ErrorType::Internal => "Internal",
        }
    }

    /// Stable diagnostic code reported through `miette`.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorType::Parse => "deflang::parse",
            ErrorType::Validation => "deflang::validation",
            ErrorType::Structural => "deflang::structural",
            ErrorType::Io => "deflang::io",
            ErrorType::Internal => "deflang::internal",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source, span and help attached to an error for rendering.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

/// Unified error type for every deflang failure mode.
#[derive(Debug, Error)]
pub enum DeflangError {
    #[error("Parse error: {}", located(.message, .line))]
    Parse {
        message: String,
        line: Option<usize>,
        ctx: ErrorContext,
    },
    #[error("Validation error: {}", located(.message, .line))]
    Validation {
        message: String,
        line: Option<usize>,
        ctx: ErrorContext,
    },
    #[error("Structural error: {}", located(.message, .line))]
    Structural {
        message: String,
        line: Option<usize>,
        ctx: ErrorContext,
    },
    #[error("I/O error: {}", located(.message, .line))]
    Io {
        message: String,
        line: Option<usize>,
        ctx: ErrorContext,
    },
    #[error("Internal error: {}", located(.message, .line))]
    Internal {
        message: String,
        line: Option<usize>,
        ctx: ErrorContext,
    },
}

fn located(message: &str, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("Line {line}: {message}"),
        None => message.to_string(),
    }
}

impl DeflangError {
    fn parts(&self) -> (&str, Option<usize>, &ErrorContext) {
        match self {
            DeflangError::Parse { message, line, ctx }
            | DeflangError::Validation { message, line, ctx }
            | DeflangError::Structural { message, line, ctx }
            | DeflangError::Io { message, line, ctx }
            | DeflangError::Internal { message, line, ctx } => (message, *line, ctx),
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            DeflangError::Parse { ctx, .. }
            | DeflangError::Validation { ctx, .. }
            | DeflangError::Structural { ctx, .. }
            | DeflangError::Io { ctx, .. }
            | DeflangError::Internal { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            DeflangError::Parse { .. } => ErrorType::Parse,
            DeflangError::Validation { .. } => ErrorType::Validation,
            DeflangError::Structural { .. } => ErrorType::Structural,
            DeflangError::Io { .. } => ErrorType::Io,
            DeflangError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// The diagnostic message without the class prefix or line.
    pub fn message(&self) -> &str {
        self.parts().0
    }

    /// The line on which the failing construct began, when known.
    pub fn line(&self) -> Option<usize> {
        self.parts().1
    }

    pub fn span(&self) -> Option<Span> {
        self.parts().2.span
    }

    /// Attaches the source text so the error renders with a snippet.
    ///
    /// Errors raised after parsing only know their line; for those the whole
    /// line is labelled. An existing source is left untouched.
    pub fn with_source(mut self, name: &str, text: &str) -> Self {
        if self.parts().2.source.is_some() {
            return self;
        }
        let line = self.line();
        let ctx = self.ctx_mut();
        ctx.source = Some(to_error_source(name, text));
        if ctx.span.is_none() {
            ctx.span = line.and_then(|line| Span::of_line(text, line));
        }
        self
    }
}

impl Diagnostic for DeflangError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.error_type().code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.parts()
            .2
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.parts()
            .2
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let (message, _, ctx) = self.parts();
        // A label without source code would make miette fail to render.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let label = LabeledSpan::new(Some(message.to_string()), span.start, span.len());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Wraps source text into a named source for error contexts.
pub fn to_error_source(name: &str, text: &str) -> SourceArc {
    Arc::new(NamedSource::new(name, text.to_string()))
}

/// Constructs a `DeflangError` variant with a message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:expr) => {
        $crate::DeflangError::$variant {
            message: format!("{}", $msg),
            line: None,
            ctx: $crate::ErrorContext::none(),
        }
    };
    ($variant:ident, $fmt:expr, $($arg:expr),+) => {
        $crate::DeflangError::$variant {
            message: format!($fmt, $($arg),+),
            line: None,
            ctx: $crate::ErrorContext::none(),
        }
    };
}

/// Constructs a `DeflangError` variant carrying a line and, optionally, a source,
/// span and help message.
#[macro_export]
macro_rules! err_ctx {
    // Message, line, src, span, help
    ($variant:ident, $msg:expr, $line:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::DeflangError::$variant {
            message: $msg.to_string(),
            line: Some($line),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
        }
    };
    // Message, line, src, span
    ($variant:ident, $msg:expr, $line:expr, $src:expr, $span:expr) => {
        $crate::DeflangError::$variant {
            message: $msg.to_string(),
            line: Some($line),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::SourceArc::clone($src),
                $span,
            ),
        }
    };
    // Message, line, help
    ($variant:ident, $msg:expr, $line:expr, help = $help:expr) => {
        $crate::DeflangError::$variant {
            message: $msg.to_string(),
            line: Some($line),
            ctx: $crate::ErrorContext {
                source: None,
                span: None,
                help: Some(format!("{}", $help)),
            },
        }
    };
    // Message, line
    ($variant:ident, $msg:expr, $line:expr) => {
        $crate::DeflangError::$variant {
            message: $msg.to_string(),
            line: Some($line),
            ctx: $crate::ErrorContext::none(),
        }
    };
}
