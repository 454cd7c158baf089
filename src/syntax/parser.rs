//! deflang Parser - hand-written, character-level recursive descent.
//!
//! The parser owns one forward-only byte cursor and a running line counter for the
//! duration of a single parse. Calls and argument lists first pre-scan for their
//! matching close delimiter, then recurse into the enclosed span, so every nested
//! parse is bounded by the span of its parent.
//!
//! Every grammar character is ASCII; anything else is reported as unexpected.

use crate::ast::{Arg, ArgList, Call, CallName, Float, Int, Node, Operator, Term};
use crate::diagnostics::{to_error_source, SourceArc, Span};
use crate::{err_ctx, DeflangError};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Deepest nesting of calls and argument lists a parse accepts.
pub const MAX_DEPTH: usize = 256;

/// Parser state for one source text.
pub struct Parser<'src> {
    text: &'src str,
    bytes: &'src [u8],
    source: SourceArc,
    index: usize,
    line: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(name: &str, text: &'src str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            source: to_error_source(name, text),
            index: 0,
            line: 1,
            depth: 0,
        }
    }

    /// Parses the whole text into its top-level nodes.
    pub fn parse(mut self) -> Result<Vec<Node>, DeflangError> {
        let end = self.bytes.len();
        self.parse_from(0, end)
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Parses every node found in `start..end`.
    fn parse_from(&mut self, start: usize, end: usize) -> Result<Vec<Node>, DeflangError> {
        let mut nodes = Vec::new();
        self.index = start;

        while let Some(byte) = self.peek(end) {
            match byte {
                b' ' => self.index += 1,
                b'\n' => {
                    self.line += 1;
                    self.index += 1;
                }
                b'0'..=b'9' => nodes.push(self.parse_number(end)?),
                b'(' => nodes.push(self.parse_call(end)?.into()),
                b')' => return Err(self.unexpected()),
                b'[' => nodes.push(self.parse_arg_list(end)?.into()),
                b']' => return Err(self.unexpected()),
                _ => nodes.push(self.parse_op_or_term(end)?.into()),
            }
        }

        Ok(nodes)
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn parse_number(&mut self, end: usize) -> Result<Node, DeflangError> {
        let start = self.index;
        let line = self.line;
        let mut saw_dot = false;

        while let Some(byte) = self.peek(end) {
            match byte {
                b'0'..=b'9' => {}
                b'.' if saw_dot => {
                    return Err(self.error("invalid `.`; expected digit", self.index, 1));
                }
                b'.' => saw_dot = true,
                _ => break,
            }
            self.index += 1;
        }

        let tokens = &self.text[start..self.index];
        if saw_dot {
            Ok(Float::new(line, tokens).into())
        } else {
            Ok(Int::new(line, tokens).into())
        }
    }

    fn parse_op_or_term(&mut self, end: usize) -> Result<CallName, DeflangError> {
        self.skip_whitespace(end);

        if let Some(byte) = self.peek(end).filter(|b| is_operator(*b)) {
            let op = Operator::new(self.line, char::from(byte));
            self.index += 1;
            return Ok(CallName::Operator(op));
        }

        self.parse_term(end).map(CallName::Term)
    }

    fn parse_term(&mut self, end: usize) -> Result<Term, DeflangError> {
        self.skip_whitespace(end);
        let start = self.index;

        if self.peek(end).is_some_and(is_ident_start) {
            self.index += 1;
            while self.peek(end).is_some_and(is_ident_continue) {
                self.index += 1;
            }
        }

        if start == self.index {
            return Err(self.unexpected());
        }
        Ok(Term::new(self.line, &self.text[start..self.index]))
    }

    // ------------------------------------------------------------------------
    // Delimited forms
    // ------------------------------------------------------------------------

    fn parse_call(&mut self, end: usize) -> Result<Call, DeflangError> {
        let open = self.index;
        let line = self.line;
        self.enter(open)?;
        let close = self
            .find_close(open, end, b'(', b')')
            .ok_or_else(|| self.error("unmatched parentheses", open, 1))?;

        self.index = open + 1;
        let name = self.parse_op_or_term(close)?;
        let args = self.parse_from(self.index, close)?;
        self.index = close + 1;
        self.depth -= 1;

        Ok(Call::new(line, name, args))
    }

    fn parse_arg_list(&mut self, end: usize) -> Result<ArgList, DeflangError> {
        let open = self.index;
        let line = self.line;
        self.enter(open)?;
        let close = self
            .find_close(open, end, b'[', b']')
            .ok_or_else(|| self.error("unmatched square brackets", open, 1))?;

        self.index = open + 1;
        let mut args = Vec::new();
        self.skip_whitespace(close);
        while self.index < close {
            args.push(self.parse_arg(close)?);
            self.skip_whitespace(close);
        }
        self.index = close + 1;
        self.depth -= 1;

        Ok(ArgList::new(line, args))
    }

    /// Parses one `name:Type` entry.
    fn parse_arg(&mut self, end: usize) -> Result<Arg, DeflangError> {
        let start = self.index;
        let line = self.line;

        if self.peek(end).is_some_and(|b| is_ident_start(b) || b == b':') {
            self.index += 1;
            while self
                .peek(end)
                .is_some_and(|b| is_ident_continue(b) || b == b':')
            {
                self.index += 1;
            }
        }
        if start == self.index {
            return Err(self.unexpected());
        }

        let text = &self.text[start..self.index];
        let width = self.index - start;
        let parts: Vec<&str> = text.split(':').collect();
        let (name, ty) = match parts.as_slice() {
            [name, ty] => (*name, *ty),
            [_] => {
                return Err(self.error_with_help(
                    format!("expected a colon (:) in argument `{text}`"),
                    start,
                    width,
                ))
            }
            _ => {
                return Err(self.error_with_help(
                    "too many colon (:) characters",
                    start,
                    width,
                ))
            }
        };
        if name.is_empty() || ty.is_empty() {
            return Err(self.error_with_help(
                format!("argument `{text}` needs both a name and a type"),
                start,
                width,
            ));
        }
        if !ty.bytes().next().is_some_and(is_ident_start) {
            return Err(self.error(
                format!("invalid type name `{ty}`; expected a letter first"),
                start + name.len() + 1,
                ty.len(),
            ));
        }

        Ok(Arg::new(line, Term::new(line, name), Term::new(line, ty)))
    }

    // ------------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------------

    fn peek(&self, end: usize) -> Option<u8> {
        if self.index < end {
            self.bytes.get(self.index).copied()
        } else {
            None
        }
    }

    /// Opens one nesting level for the delimiter at `open`.
    ///
    /// Any error ends the parse, so callers only close the level on success.
    fn enter(&mut self, open: usize) -> Result<(), DeflangError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error(
                format!("nesting too deep; at most {MAX_DEPTH} levels are allowed"),
                open,
                1,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_whitespace(&mut self, end: usize) {
        while let Some(byte) = self.peek(end) {
            match byte {
                b' ' => {}
                b'\n' => self.line += 1,
                _ => break,
            }
            self.index += 1;
        }
    }

    /// Index of the delimiter closing the one at `open`, searching no further than `end`.
    fn find_close(&self, open: usize, end: usize, open_byte: u8, close_byte: u8) -> Option<usize> {
        let mut depth = 0usize;
        for (index, &byte) in self.bytes.iter().enumerate().take(end).skip(open) {
            if byte == open_byte {
                depth += 1;
            } else if byte == close_byte {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------

    fn error(&self, message: impl Into<String>, start: usize, len: usize) -> DeflangError {
        let message: String = message.into();
        err_ctx!(
            Parse,
            message,
            self.line,
            &self.source,
            Span::new(start, start + len)
        )
    }

    fn error_with_help(&self, message: impl Into<String>, start: usize, len: usize) -> DeflangError {
        let message: String = message.into();
        err_ctx!(
            Parse,
            message,
            self.line,
            &self.source,
            Span::new(start, start + len),
            "argument entries are written `name:Type`, e.g. `[x:Int y:Float]`"
        )
    }

    /// Reports the character under the cursor, ignoring span bounds.
    fn unexpected(&self) -> DeflangError {
        match self.text.get(self.index..).and_then(|rest| rest.chars().next()) {
            Some(c) => self.error(
                format!("unexpected `{}`", c.escape_debug()),
                self.index,
                c.len_utf8(),
            ),
            None => self.error("unexpected end of input", self.index, 0),
        }
    }
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

fn is_operator(byte: u8) -> bool {
    matches!(byte, b'+' | b'-' | b'/' | b'*' | b'%')
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic()
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorType;

    fn parse(source: &str) -> Result<Vec<Node>, DeflangError> {
        Parser::new("test", source).parse()
    }

    fn parse_err(source: &str) -> DeflangError {
        match parse(source) {
            Ok(nodes) => panic!("expected `{source}` to fail, got {nodes:?}"),
            Err(e) => e,
        }
    }

    /// `depth` calls named `a`, nested around `inner`.
    fn nested(depth: usize, inner: &str) -> String {
        format!("{}{inner}{}", "(a ".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_nesting_up_to_limit_parses() {
        assert_eq!(parse(&nested(MAX_DEPTH, "")).unwrap().len(), 1);
        assert!(parse(&nested(MAX_DEPTH - 1, "[x:Int]")).is_ok());
    }

    #[test]
    fn test_nesting_past_limit_is_parse_error() {
        let err = parse_err(&nested(MAX_DEPTH + 1, ""));
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert!(err.message().starts_with("nesting too deep"));
        assert_eq!(
            err.span(),
            Some(Span::new(3 * MAX_DEPTH, 3 * MAX_DEPTH + 1))
        );

        let err = parse_err(&nested(MAX_DEPTH, "[x:Int]"));
        assert!(err.message().starts_with("nesting too deep"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  \n \n").unwrap().is_empty());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("42").unwrap(), vec![Node::Int(Int::new(1, "42"))]);
        assert_eq!(parse("3.14").unwrap(), vec![Node::Float(Float::new(1, "3.14"))]);
    }

    #[test]
    fn test_second_dot_fails() {
        let err = parse_err("1.2.3");
        assert_eq!(err.message(), "invalid `.`; expected digit");
        assert_eq!(err.span(), Some(Span::new(3, 4)));
    }

    #[test]
    fn test_operator_and_term() {
        let nodes = parse("- foo_1").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Operator(Operator::new(1, '-')),
                Node::Term(Term::new(1, "foo_1")),
            ]
        );
    }

    #[test]
    fn test_term_must_start_with_letter() {
        let err = parse_err("_x");
        assert_eq!(err.message(), "unexpected `_`");
    }

    #[test]
    fn test_stray_delimiters() {
        assert_eq!(parse_err("a)").message(), "unexpected `)`");
        assert_eq!(parse_err("]").message(), "unexpected `]`");
    }

    #[test]
    fn test_empty_call_fails() {
        assert_eq!(parse_err("()").message(), "unexpected `)`");
    }

    #[test]
    fn test_call_with_operator_name_touching_args() {
        let nodes = parse("(+(f 1)2)").unwrap();
        let Node::Call(call) = &nodes[0] else {
            panic!("expected a call");
        };
        assert_eq!(call.name.text(), "+");
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.args[1], Node::Int(Int::new(1, "2")));
    }

    #[test]
    fn test_lines_count_newlines() {
        let nodes = parse("a\n\nb\n  (c\n d)").unwrap();
        let lines: Vec<usize> = nodes.iter().map(Node::line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
        let Node::Call(call) = &nodes[2] else {
            panic!("expected a call");
        };
        assert_eq!(call.args[0].line(), 5);
    }

    #[test]
    fn test_unmatched_delimiters() {
        let err = parse_err("(a b");
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert_eq!(err.message(), "unmatched parentheses");
        assert_eq!(err.span(), Some(Span::new(0, 1)));

        assert_eq!(parse_err("[x:Int").message(), "unmatched square brackets");
    }

    #[test]
    fn test_bracket_match_is_bounded_by_call() {
        assert_eq!(parse_err("(f [x:Int)]").message(), "unmatched square brackets");
    }

    #[test]
    fn test_arg_entries() {
        let nodes = parse("[x:Int\n y:Float]").unwrap();
        let expected = ArgList::new(
            1,
            vec![
                Arg::new(1, Term::new(1, "x"), Term::new(1, "Int")),
                Arg::new(2, Term::new(2, "y"), Term::new(2, "Float")),
            ],
        );
        assert_eq!(nodes, vec![Node::ArgList(expected)]);
        assert_eq!(parse("[]").unwrap(), vec![Node::ArgList(ArgList::new(1, vec![]))]);
    }

    #[test]
    fn test_arg_colon_arity() {
        assert_eq!(
            parse_err("[x:Int:Extra]").message(),
            "too many colon (:) characters"
        );
        assert!(parse_err("[x]").message().contains("expected a colon"));
        assert!(parse_err("[:Int]").message().contains("needs both a name and a type"));
        assert!(parse_err("[x:]").message().contains("needs both a name and a type"));
        assert!(parse_err("[x:1nt]").message().contains("invalid type name"));
    }

    #[test]
    fn test_arg_list_rejects_nested_forms() {
        assert_eq!(parse_err("[x:Int (f)]").message(), "unexpected `(`");
    }

    #[test]
    fn test_unrecognised_whitespace() {
        assert_eq!(parse_err("a\tb").message(), "unexpected `\\t`");
    }

    #[test]
    fn test_non_ascii_is_unexpected() {
        let err = parse_err("(f é)");
        assert_eq!(err.message(), "unexpected `é`");
        assert_eq!(err.span(), Some(Span::new(3, 5)));
    }

    #[test]
    fn test_error_reports_current_line() {
        assert_eq!(parse_err("(a\n\n $)").line(), Some(3));
    }
}
