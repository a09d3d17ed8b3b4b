use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

/// A line/column position in the source text, both 0-based.
///
/// Locations compare exactly; comparing AST shapes while ignoring positions
/// is done with `Expr::same_shape` rather than here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
}

impl Loc {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

#[derive(Debug, Clone)]
pub enum ErrorKind {
    LexError,
    ParseError,
    RuntimeError,
}

/// The crate-wide error type. Every syntax and runtime failure carries the
/// offending location; only the empty-input parse error has none.
#[derive(Debug, Clone)]
pub struct RillError {
    pub kind: ErrorKind,
    pub loc: Option<Loc>,
    pub message: String,
    pub help: Option<String>,
}

impl RillError {
    pub fn new(kind: ErrorKind, loc: Option<Loc>, message: String) -> Self {
        Self {
            kind,
            loc,
            message,
            help: None,
        }
    }

    pub fn new_with_help(kind: ErrorKind, loc: Option<Loc>, message: String, help: String) -> Self {
        Self {
            kind,
            loc,
            message,
            help: Some(help),
        }
    }

    pub fn lex_error(loc: Loc, message: String) -> Self {
        Self::new(ErrorKind::LexError, Some(loc), message)
    }

    pub fn parse_error(loc: Loc, message: String) -> Self {
        Self::new(ErrorKind::ParseError, Some(loc), message)
    }

    pub fn parse_error_with_help(loc: Loc, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::ParseError, Some(loc), message, help)
    }

    /// Parse failure with no meaningful position, e.g. an empty token list.
    pub fn parse_error_no_loc(message: String) -> Self {
        Self::new(ErrorKind::ParseError, None, message)
    }

    pub fn runtime_error(loc: Loc, message: String) -> Self {
        Self::new(ErrorKind::RuntimeError, Some(loc), message)
    }

    pub fn runtime_error_with_help(loc: Loc, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::RuntimeError, Some(loc), message, help)
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.kind {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::RuntimeError => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::RuntimeError => "Runtime Error",
        };

        let offset = self
            .loc
            .as_ref()
            .map(|loc| byte_offset(source, loc))
            .unwrap_or(0);
        let end = source.len().min(offset + 1);

        let mut report_builder = Report::build(ReportKind::Error, filename, offset)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, offset..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if report_builder
            .finish()
            .print((filename, Source::from(source)))
            .is_err()
        {
            eprintln!("{}", self);
        }
    }
}

/// Byte offset of a line/column position in `source`, clamped to its length.
fn byte_offset(source: &str, loc: &Loc) -> usize {
    let mut line = 0usize;
    let mut column = 0usize;
    for (i, ch) in source.char_indices() {
        if line == loc.line && column == loc.column {
            return i;
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    source.len()
}

impl fmt::Display for RillError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.loc {
            Some(ref loc) => write!(f, "{}: {}", loc, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RillError {}
