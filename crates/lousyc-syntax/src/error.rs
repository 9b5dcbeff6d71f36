//! Diagnostic rendering shared by the parser and (via re-export) the
//! checker: `spec.md` §6's two-line path/line/caret format.

use std::fmt;

use crate::token::Token;

/// A single diagnostic tied to one offending token.
///
/// Rendering is hand-written rather than routed through a generic
/// diagnostics crate, because the exact layout is a tested interface
/// (`spec.md` §6, §8) — see `SPEC_FULL.md` §2.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub path: String,
    pub token: Token,
    pub message: String,
    line_text: String,
    caret_column: usize,
}

impl Diagnostic {
    pub fn new(path: &str, source: &str, token: Token, message: impl Into<String>) -> Self {
        let bytes = source.as_bytes();
        let mut line_start = token.start as usize;

        while line_start != 0 && bytes[line_start - 1] != b'\n' {
            line_start -= 1;
        }

        while line_start < bytes.len() && (bytes[line_start] as char).is_whitespace() {
            line_start += 1;
        }

        let mut line_end = line_start;
        while line_end < bytes.len() && bytes[line_end] != b'\n' {
            line_end += 1;
        }

        let line_text = source[line_start..line_end].to_string();
        let caret_column = (token.start as usize).saturating_sub(line_start);

        Diagnostic {
            path: path.to_string(),
            token,
            message: message.into(),
            line_text,
            caret_column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = format!("{}({}): error: ", self.path, self.token.line);
        writeln!(f, "{prefix}{}", self.line_text)?;
        write!(
            f,
            "{:>width$}^ {}",
            "",
            self.message,
            width = prefix.len() + self.caret_column
        )
    }
}

/// Errors raised while parsing. Each carries the token and rendered message
/// needed to build a [`Diagnostic`]; parsing aborts on the first error
/// (`spec.md` §7: "no recovery").
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("expected an expression")]
    ExpectedExpression { token: Token },

    #[error("{expected}")]
    UnexpectedToken { token: Token, expected: String },

    #[error("no matching '}}' to close this block")]
    UnterminatedBlock { lbrace: Token },

    #[error("an else clause must be followed by an if statement or a block")]
    DanglingElse { token: Token },
}

impl ParseError {
    /// The token this error should be reported against.
    pub fn token(&self) -> Token {
        match self {
            ParseError::ExpectedExpression { token } => *token,
            ParseError::UnexpectedToken { token, .. } => *token,
            ParseError::UnterminatedBlock { lbrace } => *lbrace,
            ParseError::DanglingElse { token } => *token,
        }
    }

    pub fn diagnostic(&self, path: &str, source: &str) -> Diagnostic {
        Diagnostic::new(path, source, self.token(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn caret_aligns_under_the_token() {
        let source = "x = 1 = 2;";
        let token = Token::new(TokenKind::Integer, 4, 1, 1);
        let diag = Diagnostic::new("t.lousy", source, token, "cannot assign this value");
        let rendered = diag.to_string();
        let mut lines = rendered.lines();
        let first = lines.next().unwrap();
        let second = lines.next().unwrap();
        let caret_pos = second.find('^').unwrap();
        assert_eq!(first.chars().nth(caret_pos), Some('1'));
    }
}
