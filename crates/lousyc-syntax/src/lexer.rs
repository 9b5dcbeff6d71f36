//! Single-pass lexer. Total: every byte of input produces some token, so
//! there is no lex-error variant (`spec.md` §7: "currently none; lexer is
//! total").

use crate::token::{Token, TokenKind, Tokens};

fn is_ident_start(c: u8) -> bool {
    c == b'_' || c.is_ascii_lowercase()
}

fn is_ident_continue(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphanumeric()
}

fn keyword_kind(text: &str) -> TokenKind {
    match text {
        "if" => TokenKind::KwIf,
        "else" => TokenKind::KwElse,
        "while" => TokenKind::KwWhile,
        "return" => TokenKind::KwReturn,
        _ => TokenKind::Identifier,
    }
}

/// Lex `source` into a flat token stream, skipping whitespace and `//` line
/// comments. The final token is always `Eof`.
pub fn lex_source(source: &str) -> Tokens {
    let bytes = source.as_bytes();
    let mut data = Vec::new();

    let mut line: u32 = 1;
    let mut cursor: usize = 0;

    loop {
        loop {
            while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                if bytes[cursor] == b'\n' {
                    line += 1;
                }
                cursor += 1;
            }

            if cursor + 1 < bytes.len() && bytes[cursor] == b'/' && bytes[cursor + 1] == b'/' {
                while cursor < bytes.len() && bytes[cursor] != b'\n' {
                    cursor += 1;
                }
            } else {
                break;
            }
        }

        if cursor >= bytes.len() {
            break;
        }

        let start = cursor;
        let start_line = line;
        let c = bytes[cursor];
        cursor += 1;

        let kind = if c.is_ascii_digit() {
            while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
                cursor += 1;
            }
            TokenKind::Integer
        } else if is_ident_start(c) {
            while cursor < bytes.len() && is_ident_continue(bytes[cursor]) {
                cursor += 1;
            }
            keyword_kind(&source[start..cursor])
        } else {
            TokenKind::Punct(c)
        };

        data.push(Token::new(kind, start as u32, (cursor - start) as u32, start_line));
    }

    data.push(Token::new(TokenKind::Eof, cursor as u32, 0, line));

    Tokens { data }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex_source(source).data.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn skips_whitespace_and_comments() {
        let toks = kinds("  // a comment\n  1 // trailing\n");
        assert_eq!(toks, vec![TokenKind::Integer, TokenKind::Eof]);
    }

    #[test]
    fn classifies_keywords_and_identifiers() {
        let toks = kinds("if else while return foo");
        assert_eq!(
            toks,
            vec![
                TokenKind::KwIf,
                TokenKind::KwElse,
                TokenKind::KwWhile,
                TokenKind::KwReturn,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn punctuation_carries_its_byte() {
        let toks = kinds("{}();=+-*/");
        assert_eq!(
            toks,
            vec![
                TokenKind::Punct(b'{'),
                TokenKind::Punct(b'}'),
                TokenKind::Punct(b'('),
                TokenKind::Punct(b')'),
                TokenKind::Punct(b';'),
                TokenKind::Punct(b'='),
                TokenKind::Punct(b'+'),
                TokenKind::Punct(b'-'),
                TokenKind::Punct(b'*'),
                TokenKind::Punct(b'/'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = lex_source("a\nb\n  c");
        let lines: Vec<u32> = tokens.data.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 3]);
    }

    #[test]
    fn round_trips_token_slices_against_source() {
        let source = "x: int = 12;";
        let tokens = lex_source(source);
        let reconstructed: String = tokens
            .data
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text(source))
            .collect::<Vec<_>>()
            .join("");
        assert_eq!(reconstructed, "x:int=12;");
    }
}
