//! Tokenizer for L-System scripts.
//!
//! The lexer is deliberately context free: identifiers are read greedily
//! (`ABA` is one token) and numbers keep their source text, so the parser can
//! split both back into single-character symbols when it reads a word.
//! `#` starts a line comment; `/` is the roll glyph, so `//` is two tokens.

use crate::error::{Error, Result};
use std::fmt;

/// 1-based source position of a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Lsystem,
    Axiom,
    Let,
    Replace,
    By,
    When,
    Interpret,
    As,
    Ignore,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Self> {
        Some(match ident {
            "lsystem" => Keyword::Lsystem,
            "axiom" => Keyword::Axiom,
            "let" => Keyword::Let,
            "replace" => Keyword::Replace,
            "by" => Keyword::By,
            "when" => Keyword::When,
            "interpret" => Keyword::Interpret,
            "as" => Keyword::As,
            "ignore" => Keyword::Ignore,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Lsystem => "lsystem",
            Keyword::Axiom => "axiom",
            Keyword::Let => "let",
            Keyword::Replace => "replace",
            Keyword::By => "by",
            Keyword::When => "when",
            Keyword::Interpret => "interpret",
            Keyword::As => "as",
            Keyword::Ignore => "ignore",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident(String),
    /// Unsigned literal; `text` is the exact source lexeme.
    Number {
        value: f64,
        text: String,
    },

    // Operators and structural glyphs
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Backslash,
    Caret,
    Less,
    Greater,
    Equal,
    LessEqual,
    GreaterEqual,
    NotEqual,
    Bang,
    Amp,
    Pipe,
    Dot,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Colon,

    Eof,
}

impl TokenKind {
    /// The alphabet symbol this token stands for when it appears inside a word.
    pub fn glyph(&self) -> Option<char> {
        Some(match self {
            TokenKind::Plus => '+',
            TokenKind::Minus => '-',
            TokenKind::Pipe => '|',
            TokenKind::Caret => '^',
            TokenKind::Amp => '&',
            TokenKind::Slash => '/',
            TokenKind::Backslash => '\\',
            TokenKind::LBracket => '[',
            TokenKind::RBracket => ']',
            TokenKind::Less => '<',
            TokenKind::Dot => '.',
            TokenKind::Greater => '>',
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Keyword(k) => return write!(f, "'{}'", k.as_str()),
            TokenKind::Ident(i) => return write!(f, "identifier '{i}'"),
            TokenKind::Number { text, .. } => return write!(f, "number '{text}'"),
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Backslash => "\\",
            TokenKind::Caret => "^",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Equal => "=",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::NotEqual => "!=",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Eof => return write!(f, "end of input"),
        };
        write!(f, "'{s}'")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenizes `source`. The returned sequence always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let span = self.span();

            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }

            let kind = if c.is_ascii_alphabetic() {
                self.ident()
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit()))
            {
                self.number()
            } else {
                self.bump();
                match c {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    '%' => TokenKind::Percent,
                    '\\' => TokenKind::Backslash,
                    '^' => TokenKind::Caret,
                    '<' => self.with_equal(TokenKind::Less, TokenKind::LessEqual),
                    '>' => self.with_equal(TokenKind::Greater, TokenKind::GreaterEqual),
                    '!' => self.with_equal(TokenKind::Bang, TokenKind::NotEqual),
                    '=' => TokenKind::Equal,
                    '&' => TokenKind::Amp,
                    '|' => TokenKind::Pipe,
                    '.' => TokenKind::Dot,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    found => {
                        return Err(Error::Lex {
                            found,
                            line: span.line,
                            column: span.column,
                        });
                    }
                }
            };

            tokens.push(Token { kind, span });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: self.span(),
        });
        Ok(tokens)
    }

    fn with_equal(&mut self, single: TokenKind, double: TokenKind) -> TokenKind {
        if self.peek() == Some('=') {
            self.bump();
            double
        } else {
            single
        }
    }

    fn ident(&mut self) -> TokenKind {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match Keyword::from_ident(&ident) {
            Some(k) => TokenKind::Keyword(k),
            None => TokenKind::Ident(ident),
        }
    }

    fn number(&mut self) -> TokenKind {
        let mut text = String::new();
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
            } else if c == '.' && !seen_dot && self.peek_next().is_some_and(|n| n.is_ascii_digit())
            {
                seen_dot = true;
                text.push(c);
            } else {
                break;
            }
            self.bump();
        }
        // Only digits and at most one interior dot were accepted.
        let value = text.parse::<f64>().unwrap_or_default();
        TokenKind::Number { value, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("lsystem Koch { axiom F; }"),
            vec![
                TokenKind::Keyword(Keyword::Lsystem),
                TokenKind::Ident("Koch".into()),
                TokenKind::LBrace,
                TokenKind::Keyword(Keyword::Axiom),
                TokenKind::Ident("F".into()),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_keep_their_text() {
        assert_eq!(
            kinds("1.5 .25 10"),
            vec![
                TokenKind::Number {
                    value: 1.5,
                    text: "1.5".into()
                },
                TokenKind::Number {
                    value: 0.25,
                    text: ".25".into()
                },
                TokenKind::Number {
                    value: 10.0,
                    text: "10".into()
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("<= >= != < > ! ="),
            vec![
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("F # trailing words\n+"),
            vec![
                TokenKind::Ident("F".into()),
                TokenKind::Plus,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn repeated_slashes_are_glyphs() {
        assert_eq!(
            kinds("F//F;"),
            vec![
                TokenKind::Ident("F".into()),
                TokenKind::Slash,
                TokenKind::Slash,
                TokenKind::Ident("F".into()),
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn underscore_is_not_part_of_identifiers() {
        assert_eq!(
            tokenize("axiom F_G;"),
            Err(Error::Lex {
                found: '_',
                line: 1,
                column: 8
            })
        );
    }

    #[test]
    fn spans_are_one_based() {
        let tokens = tokenize("axiom\n  F;").unwrap();
        assert_eq!(tokens[1].span, Span { line: 2, column: 3 });
    }

    #[test]
    fn unknown_character_reports_position() {
        let err = tokenize("axiom F;\n  @").unwrap_err();
        assert_eq!(
            err,
            Error::Lex {
                found: '@',
                line: 2,
                column: 3
            }
        );
    }
}
