//! Recursive-descent parser from tokens to a [`Script`].
//!
//! ```text
//! script    := "lsystem" NAME "{" statement* "}"
//! statement := "let" NAME "=" expr ";"
//!            | "axiom" template+ ";"
//!            | "ignore" symbol+ ";"
//!            | "replace" [patterns "<"] pattern [">" patterns] "by" template*
//!              ["when" expr] [":" expr] ";"
//!            | "interpret" pattern+ "as" COMMAND "(" [expr ("," expr)*] ")" ";"
//! ```
//!
//! Expression precedence, lowest first: `|`, `&`, relational, additive,
//! multiplicative, `^` (right associative), unary.

use crate::error::{Error, Result};
use crate::expr::{BinaryOp, Builtin, Expr, UnaryOp};
use crate::grammar::{ModulePattern, ModuleTemplate, Production};
use crate::lexer::{Keyword, Span, Token, TokenKind};
use crate::turtle::Command;

/// The syntax tree of one `lsystem` declaration, before semantic checks.
#[derive(Clone, Debug, PartialEq)]
pub struct Script {
    pub name: String,
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Let {
        name: String,
        value: Expr,
        span: Span,
    },
    Axiom {
        modules: Vec<ModuleTemplate>,
        span: Span,
    },
    Ignore {
        symbols: Vec<char>,
    },
    Replace(Production),
    Interpret {
        patterns: Vec<ModulePattern>,
        command: Command,
        args: Vec<Expr>,
    },
}

/// Parses a token stream produced by [`crate::lexer::tokenize`].
pub fn parse_script(tokens: &[Token]) -> Result<Script> {
    if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
        return Err(Error::parse(
            "token stream is not terminated by end of input",
            tokens.last().map(|t| t.span).unwrap_or_default(),
        ));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let script = parser.script()?;
    parser.expect(TokenKind::Eof, "end of input after the closing '}'")?;
    Ok(script)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

/// Which token kinds may stand for a symbol in the word being read.
#[derive(Clone, Copy, PartialEq, Eq)]
enum WordContext {
    /// Axioms and successors: every glyph is a symbol.
    Free,
    /// Replace patterns: `<` and `>` separate contexts, brackets are not allowed.
    Pattern,
    /// Interpret and ignore lists: every glyph is a symbol.
    List,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> &'t Token {
        // `parse_script` only accepts streams that end with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &'t TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> &'t Token {
        let token = self.peek();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        Error::parse(format!("expected {expected}, found {}", token.kind), token.span)
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Span> {
        if self.check(&kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<(String, Span)> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name.clone(), span))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn script(&mut self) -> Result<Script> {
        let span = self.expect(TokenKind::Keyword(Keyword::Lsystem), "'lsystem'")?;
        let (name, _) = self.expect_ident("lsystem name")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            statements.push(self.statement()?);
        }
        self.advance();

        Ok(Script {
            name,
            span,
            statements,
        })
    }

    fn statement(&mut self) -> Result<Statement> {
        let span = self.peek().span;
        let statement = match self.peek_kind() {
            TokenKind::Keyword(Keyword::Let) => {
                self.advance();
                let (name, _) = self.expect_ident("constant name")?;
                self.expect(TokenKind::Equal, "'='")?;
                let value = self.expr()?;
                Statement::Let { name, value, span }
            }
            TokenKind::Keyword(Keyword::Axiom) => {
                self.advance();
                let modules = self.templates()?;
                if modules.is_empty() {
                    return Err(self.unexpected("at least one axiom symbol"));
                }
                Statement::Axiom { modules, span }
            }
            TokenKind::Keyword(Keyword::Ignore) => {
                self.advance();
                let patterns = self.patterns(WordContext::List)?;
                if patterns.is_empty() {
                    return Err(self.unexpected("symbols to ignore"));
                }
                if let Some(p) = patterns.iter().find(|p| !p.params.is_empty()) {
                    return Err(Error::parse("ignored symbols take no parameter list", p.span));
                }
                Statement::Ignore {
                    symbols: patterns.into_iter().map(|p| p.symbol).collect(),
                }
            }
            TokenKind::Keyword(Keyword::Replace) => {
                self.advance();
                Statement::Replace(self.production(span)?)
            }
            TokenKind::Keyword(Keyword::Interpret) => {
                self.advance();
                self.interpretation()?
            }
            _ => return Err(self.unexpected("'let', 'axiom', 'ignore', 'replace' or 'interpret'")),
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(statement)
    }

    fn production(&mut self, span: Span) -> Result<Production> {
        let first = self.patterns(WordContext::Pattern)?;

        let (left, predecessor) = if self.eat(&TokenKind::Less) {
            if first.is_empty() {
                return Err(self.unexpected("left context symbols before '<'"));
            }
            let pred = self.patterns(WordContext::Pattern)?;
            (first, self.single_predecessor(pred)?)
        } else {
            (Vec::new(), self.single_predecessor(first)?)
        };

        let right = if self.eat(&TokenKind::Greater) {
            let right = self.patterns(WordContext::Pattern)?;
            if right.is_empty() {
                return Err(self.unexpected("right context symbols"));
            }
            right
        } else {
            Vec::new()
        };
        self.expect(TokenKind::Keyword(Keyword::By), "'by'")?;
        let successor = self.templates()?;

        let condition = if self.eat(&TokenKind::Keyword(Keyword::When)) {
            Some(self.expr()?)
        } else {
            None
        };
        let weight = if self.eat(&TokenKind::Colon) {
            self.expr()?
        } else {
            Expr::Number(1.0)
        };

        Ok(Production {
            left,
            predecessor,
            right,
            condition,
            weight,
            successor,
            span,
        })
    }

    fn single_predecessor(&self, mut patterns: Vec<ModulePattern>) -> Result<ModulePattern> {
        match patterns.len() {
            1 => Ok(patterns.remove(0)),
            0 => Err(self.unexpected("a predecessor symbol")),
            _ => Err(Error::parse(
                "a production rewrites exactly one predecessor symbol",
                patterns[1].span,
            )),
        }
    }

    fn interpretation(&mut self) -> Result<Statement> {
        let patterns = self.patterns(WordContext::List)?;
        if patterns.is_empty() {
            return Err(self.unexpected("symbols to interpret"));
        }
        self.expect(TokenKind::Keyword(Keyword::As), "'as'")?;

        let (name, span) = self.expect_ident("command name")?;
        let command = Command::from_name(&name)
            .ok_or_else(|| Error::parse(format!("unknown command '{name}'"), span))?;

        self.expect(TokenKind::LParen, "'('")?;
        let args = self.arguments()?;
        if args.len() > command.max_args() {
            return Err(Error::parse(
                format!(
                    "command '{name}' takes at most {} argument(s), found {}",
                    command.max_args(),
                    args.len()
                ),
                span,
            ));
        }

        Ok(Statement::Interpret {
            patterns,
            command,
            args,
        })
    }

    /// Reads the symbols of the current token, if it can stand for symbols.
    fn symbols(&mut self, context: WordContext) -> Result<Option<(Vec<char>, Span)>> {
        let token = self.peek();
        let symbols = match &token.kind {
            TokenKind::Ident(s) => s.chars().collect(),
            TokenKind::Number { text, .. } => text.chars().collect(),
            TokenKind::Less | TokenKind::Greater if context == WordContext::Pattern => {
                return Ok(None);
            }
            TokenKind::LBracket | TokenKind::RBracket if context == WordContext::Pattern => {
                return Err(Error::parse(
                    "brackets are not allowed in production patterns",
                    token.span,
                ));
            }
            kind => match kind.glyph() {
                Some(c) => vec![c],
                None => return Ok(None),
            },
        };
        self.advance();
        Ok(Some((symbols, token.span)))
    }

    /// Reads `symbol(param, ...)` patterns until a token that is not a symbol.
    fn patterns(&mut self, context: WordContext) -> Result<Vec<ModulePattern>> {
        let mut patterns = Vec::new();
        while let Some((symbols, span)) = self.symbols(context)? {
            patterns.extend(symbols.into_iter().map(|symbol| ModulePattern {
                symbol,
                params: Vec::new(),
                span,
            }));
            if self.eat(&TokenKind::LParen) {
                let mut params = Vec::new();
                if !self.eat(&TokenKind::RParen) {
                    loop {
                        params.push(self.expect_ident("parameter name")?.0);
                        if self.eat(&TokenKind::RParen) {
                            break;
                        }
                        self.expect(TokenKind::Comma, "',' or ')'")?;
                    }
                }
                if let Some(last) = patterns.last_mut() {
                    last.params = params;
                }
            }
        }
        Ok(patterns)
    }

    /// Reads `symbol(expr, ...)` templates until a token that is not a symbol.
    fn templates(&mut self) -> Result<Vec<ModuleTemplate>> {
        let mut templates = Vec::new();
        while let Some((symbols, span)) = self.symbols(WordContext::Free)? {
            templates.extend(symbols.into_iter().map(|symbol| ModuleTemplate {
                symbol,
                args: Vec::new(),
                span,
            }));
            if self.eat(&TokenKind::LParen) {
                let args = self.arguments()?;
                if let Some(last) = templates.last_mut() {
                    last.args = args;
                }
            }
        }
        Ok(templates)
    }

    /// Comma separated expressions; the opening `(` has been consumed.
    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&TokenKind::RParen) {
                return Ok(args);
            }
            self.expect(TokenKind::Comma, "',' or ')'")?;
        }
    }

    pub(crate) fn expr(&mut self) -> Result<Expr> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr> {
        let mut lhs = self.and()?;
        while self.eat(&TokenKind::Pipe) {
            let rhs = self.and()?;
            lhs = Expr::binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut lhs = self.relational()?;
        while self.eat(&TokenKind::Amp) {
            let rhs = self.relational()?;
            lhs = Expr::binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn relational(&mut self) -> Result<Expr> {
        let lhs = self.additive()?;
        let op = match self.peek_kind() {
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::Equal => BinaryOp::Eq,
            TokenKind::LessEqual => BinaryOp::Le,
            TokenKind::GreaterEqual => BinaryOp::Ge,
            TokenKind::NotEqual => BinaryOp::Ne,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.additive()?;
        Ok(Expr::binary(op, lhs, rhs))
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.power()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.power()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.unary()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.power()?;
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.advance();
        Ok(Expr::Unary(op, Box::new(self.unary()?)))
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Number { value, .. } => {
                self.advance();
                Ok(Expr::Number(*value))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if !self.eat(&TokenKind::LParen) {
                    return Ok(Expr::Var(name.clone()));
                }
                let builtin = Builtin::from_name(name).ok_or_else(|| {
                    Error::parse(format!("unknown function '{name}'"), token.span)
                })?;
                let args = self.arguments()?;
                if args.len() != builtin.arity() {
                    return Err(Error::parse(
                        format!(
                            "function '{name}' takes {} argument(s), found {}",
                            builtin.arity(),
                            args.len()
                        ),
                        token.span,
                    ));
                }
                Ok(Expr::Call(builtin, args))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}
